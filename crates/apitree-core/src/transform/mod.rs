pub mod naming;
pub mod route_hierarchy;
pub mod route_resolver;
pub mod schema_resolver;
pub mod spec_to_ir;

pub use spec_to_ir::{transform, transform_with_config};

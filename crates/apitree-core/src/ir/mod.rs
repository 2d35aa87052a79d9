pub mod api;
pub mod context;
pub mod model;
pub mod route;
pub mod types;

pub use api::{Api, Root};
pub use context::NamingContext;
pub use model::*;
pub use route::*;
pub use types::{IrInfo, IrServer, IrSpec};

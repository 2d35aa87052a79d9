//! OpenAPI 3.x to a language-neutral IR: a shared model arena, stable type
//! names and an API tree grouped by path.

pub mod config;
pub mod error;
pub mod ir;
pub mod parse;
pub mod transform;

pub use transform::{transform, transform_with_config};

#![deny(unsafe_code)]

pub mod error;
pub mod registry;

pub use crate::error::StandardsError;
pub use crate::registry::{BUILTIN_CATALOG, SchemaRegistry};

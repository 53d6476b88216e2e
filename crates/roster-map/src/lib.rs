#![deny(unsafe_code)]

//! Schema-aware column mapping and entity resolution.
//!
//! - [`score`]: name similarity used by both the mapping engine and the resolver.
//! - [`engine`]: per-column mapping suggestions with content heuristics.
//! - [`state`]: operator edits on a suggested mapping set.
//! - [`resolve`]: free-text label to canonical entity resolution.
//! - [`config`]: JSON persistence of approved mappings.

pub mod config;
pub mod engine;
pub mod error;
mod heuristics;
pub mod resolve;
pub mod score;
pub mod state;

pub use config::MappingConfig;
pub use engine::{ColumnMappingEngine, ConfidenceBucket, auto_promote};
pub use error::{MappingError, Result};
pub use resolve::EntityResolver;
pub use score::{entity_score, score};
pub use state::{MappingSet, MappingSummary};

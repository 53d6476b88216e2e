//! Error types for mapping operations.

use std::path::PathBuf;

use roster_model::ModelError;
use roster_standards::StandardsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    /// Column not present in the mapping set.
    #[error("column not found: {column}")]
    UnknownColumn { column: String },

    #[error("field {field} does not exist in table {table}")]
    UnknownField { table: String, field: String },

    #[error("column {column} targets table {found}, expected {expected}")]
    TableMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// A created custom field would collide with an existing field.
    #[error("column {column} would create field {field}, which already exists")]
    ShadowedField { column: String, field: String },

    #[error(transparent)]
    Malformed(#[from] ModelError),

    #[error(transparent)]
    Standards(#[from] StandardsError),

    #[error("failed to access mapping file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid mapping file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, MappingError>;

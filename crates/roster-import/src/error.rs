//! Import and store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by an [`crate::EntityRepository`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached at all.
    #[error("store unavailable: {reason}")]
    Unavailable { reason: String },

    /// The store refused a single write.
    #[error("{table} store rejected the record: {reason}")]
    Rejected { table: String, reason: String },

    #[error("{table} record {id} not found")]
    NotFound { table: String, id: String },

    #[error("failed to {operation} store file {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a single record could not be imported.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Neither the identifier nor every natural-key field has a value.
    #[error("cannot identify record: {fields} missing")]
    MissingKey { fields: String },

    #[error("table {table} has no name field for new entities")]
    NoNameField { table: String },
}

impl RecordError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Store(StoreError::Unavailable { .. }))
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    /// Validation produced blocking errors; nothing was written.
    #[error("validation failed: {errors} error(s) in {rows} row(s)")]
    ValidationFailed { errors: usize, rows: usize },

    #[error("row {row}, column {column}: cannot convert '{value}' to {expected}")]
    Coercion {
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error(transparent)]
    Standards(#[from] roster_standards::StandardsError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to write error report: {source}")]
    Report {
        #[source]
        source: csv::Error,
    },

    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_is_detected_through_record_error() {
        let err = RecordError::from(StoreError::Unavailable {
            reason: "connection refused".to_string(),
        });
        assert!(err.is_unavailable());
        assert_eq!(err.to_string(), "store unavailable: connection refused");
    }
}

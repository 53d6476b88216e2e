//! Error types for file ingestion.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Only UTF-8 input is accepted.
    #[error("unsupported encoding {encoding} in {path}")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("failed to parse delimited data: {source}")]
    Parse {
        #[source]
        source: csv::Error,
    },

    /// No header row: the input is empty or only blank lines.
    #[error("input has no header row")]
    MissingHeader,

    #[error("header at position {index} is empty")]
    EmptyHeader { index: usize },

    #[error("duplicate header '{header}'")]
    DuplicateHeader { header: String },

    #[error(transparent)]
    Model(roster_model::ModelError),
}

impl From<roster_model::ModelError> for IngestError {
    fn from(err: roster_model::ModelError) -> Self {
        match err {
            roster_model::ModelError::EmptyHeader { index } => Self::EmptyHeader { index },
            roster_model::ModelError::DuplicateHeader { header } => Self::DuplicateHeader { header },
            other => Self::Model(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;

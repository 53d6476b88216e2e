use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("header at position {index} is empty")]
    EmptyHeader { index: usize },
    #[error("duplicate header '{header}'")]
    DuplicateHeader { header: String },
    #[error("mapping for column '{column}' is malformed: {reason}")]
    MalformedMapping { column: String, reason: String },
    #[error("unknown field type '{0}'")]
    UnknownFieldType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

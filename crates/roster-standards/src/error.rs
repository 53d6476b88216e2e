#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {source}")]
    Toml {
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown table: {table}")]
    UnknownTable { table: String },

    #[error("unknown field {field} in table {table}")]
    UnknownField { table: String, field: String },

    #[error("duplicate table in catalog: {table}")]
    DuplicateTable { table: String },

    #[error("duplicate field {field} in table {table}")]
    DuplicateField { table: String, field: String },

    #[error("fields {first} and {second} in table {table} normalize to the same label")]
    AmbiguousField {
        table: String,
        first: String,
        second: String,
    },

    #[error("enum field {field} in table {table} has no options")]
    MissingEnumOptions { table: String, field: String },

    #[error("table {table} references missing field {field} as {role}")]
    DanglingReference {
        table: String,
        field: String,
        role: &'static str,
    },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

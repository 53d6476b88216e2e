//! Loading of spreadsheet exports (CSV/TSV) into [`roster_model::ParsedTable`].

pub mod error;
pub mod reader;

pub use error::{IngestError, Result};
pub use reader::{IngestOptions, parse_bytes, read_table};

#![deny(unsafe_code)]

//! Import of validated rows into the canonical store.
//!
//! Rows are coerced into typed [`FieldValues`] ([`records`]), then written
//! one record at a time by the [`ImportOrchestrator`] through injected
//! [`EntityRepository`] implementations. Failures are collected per record
//! and can be written out as a CSV error report ([`report`]).

pub mod error;
pub mod notify;
pub mod orchestrator;
pub mod records;
pub mod report;
pub mod store;
pub mod values;

pub use error::{ImportError, RecordError, StoreError};
pub use notify::{Notifier, TracingNotifier};
pub use orchestrator::{
    CancellationToken, ImportKind, ImportOptions, ImportOrchestrator, ImportResult, ImportState,
    RowError, RunStatus, ensure_importable,
};
pub use records::{ImportRecord, build_records};
pub use report::{render_error_report, report_file_name, save_error_report, write_error_report};
pub use store::{EntityRepository, InMemoryStore, MemoryRepository};
pub use values::{FieldValue, FieldValues, NaturalKey};

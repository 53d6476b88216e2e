#![deny(unsafe_code)]

//! Row validation against a frozen column mapping.
//!
//! Validation runs as a chunked iterator ([`ValidationRun`]) so callers can
//! report progress and stay responsive on large files; [`RowValidator::validate`]
//! is the blocking form.

pub mod checks;
pub mod validator;

pub use checks::{
    INVALID_BOOLEAN, INVALID_DATE, INVALID_EMAIL, INVALID_NUMBER, NOT_AN_OPTION, REQUIRED_EMPTY,
};
pub use validator::{RowValidator, ValidationProgress, ValidationRun, ValidatorSettings};

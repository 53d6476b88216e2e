//! Validation issues and the per-run result that decides whether an import may start.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the import.
    Error,
    /// Surfaced to the operator, never blocking.
    Warning,
}

/// One problem found in one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Spreadsheet row number: the first data row is row 2.
    pub row_index: usize,
    /// Source column as it appears in the file.
    pub column: String,
    /// Target field the column is mapped to.
    pub field: String,
    pub message: String,
    pub raw_value: String,
    pub severity: Severity,
}

/// Outcome of validating every row against a frozen mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    is_valid: bool,
    issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let is_valid = !issues.iter().any(|i| i.severity == Severity::Error);
        Self { is_valid, issues }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Row numbers carrying at least one blocking error, ascending.
    pub fn invalid_rows(&self) -> Vec<usize> {
        self.errors()
            .map(|i| i.row_index)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

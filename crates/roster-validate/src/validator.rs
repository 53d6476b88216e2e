//! Chunked row validation.

use roster_model::{
    ColumnMapping, FieldType, MappingAction, ParsedTable, PipelineSettings, Severity,
    TargetTableSpec, ValidationIssue, ValidationResult,
};

use crate::checks::{ColumnCheck, TextLimits, check_cell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorSettings {
    /// Rows validated between progress events.
    pub chunk_size: usize,
    pub max_text_length: usize,
    pub truncate_to: usize,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self::from(&PipelineSettings::default())
    }
}

impl From<&PipelineSettings> for ValidatorSettings {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size.max(1),
            max_text_length: settings.max_text_length,
            truncate_to: settings.truncate_to,
        }
    }
}

/// Progress after a validated chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationProgress {
    pub processed: usize,
    pub total: usize,
    /// `processed / total`, `1.0` for an empty file.
    pub fraction: f64,
}

/// Validates parsed rows against a target table and a frozen mapping.
#[derive(Debug, Clone)]
pub struct RowValidator<'t> {
    table: &'t TargetTableSpec,
    settings: ValidatorSettings,
}

impl<'t> RowValidator<'t> {
    pub fn new(table: &'t TargetTableSpec) -> Self {
        Self::with_settings(table, ValidatorSettings::default())
    }

    pub fn with_settings(table: &'t TargetTableSpec, settings: ValidatorSettings) -> Self {
        Self { table, settings }
    }

    /// Start a validation pass. Every call starts again from the first row.
    pub fn run<'a>(
        &'a self,
        parsed: &'a ParsedTable,
        mappings: &'a [ColumnMapping],
    ) -> ValidationRun<'a> {
        let checks = mappings
            .iter()
            .filter(|m| !m.is_skip())
            .map(|m| self.column_check(m))
            .collect();
        ValidationRun {
            parsed,
            checks,
            chunk_size: self.settings.chunk_size.max(1),
            limits: TextLimits {
                max_len: self.settings.max_text_length,
                truncate_to: self.settings.truncate_to,
            },
            next_row: 0,
            issues: Vec::new(),
            done: false,
        }
    }

    /// Validate every row at once.
    pub fn validate(&self, parsed: &ParsedTable, mappings: &[ColumnMapping]) -> ValidationResult {
        self.run(parsed, mappings).finish()
    }

    fn column_check<'a>(&'a self, mapping: &'a ColumnMapping) -> ColumnCheck<'a> {
        let spec = match mapping.action {
            MappingAction::Map => self.table.field(&mapping.target_field),
            _ => None,
        };
        let field_type = match mapping.action {
            MappingAction::Create => mapping.data_type,
            _ => spec.map(|s| s.field_type),
        }
        .unwrap_or(FieldType::Text);
        ColumnCheck {
            column: &mapping.source_column,
            field: &mapping.target_field,
            field_type,
            required: spec.is_some_and(|s| s.required),
            email: spec.is_some() && self.table.is_email_field(&mapping.target_field),
            spec,
        }
    }
}

/// A lazy validation pass yielding [`ValidationProgress`] after each chunk.
///
/// Dropping the run abandons it; [`ValidationRun::finish`] drains the
/// remaining chunks and returns the result.
#[derive(Debug)]
pub struct ValidationRun<'a> {
    parsed: &'a ParsedTable,
    checks: Vec<ColumnCheck<'a>>,
    chunk_size: usize,
    limits: TextLimits,
    next_row: usize,
    issues: Vec<ValidationIssue>,
    done: bool,
}

impl ValidationRun<'_> {
    /// Issues found so far.
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Discard partial results and start again from the first row.
    pub fn restart(&mut self) {
        self.next_row = 0;
        self.issues.clear();
        self.done = false;
    }

    /// Validate the remaining rows and produce the result.
    pub fn finish(mut self) -> ValidationResult {
        for _ in self.by_ref() {}
        let result = ValidationResult::from_issues(self.issues);
        tracing::info!(
            rows = self.parsed.row_count(),
            errors = result.error_count(),
            warnings = result.warning_count(),
            valid = result.is_valid(),
            "validation finished"
        );
        result
    }

    fn progress(&self) -> ValidationProgress {
        let total = self.parsed.row_count();
        let fraction = if total == 0 {
            1.0
        } else {
            self.next_row as f64 / total as f64
        };
        ValidationProgress {
            processed: self.next_row,
            total,
            fraction,
        }
    }
}

impl Iterator for ValidationRun<'_> {
    type Item = ValidationProgress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let rows = self.parsed.rows();
        let end = (self.next_row + self.chunk_size).min(rows.len());
        for row in rows.iter().take(end).skip(self.next_row) {
            let row_number = row.line();
            for check in &self.checks {
                check_cell(
                    check,
                    row_number,
                    row.value(check.column),
                    self.limits,
                    &mut self.issues,
                );
            }
        }
        self.next_row = end;
        self.done = end >= rows.len();

        let progress = self.progress();
        tracing::debug!(
            processed = progress.processed,
            total = progress.total,
            errors = self.issues.iter().filter(|i| i.severity == Severity::Error).count(),
            "validated chunk"
        );
        Some(progress)
    }
}

#[cfg(test)]
mod tests {
    use roster_model::TargetFieldSpec;

    use super::*;

    fn table() -> TargetTableSpec {
        TargetTableSpec {
            name: "employers".to_string(),
            label: String::new(),
            primary_name_field: Some("name".to_string()),
            email_field: Some("email".to_string()),
            identifier_field: None,
            natural_key: vec!["name".to_string()],
            fields: vec![
                TargetFieldSpec {
                    name: "name".to_string(),
                    field_type: FieldType::Text,
                    required: true,
                    description: String::new(),
                    enum_options: None,
                },
                TargetFieldSpec {
                    name: "email".to_string(),
                    field_type: FieldType::Text,
                    required: false,
                    description: String::new(),
                    enum_options: None,
                },
            ],
        }
    }

    fn rows(count: usize) -> ParsedTable {
        ParsedTable::new(
            vec!["name".to_string()],
            (0..count).map(|i| vec![format!("Employer {i}")]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn yields_one_event_per_chunk() {
        let spec = table();
        let validator = RowValidator::with_settings(
            &spec,
            ValidatorSettings {
                chunk_size: 100,
                ..ValidatorSettings::default()
            },
        );
        let parsed = rows(250);
        let mappings = vec![ColumnMapping::map("name", "employers", "name", 100)];
        let events: Vec<ValidationProgress> = validator.run(&parsed, &mappings).collect();
        let processed: Vec<usize> = events.iter().map(|e| e.processed).collect();
        assert_eq!(processed, vec![100, 200, 250]);
        assert_eq!(events[0].fraction, 0.4);
        assert_eq!(events[2].fraction, 1.0);
    }

    #[test]
    fn empty_table_reports_complete_once() {
        let spec = table();
        let validator = RowValidator::new(&spec);
        let parsed = rows(0);
        let events: Vec<ValidationProgress> = validator.run(&parsed, &[]).collect();
        assert_eq!(
            events,
            vec![ValidationProgress {
                processed: 0,
                total: 0,
                fraction: 1.0
            }]
        );
    }

    #[test]
    fn restart_discards_partial_issues() {
        let spec = table();
        let validator = RowValidator::with_settings(
            &spec,
            ValidatorSettings {
                chunk_size: 1,
                ..ValidatorSettings::default()
            },
        );
        let parsed = ParsedTable::new(
            vec!["name".to_string()],
            vec![vec![String::new()], vec![String::new()]],
        )
        .unwrap();
        let mappings = vec![ColumnMapping::map("name", "employers", "name", 100)];

        let mut run = validator.run(&parsed, &mappings);
        run.next();
        assert_eq!(run.issues().len(), 1);
        run.restart();
        assert!(run.issues().is_empty());
        let result = run.finish();
        assert_eq!(result.invalid_rows(), vec![2, 3]);
    }
}

pub mod entity;
pub mod error;
pub mod mapping;
pub mod options;
pub mod schema;
pub mod table;
pub mod validation;
pub mod values;

pub use entity::{ConfidenceTier, EntityCandidate, EntityMatch, RecordId};
pub use error::{ModelError, Result};
pub use mapping::{ColumnMapping, MappingAction, custom_field_name};
pub use options::PipelineSettings;
pub use schema::{FieldType, TargetFieldSpec, TargetTableSpec};
pub use table::{FIRST_DATA_LINE, ParsedTable, Row};
pub use validation::{Severity, ValidationIssue, ValidationResult};
pub use values::{is_blank, normalize_label, parse_boolean, parse_date, parse_number};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_result_counts() {
        let result = ValidationResult::from_issues(vec![
            ValidationIssue {
                row_index: 2,
                column: "Surname".to_string(),
                field: "surname".to_string(),
                message: "required field empty".to_string(),
                raw_value: String::new(),
                severity: Severity::Error,
            },
            ValidationIssue {
                row_index: 3,
                column: "Email".to_string(),
                field: "email".to_string(),
                message: "invalid email format".to_string(),
                raw_value: "jane@".to_string(),
                severity: Severity::Warning,
            },
        ]);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.warning_count(), 1);
        assert!(!result.is_valid());
        assert_eq!(result.invalid_rows(), vec![2]);
    }

    #[test]
    fn warnings_alone_keep_result_valid() {
        let result = ValidationResult::from_issues(vec![ValidationIssue {
            row_index: 2,
            column: "Email".to_string(),
            field: "email".to_string(),
            message: "invalid email format".to_string(),
            raw_value: "nope".to_string(),
            severity: Severity::Warning,
        }]);
        assert!(result.is_valid());
        assert!(result.invalid_rows().is_empty());
    }

    #[test]
    fn mapping_serializes_lowercase_action() {
        let mapping = ColumnMapping::map("First Name", "workers", "first_name", 100);
        let json = serde_json::to_string(&mapping).expect("serialize mapping");
        assert!(json.contains("\"action\":\"map\""));
        let round: ColumnMapping = serde_json::from_str(&json).expect("deserialize mapping");
        assert_eq!(round, mapping);
    }
}

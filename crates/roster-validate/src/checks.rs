//! Per-cell checks.

use std::sync::LazyLock;

use regex::Regex;
use roster_model::{
    FieldType, Severity, TargetFieldSpec, ValidationIssue, is_blank, parse_boolean, parse_date,
    parse_number,
};

pub const REQUIRED_EMPTY: &str = "required field empty";
pub const INVALID_DATE: &str = "invalid date format";
pub const INVALID_NUMBER: &str = "invalid number format";
pub const INVALID_EMAIL: &str = "invalid email format";
pub const NOT_AN_OPTION: &str = "value not in allowed options";
pub const INVALID_BOOLEAN: &str = "invalid boolean value";

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

/// What the validator knows about one mapped column.
#[derive(Debug, Clone)]
pub(crate) struct ColumnCheck<'a> {
    pub column: &'a str,
    pub field: &'a str,
    pub field_type: FieldType,
    pub required: bool,
    pub email: bool,
    pub spec: Option<&'a TargetFieldSpec>,
}

/// Limits for the overlong-text warning.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TextLimits {
    pub max_len: usize,
    pub truncate_to: usize,
}

pub(crate) fn check_cell(
    check: &ColumnCheck<'_>,
    row_index: usize,
    raw: &str,
    limits: TextLimits,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut push = |message: String, raw_value: String, severity: Severity| {
        issues.push(ValidationIssue {
            row_index,
            column: check.column.to_string(),
            field: check.field.to_string(),
            message,
            raw_value,
            severity,
        });
    };

    if is_blank(raw) {
        if check.required {
            push(REQUIRED_EMPTY.to_string(), raw.to_string(), Severity::Error);
        }
        return;
    }

    match check.field_type {
        FieldType::Date if parse_date(raw).is_none() => {
            push(INVALID_DATE.to_string(), raw.to_string(), Severity::Error);
        }
        FieldType::Number if parse_number(raw).is_none() => {
            push(INVALID_NUMBER.to_string(), raw.to_string(), Severity::Error);
        }
        FieldType::Boolean if parse_boolean(raw).is_none() => {
            push(INVALID_BOOLEAN.to_string(), raw.to_string(), Severity::Warning);
        }
        FieldType::Enum => {
            let has_options = check
                .spec
                .and_then(|spec| spec.enum_options.as_ref())
                .is_some_and(|options| !options.is_empty());
            let known = check.spec.and_then(|spec| spec.enum_option(raw)).is_some();
            if has_options && !known {
                push(NOT_AN_OPTION.to_string(), raw.to_string(), Severity::Warning);
            }
        }
        _ => {}
    }

    if check.email && !EMAIL_REGEX.is_match(raw.trim()) {
        push(INVALID_EMAIL.to_string(), raw.to_string(), Severity::Warning);
    }

    if raw.chars().count() > limits.max_len {
        let mut captured: String = raw.chars().take(limits.truncate_to).collect();
        captured.push_str("...");
        push(
            format!("value exceeds {} characters", limits.max_len),
            captured,
            Severity::Warning,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITS: TextLimits = TextLimits {
        max_len: 255,
        truncate_to: 50,
    };

    fn check(field_type: FieldType, required: bool, email: bool) -> ColumnCheck<'static> {
        ColumnCheck {
            column: "Col",
            field: "col",
            field_type,
            required,
            email,
            spec: None,
        }
    }

    fn run(check: &ColumnCheck<'_>, raw: &str) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        check_cell(check, 2, raw, LIMITS, &mut issues);
        issues
    }

    #[test]
    fn blank_optional_value_is_fine() {
        assert!(run(&check(FieldType::Date, false, false), "  ").is_empty());
    }

    #[test]
    fn email_pattern() {
        let email = check(FieldType::Text, false, true);
        assert!(run(&email, "jane@example.org").is_empty());
        assert!(run(&email, " jane@example.org ").is_empty());
        let issues = run(&email, "jane@example");
        assert_eq!(issues[0].message, INVALID_EMAIL);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(run(&email, "jane doe@example.org").len(), 1);
    }

    #[test]
    fn overlong_value_is_truncated_in_issue() {
        let raw = "x".repeat(300);
        let issues = run(&check(FieldType::Text, false, false), &raw);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "value exceeds 255 characters");
        assert_eq!(issues[0].raw_value, format!("{}...", "x".repeat(50)));
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn exactly_max_length_is_fine() {
        let raw = "y".repeat(255);
        assert!(run(&check(FieldType::Text, false, false), &raw).is_empty());
    }

    #[test]
    fn boolean_spellings() {
        let flag = check(FieldType::Boolean, false, false);
        assert!(run(&flag, "Yes").is_empty());
        assert_eq!(run(&flag, "perhaps")[0].message, INVALID_BOOLEAN);
    }
}

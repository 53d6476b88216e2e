//! Raw value helpers shared by mapping, validation, and coercion.

use chrono::NaiveDate;

/// Date layouts accepted on import, tried in order.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Lowercase and strip every non-alphanumeric character.
///
/// This is the single normalization used for header/field comparison and
/// for entity labels, so "First Name", "first_name" and "FIRST-NAME" all
/// compare equal.
pub fn normalize_label(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Parse a finite decimal number. `NaN` and infinities are rejected.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn parse_boolean(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_separators_and_case() {
        assert_eq!(normalize_label("First Name"), "firstname");
        assert_eq!(normalize_label("first_name"), "firstname");
        assert_eq!(normalize_label("  ACME Pty. Ltd "), "acmeptyltd");
        assert_eq!(normalize_label("--"), "");
    }

    #[test]
    fn parses_supported_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_date("2024-03-09"), expected);
        assert_eq!(parse_date("09/03/2024"), expected);
        assert_eq!(parse_date("09-03-2024"), expected);
        assert_eq!(parse_date(" 2024-03-09 "), expected);
    }

    #[test]
    fn rejects_impossible_dates() {
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("31/13/2024"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn numbers_must_be_finite() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("12abc"), None);
    }

    #[test]
    fn booleans_accept_common_spellings() {
        assert_eq!(parse_boolean("Yes"), Some(true));
        assert_eq!(parse_boolean("0"), Some(false));
        assert_eq!(parse_boolean("maybe"), None);
    }
}

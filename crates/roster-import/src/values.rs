//! Typed field values produced from validated raw strings.

use std::fmt;

use chrono::NaiveDate;
use roster_model::normalize_label;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Number(f64),
    Boolean(bool),
    List(Vec<String>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::List(items) => f.write_str(&items.join("; ")),
        }
    }
}

/// Ordered field name to value pairs for one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(Vec<(String, FieldValue)>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Display form of `field`, if present and not blank.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field)
            .map(ToString::to_string)
            .filter(|text| !text.trim().is_empty())
    }

    /// Set `field`, replacing an existing value in place.
    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        let field = field.into();
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((field, value)),
        }
    }

    /// Set `field` unless it already has a value. Returns whether it was set.
    pub fn insert_if_absent(&mut self, field: impl Into<String>, value: FieldValue) -> bool {
        let field = field.into();
        if self.get(&field).is_some() {
            return false;
        }
        self.0.push((field, value));
        true
    }

    /// Overwrite with every value present in `other`; fields absent from
    /// `other` keep their current value.
    pub fn merge(&mut self, other: &FieldValues) {
        for (field, value) in other.iter() {
            self.insert(field, value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        let mut values = FieldValues::new();
        for (field, value) in iter {
            values.insert(field, value);
        }
        values
    }
}

/// How an incoming record is matched against existing canonical records.
///
/// Identifiers compare exactly after trimming. Name fields compare on
/// [`normalize_label`] so case, spacing and punctuation differences do not
/// create duplicates; a value with nothing left after normalizing never
/// matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NaturalKey {
    /// A stable external identifier such as a membership number.
    Identifier { field: String, value: String },
    /// Every listed field must match.
    Fields(Vec<(String, String)>),
    /// Every listed field must match on a record with no `identifier` yet.
    Unidentified {
        identifier: String,
        fields: Vec<(String, String)>,
    },
}

impl NaturalKey {
    pub fn matches(&self, values: &FieldValues) -> bool {
        let same_name = |field: &str, wanted: &str| {
            let wanted = normalize_label(wanted);
            !wanted.is_empty()
                && values
                    .text(field)
                    .is_some_and(|have| normalize_label(&have) == wanted)
        };
        let all_names = |pairs: &[(String, String)]| {
            !pairs.is_empty() && pairs.iter().all(|(field, value)| same_name(field, value))
        };
        match self {
            NaturalKey::Identifier { field, value } => values
                .text(field)
                .is_some_and(|have| have.trim() == value.trim()),
            NaturalKey::Fields(pairs) => all_names(pairs),
            NaturalKey::Unidentified { identifier, fields } => {
                values.text(identifier).is_none() && all_names(fields)
            }
        }
    }
}

fn write_pairs(f: &mut fmt::Formatter<'_>, pairs: &[(String, String)]) -> fmt::Result {
    let parts: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
    f.write_str(&parts.join(", "))
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NaturalKey::Identifier { field, value } => write!(f, "{field}={value}"),
            NaturalKey::Fields(pairs) => write_pairs(f, pairs),
            NaturalKey::Unidentified { identifier, fields } => {
                write_pairs(f, fields)?;
                write!(f, " (no {identifier})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    #[test]
    fn display_forms() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(FieldValue::Date(date).to_string(), "2024-03-09");
        assert_eq!(FieldValue::Number(42.0).to_string(), "42");
        assert_eq!(FieldValue::Number(12.5).to_string(), "12.5");
        assert_eq!(
            FieldValue::List(vec!["English".into(), "Greek".into()]).to_string(),
            "English; Greek"
        );
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut values = FieldValues::new();
        values.insert("first_name", text("Jane"));
        values.insert("surname", text("Doe"));
        values.insert("first_name", text("Janet"));
        let fields: Vec<&str> = values.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["first_name", "surname"]);
        assert_eq!(values.text("first_name").as_deref(), Some("Janet"));
        assert!(!values.insert_if_absent("surname", text("Roe")));
    }

    #[test]
    fn natural_keys_ignore_case_and_spacing() {
        let values: FieldValues = [
            ("first_name".to_string(), text("Jane")),
            ("surname".to_string(), text("O'Neil")),
        ]
        .into_iter()
        .collect();
        let key = NaturalKey::Fields(vec![
            ("first_name".into(), "JANE".into()),
            ("surname".into(), "oneil".into()),
        ]);
        assert!(key.matches(&values));
        let other = NaturalKey::Identifier {
            field: "member_number".into(),
            value: "M-1".into(),
        };
        assert!(!other.matches(&values));
    }

    #[test]
    fn identifiers_compare_exactly() {
        let values: FieldValues = [("member_number".to_string(), text(" AB-12 "))]
            .into_iter()
            .collect();
        let key = |value: &str| NaturalKey::Identifier {
            field: "member_number".into(),
            value: value.into(),
        };
        assert!(key("AB-12").matches(&values));
        assert!(!key("AB12").matches(&values));
        assert!(!key("ab-12").matches(&values));
    }

    #[test]
    fn punctuation_only_names_never_match() {
        let values: FieldValues = [("name".to_string(), text("--"))].into_iter().collect();
        let key = NaturalKey::Fields(vec![("name".into(), "!!".into())]);
        assert!(!key.matches(&values));
    }

    #[test]
    fn unidentified_key_skips_records_with_an_identifier() {
        let mut values: FieldValues = [
            ("first_name".to_string(), text("Jane")),
            ("surname".to_string(), text("Doe")),
        ]
        .into_iter()
        .collect();
        let key = NaturalKey::Unidentified {
            identifier: "member_number".into(),
            fields: vec![
                ("first_name".into(), "Jane".into()),
                ("surname".into(), "Doe".into()),
            ],
        };
        assert!(key.matches(&values));
        assert_eq!(key.to_string(), "first_name=Jane, surname=Doe (no member_number)");
        values.insert("member_number", text("M-1"));
        assert!(!key.matches(&values));
    }
}

//! Target catalog types: tables and their importable fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Storage type of a target field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Date,
    Number,
    Boolean,
    Enum,
    Identifier,
    Array,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Enum => "enum",
            FieldType::Identifier => "identifier",
            FieldType::Array => "array",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "date" => Ok(FieldType::Date),
            "number" => Ok(FieldType::Number),
            "boolean" => Ok(FieldType::Boolean),
            "enum" => Ok(FieldType::Enum),
            "identifier" => Ok(FieldType::Identifier),
            "array" => Ok(FieldType::Array),
            other => Err(ModelError::UnknownFieldType(other.to_string())),
        }
    }
}

/// A single importable field of a target table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_options: Option<Vec<String>>,
}

impl TargetFieldSpec {
    /// Canonical spelling of `value` among the enum options (case-insensitive).
    ///
    /// Returns `None` for non-enum fields or when no option matches.
    pub fn enum_option(&self, value: &str) -> Option<&str> {
        let trimmed = value.trim();
        self.enum_options
            .as_deref()?
            .iter()
            .find(|option| option.eq_ignore_ascii_case(trimmed))
            .map(String::as_str)
    }
}

/// A named, ordered collection of fields.
///
/// Field order is significant: it is the tie-break order when two fields
/// score equally for a source column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTableSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    /// Field an unqualified "name" header defaults to.
    #[serde(default)]
    pub primary_name_field: Option<String>,
    /// Field holding an email address (pattern-checked on validation).
    #[serde(default)]
    pub email_field: Option<String>,
    /// Stable external identifier, preferred for natural-key lookups.
    #[serde(default)]
    pub identifier_field: Option<String>,
    /// Fallback natural key used when the identifier is absent.
    #[serde(default)]
    pub natural_key: Vec<String>,
    pub fields: Vec<TargetFieldSpec>,
}

impl TargetTableSpec {
    pub fn field(&self, name: &str) -> Option<&TargetFieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &TargetFieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn is_email_field(&self, name: &str) -> bool {
        self.email_field.as_deref() == Some(name)
    }
}

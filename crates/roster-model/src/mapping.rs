//! Column mapping types: how one source column lands in the target table.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::schema::FieldType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingAction {
    /// Write into an existing field of the target table.
    Map,
    /// Create a new custom field named after the source column.
    Create,
    /// Ignore the column.
    Skip,
}

/// Mapping of one source column onto the target table.
///
/// Invariants: `target_field` is empty iff the action is `Skip`; a `Create`
/// mapping carries `data_type`. Field existence for `Map` is checked against
/// the catalog by the mapping crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source_column: String,
    pub target_table: String,
    pub target_field: String,
    pub action: MappingAction,
    /// Suggestion confidence, 0..=100.
    pub confidence: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<FieldType>,
}

impl ColumnMapping {
    pub fn map(source: &str, table: &str, field: &str, confidence: u8) -> Self {
        Self {
            source_column: source.to_string(),
            target_table: table.to_string(),
            target_field: field.to_string(),
            action: MappingAction::Map,
            confidence: confidence.min(100),
            data_type: None,
        }
    }

    pub fn skip(source: &str, table: &str) -> Self {
        Self {
            source_column: source.to_string(),
            target_table: table.to_string(),
            target_field: String::new(),
            action: MappingAction::Skip,
            confidence: 0,
            data_type: None,
        }
    }

    /// A new custom field derived from the source column name.
    pub fn create(source: &str, table: &str, data_type: FieldType) -> Self {
        Self {
            source_column: source.to_string(),
            target_table: table.to_string(),
            target_field: custom_field_name(source),
            action: MappingAction::Create,
            confidence: 0,
            data_type: Some(data_type),
        }
    }

    pub fn is_skip(&self) -> bool {
        self.action == MappingAction::Skip
    }

    /// Check the invariants that do not need the catalog.
    pub fn check_shape(&self) -> Result<()> {
        let malformed = |reason: &str| ModelError::MalformedMapping {
            column: self.source_column.clone(),
            reason: reason.to_string(),
        };
        if self.confidence > 100 {
            return Err(malformed("confidence above 100"));
        }
        match self.action {
            MappingAction::Skip if !self.target_field.is_empty() => {
                Err(malformed("skipped column has a target field"))
            }
            MappingAction::Map | MappingAction::Create if self.target_field.is_empty() => {
                Err(malformed("target field is empty"))
            }
            MappingAction::Create if self.data_type.is_none() => {
                Err(malformed("created field has no data type"))
            }
            _ => Ok(()),
        }
    }
}

/// Snake-case field name for a column promoted with `Create`.
pub fn custom_field_name(source: &str) -> String {
    let mut name = String::new();
    let mut pending_sep = false;
    for ch in source.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !name.is_empty() {
                name.push('_');
            }
            pending_sep = false;
            name.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_field_names_are_snake_case() {
        assert_eq!(custom_field_name("Shirt Size"), "shirt_size");
        assert_eq!(custom_field_name("  T-Shirt / Size "), "t_shirt_size");
    }

    #[test]
    fn shape_rules() {
        assert!(ColumnMapping::skip("X", "workers").check_shape().is_ok());
        assert!(
            ColumnMapping::create("X", "workers", FieldType::Text)
                .check_shape()
                .is_ok()
        );
        let mut broken = ColumnMapping::create("X", "workers", FieldType::Text);
        broken.data_type = None;
        assert!(broken.check_shape().is_err());
        let mut broken = ColumnMapping::skip("X", "workers");
        broken.target_field = "x".to_string();
        assert!(broken.check_shape().is_err());
    }
}

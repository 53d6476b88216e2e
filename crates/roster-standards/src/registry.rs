#![deny(unsafe_code)]

//! Read-only catalog of importable tables.
//!
//! The registry is loaded once at process start, either from the catalog
//! embedded in this crate or from a TOML file with the same layout, and is
//! never mutated afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use roster_model::{FieldType, TargetFieldSpec, TargetTableSpec, normalize_label};
use serde::Deserialize;

use crate::error::StandardsError;

/// Catalog shipped with the crate.
pub const BUILTIN_CATALOG: &str = include_str!("../standards/catalog.toml");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    tables: Vec<TargetTableSpec>,
}

#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    tables: Vec<TargetTableSpec>,
}

impl SchemaRegistry {
    /// Load the embedded catalog.
    pub fn load_default() -> Result<Self, StandardsError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn from_path(path: &Path) -> Result<Self, StandardsError> {
        let contents = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, StandardsError> {
        let catalog: CatalogFile =
            toml::from_str(contents).map_err(|source| StandardsError::Toml { source })?;
        Self::from_tables(catalog.tables)
    }

    pub fn from_tables(tables: Vec<TargetTableSpec>) -> Result<Self, StandardsError> {
        let mut seen = BTreeMap::new();
        for table in &tables {
            if seen.insert(table.name.as_str(), ()).is_some() {
                return Err(StandardsError::DuplicateTable {
                    table: table.name.clone(),
                });
            }
            validate_table(table)?;
        }
        Ok(Self { tables })
    }

    /// Tables in catalog order.
    pub fn tables(&self) -> &[TargetTableSpec] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Result<&TargetTableSpec, StandardsError> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| StandardsError::UnknownTable {
                table: name.to_string(),
            })
    }

    /// Fields of `table` in declaration order.
    pub fn fields(&self, table: &str) -> Result<&[TargetFieldSpec], StandardsError> {
        Ok(&self.table(table)?.fields)
    }

    pub fn field(&self, table: &str, name: &str) -> Result<&TargetFieldSpec, StandardsError> {
        self.table(table)?
            .field(name)
            .ok_or_else(|| StandardsError::UnknownField {
                table: table.to_string(),
                field: name.to_string(),
            })
    }
}

fn validate_table(table: &TargetTableSpec) -> Result<(), StandardsError> {
    let mut names: BTreeMap<&str, ()> = BTreeMap::new();
    let mut normalized: BTreeMap<String, &str> = BTreeMap::new();
    for field in &table.fields {
        if names.insert(field.name.as_str(), ()).is_some() {
            return Err(StandardsError::DuplicateField {
                table: table.name.clone(),
                field: field.name.clone(),
            });
        }
        // An exact normalized header match must point at exactly one field.
        if let Some(first) = normalized.insert(normalize_label(&field.name), &field.name) {
            return Err(StandardsError::AmbiguousField {
                table: table.name.clone(),
                first: first.to_string(),
                second: field.name.clone(),
            });
        }
        if field.field_type == FieldType::Enum
            && field.enum_options.as_ref().is_none_or(Vec::is_empty)
        {
            return Err(StandardsError::MissingEnumOptions {
                table: table.name.clone(),
                field: field.name.clone(),
            });
        }
    }

    let references = [
        ("primary name field", table.primary_name_field.as_deref()),
        ("email field", table.email_field.as_deref()),
        ("identifier field", table.identifier_field.as_deref()),
    ];
    let key_refs = table
        .natural_key
        .iter()
        .map(|field| ("natural key", Some(field.as_str())));
    for (role, field) in references.into_iter().chain(key_refs) {
        if let Some(field) = field
            && !table.has_field(field)
        {
            return Err(StandardsError::DanglingReference {
                table: table.name.clone(),
                field: field.to_string(),
                role,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let registry = SchemaRegistry::load_default().expect("load builtin catalog");
        assert!(registry.table("workers").is_ok());
        assert!(registry.table("employers").is_ok());
    }

    #[test]
    fn rejects_fields_that_normalize_alike() {
        let toml = r#"
            [[tables]]
            name = "t"
            [[tables.fields]]
            name = "first_name"
            type = "text"
            [[tables.fields]]
            name = "FirstName"
            type = "text"
        "#;
        let err = SchemaRegistry::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, StandardsError::AmbiguousField { .. }));
    }

    #[test]
    fn rejects_enum_without_options() {
        let toml = r#"
            [[tables]]
            name = "t"
            [[tables.fields]]
            name = "state"
            type = "enum"
        "#;
        let err = SchemaRegistry::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, StandardsError::MissingEnumOptions { .. }));
    }

    #[test]
    fn rejects_dangling_natural_key() {
        let toml = r#"
            [[tables]]
            name = "t"
            natural_key = ["missing"]
            [[tables.fields]]
            name = "name"
            type = "text"
        "#;
        let err = SchemaRegistry::from_toml_str(toml).unwrap_err();
        assert!(matches!(
            err,
            StandardsError::DanglingReference {
                role: "natural key",
                ..
            }
        ));
    }
}

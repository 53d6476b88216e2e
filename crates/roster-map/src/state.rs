//! Operator edits on a suggested mapping set.
//!
//! A [`MappingSet`] starts from the engine's suggestions and is adjusted
//! column by column before being frozen for validation and import.

use roster_model::{ColumnMapping, FieldType, MappingAction, TargetTableSpec};
use roster_standards::SchemaRegistry;
use serde::{Deserialize, Serialize};

use crate::engine::{ConfidenceBucket, auto_promote};
use crate::error::{MappingError, Result};

/// Confidence recorded for a field picked by hand.
const MANUAL_CONFIDENCE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSet {
    table: String,
    mappings: Vec<ColumnMapping>,
}

impl MappingSet {
    pub fn new(table: impl Into<String>, mappings: Vec<ColumnMapping>) -> Self {
        Self {
            table: table.into(),
            mappings,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn mappings(&self) -> &[ColumnMapping] {
        &self.mappings
    }

    pub fn into_mappings(self) -> Vec<ColumnMapping> {
        self.mappings
    }

    pub fn get(&self, column: &str) -> Option<&ColumnMapping> {
        self.mappings.iter().find(|m| m.source_column == column)
    }

    fn get_mut(&mut self, column: &str) -> Result<&mut ColumnMapping> {
        self.mappings
            .iter_mut()
            .find(|m| m.source_column == column)
            .ok_or_else(|| MappingError::UnknownColumn {
                column: column.to_string(),
            })
    }

    /// Point `column` at an existing field of `table`.
    pub fn set_target(&mut self, table: &TargetTableSpec, column: &str, field: &str) -> Result<()> {
        if !table.has_field(field) {
            return Err(MappingError::UnknownField {
                table: table.name.clone(),
                field: field.to_string(),
            });
        }
        let mapping = self.get_mut(column)?;
        mapping.target_field = field.to_string();
        mapping.action = MappingAction::Map;
        mapping.confidence = MANUAL_CONFIDENCE;
        mapping.data_type = None;
        Ok(())
    }

    /// Promote `column` to a new custom field of the given type.
    pub fn set_create(&mut self, column: &str, data_type: FieldType) -> Result<()> {
        let table = self.table.clone();
        let mapping = self.get_mut(column)?;
        *mapping = ColumnMapping::create(column, &table, data_type);
        Ok(())
    }

    pub fn set_skip(&mut self, column: &str) -> Result<()> {
        let table = self.table.clone();
        let mapping = self.get_mut(column)?;
        *mapping = ColumnMapping::skip(column, &table);
        Ok(())
    }

    /// Accept every suggestion at or above `threshold`.
    pub fn auto_promote(&mut self, threshold: u8) {
        self.mappings = auto_promote(&self.mappings, threshold);
    }

    /// Enforce the mapping invariants against the catalog.
    pub fn check(&self, registry: &SchemaRegistry) -> Result<()> {
        let table = registry.table(&self.table)?;
        for mapping in &self.mappings {
            mapping.check_shape()?;
            if mapping.target_table != self.table {
                return Err(MappingError::TableMismatch {
                    column: mapping.source_column.clone(),
                    expected: self.table.clone(),
                    found: mapping.target_table.clone(),
                });
            }
            match mapping.action {
                MappingAction::Map if !table.has_field(&mapping.target_field) => {
                    return Err(MappingError::UnknownField {
                        table: self.table.clone(),
                        field: mapping.target_field.clone(),
                    });
                }
                MappingAction::Create if table.has_field(&mapping.target_field) => {
                    return Err(MappingError::ShadowedField {
                        column: mapping.source_column.clone(),
                        field: mapping.target_field.clone(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Counts per action and confidence bucket.
    pub fn summary(&self, table: &TargetTableSpec) -> MappingSummary {
        let mut summary = MappingSummary {
            columns: self.mappings.len(),
            ..MappingSummary::default()
        };
        for mapping in &self.mappings {
            match mapping.action {
                MappingAction::Map => {
                    summary.mapped += 1;
                    match ConfidenceBucket::from_confidence(mapping.confidence) {
                        ConfidenceBucket::Excellent => summary.excellent += 1,
                        ConfidenceBucket::Good => summary.good += 1,
                        ConfidenceBucket::Fair => summary.fair += 1,
                        ConfidenceBucket::Poor => summary.poor += 1,
                    }
                }
                MappingAction::Create => summary.created += 1,
                MappingAction::Skip => summary.skipped += 1,
            }
        }
        for field in table.required_fields() {
            summary.required_total += 1;
            let covered = self
                .mappings
                .iter()
                .any(|m| m.action == MappingAction::Map && m.target_field == field.name);
            if covered {
                summary.required_mapped += 1;
            }
        }
        summary
    }

    /// Required fields of `table` that no column maps to.
    pub fn missing_required<'t>(&self, table: &'t TargetTableSpec) -> Vec<&'t str> {
        table
            .required_fields()
            .filter(|field| {
                !self
                    .mappings
                    .iter()
                    .any(|m| m.action == MappingAction::Map && m.target_field == field.name)
            })
            .map(|field| field.name.as_str())
            .collect()
    }
}

/// Summary of mapping counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingSummary {
    pub columns: usize,
    pub mapped: usize,
    pub created: usize,
    pub skipped: usize,
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
    pub required_total: usize,
    pub required_mapped: usize,
}

//! Coercion of validated rows into typed import records.

use roster_model::{
    ColumnMapping, FieldType, MappingAction, ParsedTable, TargetTableSpec, is_blank,
    parse_boolean, parse_date, parse_number,
};

use crate::error::ImportError;
use crate::values::{FieldValue, FieldValues};

/// Separators accepted between items of an array field.
const LIST_SEPARATORS: &[char] = &[';', '|', ','];

/// One data row ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRecord {
    /// Spreadsheet row number (first data row is 2).
    pub row: usize,
    /// Human-readable label used in the error report.
    pub label: String,
    pub values: FieldValues,
}

/// Build typed records from a parsed file and its frozen mapping.
///
/// Call after validation passed: a date or number that does not parse is
/// reported as [`ImportError::Coercion`]. Blank cells are omitted, so an
/// update never clears an existing value.
pub fn build_records(
    parsed: &ParsedTable,
    mappings: &[ColumnMapping],
    table: &TargetTableSpec,
) -> Result<Vec<ImportRecord>, ImportError> {
    let active: Vec<(&ColumnMapping, FieldType)> = mappings
        .iter()
        .filter(|m| !m.is_skip())
        .map(|m| (m, target_type(m, table)))
        .collect();

    parsed
        .rows()
        .iter()
        .map(|row| {
            let row_number = row.line();
            let mut values = FieldValues::new();
            for (mapping, field_type) in &active {
                let raw = row.value(&mapping.source_column).trim();
                if is_blank(raw) {
                    continue;
                }
                let value = coerce(raw, *field_type, mapping, table).ok_or_else(|| {
                    ImportError::Coercion {
                        row: row_number,
                        column: mapping.source_column.clone(),
                        value: raw.to_string(),
                        expected: field_type.as_str(),
                    }
                })?;
                values.insert_if_absent(mapping.target_field.clone(), value);
            }
            Ok(ImportRecord {
                row: row_number,
                label: record_label(table, &values, row_number),
                values,
            })
        })
        .collect()
}

fn target_type(mapping: &ColumnMapping, table: &TargetTableSpec) -> FieldType {
    match mapping.action {
        MappingAction::Create => mapping.data_type,
        _ => table.field(&mapping.target_field).map(|f| f.field_type),
    }
    .unwrap_or(FieldType::Text)
}

fn coerce(
    raw: &str,
    field_type: FieldType,
    mapping: &ColumnMapping,
    table: &TargetTableSpec,
) -> Option<FieldValue> {
    let value = match field_type {
        FieldType::Text | FieldType::Identifier => FieldValue::Text(raw.to_string()),
        FieldType::Date => FieldValue::Date(parse_date(raw)?),
        FieldType::Number => FieldValue::Number(parse_number(raw)?),
        // Unrecognised spellings were warned about; keep them as text.
        FieldType::Boolean => match parse_boolean(raw) {
            Some(flag) => FieldValue::Boolean(flag),
            None => FieldValue::Text(raw.to_string()),
        },
        FieldType::Enum => {
            let canonical = table
                .field(&mapping.target_field)
                .and_then(|spec| spec.enum_option(raw))
                .unwrap_or(raw);
            FieldValue::Text(canonical.to_string())
        }
        FieldType::Array => FieldValue::List(
            raw.split(LIST_SEPARATORS)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    };
    Some(value)
}

/// Natural-key values joined by spaces, else the name or identifier, else
/// the row number.
fn record_label(table: &TargetTableSpec, values: &FieldValues, row: usize) -> String {
    let key_parts: Vec<String> = table
        .natural_key
        .iter()
        .filter_map(|field| values.text(field))
        .collect();
    if !key_parts.is_empty() {
        return key_parts.join(" ");
    }
    [&table.primary_name_field, &table.identifier_field]
        .into_iter()
        .flatten()
        .find_map(|field| values.text(field))
        .unwrap_or_else(|| format!("row {row}"))
}

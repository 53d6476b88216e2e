//! Terminal tables for command output.

use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use roster_import::{ImportResult, RunStatus};
use roster_map::{ConfidenceBucket, MappingSet};
use roster_model::{MappingAction, Severity, TargetTableSpec, ValidationResult};
use roster_standards::SchemaRegistry;

/// Rows listed per column before the rest are elided.
const MAX_EXAMPLE_ROWS: usize = 5;

/// Issues of one source column, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnIssues {
    pub column: String,
    pub errors: usize,
    pub warnings: usize,
    pub rows: Vec<usize>,
    pub messages: Vec<String>,
}

/// Group validation issues by column.
pub fn group_by_column(result: &ValidationResult) -> Vec<ColumnIssues> {
    let mut groups: Vec<ColumnIssues> = Vec::new();
    for issue in result.issues() {
        let index = match groups.iter().position(|g| g.column == issue.column) {
            Some(index) => index,
            None => {
                groups.push(ColumnIssues {
                    column: issue.column.clone(),
                    errors: 0,
                    warnings: 0,
                    rows: Vec::new(),
                    messages: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        match issue.severity {
            Severity::Error => group.errors += 1,
            Severity::Warning => group.warnings += 1,
        }
        if !group.rows.contains(&issue.row_index) {
            group.rows.push(issue.row_index);
        }
        if !group.messages.contains(&issue.message) {
            group.messages.push(issue.message.clone());
        }
    }
    groups
}

pub fn print_tables(registry: &SchemaRegistry) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Label"),
        header_cell("Fields"),
        header_cell("Required"),
        header_cell("Key"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for spec in registry.tables() {
        let required: Vec<&str> = spec.required_fields().map(|f| f.name.as_str()).collect();
        let key = match &spec.identifier_field {
            Some(identifier) => format!("{identifier} / {}", spec.natural_key.join(" + ")),
            None => spec.natural_key.join(" + "),
        };
        table.add_row(vec![
            Cell::new(&spec.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&spec.label),
            Cell::new(spec.fields.len()),
            text_or_dash(&required.join(", ")),
            text_or_dash(&key),
        ]);
    }
    println!("{table}");
}

pub fn print_mappings(spec: &TargetTableSpec, set: &MappingSet) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Action"),
        header_cell("Field"),
        header_cell("Confidence"),
        header_cell("Match"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for mapping in set.mappings() {
        let (action, field, confidence, bucket) = match mapping.action {
            MappingAction::Map => {
                let bucket = ConfidenceBucket::from_confidence(mapping.confidence);
                (
                    Cell::new("map").fg(Color::Green),
                    Cell::new(&mapping.target_field),
                    Cell::new(mapping.confidence),
                    bucket_cell(bucket),
                )
            }
            MappingAction::Create => (
                Cell::new("create").fg(Color::Yellow),
                Cell::new(&mapping.target_field),
                dim_cell("-"),
                dim_cell("-"),
            ),
            MappingAction::Skip => (dim_cell("skip"), dim_cell("-"), dim_cell("-"), dim_cell("-")),
        };
        table.add_row(vec![
            Cell::new(&mapping.source_column),
            action,
            field,
            confidence,
            bucket,
        ]);
    }
    println!("{table}");

    let summary = set.summary(spec);
    println!(
        "{} columns: {} mapped ({} excellent, {} good, {} fair, {} poor), {} created, {} skipped",
        summary.columns,
        summary.mapped,
        summary.excellent,
        summary.good,
        summary.fair,
        summary.poor,
        summary.created,
        summary.skipped
    );
    let missing = set.missing_required(spec);
    if !missing.is_empty() {
        eprintln!("Required fields without a column: {}", missing.join(", "));
    }
}

pub fn print_validation(result: &ValidationResult) {
    let groups = group_by_column(result);
    if groups.is_empty() {
        println!("Validation passed: no issues found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Errors"),
        header_cell("Warnings"),
        header_cell("Rows"),
        header_cell("Messages"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for group in &groups {
        table.add_row(vec![
            Cell::new(&group.column),
            count_cell(group.errors, Color::Red),
            count_cell(group.warnings, Color::Yellow),
            Cell::new(row_list(&group.rows)),
            Cell::new(group.messages.join("; ")),
        ]);
    }
    println!("{table}");
    println!(
        "{} error(s), {} warning(s) in {} row(s)",
        result.error_count(),
        result.warning_count(),
        result.invalid_rows().len()
    );
}

pub fn print_import(result: &ImportResult, report: Option<&Path>) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Records"),
        header_cell("Imported"),
        header_cell("Duplicates"),
        header_cell("Failed"),
        header_cell("New employers"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(result.total()),
        count_cell(result.successful(), Color::Green),
        count_cell(result.duplicates(), Color::Cyan),
        count_cell(result.failed(), Color::Red),
        count_cell(result.created_entities(), Color::Cyan),
        status_cell(result.status()),
    ]);
    println!("{table}");
    println!("{}", result.summary_line());
    if result.unplaced() > 0 {
        println!(
            "{} workers had no employer and were imported without a placement",
            result.unplaced()
        );
    }
    if let Some(path) = report {
        println!("Error report: {}", path.display());
    }
}

fn row_list(rows: &[usize]) -> String {
    let shown: Vec<String> = rows
        .iter()
        .take(MAX_EXAMPLE_ROWS)
        .map(ToString::to_string)
        .collect();
    let mut list = shown.join(", ");
    if rows.len() > MAX_EXAMPLE_ROWS {
        list.push_str(&format!(" (+{} more)", rows.len() - MAX_EXAMPLE_ROWS));
    }
    list
}

fn status_cell(status: RunStatus) -> Cell {
    match status {
        RunStatus::Completed => Cell::new("completed").fg(Color::Green),
        RunStatus::Cancelled => Cell::new("cancelled").fg(Color::Yellow),
        RunStatus::Aborted => Cell::new("aborted")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn bucket_cell(bucket: ConfidenceBucket) -> Cell {
    let color = match bucket {
        ConfidenceBucket::Excellent => Color::Green,
        ConfidenceBucket::Good => Color::Cyan,
        ConfidenceBucket::Fair => Color::Yellow,
        ConfidenceBucket::Poor => Color::Red,
    };
    Cell::new(bucket.label()).fg(color)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn text_or_dash(text: &str) -> Cell {
    if text.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(text)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

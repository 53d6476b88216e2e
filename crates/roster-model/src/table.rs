//! Parsed tabular input: a header row plus string-valued data rows.
//!
//! A [`ParsedTable`] is built once per uploaded file and never mutated
//! afterwards. No type coercion happens here; every cell stays a string.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::values::is_blank;

/// Spreadsheet line of the first data row: line 1 holds the column labels.
pub const FIRST_DATA_LINE: usize = 2;

/// One data row as ordered `(header, raw value)` pairs, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    line: usize,
    cells: Vec<(String, String)>,
}

impl Row {
    pub fn new(line: usize, cells: Vec<(String, String)>) -> Self {
        Self { line, cells }
    }

    /// 1-based line of this row in the source file, header included.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Raw value for `column`, if the column exists.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(header, _)| header == column)
            .map(|(_, value)| value.as_str())
    }

    /// Raw value for `column`, or an empty string when the column is absent.
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(header, value)| (header.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Header row plus data rows of an imported file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTable {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl ParsedTable {
    /// Build a table from trimmed-or-raw headers and positional rows.
    ///
    /// Headers are trimmed and must be non-empty and unique. Rows shorter
    /// than the header are padded with empty values; extra cells are dropped.
    /// Rows are numbered as if they followed the header line with no gaps.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let numbered = rows
            .into_iter()
            .enumerate()
            .map(|(index, raw)| (index + FIRST_DATA_LINE, raw))
            .collect();
        Self::with_lines(headers, numbered)
    }

    /// Like [`ParsedTable::new`], keeping the source line of each row.
    pub fn with_lines(headers: Vec<String>, rows: Vec<(usize, Vec<String>)>) -> Result<Self> {
        let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let mut seen = BTreeSet::new();
        for (index, header) in headers.iter().enumerate() {
            if header.is_empty() {
                return Err(ModelError::EmptyHeader { index });
            }
            if !seen.insert(header.as_str()) {
                return Err(ModelError::DuplicateHeader {
                    header: header.clone(),
                });
            }
        }
        let rows = rows
            .into_iter()
            .map(|(line, raw)| {
                let mut values = raw.into_iter();
                let cells = headers
                    .iter()
                    .map(|header| (header.clone(), values.next().unwrap_or_default()))
                    .collect();
                Row::new(line, cells)
            })
            .collect();
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Up to `limit` non-blank values of `column`, trimmed, in row order.
    pub fn sample_values(&self, column: &str, limit: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.value(column).trim())
            .filter(|value| !is_blank(value))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn pads_short_rows_and_drops_extra_cells() {
        let table = ParsedTable::new(
            strings(&["A", "B"]),
            vec![strings(&["1"]), strings(&["1", "2", "3"])],
        )
        .unwrap();
        assert_eq!(table.rows()[0].value("B"), "");
        assert_eq!(table.rows()[1].len(), 2);
        assert_eq!(table.rows()[1].get("C"), None);
    }

    #[test]
    fn rejects_duplicate_headers_after_trim() {
        let err = ParsedTable::new(strings(&["Name", " Name "]), vec![]).unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateHeader {
                header: "Name".to_string()
            }
        );
    }

    #[test]
    fn rejects_blank_header() {
        let err = ParsedTable::new(strings(&["Name", "  "]), vec![]).unwrap_err();
        assert_eq!(err, ModelError::EmptyHeader { index: 1 });
    }

    #[test]
    fn rows_without_source_lines_follow_the_header() {
        let table = ParsedTable::new(strings(&["A"]), vec![strings(&["1"]), strings(&["2"])]).unwrap();
        let lines: Vec<usize> = table.rows().iter().map(Row::line).collect();
        assert_eq!(lines, vec![2, 3]);
    }

    #[test]
    fn source_lines_are_kept() {
        let table =
            ParsedTable::with_lines(strings(&["A"]), vec![(4, strings(&["1"])), (9, strings(&["2"]))])
                .unwrap();
        assert_eq!(table.rows()[0].line(), 4);
        assert_eq!(table.rows()[1].line(), 9);
    }

    #[test]
    fn samples_skip_blank_values() {
        let table = ParsedTable::new(
            strings(&["Date"]),
            vec![
                strings(&[""]),
                strings(&["2024-01-01"]),
                strings(&["  "]),
                strings(&["2024-01-02"]),
            ],
        )
        .unwrap();
        assert_eq!(table.sample_values("Date", 5), vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(table.sample_values("Date", 1), vec!["2024-01-01"]);
    }
}

//! Delimited text reading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use roster_model::ParsedTable;

use crate::error::{IngestError, Result};

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl IngestOptions {
    /// Tab-delimited for `.tsv`/`.tab` files, comma otherwise.
    pub fn for_path(path: &Path) -> Self {
        let tabbed = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab"));
        if tabbed {
            Self { delimiter: b'\t' }
        } else {
            Self::default()
        }
    }
}

/// Read a delimited file from disk.
///
/// UTF-16 byte order marks are rejected up front; a UTF-8 BOM is stripped
/// from the first header.
pub fn read_table(path: &Path, options: &IngestOptions) -> Result<ParsedTable> {
    let mut file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
    if let Some(encoding) = utf16_encoding(&bytes) {
        return Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding,
        });
    }

    let table = parse_bytes(&bytes, options)?;
    tracing::debug!(
        path = %path.display(),
        columns = table.headers().len(),
        rows = table.row_count(),
        "loaded input file"
    );
    Ok(table)
}

/// Parse delimited text. The first non-blank line holds the column labels.
///
/// Lines whose cells are all blank are skipped, but each kept row remembers
/// the line it starts on so reported row numbers match the source file.
/// Cells are kept as raw strings; no trimming or coercion happens here.
pub fn parse_bytes(bytes: &[u8], options: &IngestOptions) -> Result<ParsedTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(bytes);

    let mut lines = LineTracker::new(bytes);
    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader
        .read_record(&mut record)
        .map_err(|source| IngestError::Parse { source })?
    {
        let line = lines.next_record(reader.position().byte() as usize);
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if headers.is_none() {
            headers = Some(
                cells
                    .iter()
                    .map(|h| h.trim_start_matches(UTF8_BOM).to_string())
                    .collect(),
            );
        } else {
            rows.push((line, cells));
        }
    }

    let headers = headers.ok_or(IngestError::MissingHeader)?;
    Ok(ParsedTable::with_lines(headers, rows)?)
}

/// Follows 1-based line numbers through the input as records are read.
///
/// The csv reader drops empty lines silently, so the start of each record
/// is found by skipping line breaks after the previous record's end.
struct LineTracker<'a> {
    bytes: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineTracker<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            line: 1,
        }
    }

    /// Line the next record starts on; `end` is the byte offset just past it.
    fn next_record(&mut self, end: usize) -> usize {
        while let Some(&byte) = self.bytes.get(self.offset) {
            match byte {
                b'\n' => self.line += 1,
                b'\r' => {}
                _ => break,
            }
            self.offset += 1;
        }
        let start = self.line;
        let end = end.clamp(self.offset, self.bytes.len());
        self.line += self.bytes[self.offset..end]
            .iter()
            .filter(|&&byte| byte == b'\n')
            .count();
        self.offset = end;
        start
    }
}

fn utf16_encoding(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xFE, ..] => Some("UTF-16 LE"),
        [0xFE, 0xFF, ..] => Some("UTF-16 BE"),
        _ => None,
    }
}

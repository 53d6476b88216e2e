//! CSV error report for failed records.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::ImportError;
use crate::orchestrator::RowError;

const REPORT_HEADER: [&str; 3] = ["row", "label", "error"];

/// `import-errors-YYYY-MM-DD.csv`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("import-errors-{}.csv", date.format("%Y-%m-%d"))
}

/// Write `errors` as CSV with a `row,label,error` header.
pub fn write_error_report<W: Write>(writer: W, errors: &[RowError]) -> Result<(), ImportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(REPORT_HEADER)
        .map_err(|source| ImportError::Report { source })?;
    for error in errors {
        let row = error.row.to_string();
        csv.write_record([row.as_str(), error.label.as_str(), error.message.as_str()])
            .map_err(|source| ImportError::Report { source })?;
    }
    csv.flush().map_err(|source| ImportError::Io {
        operation: "flush",
        path: PathBuf::new(),
        source,
    })
}

pub fn render_error_report(errors: &[RowError]) -> Result<String, ImportError> {
    let mut buffer = Vec::new();
    write_error_report(&mut buffer, errors)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Save the report into `dir` (created if needed) and return its path.
pub fn save_error_report(
    dir: &Path,
    date: NaiveDate,
    errors: &[RowError],
) -> Result<PathBuf, ImportError> {
    fs::create_dir_all(dir).map_err(|source| ImportError::Io {
        operation: "create",
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(report_file_name(date));
    let file = fs::File::create(&path).map_err(|source| ImportError::Io {
        operation: "create",
        path: path.clone(),
        source,
    })?;
    write_error_report(file, errors)?;
    tracing::info!(path = %path.display(), errors = errors.len(), "wrote error report");
    Ok(path)
}

//! CSV report files
//!
//! One report per file, `<reports_dir>/<name>.csv`. Fields are quoted per
//! RFC 4180 when they contain a comma, a quote or a line break. Existing
//! files are never replaced.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::table::{format_value, ReportTable, DATE_FORMAT};
use crate::errors::{StoreError, StoreResult};
use crate::observability::{log_event, Event};

const FIELD_SEPARATOR: char = ',';
const LINE_TERMINATOR: &str = "\r\n";

/// Writes report tables into a reports directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    reports_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Writes `table` to `<reports_dir>/<name>.csv` and returns the path.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `name` is empty or contains a path separator
    /// - `StorageIo` if the directory is missing or unwritable, or the file
    ///   already exists
    pub fn save_report(&self, table: &ReportTable, name: &str) -> StoreResult<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(StoreError::invalid_argument(format!(
                "invalid report name '{}'",
                name
            )));
        }
        let path = self.reports_dir.join(format!("{}.csv", name));

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                StoreError::storage_io(format!("failed to create report {}", path.display()), e)
            })?;

        let written = file
            .write_all(render_csv(table).as_bytes())
            .and_then(|_| file.sync_all());
        if let Err(e) = written {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(StoreError::storage_io(
                format!("failed to write report {}", path.display()),
                e,
            ));
        }

        log_event(
            Event::ReportWritten,
            &[
                ("path", &path.display().to_string()),
                ("rows", &table.len().to_string()),
            ],
        );
        Ok(path)
    }

    /// Writes every `(name, table)` pair, all or nothing.
    ///
    /// If any report fails, the files already written by this call are
    /// removed and the first error is returned.
    pub fn save_reports(&self, reports: &[(String, ReportTable)]) -> StoreResult<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(reports.len());
        for (name, table) in reports {
            match self.save_report(table, name) {
                Ok(path) => paths.push(path),
                Err(e) => {
                    for path in &paths {
                        let _ = fs::remove_file(path);
                    }
                    return Err(e);
                }
            }
        }
        Ok(paths)
    }
}

/// `"<identifier>_<MM-DD-YYYY>"`, with path separators in the identifier
/// replaced by `_`
pub fn report_file_name(identifier: &str, date: NaiveDate) -> String {
    let identifier: String = identifier
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}_{}", identifier, date.format(DATE_FORMAT))
}

/// Renders the header and rows as CSV text
pub fn render_csv(table: &ReportTable) -> String {
    let mut out = String::new();
    write_line(&mut out, table.columns().iter().map(String::as_str));
    for row in table.rows() {
        let cells: Vec<String> = row.iter().map(format_value).collect();
        write_line(&mut out, cells.iter().map(String::as_str));
    }
    out
}

fn write_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(FIELD_SEPARATOR);
        }
        push_field(out, field);
    }
    out.push_str(LINE_TERMINATOR);
}

fn push_field(out: &mut String, field: &str) {
    let needs_quotes = field
        .chars()
        .any(|c| c == FIELD_SEPARATOR || c == '"' || c == '\n' || c == '\r');
    if !needs_quotes {
        out.push_str(field);
        return;
    }
    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}

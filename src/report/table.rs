//! In-memory report rows and value rendering

use base64::Engine;
use chrono::Local;

use crate::errors::{StoreError, StoreResult};
use crate::schema::Value;

/// Date format used in reports and report file names
pub const DATE_FORMAT: &str = "%m-%d-%Y";
/// Timestamp format used in reports (local time)
pub const DATETIME_FORMAT: &str = "%m-%d-%Y %H:%M";

/// A header row plus data rows of equal width
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ReportTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row; its width must match the header.
    pub fn push_row(&mut self, row: Vec<Value>) -> StoreResult<()> {
        if row.len() != self.columns.len() {
            return Err(StoreError::invalid_argument(format!(
                "report row has {} fields, header has {}",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Renders a value the way it appears in a report cell.
///
/// Timestamps are converted from UTC to the local timezone.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format!("{:?}", f),
        Value::Str(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Binary(bytes) => base64::engine::general_purpose::STANDARD.encode(bytes),
        Value::Timestamp(ts) => ts.with_timezone(&Local).format(DATETIME_FORMAT).to_string(),
        Value::Date(d) => d.format(DATE_FORMAT).to_string(),
    }
}

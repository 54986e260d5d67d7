//! Record store error types
//!
//! Error codes:
//! - CHOCAN_SCHEMA_MISMATCH (REJECT)
//! - CHOCAN_TYPE_MISMATCH (REJECT)
//! - CHOCAN_RANGE_VIOLATION (REJECT)
//! - CHOCAN_DUPLICATE_KEY (REJECT)
//! - CHOCAN_RECORD_NOT_FOUND (REJECT)
//! - CHOCAN_ID_SPACE_EXHAUSTED (REJECT)
//! - CHOCAN_INVALID_ARGUMENT (REJECT)
//! - CHOCAN_STORAGE_IO (ERROR)
//! - CHOCAN_CORRUPT_DATA (ERROR)
//!
//! None of these are process-fatal. The caller aborts the single operation
//! that produced the error and carries on.

use std::fmt;
use std::io;

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The request was rejected; stored data is untouched
    Reject,
    /// The storage layer failed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Error codes raised by the schema registry, record store and report writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Columns or shape disagree with the declared schema
    SchemaMismatch,
    /// Value type disagrees with the column type, or is not comparable
    TypeMismatch,
    /// Value outside the declared numeric range or character limit
    RangeViolation,
    /// Primary identifier collision
    DuplicateKey,
    /// Lookup on an absent identifier
    RecordNotFound,
    /// Identifier generator ran out of values
    IdSpaceExhausted,
    /// File unreadable or unwritable
    StorageIo,
    /// File exists but cannot be parsed
    CorruptData,
    /// Caller supplied an unusable argument
    InvalidArgument,
}

impl StoreErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::SchemaMismatch => "CHOCAN_SCHEMA_MISMATCH",
            StoreErrorCode::TypeMismatch => "CHOCAN_TYPE_MISMATCH",
            StoreErrorCode::RangeViolation => "CHOCAN_RANGE_VIOLATION",
            StoreErrorCode::DuplicateKey => "CHOCAN_DUPLICATE_KEY",
            StoreErrorCode::RecordNotFound => "CHOCAN_RECORD_NOT_FOUND",
            StoreErrorCode::IdSpaceExhausted => "CHOCAN_ID_SPACE_EXHAUSTED",
            StoreErrorCode::StorageIo => "CHOCAN_STORAGE_IO",
            StoreErrorCode::CorruptData => "CHOCAN_CORRUPT_DATA",
            StoreErrorCode::InvalidArgument => "CHOCAN_INVALID_ARGUMENT",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StoreErrorCode::StorageIo | StoreErrorCode::CorruptData => Severity::Error,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with context
#[derive(Debug)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    /// Table the error relates to, if any
    table: Option<String>,
    source: Option<io::Error>,
}

impl StoreError {
    fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            table: None,
            source: None,
        }
    }

    /// Columns disagree with the declared schema
    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::SchemaMismatch, message)
    }

    /// A column name that the schema does not declare
    pub fn unknown_column(table: &str, column: &str) -> Self {
        Self::new(
            StoreErrorCode::SchemaMismatch,
            format!("column '{}' is not part of table '{}'", column, table),
        )
        .with_table(table)
    }

    /// Value type disagrees with the column type
    pub fn type_mismatch(column: &str, expected: &str, actual: &str) -> Self {
        Self::new(
            StoreErrorCode::TypeMismatch,
            format!("column '{}': expected {}, got {}", column, expected, actual),
        )
    }

    /// Value type cannot be compared with the given operator
    pub fn not_comparable(column: &str, op: &str, reason: impl Into<String>) -> Self {
        Self::new(
            StoreErrorCode::TypeMismatch,
            format!("column '{}' does not support '{}': {}", column, op, reason.into()),
        )
    }

    /// Value outside the declared limits
    pub fn range_violation(column: &str, reason: impl Into<String>) -> Self {
        Self::new(
            StoreErrorCode::RangeViolation,
            format!("column '{}': {}", column, reason.into()),
        )
    }

    /// Primary identifier already in use
    pub fn duplicate_key(table: &str, id: i64) -> Self {
        Self::new(
            StoreErrorCode::DuplicateKey,
            format!("identifier {} already exists in '{}'", id, table),
        )
        .with_table(table)
    }

    /// Primary identifier absent
    pub fn record_not_found(table: &str, id: i64) -> Self {
        Self::new(
            StoreErrorCode::RecordNotFound,
            format!("no record with identifier {} in '{}'", id, table),
        )
        .with_table(table)
    }

    /// The largest identifier is already taken
    pub fn id_space_exhausted(table: &str, max: i64) -> Self {
        Self::new(
            StoreErrorCode::IdSpaceExhausted,
            format!("identifier {} is in use; no identifiers left in '{}'", max, table),
        )
        .with_table(table)
    }

    /// Caller supplied an unusable argument
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::InvalidArgument, message)
    }

    /// File unreadable or unwritable
    pub fn storage_io(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StoreErrorCode::StorageIo, message)
        }
    }

    /// File exists but cannot be parsed
    pub fn corrupt_data(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::CorruptData, message)
    }

    /// Attach the table name
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the table name if applicable
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreErrorCode::SchemaMismatch.code(), "CHOCAN_SCHEMA_MISMATCH");
        assert_eq!(StoreErrorCode::DuplicateKey.code(), "CHOCAN_DUPLICATE_KEY");
        assert_eq!(StoreErrorCode::CorruptData.code(), "CHOCAN_CORRUPT_DATA");
        assert_eq!(
            StoreErrorCode::IdSpaceExhausted.code(),
            "CHOCAN_ID_SPACE_EXHAUSTED"
        );
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(StoreErrorCode::TypeMismatch.severity(), Severity::Reject);
        assert_eq!(StoreErrorCode::StorageIo.severity(), Severity::Error);
        assert_eq!(StoreErrorCode::CorruptData.severity(), Severity::Error);
    }

    #[test]
    fn test_display_includes_source() {
        let err = StoreError::storage_io(
            "failed to open members.tbl",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let display = err.to_string();
        assert!(display.contains("CHOCAN_STORAGE_IO"));
        assert!(display.contains("members.tbl"));
        assert!(display.contains("denied"));
    }

    #[test]
    fn test_table_context() {
        let err = StoreError::duplicate_key("members", 1000000000);
        assert_eq!(err.table(), Some("members"));
        assert!(err.message().contains("1000000000"));
    }
}

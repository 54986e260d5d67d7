//! CLI-specific error types
//!
//! A CLI error aborts only the command that raised it.

use std::fmt;
use std::io;

use crate::errors::StoreError;
use crate::services::ServiceError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout, directories)
    IoError,
    /// Configured data directory missing
    NotInitialized,
    /// Store or domain operation failed; carries its own code
    Operation(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CHOCAN_CLI_CONFIG_ERROR",
            Self::IoError => "CHOCAN_CLI_IO_ERROR",
            Self::NotInitialized => "CHOCAN_CLI_NOT_INITIALIZED",
            Self::Operation(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn not_initialized(data_dir: &std::path::Path) -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            format!(
                "data directory {} does not exist. Run 'chocan init' first.",
                data_dir.display()
            ),
        )
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        let message = match &e {
            ServiceError::Store(store) => store.message().to_string(),
            other => other.to_string(),
        };
        Self::new(CliErrorCode::Operation(e.code()), message)
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        Self::from(ServiceError::from(e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_code_passes_through() {
        let err = CliError::from(StoreError::duplicate_key("members", 1));
        assert_eq!(err.code_str(), "CHOCAN_DUPLICATE_KEY");

        let err = CliError::from(ServiceError::MemberSuspended(5));
        assert_eq!(err.code_str(), "CHOCAN_MEMBER_SUSPENDED");
        assert_eq!(err.message(), "member 5 is suspended");
    }

    #[test]
    fn test_display() {
        let err = CliError::config_error("bad");
        assert_eq!(err.to_string(), "CHOCAN_CLI_CONFIG_ERROR: bad");
    }
}

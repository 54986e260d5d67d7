//! Service-layer errors

use thiserror::Error;

use crate::errors::{StoreError, StoreErrorCode};

/// Result type for domain service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Domain service errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Record store or report writer failure
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("member {0} not found")]
    UnknownMember(i64),

    #[error("member {0} is suspended")]
    MemberSuspended(i64),

    #[error("provider {0} not found")]
    UnknownProvider(i64),

    #[error("service {0:06} is not in the provider directory")]
    UnknownService(i64),

    /// Password does not meet requirements
    #[error("password does not meet requirements: {0}")]
    WeakPassword(String),

    #[error("password hashing failed")]
    HashingFailed,
}

impl ServiceError {
    /// Stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Store(e) => e.code().code(),
            ServiceError::UnknownMember(_) => "CHOCAN_UNKNOWN_MEMBER",
            ServiceError::MemberSuspended(_) => "CHOCAN_MEMBER_SUSPENDED",
            ServiceError::UnknownProvider(_) => "CHOCAN_UNKNOWN_PROVIDER",
            ServiceError::UnknownService(_) => "CHOCAN_UNKNOWN_SERVICE",
            ServiceError::WeakPassword(_) => "CHOCAN_WEAK_PASSWORD",
            ServiceError::HashingFailed => "CHOCAN_HASHING_FAILED",
        }
    }

    /// The underlying store error code, if any
    pub fn store_code(&self) -> Option<StoreErrorCode> {
        match self {
            ServiceError::Store(e) => Some(e.code()),
            _ => None,
        }
    }

    /// Maps a store `RecordNotFound` to a domain error
    pub(crate) fn not_found_as(self, f: impl FnOnce() -> ServiceError) -> ServiceError {
        match self.store_code() {
            Some(StoreErrorCode::RecordNotFound) => f(),
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ServiceError::UnknownMember(1).code(), "CHOCAN_UNKNOWN_MEMBER");
        let wrapped = ServiceError::from(StoreError::record_not_found("members", 1));
        assert_eq!(wrapped.code(), "CHOCAN_RECORD_NOT_FOUND");
    }

    #[test]
    fn test_not_found_mapping() {
        let err = ServiceError::from(StoreError::record_not_found("members", 7))
            .not_found_as(|| ServiceError::UnknownMember(7));
        assert!(matches!(err, ServiceError::UnknownMember(7)));

        let err = ServiceError::from(StoreError::invalid_argument("x"))
            .not_found_as(|| ServiceError::UnknownMember(7));
        assert_eq!(err.store_code(), Some(StoreErrorCode::InvalidArgument));
    }

    #[test]
    fn test_service_code_is_zero_padded() {
        assert_eq!(
            ServiceError::UnknownService(42).to_string(),
            "service 000042 is not in the provider directory"
        );
    }
}

use crate::roles::UniqueField;
use thiserror::Error;
use tonic::{Code, Status};

pub type Result<T> = std::result::Result<T, IdentityError>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0} already registered")]
    Conflict(UniqueField),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Refresh token invalid or expired")]
    RefreshInvalid,

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("SMS delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Password hashing failed: {0}")]
    HashingFailure(String),

    #[error("Corrupt password digest: {0}")]
    CorruptDigest(String),

    #[error("Refresh token collision")]
    IssuanceConflict,

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Outward error taxonomy; one variant per distinguishable signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidCredential,
    Conflict,
    InvalidToken,
    RefreshInvalid,
    InvalidField,
    ExternalDeliveryFailure,
    StoreUnavailable,
    Internal,
}

impl IdentityError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::UserNotFound => ErrorKind::NotFound,
            IdentityError::InvalidCredentials => ErrorKind::InvalidCredential,
            IdentityError::Conflict(_) | IdentityError::IssuanceConflict => ErrorKind::Conflict,
            IdentityError::InvalidToken => ErrorKind::InvalidToken,
            IdentityError::RefreshInvalid => ErrorKind::RefreshInvalid,
            IdentityError::InvalidField(_) => ErrorKind::InvalidField,
            IdentityError::DeliveryFailed(_) => ErrorKind::ExternalDeliveryFailure,
            IdentityError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            IdentityError::HashingFailure(_)
            | IdentityError::CorruptDigest(_)
            | IdentityError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert to gRPC Status for wire protocol
    pub fn to_status(&self) -> Status {
        match self {
            IdentityError::UserNotFound => Status::new(Code::NotFound, "User not found"),
            IdentityError::InvalidCredentials => {
                Status::new(Code::Unauthenticated, "Invalid credentials")
            }
            IdentityError::Conflict(field) => {
                Status::new(Code::AlreadyExists, format!("{} already registered", field))
            }
            IdentityError::InvalidToken => Status::new(Code::Unauthenticated, "Invalid token"),
            IdentityError::RefreshInvalid => {
                Status::new(Code::Unauthenticated, "Invalid or expired refresh token")
            }
            IdentityError::InvalidField(msg) => {
                Status::new(Code::InvalidArgument, format!("Invalid field: {}", msg))
            }
            IdentityError::DeliveryFailed(_) => {
                Status::new(Code::Unavailable, "Failed to deliver verification code")
            }
            IdentityError::StoreUnavailable(_) => {
                Status::new(Code::Unavailable, "Storage temporarily unavailable")
            }
            IdentityError::IssuanceConflict => {
                Status::new(Code::Aborted, "Token issuance conflict, retry")
            }
            IdentityError::HashingFailure(_)
            | IdentityError::CorruptDigest(_)
            | IdentityError::Internal(_) => {
                // Don't leak internal details in production
                Status::new(Code::Internal, "Internal server error")
            }
        }
    }
}

// Conversions from external error types
impl From<sqlx::Error> for IdentityError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", err);
        IdentityError::StoreUnavailable(err.to_string())
    }
}

impl From<redis::RedisError> for IdentityError {
    fn from(err: redis::RedisError) -> Self {
        tracing::error!("Redis error: {}", err);
        IdentityError::StoreUnavailable(err.to_string())
    }
}

impl From<validator::ValidationErrors> for IdentityError {
    fn from(err: validator::ValidationErrors) -> Self {
        IdentityError::InvalidField(err.to_string())
    }
}

// gRPC Status conversion
impl From<IdentityError> for Status {
    fn from(err: IdentityError) -> Self {
        err.to_status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_distinct_signal() {
        let errors = vec![
            IdentityError::UserNotFound,
            IdentityError::InvalidCredentials,
            IdentityError::Conflict(UniqueField::Email),
            IdentityError::InvalidToken,
            IdentityError::RefreshInvalid,
            IdentityError::InvalidField("license_expiry_date".to_string()),
            IdentityError::DeliveryFailed("twilio 500".to_string()),
            IdentityError::StoreUnavailable("connection refused".to_string()),
            IdentityError::Internal("boom".to_string()),
        ];

        let signals: Vec<(i32, String)> = errors
            .iter()
            .map(|e| {
                let status = e.to_status();
                (status.code() as i32, status.message().to_string())
            })
            .collect();
        let mut deduped = signals.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(signals.len(), deduped.len());
    }

    #[test]
    fn test_conflict_status_names_field() {
        let status = IdentityError::Conflict(UniqueField::LicenseNumber).to_status();
        assert_eq!(status.code(), Code::AlreadyExists);
        assert!(status.message().contains("license number"));
    }

    #[test]
    fn test_internal_details_not_leaked() {
        let status = IdentityError::StoreUnavailable("password=hunter2".to_string()).to_status();
        assert!(!status.message().contains("hunter2"));

        let status = IdentityError::CorruptDigest("$argon2id$...".to_string()).to_status();
        assert_eq!(status.code(), Code::Internal);
        assert!(!status.message().contains("argon2"));
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(IdentityError::RefreshInvalid.kind(), ErrorKind::RefreshInvalid);
        assert_eq!(
            IdentityError::DeliveryFailed(String::new()).kind(),
            ErrorKind::ExternalDeliveryFailure
        );
        assert_eq!(IdentityError::IssuanceConflict.kind(), ErrorKind::Conflict);
    }
}

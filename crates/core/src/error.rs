//! Domain error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every failure a caller can observe is one of these variants. Ownership
/// failures are reported as [`DomainError::NotFound`] so a caller cannot tell a
/// foreign resource apart from a missing one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input). Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Missing, invalid or expired credentials.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Access to an identified resource was denied.
    #[error("unauthorized")]
    Unauthorized,

    /// A requested resource was not found (or is not visible to the caller).
    #[error("not found")]
    NotFound,

    /// A uniqueness conflict (e.g. duplicate email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unexpected backing-store or cryptographic failure. Safe to retry.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// The tag of this error, independent of its message.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::NotFound => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether a caller may legitimately resubmit the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Error tag, serialized as a stable snake_case code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    #[serde(rename = "validation_error")]
    Validation,
    Unauthenticated,
    Unauthorized,
    NotFound,
    Conflict,
    #[serde(rename = "internal_error")]
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::Unauthenticated => "unauthenticated",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Internal => "internal_error",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Storage error model and its mapping onto the domain taxonomy.

use thiserror::Error;

use taskflow_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. duplicate email).
    #[error("unique constraint violated in {operation}: {message}")]
    UniqueViolation { operation: &'static str, message: String },

    /// A referenced row vanished (e.g. the parent project was deleted concurrently).
    #[error("foreign key violated in {operation}: {message}")]
    ForeignKeyViolation { operation: &'static str, message: String },

    #[error("database error in {operation}: {message}")]
    Backend { operation: &'static str, message: String },

    #[error("store lock poisoned in {0}")]
    Poisoned(&'static str),
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::UniqueViolation { .. } => DomainError::conflict("resource already exists"),
            StoreError::ForeignKeyViolation { .. } => DomainError::NotFound,
            other => {
                tracing::error!(error = %other, "store failure");
                DomainError::internal(other.to_string())
            }
        }
    }
}

/// Classify an sqlx error by Postgres SQLSTATE.
pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let message = db_err.message().to_string();
            match db_err.code().as_deref() {
                Some("23505") => StoreError::UniqueViolation { operation, message },
                Some("23503") => StoreError::ForeignKeyViolation { operation, message },
                _ => StoreError::Backend { operation, message },
            }
        }
        sqlx::Error::PoolClosed => StoreError::Backend {
            operation,
            message: "connection pool closed".to_string(),
        },
        other => StoreError::Backend {
            operation,
            message: other.to_string(),
        },
    }
}

//! Error handling module for the Chazu backend.
//!
//! Provides the error taxonomy shared by every service, with stable error codes
//! that presentation clients can match on.

use thiserror::Error;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const EMPTY_ORDER: &str = "EMPTY_ORDER";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const VERSION_MISMATCH: &str = "VERSION_MISMATCH";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown username/password pair
    #[error("Invalid username or password")]
    InvalidCredentials,
    /// Resource not found
    #[error("{0}")]
    NotFound(String),
    /// Order with no positive-quantity items
    #[error("Order must contain at least one item")]
    EmptyOrder,
    /// Validation error
    #[error("{0}")]
    Validation(String),
    /// Compare-and-swap lost against another writer
    #[error("{message}")]
    Conflict {
        message: String,
        current_version: i64,
    },
    /// Database error
    #[error("{0}")]
    Database(String),
    /// Slot encoding error
    #[error("{0}")]
    Serialization(String),
    /// Internal error
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidCredentials => codes::INVALID_CREDENTIALS,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::EmptyOrder => codes::EMPTY_ORDER,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Conflict { .. } => codes::VERSION_MISMATCH,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Serialization(_) => codes::SERIALIZATION_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Serialization(format!("JSON error: {}", err))
    }
}

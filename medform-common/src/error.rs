//! Common error types for medform

use thiserror::Error;

/// Common result type for medform operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared across the backend
///
/// All failures are request-scoped and terminal; there is no retry layer.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or invalid credentials, or a disabled account
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Actor lacks the manager role or isn't the resource's creator
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate unique field or a cross-entity consistency violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

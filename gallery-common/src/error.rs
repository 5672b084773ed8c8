//! Common error types for the gallery services
//!
//! Errors form a closed set of kinds. Callers classify failures by `code()` or
//! `status_code()`, never by inspecting the message text.

use thiserror::Error;

/// Common result type for gallery operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error kinds shared by every gallery component
///
/// `Clone` so that a single failure can be handed to every caller waiting on the
/// same de-duplicated request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid caller input or request parameter (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// External collaborator (CMS, database, network) failed (502)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Internal processing error (500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration loading or validation error (500)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Upstream(_) => "UPSTREAM_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
        }
    }

    /// HTTP status code the error maps to at the service boundary
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            Error::Upstream(_) => 502,
            Error::Internal(_) | Error::Config(_) => 500,
        }
    }

    /// Human-readable message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Error::Validation(msg)
            | Error::NotFound(msg)
            | Error::Upstream(msg)
            | Error::Internal(msg)
            | Error::Config(msg) => msg,
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("database row not found".to_string()),
            other => Error::Upstream(format!("database: {}", other)),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Internal(format!("IO: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Internal(format!("JSON: {}", err))
    }
}

//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and the
//! mapping from core port errors to HTTP status codes.

use axum::http::StatusCode;

use crate::config::ConfigError;
use study_match_core::ports::PortError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// Maps a [`PortError`] to the response a handler should return.
///
/// Client-caused categories keep their message; everything unexpected is
/// collapsed into a generic 500 so store internals never leak to clients.
pub fn port_error_response(err: PortError) -> (StatusCode, String) {
    match err {
        PortError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        PortError::Unexpected(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    }
}

//! Error types for the content host
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::warn;

/// Body of the bare protocol-level 404.
pub const NOT_FOUND_BODY: &str = "404 page not found";

/// Body of the generic internal error response.
pub const INTERNAL_ERROR_BODY: &str = "500 internal server error";

// == Serve Error Enum ==
/// Unified error type for the content host.
#[derive(Error, Debug)]
pub enum ServeError {
    /// Tenant or resource absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Method other than GET or HEAD
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Filesystem failure other than absence
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServeError {
    /// HTTP status this error is surfaced as.
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::NotFound(_) => StatusCode::NOT_FOUND,
            ServeError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ServeError::Io(_) | ServeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let plain = [(header::CONTENT_TYPE, "text/plain; charset=utf-8")];

        match self {
            ServeError::NotFound(_) => (status, plain, NOT_FOUND_BODY).into_response(),
            ServeError::MethodNotAllowed(_) => (
                status,
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                    (header::ALLOW, "GET, HEAD"),
                ],
                "405 method not allowed",
            )
                .into_response(),
            ServeError::Io(_) | ServeError::Internal(_) => {
                // Detail stays in the log, never in the body.
                warn!(error = %self, "Responding with internal error");
                (status, plain, INTERNAL_ERROR_BODY).into_response()
            }
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the content host.
pub type Result<T> = std::result::Result<T, ServeError>;

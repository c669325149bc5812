//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and the
//! JSON error response returned by HTTP handlers.

use crate::config::ConfigError;
use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use codewithchat_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

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

    /// Represents a failure while applying migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents an error from the cache client.
    #[error("Cache Error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

//=========================================================================================
// HTTP Error Responses
//=========================================================================================

/// The JSON body of every error response.
///
/// `error` repeats `message`; clients read either field.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    pub error: String,
}

/// An error returned from a handler, rendered as `ErrorBody` JSON.
#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<PortError> for HttpError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            PortError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            PortError::Unauthorized => Self::unauthorized("Unauthorized"),
            PortError::Unexpected(msg) => {
                // The detail stays in the logs.
                error!("Unexpected port error: {}", msg);
                Self::internal("Internal server error")
            }
        }
    }
}

// Extractor rejections are plain text by default; keep every error body JSON.
impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for HttpError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message.clone(),
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_status_mapping() {
        assert_eq!(
            HttpError::from(PortError::NotFound("x".into())).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HttpError::from(PortError::Conflict("x".into())).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            HttpError::from(PortError::Unauthorized).status,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_unexpected_error_hides_detail() {
        let err = HttpError::from(PortError::Unexpected("connection reset by peer".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }
}

//! Axum-specific error types and mappings.
//!
//! Maps `ProvisionError` to HTTP status codes for the REST endpoints. The
//! JSON-RPC endpoint does not use this type; it always answers 200 with an
//! error object (see [`crate::rpc`]).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bottler_core::ProvisionError;
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A workflow is already running for the environment.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Host tool missing, failing or timing out.
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    /// Stable error type discriminant for client-side handling
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    error_type: Option<&'static str>,
}

impl HttpError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_type = match &self {
            Self::Conflict(_) => Some("already_running"),
            _ => None,
        };
        let message = match self {
            Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg)
            | Self::ServiceUnavailable(msg)
            | Self::Internal(msg) => msg,
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
            error_type,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<ProvisionError> for HttpError {
    fn from(err: ProvisionError) -> Self {
        let message = err.to_string();
        match err {
            ProvisionError::NotFound(_) => Self::NotFound(message),
            ProvisionError::InvalidRequest(_) | ProvisionError::PathViolation(_) => {
                Self::BadRequest(message)
            }
            ProvisionError::AlreadyRunning(_) => Self::Conflict(message),
            ProvisionError::ToolUnavailable(_)
            | ProvisionError::ToolFailure(_)
            | ProvisionError::Timeout(_) => Self::ServiceUnavailable(message),
            ProvisionError::Io(_) => Self::Internal(message),
        }
    }
}

//! Mapping from domain errors to HTTP responses.

use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::error;

/// Error returned by every handler.
///
/// Domain failures (not found, invalid input, conflict) carry their message
/// to the client. Collaborator and storage failures are logged here and
/// surfaced with a generic retryable message.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    /// An upstream collaborator timed out.
    ServiceUnavailable(String),
    Internal(String),
}

impl From<papyr_core::Error> for ApiError {
    fn from(err: papyr_core::Error) -> Self {
        use papyr_core::Error;

        match err {
            Error::NotFound(_) | Error::PaperNotFound(_) | Error::LabelNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::UpstreamTimeout(msg) => {
                error!(subsystem = "api", error = %msg, "Upstream collaborator timed out");
                ApiError::ServiceUnavailable(
                    "The processing service did not respond in time, please retry".to_string(),
                )
            }
            other => {
                error!(
                    subsystem = "api",
                    error = %other,
                    retryable = other.is_retryable(),
                    "Request failed"
                );
                ApiError::Internal("The request could not be completed, please retry".to_string())
            }
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::ServiceUnavailable(_) | ApiError::Internal(_))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let retryable = self.is_retryable();
        let message = match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Internal(msg) => msg,
        };

        let body = if retryable {
            serde_json::json!({ "error": message, "retryable": true })
        } else {
            serde_json::json!({ "error": message })
        };

        (status, Json(body)).into_response()
    }
}

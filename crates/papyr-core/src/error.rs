//! Error types for papyr.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using papyr's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for papyr operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Paper not found
    #[error("Paper not found: {0}")]
    PaperNotFound(Uuid),

    /// Label not found
    #[error("Label not found: {0}")]
    LabelNotFound(Uuid),

    /// Invalid input (empty label name, missing upload fields, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// State conflict (duplicate finalize, strict name collision)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An external collaborator did not answer within its time budget
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Document text extraction failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the caller may retry the same request unchanged.
    ///
    /// Typed domain failures (not found, invalid input, conflict) are final;
    /// collaborator and storage failures are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Database(_)
                | Error::UpstreamTimeout(_)
                | Error::Inference(_)
                | Error::Extraction(_)
                | Error::Request(_)
                | Error::Io(_)
        )
    }

    /// Whether this error means an id could not be resolved.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::PaperNotFound(_) | Error::LabelNotFound(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::UpstreamTimeout(e.to_string())
        } else {
            Error::Request(e.to_string())
        }
    }
}

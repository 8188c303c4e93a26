//! Error types for the course knowledge service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for course-rag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Course knowledge service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Upload extension outside pdf/docx/doc/txt/html
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A supported format failed to parse
    #[error("Failed to extract text from '{filename}': {message}")]
    ExtractionFailure { filename: String, message: String },

    /// Course index could not be loaded, saved or embedded
    #[error("Index store unavailable: {0}")]
    StoreUnavailable(String),

    /// Hosted language model failed or timed out
    #[error("Language model unavailable: {0}")]
    ModelUnavailable(String),

    /// Generation output did not match the question schema
    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    /// Course has no indexed material and the answer policy rejects that
    #[error("No course material indexed for course {0}")]
    EmptyContext(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Course record not found
    #[error("Course not found: {0}")]
    CourseNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an extraction failure
    pub fn extraction(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExtractionFailure {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    /// Create a model error
    pub fn model(message: impl Into<String>) -> Self {
        Self::ModelUnavailable(message.into())
    }

    /// Create a malformed output error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedModelOutput(message.into())
    }

    /// Create an invalid request error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::ExtractionFailure { .. } => "extraction_failure",
            Error::StoreUnavailable(_) => "store_unavailable",
            Error::ModelUnavailable(_) => "model_unavailable",
            Error::MalformedModelOutput(_) => "malformed_model_output",
            Error::EmptyContext(_) => "empty_context",
            Error::Config(_) => "config_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::CourseNotFound(_) => "not_found",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::UnsupportedFormat(_)
            | Error::ExtractionFailure { .. }
            | Error::InvalidRequest(_)
            | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::CourseNotFound(_) => StatusCode::NOT_FOUND,
            Error::EmptyContext(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::MalformedModelOutput(_) => StatusCode::BAD_GATEWAY,
            Error::StoreUnavailable(_) | Error::ModelUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Error::Config(_) | Error::Io(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        match status {
            s if s.is_server_error() => tracing::error!("{}", self),
            _ => tracing::debug!("Request rejected: {}", self),
        }

        let body = Json(json!({
            "error": {
                "type": self.kind(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::UnsupportedFormat("xlsx".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::model("down").status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(Error::malformed("bad").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            Error::CourseNotFound("c1".into()).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_extraction_message() {
        let err = Error::extraction("notes.pdf", "corrupt xref table");
        assert_eq!(err.kind(), "extraction_failure");
        assert_eq!(
            err.to_string(),
            "Failed to extract text from 'notes.pdf': corrupt xref table"
        );
    }
}

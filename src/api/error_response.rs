//! Unified error response handling for the HTTP interface
//!
//! Every failure is rendered as a JSON object whose `error` field carries
//! the human-readable message, with the status code chosen per error kind.

use crate::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Standard error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Stable error code for programmatic handling
    pub code: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Add additional error details
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convert to HTTP response with the given status
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Extension trait for consistent error formatting
pub trait ErrorResponseExt {
    /// Convert to standardized error response
    fn to_error_response(&self) -> ErrorResponse;

    /// Get the appropriate HTTP status code
    fn status_code(&self) -> StatusCode;
}

fn error_code(error: &Error) -> &'static str {
    match error.root() {
        Error::Validation { .. } => "VALIDATION_ERROR",
        Error::Format(_) => "FORMAT_ERROR",
        Error::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
        Error::NotFound { .. } => "NOT_FOUND",
        Error::Store(_) => "STORE_ERROR",
        Error::Config(_) => "CONFIG_ERROR",
        Error::Io(_) | Error::BatchAborted { .. } => "INTERNAL_ERROR",
    }
}

impl ErrorResponseExt for Error {
    fn to_error_response(&self) -> ErrorResponse {
        let response = ErrorResponse::new(error_code(self), self.to_string());
        match self {
            Error::BatchAborted { row, .. } => response.with_details(serde_json::json!({
                "row": row,
                "rolled_back": true
            })),
            _ => response,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.root() {
            Error::Validation { .. } | Error::Format(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Store(_) | Error::Config(_) | Error::Io(_) | Error::BatchAborted { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error conversion for Axum responses using standardized format
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed with an internal error");
        }
        self.to_error_response().into_response_with_status(status)
    }
}

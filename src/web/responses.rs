//! HTTP response types and utilities
//!
//! Every failure is returned as `{"error": "..."}` with a status derived from
//! the [`AppError`] variant. Server-side failures get a generic message; the
//! details only go to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::AppError;

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Status code and client-facing message for an error
pub fn error_status(error: &AppError) -> (StatusCode, String) {
    match error {
        AppError::Parse(parse_error) => (StatusCode::BAD_REQUEST, parse_error.to_string()),
        AppError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
        AppError::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, error.to_string()),
        AppError::NotFound { .. } => (StatusCode::NOT_FOUND, error.to_string()),
        AppError::Report(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate report".to_string(),
        ),
        AppError::Repository(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Data access failed".to_string(),
        ),
        AppError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    }
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> Response {
    let (status, message) = error_status(&error);
    if status.is_server_error() {
        error!("Request failed: {}", error);
    }
    (status, Json(ErrorResponse::new(message))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        handle_error(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ParseError, RepositoryError, ReportError};

    #[test]
    fn test_client_errors_keep_their_message() {
        let (status, message) =
            error_status(&ParseError::invalid_row(2, "flowrate", "'abc' is not a number").into());
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            message,
            "Invalid value in row 2 for field 'flowrate': 'abc' is not a number"
        );

        let (status, message) = error_status(&AppError::validation("No file uploaded"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "No file uploaded");

        let (status, message) = error_status(&AppError::not_found("Dataset", "12"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "Dataset with id '12' not found");

        let (status, _) = error_status(&AppError::PayloadTooLarge { limit: 10 });
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_server_errors_hide_details() {
        let (status, message) = error_status(&ReportError::render("font table missing").into());
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Failed to generate report");

        let (status, message) =
            error_status(&RepositoryError::query_failed("select", "disk I/O error").into());
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Data access failed");

        let (_, message) = error_status(&AppError::internal("join error"));
        assert!(!message.contains("join"));
    }
}

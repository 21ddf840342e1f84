//! Common HTTP error body
//!
//! The error enums of [`crate::access`], [`crate::sharing`] and
//! [`crate::activity`] each implement `IntoResponse` so a handler can return
//! them directly. They all render through [`error_response`], which keeps the
//! JSON shape identical across modules:
//!
//! ```json
//! { "error": "forbidden", "message": "Not authorized to access this task" }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "forbidden", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

/// Builds a JSON error response
pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = Json(ErrorResponse {
        error: code.to_string(),
        message: message.into(),
        details: None,
    });

    (status, body).into_response()
}

/// Builds a 422 response listing the failed fields
pub fn validation_response(errors: &validator::ValidationErrors) -> Response {
    let details: Vec<ValidationErrorDetail> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();

    let body = Json(ErrorResponse {
        error: "validation_error".to_string(),
        message: "Request validation failed".to_string(),
        details: Some(details),
    });

    (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
}

/// Logs a storage failure and hides it behind a generic 500
pub(crate) fn storage_response(err: &sqlx::Error) -> Response {
    tracing::error!(error = %err, "Storage error");
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "An internal error occurred",
    )
}

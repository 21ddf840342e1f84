//! Access errors
//!
//! The `Display` text of [`AccessError`] names the task and user so it is
//! useful in logs. The HTTP response never includes it: a denied caller only
//! learns that they are not authorized, never which level they were missing.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::{error_response, storage_response};

/// Error type for access checks
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Effective permission is below the required minimum
    #[error("User {user_id} is not authorized to access task {task_id}")]
    AccessDenied { task_id: i64, user_id: i64 },

    /// User may see the task but may not change this comment
    #[error("User {user_id} is not authorized to modify comment {comment_id}")]
    CommentDenied { comment_id: i64, user_id: i64 },

    /// Task does not exist (checked before any permission)
    #[error("Task with ID {0} not found")]
    TaskNotFound(i64),

    /// Share lookup failed
    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl AccessError {
    /// HTTP status a handler should answer with
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccessError::AccessDenied { .. } | AccessError::CommentDenied { .. } => {
                StatusCode::FORBIDDEN
            }
            AccessError::TaskNotFound(_) => StatusCode::NOT_FOUND,
            AccessError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        match &self {
            AccessError::AccessDenied { .. } => error_response(
                StatusCode::FORBIDDEN,
                "forbidden",
                "Not authorized to access this task",
            ),
            AccessError::CommentDenied { .. } => error_response(
                StatusCode::FORBIDDEN,
                "forbidden",
                "Not authorized to modify this comment",
            ),
            AccessError::TaskNotFound(_) => {
                error_response(StatusCode::NOT_FOUND, "not_found", "Task not found")
            }
            AccessError::Storage(err) => storage_response(err),
        }
    }
}

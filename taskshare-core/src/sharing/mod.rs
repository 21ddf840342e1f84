//! Task sharing
//!
//! - [`store`]: Storage contract for share rows, plus the journal that
//!   commits a share change with its activity entry
//! - [`postgres`] / [`memory`]: Store and journal implementations
//! - [`registry`]: Grant, update, revoke and list shares
//! - [`service`]: Owner-gated sharing flows that also record activity
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskshare_core::models::{share::ShareLevel, task::Task};
//! use taskshare_core::sharing::{memory::InMemoryShareStore, ShareRegistry};
//!
//! # async fn example(task: Task) -> Result<(), Box<dyn std::error::Error>> {
//! let registry = ShareRegistry::new(Arc::new(InMemoryShareStore::new()));
//!
//! registry.grant(&task, 2, task.owner_id, ShareLevel::View).await?;
//! registry.update(task.id, 2, ShareLevel::Edit).await?;
//! assert!(registry.revoke(task.id, 2).await?);
//! # Ok(())
//! # }
//! ```

pub mod memory;
pub mod postgres;
pub mod registry;
pub mod service;
pub mod store;

pub use registry::ShareRegistry;
pub use service::TaskSharing;
pub use store::{ShareJournal, ShareStore};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::access::AccessError;
use crate::error::{error_response, storage_response};

/// Error type for share operations
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// Caller failed the access check that guards the operation
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Task {task_id} is already shared with user {user_id}")]
    DuplicateShare { task_id: i64, user_id: i64 },

    #[error("Task {task_id} is not shared with user {user_id}")]
    ShareNotFound { task_id: i64, user_id: i64 },

    /// Grantee is the task's owner
    #[error("Cannot share task {task_id} with its owner")]
    SelfShare { task_id: i64 },

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ShareError {
    /// HTTP status a handler should answer with
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShareError::Access(err) => err.status_code(),
            ShareError::DuplicateShare { .. } => StatusCode::CONFLICT,
            ShareError::ShareNotFound { .. } => StatusCode::NOT_FOUND,
            ShareError::SelfShare { .. } => StatusCode::BAD_REQUEST,
            ShareError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        match self {
            ShareError::Access(err) => err.into_response(),
            ShareError::DuplicateShare { .. } => error_response(
                StatusCode::CONFLICT,
                "conflict",
                "Task is already shared with this user",
            ),
            ShareError::ShareNotFound { .. } => {
                error_response(StatusCode::NOT_FOUND, "not_found", "Share not found")
            }
            ShareError::SelfShare { .. } => error_response(
                StatusCode::BAD_REQUEST,
                "bad_request",
                "Cannot share a task with yourself",
            ),
            ShareError::Storage(err) => storage_response(&err),
        }
    }
}

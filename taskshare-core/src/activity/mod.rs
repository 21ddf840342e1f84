//! Activity log
//!
//! Append-only record of what users did to tasks, comments and files.
//!
//! - [`store`]: Storage contract, with [`postgres`] and [`memory`] implementations
//! - [`feed`]: A user's own history and a task's timeline
//! - [`summary`]: One-line human-readable rendering of an entry

pub mod feed;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod summary;

pub use feed::ActivityFeed;
pub use store::ActivityStore;
pub use summary::summary;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::access::AccessError;
use crate::error::{storage_response, validation_response};

/// Error type for activity queries
#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Filter or pagination values out of range
    #[error("Invalid activity query: {0}")]
    InvalidQuery(#[from] validator::ValidationErrors),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ActivityError {
    /// HTTP status a handler should answer with
    pub fn status_code(&self) -> StatusCode {
        match self {
            ActivityError::Access(err) => err.status_code(),
            ActivityError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ActivityError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ActivityError {
    fn into_response(self) -> Response {
        match self {
            ActivityError::Access(err) => err.into_response(),
            ActivityError::InvalidQuery(errors) => validation_response(&errors),
            ActivityError::Storage(err) => storage_response(&err),
        }
    }
}

//! Database models for TaskShare
//!
//! Each model carries its row type plus the sqlx queries that read and
//! write it. Access decisions live in [`crate::access`]; these functions
//! never check permissions on their own.
//!
//! # Models
//!
//! - `user`: User accounts
//! - `task`: Tasks and their owners
//! - `share`: Share grants (`task_shares`) and the [`share::ShareLevel`] enum
//! - `comment`: Comments attached to tasks
//! - `file`: File metadata attached to tasks
//! - `activity`: Append-only activity log entries
//!
//! # Example
//!
//! ```no_run
//! use taskshare_core::models::user::{User, CreateUser};
//! use taskshare_core::models::task::{Task, CreateTask};
//! use taskshare_core::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//!
//! let owner = User::create(&pool, CreateUser {
//!     username: "alice".to_string(),
//!     email: "alice@example.com".to_string(),
//! }).await?;
//!
//! let task = Task::create(&pool, CreateTask {
//!     owner_id: owner.id,
//!     title: "Write report".to_string(),
//!     description: None,
//! }).await?;
//! # Ok(())
//! # }
//! ```

pub mod activity;
pub mod comment;
pub mod file;
pub mod share;
pub mod task;
pub mod user;

/// A row that belongs to exactly one task and has no permissions of its own
///
/// Comments and files implement this so the resolver can check them against
/// their parent task (see [`crate::access::resolver::AccessResolver::require_child`]).
pub trait TaskScoped {
    /// ID of the parent task
    fn task_id(&self) -> i64;
}

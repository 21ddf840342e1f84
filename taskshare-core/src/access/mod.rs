//! Access control for tasks and their sub-resources
//!
//! A user's effective permission on a task is:
//!
//! 1. **Owner** if they own the task
//! 2. otherwise the level of their share row (**View** or **Edit**)
//! 3. otherwise **None**
//!
//! Comments and files carry no permissions of their own; they are checked
//! against their parent task. Editing or deleting a comment additionally
//! depends on who wrote it.
//!
//! # Modules
//!
//! - [`permission`]: Ordered permission levels and per-operation minimums
//! - [`resolver`]: Effective permission lookup and enforcement
//! - [`comments`]: Comment authorship rule
//! - [`error`]: Access errors and their HTTP mapping
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskshare_core::access::{AccessResolver, TaskOperation};
//! use taskshare_core::models::{task::Task, user::User};
//! use taskshare_core::sharing::memory::InMemoryShareStore;
//!
//! # async fn example(task: Task, user: User) -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = AccessResolver::new(Arc::new(InMemoryShareStore::new()));
//!
//! // Uploading a file needs EDIT on the parent task
//! resolver.require_operation(&task, &user, TaskOperation::UploadFile).await?;
//! # Ok(())
//! # }
//! ```

pub mod comments;
pub mod error;
pub mod permission;
pub mod resolver;

pub use comments::CommentAction;
pub use error::AccessError;
pub use permission::{meets, TaskOperation, TaskPermission};
pub use resolver::AccessResolver;

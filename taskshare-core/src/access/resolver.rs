//! Access resolver
//!
//! Computes a user's effective permission on a task and enforces minimum
//! levels. The resolver is handed already-loaded [`Task`] and [`User`]
//! records; it only reads share rows, and it never caches: every call sees
//! the current share state.
//!
//! # Check Order
//!
//! ```text
//! task exists?          no  -> TaskNotFound (404)
//! user owns task?       yes -> Owner
//! share row for user?   yes -> View | Edit
//!                       no  -> None
//! level >= required?    no  -> AccessDenied (403)
//! ```
//!
//! Existence is always resolved before permission, so a missing task is a
//! 404 for everyone.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskshare_core::access::{AccessResolver, TaskPermission};
//! use taskshare_core::models::{task::Task, user::User};
//! use taskshare_core::sharing::postgres::PgShareStore;
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool, user: User) -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = AccessResolver::new(Arc::new(PgShareStore::new(pool.clone())));
//!
//! let task = Task::find_by_id(&pool, 42).await?;
//! let task = resolver
//!     .require_existing(42, task.as_ref(), &user, TaskPermission::View)
//!     .await?;
//! println!("{} may read {}", user.username, task.title);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use super::error::AccessError;
use super::permission::{TaskOperation, TaskPermission};
use crate::models::{task::Task, user::User, TaskScoped};
use crate::sharing::store::ShareStore;

/// Resolves and enforces task permissions
#[derive(Clone)]
pub struct AccessResolver {
    shares: Arc<dyn ShareStore>,
}

impl AccessResolver {
    /// Creates a resolver reading shares from `shares`
    pub fn new(shares: Arc<dyn ShareStore>) -> Self {
        Self { shares }
    }

    /// Gets the user's effective permission on a task
    ///
    /// Ownership wins over any share row the owner might also have.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::Storage` if the share lookup fails
    pub async fn effective_permission(
        &self,
        task: &Task,
        user: &User,
    ) -> Result<TaskPermission, AccessError> {
        if task.is_owned_by(user.id) {
            return Ok(TaskPermission::Owner);
        }

        let permission = match self.shares.find(task.id, user.id).await? {
            Some(share) => TaskPermission::from(share.permission),
            None => TaskPermission::None,
        };

        debug!(
            task_id = task.id,
            user_id = user.id,
            permission = permission.as_str(),
            "Resolved task permission"
        );

        Ok(permission)
    }

    /// Checks that the user has at least `minimum` on the task
    ///
    /// # Returns
    ///
    /// The user's effective permission when the check passes
    ///
    /// # Errors
    ///
    /// Returns `AccessError::AccessDenied` if the effective permission is
    /// below `minimum`
    pub async fn require(
        &self,
        task: &Task,
        user: &User,
        minimum: TaskPermission,
    ) -> Result<TaskPermission, AccessError> {
        let actual = self.effective_permission(task, user).await?;

        if !actual.meets(minimum) {
            warn!(
                task_id = task.id,
                user_id = user.id,
                actual = actual.as_str(),
                required = minimum.as_str(),
                "Unauthorized task access attempt"
            );
            return Err(AccessError::AccessDenied {
                task_id: task.id,
                user_id: user.id,
            });
        }

        Ok(actual)
    }

    /// Checks that the user may perform `operation` on the task
    pub async fn require_operation(
        &self,
        task: &Task,
        user: &User,
        operation: TaskOperation,
    ) -> Result<TaskPermission, AccessError> {
        self.require(task, user, operation.required_permission()).await
    }

    /// Resolves existence, then permission
    ///
    /// `task` is the result of looking up `task_id`. A missing task is
    /// reported as `TaskNotFound` regardless of who is asking; only an
    /// existing task is checked for permission.
    ///
    /// # Errors
    ///
    /// - `AccessError::TaskNotFound` if `task` is `None`
    /// - `AccessError::AccessDenied` if the user's level is below `minimum`
    pub async fn require_existing<'t>(
        &self,
        task_id: i64,
        task: Option<&'t Task>,
        user: &User,
        minimum: TaskPermission,
    ) -> Result<&'t Task, AccessError> {
        let task = task.ok_or(AccessError::TaskNotFound(task_id))?;
        self.require(task, user, minimum).await?;
        Ok(task)
    }

    /// Checks a sub-resource (comment, file) against its parent task
    ///
    /// Sub-resources have no share rows; the user's permission on the parent
    /// task decides.
    ///
    /// # Errors
    ///
    /// - `AccessError::TaskNotFound` if `child` does not belong to `task`
    /// - `AccessError::AccessDenied` if the user's level on `task` is below `minimum`
    pub async fn require_child<C>(
        &self,
        task: &Task,
        child: &C,
        user: &User,
        minimum: TaskPermission,
    ) -> Result<TaskPermission, AccessError>
    where
        C: TaskScoped + Sync + ?Sized,
    {
        if child.task_id() != task.id {
            warn!(
                task_id = task.id,
                child_task_id = child.task_id(),
                "Sub-resource checked against the wrong parent task"
            );
            return Err(AccessError::TaskNotFound(child.task_id()));
        }

        self.require(task, user, minimum).await
    }
}

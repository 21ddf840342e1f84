//! Share storage contract
//!
//! The resolver and the registry only talk to shares through
//! [`ShareStore`], so the same access logic runs against Postgres in
//! production and against memory in tests.
//!
//! # Store Contract
//!
//! Implementations must:
//! 1. Keep at most one share per `(task_id, shared_with_user_id)` pair
//! 2. Make [`ShareStore::insert`] atomic: check and insert happen as one step,
//!    and a conflicting pair yields `Ok(None)`, never a second row
//! 3. Treat deleting a missing pair as a no-op (`Ok(false)`)
//! 4. Return list results oldest first
//!
//! Share changes made on a user's behalf go through [`ShareJournal`], which
//! stores the change and its activity entry as one unit: either both land or
//! neither does.

use async_trait::async_trait;

use crate::models::activity::NewActivity;
use crate::models::share::{NewShare, ShareLevel, TaskShare};

/// Result type for share store operations
pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Persistence for task shares
#[async_trait]
pub trait ShareStore: Send + Sync {
    /// Finds the share for a (task, grantee) pair
    async fn find(&self, task_id: i64, user_id: i64) -> StoreResult<Option<TaskShare>>;

    /// Inserts a share; `None` if the pair already has one
    async fn insert(&self, share: NewShare) -> StoreResult<Option<TaskShare>>;

    /// Changes a share's level; `None` if the pair has no share
    async fn update_level(
        &self,
        task_id: i64,
        user_id: i64,
        level: ShareLevel,
    ) -> StoreResult<Option<TaskShare>>;

    /// Removes a share; `false` if there was none
    async fn delete(&self, task_id: i64, user_id: i64) -> StoreResult<bool>;

    /// Removes every share of a task, returning how many were removed
    async fn delete_for_task(&self, task_id: i64) -> StoreResult<u64>;

    /// Shares of one task
    async fn list_for_task(&self, task_id: i64) -> StoreResult<Vec<TaskShare>>;

    /// Shares granted to one user
    async fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<TaskShare>>;

    /// Shares granted by one user
    async fn list_granted_by(&self, user_id: i64) -> StoreResult<Vec<TaskShare>>;
}

/// Builds the entry for a level change from the level it replaced
pub type LevelChangeEntry = Box<dyn FnOnce(ShareLevel) -> NewActivity + Send>;

/// Share changes committed together with their activity entry
///
/// If recording the entry fails, the share change is rolled back and the
/// error is returned. A change that does nothing (pair already shared, pair
/// not shared) records nothing.
#[async_trait]
pub trait ShareJournal: Send + Sync {
    /// Inserts a share and records `entry`; `None` if the pair already has one
    async fn insert_recorded(
        &self,
        share: NewShare,
        entry: NewActivity,
    ) -> StoreResult<Option<TaskShare>>;

    /// Changes a share's level and records `entry(previous)`; `None` if the
    /// pair has no share
    async fn update_level_recorded(
        &self,
        task_id: i64,
        user_id: i64,
        level: ShareLevel,
        entry: LevelChangeEntry,
    ) -> StoreResult<Option<TaskShare>>;

    /// Removes a share and records `entry`; `false` if there was none
    async fn delete_recorded(
        &self,
        task_id: i64,
        user_id: i64,
        entry: NewActivity,
    ) -> StoreResult<bool>;
}

//! Sharing flows
//!
//! What a handler calls for the sharing endpoints: every mutation checks
//! that the caller owns the task, then writes the share change and its
//! activity entry through a [`ShareJournal`] so the two commit together.
//!
//! # Example
//!
//! ```no_run
//! use taskshare_core::models::{share::ShareLevel, task::Task, user::User};
//! use taskshare_core::services::AccessServices;
//!
//! # async fn example(task: Task, alice: User, bob: User) -> Result<(), Box<dyn std::error::Error>> {
//! let services = AccessServices::in_memory();
//!
//! services.sharing.share(&task, &alice, &bob, ShareLevel::View).await?;
//! services.sharing.update_share(&task, &alice, &bob, ShareLevel::Edit).await?;
//! services.sharing.unshare(&task, &alice, &bob).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use super::store::ShareJournal;
use super::{ShareError, ShareRegistry};
use crate::access::{AccessResolver, TaskOperation};
use crate::models::activity::NewActivity;
use crate::models::share::{ShareLevel, TaskShare};
use crate::models::{task::Task, user::User};

/// Owner-gated sharing operations
#[derive(Clone)]
pub struct TaskSharing {
    resolver: AccessResolver,
    registry: ShareRegistry,
    journal: Arc<dyn ShareJournal>,
}

impl TaskSharing {
    pub fn new(
        resolver: AccessResolver,
        registry: ShareRegistry,
        journal: Arc<dyn ShareJournal>,
    ) -> Self {
        Self {
            resolver,
            registry,
            journal,
        }
    }

    /// Shares `task` with `grantee`
    ///
    /// # Errors
    ///
    /// - `ShareError::Access` if `actor` does not own the task
    /// - `ShareError::SelfShare` if `grantee` owns the task
    /// - `ShareError::DuplicateShare` if the task is already shared with `grantee`
    /// - `ShareError::Storage` if either write fails; nothing is kept then
    pub async fn share(
        &self,
        task: &Task,
        actor: &User,
        grantee: &User,
        level: ShareLevel,
    ) -> Result<TaskShare, ShareError> {
        self.resolver
            .require_operation(task, actor, TaskOperation::ManageShares)
            .await?;

        let new_share = ShareRegistry::new_share(task, grantee.id, actor.id, level)?;
        let share = self
            .journal
            .insert_recorded(new_share, NewActivity::task_shared(actor.id, task.id, grantee, level))
            .await?
            .ok_or(ShareError::DuplicateShare {
                task_id: task.id,
                user_id: grantee.id,
            })?;

        info!(
            task_id = task.id,
            grantee_id = grantee.id,
            granted_by = actor.id,
            permission = level.as_str(),
            "Task shared"
        );

        Ok(share)
    }

    /// Changes `grantee`'s level on `task`
    ///
    /// # Errors
    ///
    /// - `ShareError::Access` if `actor` does not own the task
    /// - `ShareError::ShareNotFound` if the task is not shared with `grantee`
    /// - `ShareError::Storage` if either write fails; the old level is kept then
    pub async fn update_share(
        &self,
        task: &Task,
        actor: &User,
        grantee: &User,
        level: ShareLevel,
    ) -> Result<TaskShare, ShareError> {
        self.resolver
            .require_operation(task, actor, TaskOperation::ManageShares)
            .await?;

        let (actor_id, task_id, target) = (actor.id, task.id, grantee.clone());
        let share = self
            .journal
            .update_level_recorded(
                task.id,
                grantee.id,
                level,
                Box::new(move |previous| {
                    NewActivity::share_updated(actor_id, task_id, &target, previous, level)
                }),
            )
            .await?
            .ok_or(ShareError::ShareNotFound {
                task_id: task.id,
                user_id: grantee.id,
            })?;

        info!(
            task_id = task.id,
            grantee_id = grantee.id,
            permission = level.as_str(),
            "Share permission updated"
        );

        Ok(share)
    }

    /// Removes `grantee`'s access to `task`
    ///
    /// Returns `false` if the task was not shared with `grantee`; nothing is
    /// logged in that case.
    ///
    /// # Errors
    ///
    /// - `ShareError::Access` if `actor` does not own the task
    /// - `ShareError::Storage` if either write fails; the share is kept then
    pub async fn unshare(&self, task: &Task, actor: &User, grantee: &User) -> Result<bool, ShareError> {
        self.resolver
            .require_operation(task, actor, TaskOperation::ManageShares)
            .await?;

        let removed = self
            .journal
            .delete_recorded(
                task.id,
                grantee.id,
                NewActivity::task_unshared(actor.id, task.id, grantee),
            )
            .await?;

        if removed {
            info!(task_id = task.id, grantee_id = grantee.id, "Share revoked");
        } else {
            debug!(task_id = task.id, grantee_id = grantee.id, "No share to revoke");
        }

        Ok(removed)
    }

    /// Lists who `task` is shared with; owner only
    pub async fn shares_for_task(&self, task: &Task, actor: &User) -> Result<Vec<TaskShare>, ShareError> {
        self.resolver
            .require_operation(task, actor, TaskOperation::ListShares)
            .await?;

        self.registry.list_for_task(task.id).await
    }

    /// Lists the shares `user` has received
    pub async fn shared_with_me(&self, user: &User) -> Result<Vec<TaskShare>, ShareError> {
        self.registry.list_for_user(user.id).await
    }

    /// Lists the shares `user` has granted
    pub async fn shared_by_me(&self, user: &User) -> Result<Vec<TaskShare>, ShareError> {
        self.registry.list_granted_by(user.id).await
    }
}

//! Share registry
//!
//! Owns the rules around share rows: no sharing with the owner, at most one
//! share per (task, grantee), revocation is idempotent. It does not check
//! who is asking; callers gate mutations on OWNER (see
//! [`super::service::TaskSharing`]).

use std::sync::Arc;

use tracing::{debug, info};

use super::store::ShareStore;
use super::ShareError;
use crate::models::share::{NewShare, ShareLevel, TaskShare};
use crate::models::task::Task;

/// Grants, changes and revokes task shares
#[derive(Clone)]
pub struct ShareRegistry {
    store: Arc<dyn ShareStore>,
}

impl ShareRegistry {
    pub fn new(store: Arc<dyn ShareStore>) -> Self {
        Self { store }
    }

    /// Builds the share row for a grant, refusing the task's owner
    ///
    /// # Errors
    ///
    /// Returns `ShareError::SelfShare` if `grantee_id` owns the task
    pub fn new_share(
        task: &Task,
        grantee_id: i64,
        granted_by: i64,
        level: ShareLevel,
    ) -> Result<NewShare, ShareError> {
        if task.is_owned_by(grantee_id) {
            return Err(ShareError::SelfShare { task_id: task.id });
        }

        Ok(NewShare {
            task_id: task.id,
            shared_with_user_id: grantee_id,
            shared_by_user_id: granted_by,
            permission: level,
        })
    }

    /// Shares `task` with `grantee_id` at `level`
    ///
    /// # Errors
    ///
    /// - `ShareError::SelfShare` if `grantee_id` owns the task
    /// - `ShareError::DuplicateShare` if the task is already shared with
    ///   `grantee_id`, including when a concurrent grant won the race
    pub async fn grant(
        &self,
        task: &Task,
        grantee_id: i64,
        granted_by: i64,
        level: ShareLevel,
    ) -> Result<TaskShare, ShareError> {
        let share = self
            .store
            .insert(Self::new_share(task, grantee_id, granted_by, level)?)
            .await?
            .ok_or(ShareError::DuplicateShare {
                task_id: task.id,
                user_id: grantee_id,
            })?;

        info!(
            task_id = task.id,
            grantee_id = grantee_id,
            granted_by = granted_by,
            permission = level.as_str(),
            "Task shared"
        );

        Ok(share)
    }

    /// Gets the share for a pair, if any
    pub async fn find(&self, task_id: i64, grantee_id: i64) -> Result<Option<TaskShare>, ShareError> {
        Ok(self.store.find(task_id, grantee_id).await?)
    }

    /// Changes the level of an existing share
    ///
    /// # Errors
    ///
    /// Returns `ShareError::ShareNotFound` if the pair has no share
    pub async fn update(
        &self,
        task_id: i64,
        grantee_id: i64,
        level: ShareLevel,
    ) -> Result<TaskShare, ShareError> {
        let share = self
            .store
            .update_level(task_id, grantee_id, level)
            .await?
            .ok_or(ShareError::ShareNotFound {
                task_id,
                user_id: grantee_id,
            })?;

        info!(
            task_id = task_id,
            grantee_id = grantee_id,
            permission = level.as_str(),
            "Share permission updated"
        );

        Ok(share)
    }

    /// Removes a share
    ///
    /// Returns `false` when there was nothing to remove; that is not an error.
    pub async fn revoke(&self, task_id: i64, grantee_id: i64) -> Result<bool, ShareError> {
        let removed = self.store.delete(task_id, grantee_id).await?;

        if removed {
            info!(task_id = task_id, grantee_id = grantee_id, "Share revoked");
        } else {
            debug!(task_id = task_id, grantee_id = grantee_id, "No share to revoke");
        }

        Ok(removed)
    }

    /// Lists who a task is shared with
    pub async fn list_for_task(&self, task_id: i64) -> Result<Vec<TaskShare>, ShareError> {
        Ok(self.store.list_for_task(task_id).await?)
    }

    /// Lists the shares granted to a user
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<TaskShare>, ShareError> {
        Ok(self.store.list_for_user(user_id).await?)
    }

    /// Lists the shares a user has granted
    pub async fn list_granted_by(&self, user_id: i64) -> Result<Vec<TaskShare>, ShareError> {
        Ok(self.store.list_granted_by(user_id).await?)
    }

    /// Removes every share of a deleted task
    ///
    /// Postgres cascades this through the foreign key; stores without one
    /// need the explicit call.
    pub async fn purge_task(&self, task_id: i64) -> Result<u64, ShareError> {
        let removed = self.store.delete_for_task(task_id).await?;

        if removed > 0 {
            info!(task_id = task_id, removed = removed, "Task shares purged");
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sharing::memory::InMemoryShareStore;
    use chrono::Utc;

    const OWNER: i64 = 1;

    fn task(id: i64) -> Task {
        Task {
            id,
            owner_id: OWNER,
            title: "Plan".to_string(),
            description: Some("Quarterly plan".to_string()),
            completed: false,
            created_at: Utc::now(),
        }
    }

    fn registry() -> ShareRegistry {
        ShareRegistry::new(Arc::new(InMemoryShareStore::new()))
    }

    #[tokio::test]
    async fn test_grant_records_granter() {
        let registry = registry();
        let share = registry
            .grant(&task(10), 2, OWNER, ShareLevel::Edit)
            .await
            .unwrap();

        assert_eq!(share.task_id, 10);
        assert_eq!(share.shared_with_user_id, 2);
        assert_eq!(share.shared_by_user_id, OWNER);
        assert_eq!(share.permission, ShareLevel::Edit);
    }

    #[tokio::test]
    async fn test_grant_to_owner_is_self_share() {
        let registry = registry();
        let err = registry
            .grant(&task(10), OWNER, OWNER, ShareLevel::View)
            .await
            .unwrap_err();

        assert!(matches!(err, ShareError::SelfShare { task_id: 10 }));
        assert!(registry.list_for_task(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_grant() {
        let registry = registry();
        let t = task(10);
        registry.grant(&t, 2, OWNER, ShareLevel::View).await.unwrap();

        let err = registry
            .grant(&t, 2, OWNER, ShareLevel::Edit)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShareError::DuplicateShare { task_id: 10, user_id: 2 }
        ));
    }

    #[tokio::test]
    async fn test_update_missing_share() {
        let err = registry()
            .update(10, 2, ShareLevel::Edit)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ShareError::ShareNotFound { task_id: 10, user_id: 2 }
        ));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let registry = registry();
        registry
            .grant(&task(10), 2, OWNER, ShareLevel::View)
            .await
            .unwrap();

        assert!(registry.revoke(10, 2).await.unwrap());
        assert!(!registry.revoke(10, 2).await.unwrap());
        assert!(registry.find(10, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_task() {
        let registry = registry();
        let t = task(10);
        registry.grant(&t, 2, OWNER, ShareLevel::View).await.unwrap();
        registry.grant(&t, 3, OWNER, ShareLevel::Edit).await.unwrap();
        registry
            .grant(&task(11), 2, OWNER, ShareLevel::View)
            .await
            .unwrap();

        assert_eq!(registry.purge_task(10).await.unwrap(), 2);
        assert!(registry.list_for_task(10).await.unwrap().is_empty());
        assert_eq!(registry.list_for_user(2).await.unwrap().len(), 1);
        assert_eq!(registry.list_granted_by(OWNER).await.unwrap().len(), 1);
    }
}

//! In-memory share store
//!
//! Backs tests and single-process setups. State lives behind one
//! `tokio::sync::RwLock`; [`ShareStore::insert`] checks and inserts under
//! the same write guard, which gives it the same one-winner behavior as the
//! Postgres unique constraint.
//!
//! [`InMemoryShareJournal`] keeps that guard while the activity entry is
//! recorded and undoes the share change if recording fails.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use super::store::{LevelChangeEntry, ShareJournal, ShareStore, StoreResult};
use crate::activity::ActivityStore;
use crate::models::activity::NewActivity;
use crate::models::share::{NewShare, ShareLevel, TaskShare};

#[derive(Debug, Default)]
struct Shares {
    next_id: i64,
    by_pair: HashMap<(i64, i64), TaskShare>,
}

impl Shares {
    fn insert(&mut self, share: NewShare) -> Option<TaskShare> {
        let key = (share.task_id, share.shared_with_user_id);
        if self.by_pair.contains_key(&key) {
            return None;
        }

        self.next_id += 1;
        let row = TaskShare {
            id: self.next_id,
            task_id: share.task_id,
            shared_with_user_id: share.shared_with_user_id,
            shared_by_user_id: share.shared_by_user_id,
            permission: share.permission,
            shared_at: Utc::now(),
        };
        self.by_pair.insert(key, row.clone());

        Some(row)
    }

    fn collect<F>(&self, keep: F) -> Vec<TaskShare>
    where
        F: Fn(&TaskShare) -> bool,
    {
        let mut shares: Vec<TaskShare> = self.by_pair.values().filter(|s| keep(s)).cloned().collect();
        shares.sort_by_key(|s| (s.shared_at, s.id));
        shares
    }
}

/// Share store kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryShareStore {
    inner: RwLock<Shares>,
}

impl InMemoryShareStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shares currently stored
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_pair.len()
    }

    /// Returns true if no shares are stored
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ShareStore for InMemoryShareStore {
    async fn find(&self, task_id: i64, user_id: i64) -> StoreResult<Option<TaskShare>> {
        Ok(self.inner.read().await.by_pair.get(&(task_id, user_id)).cloned())
    }

    async fn insert(&self, share: NewShare) -> StoreResult<Option<TaskShare>> {
        Ok(self.inner.write().await.insert(share))
    }

    async fn update_level(
        &self,
        task_id: i64,
        user_id: i64,
        level: ShareLevel,
    ) -> StoreResult<Option<TaskShare>> {
        let mut inner = self.inner.write().await;

        Ok(inner.by_pair.get_mut(&(task_id, user_id)).map(|share| {
            share.permission = level;
            share.clone()
        }))
    }

    async fn delete(&self, task_id: i64, user_id: i64) -> StoreResult<bool> {
        Ok(self
            .inner
            .write()
            .await
            .by_pair
            .remove(&(task_id, user_id))
            .is_some())
    }

    async fn delete_for_task(&self, task_id: i64) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.by_pair.len();
        inner.by_pair.retain(|(t, _), _| *t != task_id);

        Ok((before - inner.by_pair.len()) as u64)
    }

    async fn list_for_task(&self, task_id: i64) -> StoreResult<Vec<TaskShare>> {
        Ok(self.inner.read().await.collect(|s| s.task_id == task_id))
    }

    async fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<TaskShare>> {
        Ok(self
            .inner
            .read()
            .await
            .collect(|s| s.shared_with_user_id == user_id))
    }

    async fn list_granted_by(&self, user_id: i64) -> StoreResult<Vec<TaskShare>> {
        Ok(self
            .inner
            .read()
            .await
            .collect(|s| s.shared_by_user_id == user_id))
    }
}

/// Memory share store paired with an activity store
#[derive(Clone)]
pub struct InMemoryShareJournal {
    shares: Arc<InMemoryShareStore>,
    activity: Arc<dyn ActivityStore>,
}

impl InMemoryShareJournal {
    pub fn new(shares: Arc<InMemoryShareStore>, activity: Arc<dyn ActivityStore>) -> Self {
        Self { shares, activity }
    }
}

#[async_trait]
impl ShareJournal for InMemoryShareJournal {
    async fn insert_recorded(
        &self,
        share: NewShare,
        entry: NewActivity,
    ) -> StoreResult<Option<TaskShare>> {
        let mut inner = self.shares.inner.write().await;

        let Some(created) = inner.insert(share) else {
            return Ok(None);
        };

        if let Err(err) = self.activity.record(entry).await {
            warn!(task_id = created.task_id, error = %err, "Rolling back share");
            inner
                .by_pair
                .remove(&(created.task_id, created.shared_with_user_id));
            return Err(err);
        }

        Ok(Some(created))
    }

    async fn update_level_recorded(
        &self,
        task_id: i64,
        user_id: i64,
        level: ShareLevel,
        entry: LevelChangeEntry,
    ) -> StoreResult<Option<TaskShare>> {
        let mut inner = self.shares.inner.write().await;
        let key = (task_id, user_id);

        let Some(share) = inner.by_pair.get_mut(&key) else {
            return Ok(None);
        };
        let previous = share.permission;
        share.permission = level;
        let updated = share.clone();

        if let Err(err) = self.activity.record(entry(previous)).await {
            warn!(task_id = task_id, error = %err, "Rolling back share update");
            if let Some(share) = inner.by_pair.get_mut(&key) {
                share.permission = previous;
            }
            return Err(err);
        }

        Ok(Some(updated))
    }

    async fn delete_recorded(
        &self,
        task_id: i64,
        user_id: i64,
        entry: NewActivity,
    ) -> StoreResult<bool> {
        let mut inner = self.shares.inner.write().await;
        let key = (task_id, user_id);

        let Some(removed) = inner.by_pair.remove(&key) else {
            return Ok(false);
        };

        if let Err(err) = self.activity.record(entry).await {
            warn!(task_id = task_id, error = %err, "Rolling back share removal");
            inner.by_pair.insert(key, removed);
            return Err(err);
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::memory::InMemoryActivityStore;
    use crate::models::activity::{ActivityLog, ActivityQuery, ResourceType};

    /// Activity store whose writes always fail
    struct FailingActivityStore;

    #[async_trait]
    impl ActivityStore for FailingActivityStore {
        async fn record(&self, _entry: NewActivity) -> Result<ActivityLog, sqlx::Error> {
            Err(sqlx::Error::PoolTimedOut)
        }

        async fn list_for_user(
            &self,
            _user_id: i64,
            _query: &ActivityQuery,
        ) -> Result<Vec<ActivityLog>, sqlx::Error> {
            Ok(Vec::new())
        }

        async fn list_for_resource(
            &self,
            _resource_type: ResourceType,
            _resource_id: i64,
        ) -> Result<Vec<ActivityLog>, sqlx::Error> {
            Ok(Vec::new())
        }
    }

    fn entry(task_id: i64) -> NewActivity {
        NewActivity {
            user_id: 1,
            action: crate::models::activity::ActivityAction::Shared,
            resource_type: ResourceType::Task,
            resource_id: task_id,
            details: None,
        }
    }

    fn new_share(task_id: i64, grantee: i64, level: ShareLevel) -> NewShare {
        NewShare {
            task_id,
            shared_with_user_id: grantee,
            shared_by_user_id: 1,
            permission: level,
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_pair() {
        let store = InMemoryShareStore::new();

        let first = store.insert(new_share(10, 2, ShareLevel::View)).await.unwrap();
        assert!(first.is_some());

        let second = store.insert(new_share(10, 2, ShareLevel::Edit)).await.unwrap();
        assert!(second.is_none());

        // The original row is untouched
        let share = store.find(10, 2).await.unwrap().unwrap();
        assert_eq!(share.permission, ShareLevel::View);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_single_winner() {
        let store = Arc::new(InMemoryShareStore::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(new_share(10, 2, ShareLevel::View)).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().is_some() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let store = InMemoryShareStore::new();

        assert!(store.update_level(10, 2, ShareLevel::Edit).await.unwrap().is_none());
        assert!(!store.delete(10, 2).await.unwrap());

        store.insert(new_share(10, 2, ShareLevel::View)).await.unwrap();
        let updated = store.update_level(10, 2, ShareLevel::Edit).await.unwrap().unwrap();
        assert_eq!(updated.permission, ShareLevel::Edit);

        assert!(store.delete(10, 2).await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_for_task_and_lists() {
        let store = InMemoryShareStore::new();
        store.insert(new_share(10, 2, ShareLevel::View)).await.unwrap();
        store.insert(new_share(10, 3, ShareLevel::Edit)).await.unwrap();
        store.insert(new_share(11, 2, ShareLevel::View)).await.unwrap();

        let for_task: Vec<i64> = store
            .list_for_task(10)
            .await
            .unwrap()
            .iter()
            .map(|s| s.shared_with_user_id)
            .collect();
        assert_eq!(for_task, vec![2, 3]);
        assert_eq!(store.list_for_user(2).await.unwrap().len(), 2);
        assert_eq!(store.list_granted_by(1).await.unwrap().len(), 3);

        assert_eq!(store.delete_for_task(10).await.unwrap(), 2);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.delete_for_task(10).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_journal_records_each_change() {
        let shares = Arc::new(InMemoryShareStore::new());
        let activity = Arc::new(InMemoryActivityStore::new());
        let journal = InMemoryShareJournal::new(shares.clone(), activity.clone());

        let created = journal
            .insert_recorded(new_share(10, 2, ShareLevel::View), entry(10))
            .await
            .unwrap();
        assert!(created.is_some());

        // A taken pair changes nothing and records nothing
        let again = journal
            .insert_recorded(new_share(10, 2, ShareLevel::Edit), entry(10))
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(activity.len().await, 1);

        let updated = journal
            .update_level_recorded(
                10,
                2,
                ShareLevel::Edit,
                Box::new(|previous| {
                    assert_eq!(previous, ShareLevel::View);
                    entry(10)
                }),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.permission, ShareLevel::Edit);

        assert!(journal.delete_recorded(10, 2, entry(10)).await.unwrap());
        assert!(!journal.delete_recorded(10, 2, entry(10)).await.unwrap());
        assert!(shares.is_empty().await);
        assert_eq!(activity.len().await, 3);
    }

    #[tokio::test]
    async fn test_journal_rolls_back_when_recording_fails() {
        let shares = Arc::new(InMemoryShareStore::new());
        let failing = InMemoryShareJournal::new(shares.clone(), Arc::new(FailingActivityStore));

        let err = failing
            .insert_recorded(new_share(10, 2, ShareLevel::View), entry(10))
            .await
            .unwrap_err();
        assert!(matches!(err, sqlx::Error::PoolTimedOut));
        assert!(shares.is_empty().await);

        // Existing shares survive failed updates and removals untouched
        shares.insert(new_share(10, 3, ShareLevel::View)).await.unwrap();

        assert!(failing
            .update_level_recorded(10, 3, ShareLevel::Edit, Box::new(|_| entry(10)))
            .await
            .is_err());
        assert_eq!(
            shares.find(10, 3).await.unwrap().unwrap().permission,
            ShareLevel::View
        );

        assert!(failing.delete_recorded(10, 3, entry(10)).await.is_err());
        assert!(shares.find(10, 3).await.unwrap().is_some());
        assert_eq!(shares.len().await, 1);
    }
}

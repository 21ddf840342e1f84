//! Postgres share store
//!
//! Thin adapter from [`ShareStore`] to the [`TaskShare`] queries. Atomic
//! grants rely on the `unique_task_share` constraint plus
//! `ON CONFLICT DO NOTHING`. [`ShareJournal`] runs the share query and the
//! `activity_logs` insert in one transaction; returning early drops the
//! transaction, which rolls it back.

use async_trait::async_trait;
use sqlx::PgPool;

use super::store::{LevelChangeEntry, ShareJournal, ShareStore, StoreResult};
use crate::models::activity::{ActivityLog, NewActivity};
use crate::models::share::{NewShare, ShareLevel, TaskShare};

/// Share store backed by the `task_shares` table
#[derive(Debug, Clone)]
pub struct PgShareStore {
    pool: PgPool,
}

impl PgShareStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareStore for PgShareStore {
    async fn find(&self, task_id: i64, user_id: i64) -> StoreResult<Option<TaskShare>> {
        TaskShare::find(&self.pool, task_id, user_id).await
    }

    async fn insert(&self, share: NewShare) -> StoreResult<Option<TaskShare>> {
        TaskShare::create(&self.pool, share).await
    }

    async fn update_level(
        &self,
        task_id: i64,
        user_id: i64,
        level: ShareLevel,
    ) -> StoreResult<Option<TaskShare>> {
        TaskShare::update_permission(&self.pool, task_id, user_id, level).await
    }

    async fn delete(&self, task_id: i64, user_id: i64) -> StoreResult<bool> {
        TaskShare::delete(&self.pool, task_id, user_id).await
    }

    async fn delete_for_task(&self, task_id: i64) -> StoreResult<u64> {
        TaskShare::delete_by_task(&self.pool, task_id).await
    }

    async fn list_for_task(&self, task_id: i64) -> StoreResult<Vec<TaskShare>> {
        TaskShare::list_by_task(&self.pool, task_id).await
    }

    async fn list_for_user(&self, user_id: i64) -> StoreResult<Vec<TaskShare>> {
        TaskShare::list_by_grantee(&self.pool, user_id).await
    }

    async fn list_granted_by(&self, user_id: i64) -> StoreResult<Vec<TaskShare>> {
        TaskShare::list_by_granter(&self.pool, user_id).await
    }
}

#[async_trait]
impl ShareJournal for PgShareStore {
    async fn insert_recorded(
        &self,
        share: NewShare,
        entry: NewActivity,
    ) -> StoreResult<Option<TaskShare>> {
        let mut tx = self.pool.begin().await?;

        let Some(created) = TaskShare::create(&mut *tx, share).await? else {
            return Ok(None);
        };
        ActivityLog::create(&mut *tx, entry).await?;

        tx.commit().await?;
        Ok(Some(created))
    }

    async fn update_level_recorded(
        &self,
        task_id: i64,
        user_id: i64,
        level: ShareLevel,
        entry: LevelChangeEntry,
    ) -> StoreResult<Option<TaskShare>> {
        let mut tx = self.pool.begin().await?;

        let Some(previous) = TaskShare::find_for_update(&mut *tx, task_id, user_id).await? else {
            return Ok(None);
        };
        let Some(updated) = TaskShare::update_permission(&mut *tx, task_id, user_id, level).await?
        else {
            return Ok(None);
        };
        ActivityLog::create(&mut *tx, entry(previous.permission)).await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_recorded(
        &self,
        task_id: i64,
        user_id: i64,
        entry: NewActivity,
    ) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        if !TaskShare::delete(&mut *tx, task_id, user_id).await? {
            return Ok(false);
        }
        ActivityLog::create(&mut *tx, entry).await?;

        tx.commit().await?;
        Ok(true)
    }
}

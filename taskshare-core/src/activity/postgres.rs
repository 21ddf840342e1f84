//! Postgres activity store

use async_trait::async_trait;
use sqlx::PgPool;

use super::store::ActivityStore;
use crate::models::activity::{ActivityLog, ActivityQuery, NewActivity, ResourceType};

/// Activity store backed by the `activity_logs` table
#[derive(Debug, Clone)]
pub struct PgActivityStore {
    pool: PgPool,
}

impl PgActivityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityStore for PgActivityStore {
    async fn record(&self, entry: NewActivity) -> Result<ActivityLog, sqlx::Error> {
        ActivityLog::create(&self.pool, entry).await
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivityLog>, sqlx::Error> {
        ActivityLog::list_by_user(&self.pool, user_id, query).await
    }

    async fn list_for_resource(
        &self,
        resource_type: ResourceType,
        resource_id: i64,
    ) -> Result<Vec<ActivityLog>, sqlx::Error> {
        ActivityLog::list_by_resource(&self.pool, resource_type, resource_id).await
    }
}

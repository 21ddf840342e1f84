//! In-memory activity store
//!
//! Entries are kept in append order, which is also id and time order.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::store::ActivityStore;
use crate::models::activity::{ActivityLog, ActivityQuery, NewActivity, ResourceType};

/// Activity store kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryActivityStore {
    logs: RwLock<Vec<ActivityLog>>,
}

impl InMemoryActivityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries recorded so far
    pub async fn len(&self) -> usize {
        self.logs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ActivityStore for InMemoryActivityStore {
    async fn record(&self, entry: NewActivity) -> Result<ActivityLog, sqlx::Error> {
        let mut logs = self.logs.write().await;

        let log = ActivityLog {
            id: logs.len() as i64 + 1,
            user_id: entry.user_id,
            action: entry.action,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id,
            details: entry.details,
            created_at: Utc::now(),
        };
        logs.push(log.clone());

        Ok(log)
    }

    async fn list_for_user(
        &self,
        user_id: i64,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let logs = self.logs.read().await;

        Ok(logs
            .iter()
            .rev()
            .filter(|log| log.user_id == user_id && query.matches(log))
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn list_for_resource(
        &self,
        resource_type: ResourceType,
        resource_id: i64,
    ) -> Result<Vec<ActivityLog>, sqlx::Error> {
        let logs = self.logs.read().await;

        Ok(logs
            .iter()
            .filter(|log| log.resource_type == resource_type && log.resource_id == resource_id)
            .cloned()
            .collect())
    }
}

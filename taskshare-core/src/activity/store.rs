//! Activity storage contract

use async_trait::async_trait;

use crate::models::activity::{ActivityLog, ActivityQuery, NewActivity, ResourceType};

/// Persistence for activity entries
///
/// Entries are only ever appended. `list_for_user` returns newest first and
/// applies every filter and the pagination of `query`; `list_for_resource`
/// returns oldest first and is unpaginated.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Appends an entry
    async fn record(&self, entry: NewActivity) -> Result<ActivityLog, sqlx::Error>;

    /// Entries made by one user
    async fn list_for_user(
        &self,
        user_id: i64,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivityLog>, sqlx::Error>;

    /// Entries about one resource
    async fn list_for_resource(
        &self,
        resource_type: ResourceType,
        resource_id: i64,
    ) -> Result<Vec<ActivityLog>, sqlx::Error>;
}

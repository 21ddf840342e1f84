//! Activity feeds
//!
//! Two views over the log: a user's own history (filterable, paginated)
//! and a task's timeline, which anyone with VIEW on the task may read.

use std::sync::Arc;

use tracing::debug;
use validator::Validate;

use super::store::ActivityStore;
use super::ActivityError;
use crate::access::{AccessResolver, TaskOperation};
use crate::models::activity::{ActivityLog, ActivityQuery, ResourceType};
use crate::models::{task::Task, user::User};

/// Read access to the activity log
#[derive(Clone)]
pub struct ActivityFeed {
    resolver: AccessResolver,
    store: Arc<dyn ActivityStore>,
}

impl ActivityFeed {
    pub fn new(resolver: AccessResolver, store: Arc<dyn ActivityStore>) -> Self {
        Self { resolver, store }
    }

    /// Lists the user's own entries, newest first
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::InvalidQuery` if `limit` is outside 1..=100
    /// or `offset` is negative
    pub async fn my_activity(
        &self,
        user: &User,
        query: &ActivityQuery,
    ) -> Result<Vec<ActivityLog>, ActivityError> {
        query.validate()?;

        let logs = self.store.list_for_user(user.id, query).await?;
        debug!(user_id = user.id, count = logs.len(), "Listed user activity");

        Ok(logs)
    }

    /// Lists everything logged against a task, oldest first
    ///
    /// # Errors
    ///
    /// Returns `ActivityError::Access` if the user cannot view the task
    pub async fn task_timeline(
        &self,
        task: &Task,
        user: &User,
    ) -> Result<Vec<ActivityLog>, ActivityError> {
        self.resolver
            .require_operation(task, user, TaskOperation::ViewTimeline)
            .await?;

        Ok(self.store.list_for_resource(ResourceType::Task, task.id).await?)
    }
}

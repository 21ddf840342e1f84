//! Activity log model and database operations
//!
//! Every entry records one action by one user on one resource. Entries are
//! never updated. Share changes are logged against the task
//! (`resource_type = 'task'`) so they show up on the task's timeline.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE activity_action AS ENUM (
//!     'created', 'updated', 'deleted', 'uploaded', 'shared', 'unshared', 'share_updated'
//! );
//! CREATE TYPE activity_resource AS ENUM ('task', 'comment', 'file');
//!
//! CREATE TABLE activity_logs (
//!     id BIGSERIAL PRIMARY KEY,
//!     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     action activity_action NOT NULL,
//!     resource_type activity_resource NOT NULL,
//!     resource_id BIGINT NOT NULL,
//!     details JSONB,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};
use validator::Validate;

use super::comment::TaskComment;
use super::file::TaskFile;
use super::share::ShareLevel;
use super::task::Task;
use super::user::User;

/// Longest comment excerpt kept in an entry, in characters
pub const CONTENT_PREVIEW_CHARS: usize = 100;

fn preview(content: &str) -> String {
    content.chars().take(CONTENT_PREVIEW_CHARS).collect()
}

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Updated,
    Deleted,
    Uploaded,
    Shared,
    Unshared,
    ShareUpdated,
}

impl ActivityAction {
    /// Converts action to its stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Created => "created",
            ActivityAction::Updated => "updated",
            ActivityAction::Deleted => "deleted",
            ActivityAction::Uploaded => "uploaded",
            ActivityAction::Shared => "shared",
            ActivityAction::Unshared => "unshared",
            ActivityAction::ShareUpdated => "share_updated",
        }
    }
}

/// What it happened to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_resource", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Task,
    Comment,
    File,
}

impl ResourceType {
    /// Converts resource type to its stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Task => "task",
            ResourceType::Comment => "comment",
            ResourceType::File => "file",
        }
    }
}

/// One activity log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityLog {
    /// Entry ID
    pub id: i64,

    /// Acting user
    pub user_id: i64,

    /// What happened
    pub action: ActivityAction,

    /// Kind of resource acted on
    pub resource_type: ResourceType,

    /// ID of the resource acted on
    pub resource_id: i64,

    /// Action-specific details (JSON object)
    pub details: Option<JsonValue>,

    /// When it happened
    pub created_at: DateTime<Utc>,
}

/// Input for recording an activity entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    pub user_id: i64,
    pub action: ActivityAction,
    pub resource_type: ResourceType,
    pub resource_id: i64,
    pub details: Option<JsonValue>,
}

impl NewActivity {
    /// Entry for `actor_id` creating `task`
    pub fn task_created(actor_id: i64, task: &Task) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::Created,
            resource_type: ResourceType::Task,
            resource_id: task.id,
            details: Some(json!({
                "title": task.title,
                "completed": task.completed,
            })),
        }
    }

    /// Entry for `actor_id` editing a task from `before` to `after`
    ///
    /// Only fields that differ are listed in `changed_fields` and carried in
    /// `old_values` / `new_values`.
    pub fn task_updated(actor_id: i64, before: &Task, after: &Task) -> Self {
        let mut changed_fields = Vec::new();
        let mut old_values = JsonMap::new();
        let mut new_values = JsonMap::new();

        let fields = [
            ("title", json!(before.title), json!(after.title)),
            ("description", json!(before.description), json!(after.description)),
            ("completed", json!(before.completed), json!(after.completed)),
        ];
        for (field, old, new) in fields {
            if old != new {
                changed_fields.push(field);
                old_values.insert(field.to_string(), old);
                new_values.insert(field.to_string(), new);
            }
        }

        Self {
            user_id: actor_id,
            action: ActivityAction::Updated,
            resource_type: ResourceType::Task,
            resource_id: after.id,
            details: Some(json!({
                "changed_fields": changed_fields,
                "old_values": old_values,
                "new_values": new_values,
            })),
        }
    }

    /// Entry for `actor_id` deleting `task`
    pub fn task_deleted(actor_id: i64, task: &Task) -> Self {
        Self {
            action: ActivityAction::Deleted,
            ..Self::task_created(actor_id, task)
        }
    }

    /// Entry for `actor_id` sharing a task with `grantee`
    pub fn task_shared(actor_id: i64, task_id: i64, grantee: &User, level: ShareLevel) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::Shared,
            resource_type: ResourceType::Task,
            resource_id: task_id,
            details: Some(json!({
                "shared_with_user_id": grantee.id,
                "shared_with_username": grantee.username,
                "permission": level.as_str(),
            })),
        }
    }

    /// Entry for `actor_id` changing `grantee`'s level on a task
    pub fn share_updated(
        actor_id: i64,
        task_id: i64,
        grantee: &User,
        old_level: ShareLevel,
        new_level: ShareLevel,
    ) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::ShareUpdated,
            resource_type: ResourceType::Task,
            resource_id: task_id,
            details: Some(json!({
                "shared_with_user_id": grantee.id,
                "shared_with_username": grantee.username,
                "old_permission": old_level.as_str(),
                "new_permission": new_level.as_str(),
            })),
        }
    }

    /// Entry for `actor_id` removing `grantee`'s access to a task
    pub fn task_unshared(actor_id: i64, task_id: i64, grantee: &User) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::Unshared,
            resource_type: ResourceType::Task,
            resource_id: task_id,
            details: Some(json!({
                "unshared_user_id": grantee.id,
                "unshared_username": grantee.username,
            })),
        }
    }

    /// Entry for `actor_id` commenting on a task
    pub fn comment_created(actor_id: i64, comment: &TaskComment) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::Created,
            resource_type: ResourceType::Comment,
            resource_id: comment.id,
            details: Some(json!({
                "task_id": comment.task_id,
                "content_preview": preview(&comment.content),
            })),
        }
    }

    /// Entry for `actor_id` editing a comment; `comment` holds the new text
    pub fn comment_updated(actor_id: i64, comment: &TaskComment, old_content: &str) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::Updated,
            resource_type: ResourceType::Comment,
            resource_id: comment.id,
            details: Some(json!({
                "task_id": comment.task_id,
                "old_content": preview(old_content),
                "new_content": preview(&comment.content),
            })),
        }
    }

    /// Entry for `actor_id` deleting a comment
    pub fn comment_deleted(actor_id: i64, comment: &TaskComment) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::Deleted,
            resource_type: ResourceType::Comment,
            resource_id: comment.id,
            details: Some(json!({
                "task_id": comment.task_id,
                "content": preview(&comment.content),
            })),
        }
    }

    /// Entry for `actor_id` attaching a file to a task
    pub fn file_uploaded(actor_id: i64, file: &TaskFile) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::Uploaded,
            resource_type: ResourceType::File,
            resource_id: file.id,
            details: Some(json!({
                "task_id": file.task_id,
                "filename": file.original_filename,
                "file_size": file.file_size,
                "content_type": file.content_type,
            })),
        }
    }

    /// Entry for `actor_id` removing a file from a task
    pub fn file_deleted(actor_id: i64, file: &TaskFile) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::Deleted,
            resource_type: ResourceType::File,
            resource_id: file.id,
            details: Some(json!({
                "task_id": file.task_id,
                "filename": file.original_filename,
            })),
        }
    }
}

/// Filters for a user's activity history
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ActivityQuery {
    /// Only entries on this kind of resource
    #[serde(default)]
    pub resource_type: Option<ResourceType>,

    /// Only entries with this action
    #[serde(default)]
    pub action: Option<ActivityAction>,

    /// Only entries at or after this time
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,

    /// Only entries at or before this time
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,

    /// Page size
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,

    /// Entries to skip
    #[serde(default)]
    #[validate(range(min = 0, message = "offset must not be negative"))]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            resource_type: None,
            action: None,
            start_date: None,
            end_date: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl ActivityQuery {
    /// Returns true if `log` passes every filter (pagination aside)
    pub fn matches(&self, log: &ActivityLog) -> bool {
        self.resource_type.map_or(true, |rt| log.resource_type == rt)
            && self.action.map_or(true, |a| log.action == a)
            && self.start_date.map_or(true, |start| log.created_at >= start)
            && self.end_date.map_or(true, |end| log.created_at <= end)
    }
}

impl ActivityLog {
    /// Appends an entry
    ///
    /// Takes any executor so the entry can join the transaction of the
    /// change it describes.
    pub async fn create<'e, E>(executor: E, data: NewActivity) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let log = sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs (user_id, action, resource_type, resource_id, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, action, resource_type, resource_id, details, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.action)
        .bind(data.resource_type)
        .bind(data.resource_id)
        .bind(data.details)
        .fetch_one(executor)
        .await?;

        Ok(log)
    }

    /// Lists a user's own entries, newest first, filtered and paginated
    ///
    /// `query` is assumed to be validated.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: i64,
        query: &ActivityQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "SELECT id, user_id, action, resource_type, resource_id, details, created_at \
             FROM activity_logs WHERE user_id = ",
        );
        builder.push_bind(user_id);

        if let Some(resource_type) = query.resource_type {
            builder.push(" AND resource_type = ").push_bind(resource_type);
        }
        if let Some(action) = query.action {
            builder.push(" AND action = ").push_bind(action);
        }
        if let Some(start) = query.start_date {
            builder.push(" AND created_at >= ").push_bind(start);
        }
        if let Some(end) = query.end_date {
            builder.push(" AND created_at <= ").push_bind(end);
        }

        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);

        let logs = builder.build_query_as::<ActivityLog>().fetch_all(pool).await?;

        Ok(logs)
    }

    /// Lists every entry about one resource, oldest first
    pub async fn list_by_resource(
        pool: &PgPool,
        resource_type: ResourceType,
        resource_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let logs = sqlx::query_as::<_, ActivityLog>(
            r#"
            SELECT id, user_id, action, resource_type, resource_id, details, created_at
            FROM activity_logs
            WHERE resource_type = $1 AND resource_id = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(resource_type)
        .bind(resource_id)
        .fetch_all(pool)
        .await?;

        Ok(logs)
    }
}

//! Comment model and database operations
//!
//! Comments have no share rows of their own. Reading or adding one needs
//! VIEW on the parent task; editing or deleting one is additionally gated
//! on authorship (see [`crate::access::comments`]).
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE task_comments (
//!     id BIGSERIAL PRIMARY KEY,
//!     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
//!     user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     content VARCHAR(1000) NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use super::TaskScoped;

/// Comment on a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskComment {
    /// Comment ID
    pub id: i64,

    /// Parent task
    pub task_id: i64,

    /// Author
    pub user_id: i64,

    /// Comment text
    pub content: String,

    /// When the comment was written
    pub created_at: DateTime<Utc>,

    /// When the comment was last edited (None if never)
    pub updated_at: Option<DateTime<Utc>>,
}

impl TaskScoped for TaskComment {
    fn task_id(&self) -> i64 {
        self.task_id
    }
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateComment {
    /// Parent task
    pub task_id: i64,

    /// Author
    pub user_id: i64,

    /// Comment text
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub content: String,
}

impl TaskComment {
    /// Returns true if `user_id` wrote this comment
    pub fn is_authored_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }

    /// Creates a comment
    ///
    /// The caller is expected to have validated `data` and checked VIEW on
    /// the parent task.
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, TaskComment>(
            r#"
            INSERT INTO task_comments (task_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, user_id, content, created_at, updated_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.user_id)
        .bind(data.content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, TaskComment>(
            r#"
            SELECT id, task_id, user_id, content, created_at, updated_at
            FROM task_comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Lists comments of a task, oldest first
    pub async fn list_by_task(pool: &PgPool, task_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, TaskComment>(
            r#"
            SELECT id, task_id, user_id, content, created_at, updated_at
            FROM task_comments
            WHERE task_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    /// Replaces the text of a comment
    pub async fn update_content(
        pool: &PgPool,
        id: i64,
        content: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, TaskComment>(
            r#"
            UPDATE task_comments
            SET content = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, task_id, user_id, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Deletes a comment
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

//! Task model and database operations
//!
//! A task has exactly one owner, fixed at creation. Ownership is never stored
//! as a share row: it is read straight from `owner_id`.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id BIGSERIAL PRIMARY KEY,
//!     owner_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     title VARCHAR(200) NOT NULL,
//!     description VARCHAR(1000),
//!     completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Deleting a task cascades to its shares, comments and files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Task owned by a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: i64,

    /// User who created and owns the task
    pub owner_id: i64,

    /// Short title
    pub title: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Whether the task is done
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owner of the new task
    pub owner_id: i64,

    /// Task title
    pub title: String,

    /// Task description
    pub description: Option<String>,
}

impl Task {
    /// Returns true if `user_id` owns this task
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }

    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (owner_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, title, description, completed, created_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    ///
    /// Returns `None` when the task does not exist. Handlers must turn that
    /// into a not-found error *before* asking the resolver about permissions.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, completed, created_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists tasks owned by a user, newest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, completed, created_at
            FROM tasks
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Deletes a task
    ///
    /// ⚠️  This also deletes all shares, comments and files of the task due to CASCADE.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_owned_by() {
        let task = Task {
            id: 1,
            owner_id: 7,
            title: "Write report".to_string(),
            description: None,
            completed: false,
            created_at: Utc::now(),
        };

        assert!(task.is_owned_by(7));
        assert!(!task.is_owned_by(8));
    }
}

//! Task share model and database operations
//!
//! A share grants one user VIEW or EDIT access to someone else's task.
//! Ownership is never a share: the owner's access comes from
//! `tasks.owner_id`, so [`ShareLevel`] has no owner variant.
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE share_permission AS ENUM ('view', 'edit');
//!
//! CREATE TABLE task_shares (
//!     id BIGSERIAL PRIMARY KEY,
//!     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
//!     shared_with_user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     shared_by_user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     permission share_permission NOT NULL DEFAULT 'view',
//!     shared_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     CONSTRAINT unique_task_share UNIQUE (task_id, shared_with_user_id)
//! );
//! ```
//!
//! The unique constraint is what turns two racing grants of the same pair
//! into one row and one [`crate::sharing::ShareError::DuplicateShare`].
//!
//! # Example
//!
//! ```no_run
//! use taskshare_core::models::share::{NewShare, ShareLevel, TaskShare};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! let created = TaskShare::create(&pool, NewShare {
//!     task_id: 1,
//!     shared_with_user_id: 2,
//!     shared_by_user_id: 1,
//!     permission: ShareLevel::View,
//! }).await?;
//!
//! if created.is_none() {
//!     println!("Task 1 is already shared with user 2");
//! }
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor, PgPool};
use std::fmt;

/// Access level a share row can carry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "share_permission", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShareLevel {
    /// Read the task, its comments, files and timeline; add comments
    #[default]
    View,

    /// Everything VIEW allows plus updating the task and managing files
    Edit,
}

impl ShareLevel {
    /// Converts level to its stored name
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareLevel::View => "view",
            ShareLevel::Edit => "edit",
        }
    }
}

impl fmt::Display for ShareLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A grant of access on one task to one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskShare {
    /// Share ID
    pub id: i64,

    /// Shared task
    pub task_id: i64,

    /// User receiving access
    pub shared_with_user_id: i64,

    /// User who granted access (the task owner)
    pub shared_by_user_id: i64,

    /// Granted level
    pub permission: ShareLevel,

    /// When the share was created
    pub shared_at: DateTime<Utc>,
}

/// Input for creating a share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShare {
    /// Task being shared
    pub task_id: i64,

    /// User receiving access
    pub shared_with_user_id: i64,

    /// User granting access
    pub shared_by_user_id: i64,

    /// Level to grant (defaults to View)
    #[serde(default)]
    pub permission: ShareLevel,
}

impl TaskShare {
    /// Inserts a share unless the (task, grantee) pair already has one
    ///
    /// # Returns
    ///
    /// The new share, or `None` if a share for the pair already exists. The
    /// check and the insert are one statement, so concurrent callers cannot
    /// both succeed.
    ///
    /// # Errors
    ///
    /// Returns an error if the task or a user doesn't exist (foreign key
    /// violation) or the database connection fails.
    pub async fn create<'e, E>(executor: E, data: NewShare) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let share = sqlx::query_as::<_, TaskShare>(
            r#"
            INSERT INTO task_shares (task_id, shared_with_user_id, shared_by_user_id, permission)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (task_id, shared_with_user_id) DO NOTHING
            RETURNING id, task_id, shared_with_user_id, shared_by_user_id, permission, shared_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.shared_with_user_id)
        .bind(data.shared_by_user_id)
        .bind(data.permission)
        .fetch_optional(executor)
        .await?;

        Ok(share)
    }

    /// Finds the share for a (task, grantee) pair
    pub async fn find(
        pool: &PgPool,
        task_id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let share = sqlx::query_as::<_, TaskShare>(
            r#"
            SELECT id, task_id, shared_with_user_id, shared_by_user_id, permission, shared_at
            FROM task_shares
            WHERE task_id = $1 AND shared_with_user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(share)
    }

    /// Finds the share for a pair and locks its row until the transaction ends
    pub async fn find_for_update(
        conn: &mut PgConnection,
        task_id: i64,
        user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let share = sqlx::query_as::<_, TaskShare>(
            r#"
            SELECT id, task_id, shared_with_user_id, shared_by_user_id, permission, shared_at
            FROM task_shares
            WHERE task_id = $1 AND shared_with_user_id = $2
            FOR UPDATE
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(share)
    }

    /// Changes the level of an existing share
    ///
    /// Returns `None` if the pair has no share.
    pub async fn update_permission<'e, E>(
        executor: E,
        task_id: i64,
        user_id: i64,
        permission: ShareLevel,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let share = sqlx::query_as::<_, TaskShare>(
            r#"
            UPDATE task_shares
            SET permission = $3
            WHERE task_id = $1 AND shared_with_user_id = $2
            RETURNING id, task_id, shared_with_user_id, shared_by_user_id, permission, shared_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(permission)
        .fetch_optional(executor)
        .await?;

        Ok(share)
    }

    /// Deletes the share for a pair
    ///
    /// Returns true if a row was removed.
    pub async fn delete<'e, E>(executor: E, task_id: i64, user_id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "DELETE FROM task_shares WHERE task_id = $1 AND shared_with_user_id = $2",
        )
        .bind(task_id)
        .bind(user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every share of a task
    pub async fn delete_by_task(pool: &PgPool, task_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_shares WHERE task_id = $1")
            .bind(task_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists the shares of a task, oldest first
    pub async fn list_by_task(pool: &PgPool, task_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let shares = sqlx::query_as::<_, TaskShare>(
            r#"
            SELECT id, task_id, shared_with_user_id, shared_by_user_id, permission, shared_at
            FROM task_shares
            WHERE task_id = $1
            ORDER BY shared_at ASC, id ASC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(shares)
    }

    /// Lists the shares granted to a user ("shared with me")
    pub async fn list_by_grantee(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let shares = sqlx::query_as::<_, TaskShare>(
            r#"
            SELECT id, task_id, shared_with_user_id, shared_by_user_id, permission, shared_at
            FROM task_shares
            WHERE shared_with_user_id = $1
            ORDER BY shared_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(shares)
    }

    /// Lists the shares a user has granted ("shared by me")
    pub async fn list_by_granter(pool: &PgPool, user_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let shares = sqlx::query_as::<_, TaskShare>(
            r#"
            SELECT id, task_id, shared_with_user_id, shared_by_user_id, permission, shared_at
            FROM task_shares
            WHERE shared_by_user_id = $1
            ORDER BY shared_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(shares)
    }
}

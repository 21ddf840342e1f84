//! File attachment metadata
//!
//! Only the metadata row is modelled here; the bytes live in whatever
//! storage backend the deployment uses. Files inherit access from their
//! parent task: listing and downloading need VIEW, uploading and deleting
//! need EDIT.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE task_files (
//!     id BIGSERIAL PRIMARY KEY,
//!     task_id BIGINT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
//!     original_filename VARCHAR(255) NOT NULL,
//!     stored_filename VARCHAR(255) NOT NULL UNIQUE,
//!     file_size BIGINT NOT NULL,
//!     content_type VARCHAR(100),
//!     uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::TaskScoped;

/// File attached to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskFile {
    /// File ID
    pub id: i64,

    /// Parent task
    pub task_id: i64,

    /// Name the uploader gave the file
    pub original_filename: String,

    /// Unique name in the storage backend
    pub stored_filename: String,

    /// Size in bytes
    pub file_size: i64,

    /// MIME type, if known
    pub content_type: Option<String>,

    /// When the file was uploaded
    pub uploaded_at: DateTime<Utc>,
}

impl TaskScoped for TaskFile {
    fn task_id(&self) -> i64 {
        self.task_id
    }
}

/// Input for recording an uploaded file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskFile {
    /// Parent task
    pub task_id: i64,

    /// Name the uploader gave the file
    pub original_filename: String,

    /// Unique name in the storage backend
    pub stored_filename: String,

    /// Size in bytes
    pub file_size: i64,

    /// MIME type, if known
    pub content_type: Option<String>,
}

impl TaskFile {
    /// Records an uploaded file
    pub async fn create(pool: &PgPool, data: CreateTaskFile) -> Result<Self, sqlx::Error> {
        let file = sqlx::query_as::<_, TaskFile>(
            r#"
            INSERT INTO task_files (task_id, original_filename, stored_filename, file_size, content_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, task_id, original_filename, stored_filename, file_size, content_type, uploaded_at
            "#,
        )
        .bind(data.task_id)
        .bind(data.original_filename)
        .bind(data.stored_filename)
        .bind(data.file_size)
        .bind(data.content_type)
        .fetch_one(pool)
        .await?;

        Ok(file)
    }

    /// Finds a file by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let file = sqlx::query_as::<_, TaskFile>(
            r#"
            SELECT id, task_id, original_filename, stored_filename, file_size, content_type, uploaded_at
            FROM task_files
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(file)
    }

    /// Lists files of a task, newest first
    pub async fn list_by_task(pool: &PgPool, task_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let files = sqlx::query_as::<_, TaskFile>(
            r#"
            SELECT id, task_id, original_filename, stored_filename, file_size, content_type, uploaded_at
            FROM task_files
            WHERE task_id = $1
            ORDER BY uploaded_at DESC, id DESC
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await?;

        Ok(files)
    }

    /// Deletes a file record
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_files WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::Utc;
use std::sync::Arc;
use taskshare_core::activity::memory::InMemoryActivityStore;
use taskshare_core::models::{comment::TaskComment, task::Task, user::User};
use taskshare_core::services::AccessServices;
use taskshare_core::sharing::memory::InMemoryShareStore;

/// In-memory services plus direct handles on their stores
pub struct World {
    pub services: AccessServices,
    pub shares: Arc<InMemoryShareStore>,
    pub activity: Arc<InMemoryActivityStore>,
}

impl World {
    pub fn new() -> Self {
        let shares = Arc::new(InMemoryShareStore::new());
        let activity = Arc::new(InMemoryActivityStore::new());

        Self {
            services: AccessServices::in_memory_with(shares.clone(), activity.clone()),
            shares,
            activity,
        }
    }
}

pub fn user(id: i64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        created_at: Utc::now(),
    }
}

pub fn task(id: i64, owner: &User) -> Task {
    Task {
        id,
        owner_id: owner.id,
        title: format!("Task {}", id),
        description: None,
        completed: false,
        created_at: Utc::now(),
    }
}

pub fn comment(id: i64, task: &Task, author: &User) -> TaskComment {
    TaskComment {
        id,
        task_id: task.id,
        user_id: author.id,
        content: format!("Comment by {}", author.username),
        created_at: Utc::now(),
        updated_at: None,
    }
}

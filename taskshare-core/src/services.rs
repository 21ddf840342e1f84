//! Service bundle
//!
//! Builds the resolver, registry, sharing service and activity feed over
//! one pair of stores so they all see the same share state. A handler layer
//! keeps an [`AccessServices`] in its application state and clones it into
//! requests; every field is cheap to clone.
//!
//! # Example
//!
//! ```no_run
//! use taskshare_core::config::Config;
//! use taskshare_core::services::AccessServices;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let services = AccessServices::connect(&config).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::access::AccessResolver;
use crate::activity::{
    memory::InMemoryActivityStore, postgres::PgActivityStore, ActivityFeed, ActivityStore,
};
use crate::config::Config;
use crate::db::{migrations::run_migrations, pool::create_pool};
use crate::sharing::{
    memory::{InMemoryShareJournal, InMemoryShareStore},
    postgres::PgShareStore,
    ShareJournal, ShareRegistry, ShareStore, TaskSharing,
};

/// Access-control services wired over shared stores
#[derive(Clone)]
pub struct AccessServices {
    pub resolver: AccessResolver,
    pub registry: ShareRegistry,
    pub sharing: TaskSharing,
    pub activity: ActivityFeed,
}

impl AccessServices {
    /// Wires services over the given stores
    ///
    /// `journal` must write to the same shares as `shares` and the same log
    /// as `activity`.
    pub fn new(
        shares: Arc<dyn ShareStore>,
        journal: Arc<dyn ShareJournal>,
        activity: Arc<dyn ActivityStore>,
    ) -> Self {
        let resolver = AccessResolver::new(shares.clone());
        let registry = ShareRegistry::new(shares);

        Self {
            sharing: TaskSharing::new(resolver.clone(), registry.clone(), journal),
            activity: ActivityFeed::new(resolver.clone(), activity),
            resolver,
            registry,
        }
    }

    /// Services backed by Postgres tables
    pub fn postgres(pool: PgPool) -> Self {
        let shares = Arc::new(PgShareStore::new(pool.clone()));
        Self::new(shares.clone(), shares, Arc::new(PgActivityStore::new(pool)))
    }

    /// Services backed by process memory
    pub fn in_memory() -> Self {
        Self::in_memory_with(
            Arc::new(InMemoryShareStore::new()),
            Arc::new(InMemoryActivityStore::new()),
        )
    }

    /// Services over a memory share store and any activity store
    pub fn in_memory_with(shares: Arc<InMemoryShareStore>, activity: Arc<dyn ActivityStore>) -> Self {
        let journal = Arc::new(InMemoryShareJournal::new(shares.clone(), activity.clone()));
        Self::new(shares, journal, activity)
    }

    /// Opens the pool, applies migrations and wires Postgres services
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or a migration fails
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let pool = create_pool(&config.database).await?;
        run_migrations(&pool).await?;

        info!("Access services ready");
        Ok(Self::postgres(pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::TaskPermission;
    use crate::models::{share::ShareLevel, task::Task, user::User};
    use chrono::Utc;

    fn user(id: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_services_share_one_store() {
        let services = AccessServices::in_memory();
        let task = Task {
            id: 1,
            owner_id: 1,
            title: "Shared state".to_string(),
            description: None,
            completed: false,
            created_at: Utc::now(),
        };

        services
            .sharing
            .share(&task, &user(1), &user(2), ShareLevel::Edit)
            .await
            .unwrap();

        // A grant through the sharing service is visible to the resolver and feed
        assert_eq!(
            services
                .resolver
                .effective_permission(&task, &user(2))
                .await
                .unwrap(),
            TaskPermission::Edit
        );
        assert_eq!(
            services
                .activity
                .task_timeline(&task, &user(2))
                .await
                .unwrap()
                .len(),
            1
        );
    }
}

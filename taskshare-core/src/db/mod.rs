//! Database plumbing
//!
//! - `pool`: Postgres connection pool with health check and stats
//! - `migrations`: Embedded schema migrations
//!
//! Row types and their queries live in [`crate::models`].

pub mod migrations;
pub mod pool;

pub use pool::{create_pool, DatabaseConfig};

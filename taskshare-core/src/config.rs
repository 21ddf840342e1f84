//! Configuration management
//!
//! Settings are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. `TASKSHARE_*` environment variables, `__` separating nested keys
//!    (e.g. `TASKSHARE_DATABASE__MAX_CONNECTIONS=20`)
//! 3. `DATABASE_URL`, if set
//!
//! A `.env` file in the working directory is loaded first when present.
//!
//! # Example
//!
//! ```no_run
//! use taskshare_core::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Pool size: {}", config.database.max_connections);
//! # Ok(())
//! # }
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use crate::db::pool::DatabaseConfig;

const ENV_PREFIX: &str = "TASKSHARE";

/// Complete library configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset
    pub filter: String,

    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "taskshare_core=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for development
    #[default]
    Pretty,

    /// One JSON object per line, for log shippers
    Json,
}

impl Config {
    /// Loads `.env`, then builds the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed or the result fails
    /// [`Config::validate`]
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::build(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
            std::env::var("DATABASE_URL").ok(),
        )
    }

    /// Builds the configuration from an explicit variable map
    ///
    /// Same layering as [`Config::from_env`] without touching the process
    /// environment.
    pub fn from_vars(vars: HashMap<String, String>) -> anyhow::Result<Self> {
        let database_url = vars.get("DATABASE_URL").cloned();

        Self::build(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(vars)),
            database_url,
        )
    }

    fn build(env: config::Environment, database_url: Option<String>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder().add_source(env);

        if let Some(url) = database_url {
            builder = builder.set_override("database.url", url)?;
        }

        let config: Config = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration value")?;

        config.validate()?;
        Ok(config)
    }

    /// Checks values the type system cannot
    ///
    /// # Errors
    ///
    /// Returns an error if the database URL is empty or pool bounds are
    /// inconsistent
    pub fn validate(&self) -> anyhow::Result<()> {
        let db = &self.database;

        if db.url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL (or TASKSHARE_DATABASE__URL) is required");
        }
        if db.max_connections == 0 {
            anyhow::bail!("database.max_connections must be at least 1");
        }
        if db.min_connections > db.max_connections {
            anyhow::bail!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                db.min_connections,
                db.max_connections
            );
        }
        if db.acquire_timeout_seconds == 0 {
            anyhow::bail!("database.acquire_timeout_seconds must be at least 1");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_database_url_fallback() {
        let config = Config::from_vars(vars(&[("DATABASE_URL", "postgresql://localhost/ts")])).unwrap();

        assert_eq!(config.database.url, "postgresql://localhost/ts");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.log.format, LogFormat::Pretty);
    }

    #[test]
    fn test_prefixed_nested_values() {
        let config = Config::from_vars(vars(&[
            ("TASKSHARE_DATABASE__URL", "postgresql://db/ts"),
            ("TASKSHARE_DATABASE__MAX_CONNECTIONS", "20"),
            ("TASKSHARE_LOG__FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.database.url, "postgresql://db/ts");
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_database_url_wins() {
        let config = Config::from_vars(vars(&[
            ("TASKSHARE_DATABASE__URL", "postgresql://prefixed/ts"),
            ("DATABASE_URL", "postgresql://plain/ts"),
        ]))
        .unwrap();

        assert_eq!(config.database.url, "postgresql://plain/ts");
    }

    #[test]
    fn test_missing_url_rejected() {
        let err = Config::from_vars(HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn test_pool_bounds_rejected() {
        let err = Config::from_vars(vars(&[
            ("DATABASE_URL", "postgresql://localhost/ts"),
            ("TASKSHARE_DATABASE__MIN_CONNECTIONS", "5"),
            ("TASKSHARE_DATABASE__MAX_CONNECTIONS", "2"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("min_connections"));
    }
}

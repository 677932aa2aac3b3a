//! Application configuration
//!
//! Settings come from `COLLECTION_*` environment variables; every key has a
//! default, so an empty environment yields a working local setup.

use std::time::Duration;

use serde::Deserialize;

use core_kernel::CoreError;
use infra_db::DatabaseConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "COLLECTION";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Inventory report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite connection string
    pub database_url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// Seconds a writer waits for another writer's lock
    pub busy_timeout_secs: u64,
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Report output format
    pub report_format: ReportFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://collection.db".to_string(),
            max_connections: 5,
            busy_timeout_secs: 5,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            report_format: ReportFormat::Text,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Loads configuration from a single source layered over the defaults
    pub fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("database_url", defaults.database_url)?
            .set_default("max_connections", defaults.max_connections)?
            .set_default("busy_timeout_secs", defaults.busy_timeout_secs)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "text")?
            .set_default("report_format", "text")?
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    /// Returns the pool settings derived from this configuration
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
            .max_connections(self.max_connections)
            .min_connections(self.max_connections.min(1))
            .busy_timeout(Duration::from_secs(self.busy_timeout_secs))
    }

    /// Checks the configuration before it is used
    pub fn validate(&self) -> Result<(), CoreError> {
        self.database_config().validate()
    }
}

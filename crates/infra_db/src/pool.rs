//! SQLite connection pool
//!
//! Every pooled connection enforces foreign keys, journals in WAL mode so
//! readers never block the single writer, and waits up to the busy timeout
//! for a competing writer's lock before failing with `SQLITE_BUSY`.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::info;

use core_kernel::CoreError;

use crate::error::DatabaseError;

/// Pool of connections to one collection database file
pub type DatabasePool = SqlitePool;

/// Pool and connection settings
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use infra_db::DatabaseConfig;
///
/// let config = DatabaseConfig::new("sqlite://collection.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(10));
/// assert_eq!(config.max_connections, 8);
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `sqlite://` URL of the database file
    pub url: String,
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long a caller waits for a free pooled connection
    pub acquire_timeout: Duration,
    /// How long a statement waits for a competing writer's lock
    pub busy_timeout: Duration,
    /// Idle connections above the minimum are closed after this long
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    /// Creates settings for the database at `url` with default limits
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Sets the lock wait applied to every connection
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Checks the settings before a pool is built from them
    ///
    /// # Errors
    ///
    /// `CoreError::Configuration` for an empty URL, a zero connection limit,
    /// or a minimum above the maximum
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.url.trim().is_empty() {
            return Err(CoreError::configuration("database url must not be empty"));
        }
        if self.max_connections == 0 {
            return Err(CoreError::configuration("max_connections must be at least 1"));
        }
        if self.min_connections > self.max_connections {
            return Err(CoreError::configuration(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.min_connections, self.max_connections
            )));
        }
        Ok(())
    }

    /// Per-connection options derived from these settings
    fn connect_options(&self) -> Result<SqliteConnectOptions, DatabaseError> {
        let options = SqliteConnectOptions::from_str(&self.url)
            .map_err(|e| DatabaseError::ConnectionFailed(format!("{}: {e}", self.url)))?;

        Ok(options
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(self.busy_timeout))
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new("sqlite://collection.db")
    }
}

/// Opens a pool on the configured database, creating the file if needed
///
/// The schema is not touched; see [`crate::apply_schema`].
///
/// # Errors
///
/// `DatabaseError::ConnectionFailed` if the settings are invalid or the
/// database cannot be opened
pub async fn create_pool(config: DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    config
        .validate()
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
    let options = config.connect_options()?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!(
        url = %config.url,
        max_connections = config.max_connections,
        busy_timeout_ms = config.busy_timeout.as_millis() as u64,
        "Database pool ready"
    );
    Ok(pool)
}

/// Opens a pool on `url` with default settings
pub async fn create_pool_from_url(url: &str) -> Result<DatabasePool, DatabaseError> {
    create_pool(DatabaseConfig::new(url)).await
}

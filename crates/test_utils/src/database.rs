//! Database Test Utilities
//!
//! Provides temp-file SQLite databases for integration tests. Each
//! `TestDatabase` owns its directory, so tests never share state and the file
//! disappears when the value is dropped. An in-memory database would give
//! every pooled connection its own private store, which defeats concurrency
//! tests.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use domain_collection::{AlbumService, CoinService};
use infra_db::{apply_schema, create_pool, DatabaseConfig, DatabasePool, SqliteTransactionExecutor};

/// Error type for test setup helpers
pub type TestSetupError = Box<dyn std::error::Error + Send + Sync>;

/// Name of the trigger installed by [`TestDatabase::fail_coin_delete`]
const FAULT_TRIGGER: &str = "test_fail_coin_delete";

/// A schema-initialised SQLite database in a temporary directory
pub struct TestDatabase {
    _dir: TempDir,
    pub url: String,
    pub pool: DatabasePool,
    executor: Arc<SqliteTransactionExecutor>,
}

impl TestDatabase {
    /// Creates a database with the default pool settings
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, pool or schema cannot be created
    pub async fn new() -> Result<Self, TestSetupError> {
        Self::with_config(DatabaseConfig::default()).await
    }

    /// Creates a database with the given pool settings; the URL is replaced
    pub async fn with_config(config: DatabaseConfig) -> Result<Self, TestSetupError> {
        let dir = tempfile::tempdir()?;
        let url = format!("sqlite://{}", dir.path().join("collection.db").display());

        let pool = create_pool(DatabaseConfig {
            url: url.clone(),
            ..config
        })
        .await?;
        apply_schema(&pool).await?;

        let executor = Arc::new(SqliteTransactionExecutor::new(pool.clone()));
        Ok(Self {
            _dir: dir,
            url,
            pool,
            executor,
        })
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Returns the shared transaction executor
    pub fn executor(&self) -> Arc<SqliteTransactionExecutor> {
        Arc::clone(&self.executor)
    }

    /// Album service over this database
    pub fn album_service(&self) -> AlbumService<SqliteTransactionExecutor> {
        AlbumService::new(self.executor())
    }

    /// Coin service over this database
    pub fn coin_service(&self) -> CoinService<SqliteTransactionExecutor> {
        CoinService::new(self.executor())
    }

    /// Counts the rows of a table
    pub async fn count_rows(&self, table: &str) -> Result<i64, TestSetupError> {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// Makes every delete of a coin with this description fail inside the store
    pub async fn fail_coin_delete(&self, description: &str) -> Result<(), TestSetupError> {
        self.clear_faults().await?;
        let statement = format!(
            "CREATE TRIGGER {FAULT_TRIGGER} BEFORE DELETE ON coins \
             WHEN OLD.description = '{}' \
             BEGIN SELECT RAISE(ABORT, 'injected coin delete failure'); END",
            description.replace('\'', "''")
        );
        sqlx::raw_sql(&statement).execute(&self.pool).await?;
        Ok(())
    }

    /// Removes any fault installed by [`Self::fail_coin_delete`]
    pub async fn clear_faults(&self) -> Result<(), TestSetupError> {
        sqlx::raw_sql(&format!("DROP TRIGGER IF EXISTS {FAULT_TRIGGER}"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Creates an isolated test database for a single test
pub async fn create_isolated_test_database() -> Result<TestDatabase, TestSetupError> {
    TestDatabase::new().await
}

/// Creates a test database whose writers give up quickly on a held lock
pub async fn create_impatient_test_database(
    busy_timeout: Duration,
) -> Result<TestDatabase, TestSetupError> {
    TestDatabase::with_config(DatabaseConfig::default().busy_timeout(busy_timeout)).await
}

/// Helper macro for running database tests
///
/// The body sees `db`, an isolated [`TestDatabase`].
#[macro_export]
macro_rules! db_test {
    ($name:ident, |$db:ident| $body:block) => {
        #[tokio::test]
        async fn $name() {
            let $db = $crate::database::create_isolated_test_database()
                .await
                .expect("Failed to create test database");
            $body
        }
    };
}

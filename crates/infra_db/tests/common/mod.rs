//! Scratch SQLite databases for integration tests

#![allow(dead_code)]

use std::time::Duration;

use tempfile::TempDir;

use infra_db::{apply_schema, create_pool, DatabaseConfig, DatabasePool};

/// A schema-initialised database file that lives as long as the value
pub struct Scratch {
    pub pool: DatabasePool,
    _dir: TempDir,
}

pub async fn scratch() -> Scratch {
    scratch_with(DatabaseConfig::default()).await
}

/// Opens a scratch database with the given settings; the URL is replaced
pub async fn scratch_with(config: DatabaseConfig) -> Scratch {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("collection.db").display());
    let config = DatabaseConfig { url, ..config };

    let pool = create_pool(config).await.expect("pool");
    apply_schema(&pool).await.expect("schema");
    Scratch { pool, _dir: dir }
}

pub fn short_busy_timeout() -> DatabaseConfig {
    DatabaseConfig::default().busy_timeout(Duration::from_millis(100))
}

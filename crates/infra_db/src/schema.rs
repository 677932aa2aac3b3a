//! Schema bootstrap
//!
//! The collection schema is embedded in the binary and applied idempotently
//! at start-up. There is no migration history; the script only creates what
//! is missing.

use tracing::info;

use crate::error::DatabaseError;
use crate::pool::DatabasePool;

/// Collection schema, `CREATE ... IF NOT EXISTS` statements only
pub const SCHEMA: &str = include_str!("../schema/collection.sql");

/// Creates the `albums` and `coins` tables if they do not exist yet
///
/// # Errors
///
/// Returns `DatabaseError::SchemaFailed` if any statement fails
pub async fn apply_schema(pool: &DatabasePool) -> Result<(), DatabaseError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::SchemaFailed(e.to_string()))?;

    info!("Collection schema applied");
    Ok(())
}

//! Coin Collection - Inventory Report Binary
//!
//! Prints every album with its occupancy and the coins it holds.
//!
//! # Usage
//!
//! ```bash
//! COLLECTION_DATABASE_URL=sqlite://collection.db cargo run --bin collection-report
//! COLLECTION_REPORT_FORMAT=json cargo run --bin collection-report
//! ```
//!
//! # Environment Variables
//!
//! * `COLLECTION_DATABASE_URL` - SQLite connection string (default: sqlite://collection.db)
//! * `COLLECTION_MAX_CONNECTIONS` - Pool size (default: 5)
//! * `COLLECTION_BUSY_TIMEOUT_SECS` - Writer lock wait in seconds (default: 5)
//! * `COLLECTION_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `COLLECTION_LOG_FORMAT` - text or json (default: text)
//! * `COLLECTION_REPORT_FORMAT` - text or json (default: text)

use std::sync::Arc;

use anyhow::Context;

use domain_collection::{AlbumService, CoinService};
use infra_db::{apply_schema, create_pool, SqliteTransactionExecutor};
use interface_app::{init_tracing, AppConfig, InventoryReport, ReportFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("loading configuration")?;
    config.validate().context("validating configuration")?;
    init_tracing(&config.log_level, config.log_format).context("installing tracing")?;

    tracing::info!(database_url = %config.database_url, "Generating inventory report");

    let pool = create_pool(config.database_config())
        .await
        .context("opening database")?;
    apply_schema(&pool).await.context("bootstrapping schema")?;

    let executor = Arc::new(SqliteTransactionExecutor::new(pool));
    let report = InventoryReport::collect(
        &AlbumService::new(Arc::clone(&executor)),
        &CoinService::new(executor),
    )
    .await
    .context("reading collection")?;

    match config.report_format {
        ReportFormat::Text => print!("{}", report.render_text()),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

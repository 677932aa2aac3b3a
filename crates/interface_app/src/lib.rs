//! Application Layer
//!
//! Wires the collection services to a presentation surface:
//!
//! - **Config**: `AppConfig` from `COLLECTION_*` environment variables
//! - **Telemetry**: tracing subscriber bootstrap (text or JSON)
//! - **Coordinator**: cached album and coin views refreshed after mutations
//! - **Report**: the inventory listing printed by `collection-report`
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_app::{AppConfig, Coordinator};
//!
//! let config = AppConfig::from_env()?;
//! let pool = infra_db::create_pool(config.database_config()).await?;
//! let coordinator = Coordinator::new(Arc::new(SqliteTransactionExecutor::new(pool)));
//! coordinator.refresh().await?;
//! ```

pub mod config;
pub mod coordinator;
pub mod report;
pub mod telemetry;

pub use config::{AppConfig, LogFormat, ReportFormat};
pub use coordinator::Coordinator;
pub use report::{AlbumEntry, InventoryReport};
pub use telemetry::init_tracing;

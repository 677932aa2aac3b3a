//! Infrastructure Database Layer
//!
//! This crate provides the database infrastructure for the coin collection
//! tracker, implementing the collection ports on SQLite using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern, providing data access abstractions
//! that hide the database implementation details from the domain layer:
//!
//! - [`pool`]: connection pool configuration (foreign keys, WAL, busy timeout)
//! - [`schema`]: idempotent bootstrap of the `albums` and `coins` tables
//! - [`executor`]: [`SqliteTransactionExecutor`], one `BEGIN IMMEDIATE`
//!   transaction per unit of work
//! - [`repositories`]: sqlx implementations of the repository ports, bound to
//!   the connection of the open transaction
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_db::{apply_schema, create_pool, DatabaseConfig, SqliteTransactionExecutor};
//!
//! let pool = create_pool(DatabaseConfig::new("sqlite://collection.db")).await?;
//! apply_schema(&pool).await?;
//! let executor = Arc::new(SqliteTransactionExecutor::new(pool));
//! let albums = AlbumService::new(executor);
//! ```

pub mod error;
pub mod executor;
pub mod pool;
pub mod repositories;
pub mod schema;

pub use error::DatabaseError;
pub use executor::{SqliteSession, SqliteTransactionExecutor};
pub use pool::{create_pool, create_pool_from_url, DatabaseConfig, DatabasePool};
pub use schema::apply_schema;

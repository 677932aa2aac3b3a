//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! coin collection test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built albums and coins for common scenarios
//! - `builders`: Builder patterns for test data construction
//! - `database`: Temp-file SQLite databases with services wired up
//! - `assertions`: Custom assertion helpers for collection errors and occupancy
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;

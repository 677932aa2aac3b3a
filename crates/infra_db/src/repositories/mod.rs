//! Repository implementations for domain entities
//!
//! This module provides the sqlx implementations of the collection
//! repository ports. Repositories borrow the connection of the surrounding
//! transaction, encapsulate SQL queries and map between database rows and
//! domain types.
//!
//! # Architecture
//!
//! Each repository follows these principles:
//! - Runtime-checked queries with `?` placeholders and `FromRow` row structs
//! - No business state; entity value rules are checked on `save`
//! - Rows that cannot be mapped back are reported as invalid data

pub mod album;
pub mod coin;

pub use album::SqlxAlbumRepository;
pub use coin::SqlxCoinRepository;

use uuid::Uuid;

use crate::error::DatabaseError;

/// Parses a uuid stored as text
fn parse_uuid(column: &str, raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw)
        .map_err(|e| DatabaseError::InvalidData(format!("{column} '{raw}': {e}")))
}

/// Narrows a stored integer to the domain's unsigned width
fn narrow<T: TryFrom<i64>>(column: &str, value: i64) -> Result<T, DatabaseError> {
    T::try_from(value)
        .map_err(|_| DatabaseError::InvalidData(format!("{column} {value} is out of range")))
}

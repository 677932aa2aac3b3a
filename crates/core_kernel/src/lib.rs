//! Core Kernel - Foundational types for the coin collection tracker
//!
//! This crate provides the building blocks shared by every other crate:
//! - Strongly-typed identifiers for albums and coins
//! - The common error type used for value validation and configuration

pub mod identifiers;
pub mod error;

pub use identifiers::{AlbumId, CoinId};
pub use error::CoreError;

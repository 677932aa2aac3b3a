//! Collection Domain
//!
//! This crate implements the business layer of the coin collection tracker,
//! following the same hexagonal split as the rest of the workspace: it knows
//! nothing about SQL, only about the ports a relational store must provide.
//!
//! # Architecture
//!
//! - **Entities**: [`Album`] (a container with a fixed slot capacity) and
//!   [`Coin`] (an item occupying one slot of one album)
//! - **Ports**: per-entity repository contracts, the handle bundles a unit of
//!   work receives, and the [`TransactionExecutor`] that runs units of work
//! - **Domain Services**: [`AlbumService`] and [`CoinService`], which enforce
//!   capacity, uniqueness and referential invariants inside one transaction
//!
//! # Invariants
//!
//! ```text
//! 0 <= album.occupied_slots <= album.number_of_slots
//! (album.name, album.volume)                                   unique
//! (grade, country, minting_year, description, note) of a coin  unique
//! coin.album                                                   references a live album
//! ```
//!
//! Every check is made against a fresh read inside the transaction, never
//! against the snapshot a caller passed in.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_collection::{Album, AlbumService, CoinService};
//!
//! let albums = AlbumService::new(executor.clone());
//! let coins = CoinService::new(executor);
//!
//! let album = albums.add(&Album::new("Pre-euro", 1, "Safe", 2)?).await?;
//! let album_id = album.id.expect("persisted albums carry an id");
//! let lira = Coin::new(Grade::VeryFine, "Italy", 1970, "100 lire", "", album_id)?;
//! let lira = coins.add(&lira).await?;
//! ```

pub mod album;
pub mod coin;
pub mod error;
pub mod ports;
pub mod services;

pub use album::Album;
pub use coin::{Coin, CoinKey, Grade};
pub use error::{
    AlbumLookup, CoinLookup, CollectionError, FailureKind, RepositoryError, RepositoryResult,
    StoreErrorKind, TransactionFailure,
};
pub use ports::{
    Abort, AlbumRepository, AlbumStore, CoinRepository, CollectionStore, TransactionExecutor,
    UnitOfWork,
};
pub use services::{AlbumService, CoinService};

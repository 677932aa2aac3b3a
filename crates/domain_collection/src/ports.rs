//! Collection Domain Ports
//!
//! This module defines what the domain needs from a relational store: one
//! repository contract per entity, the handle bundles a unit of work is given,
//! and the transaction executor that runs units of work.
//!
//! # Architecture
//!
//! ```text
//!   AlbumService / CoinService
//!              │  run_albums / run_collection / run_read(unit of work)
//!              ▼
//!   TransactionExecutor ── begin ── unit of work ── commit | rollback
//!              │
//!              ▼
//!   AlbumStore / CollectionStore ──► AlbumRepository, CoinRepository
//! ```
//!
//! A unit of work is a closure receiving a handle bundle and returning a
//! boxed future. Both repositories of a [`CollectionStore`] operate on the
//! same transaction, so everything a unit of work writes commits or rolls back
//! together.
//!
//! # Usage
//!
//! ```rust,ignore
//! let album = executor
//!     .run_albums(move |store| Box::pin(async move {
//!         let found = store.albums().find_by_id(id).await?;
//!         found.ok_or(Abort::Domain(CollectionError::AlbumNotFound(AlbumLookup::Id(id))))
//!     }))
//!     .await?;
//! ```

use async_trait::async_trait;
use futures::future::BoxFuture;

use core_kernel::{AlbumId, CoinId};

use crate::album::Album;
use crate::coin::{Coin, CoinKey};
use crate::error::{RepositoryError, RepositoryResult, TransactionFailure};

/// Album persistence contract
///
/// Implementations map albums to and from store rows and hold no business
/// state. They validate nothing beyond argument presence and entity value
/// rules on `save`.
#[async_trait]
pub trait AlbumRepository: Send {
    /// Returns every album
    async fn find_all(&mut self) -> RepositoryResult<Vec<Album>>;

    /// Returns the album with the given id, if any
    async fn find_by_id(&mut self, id: AlbumId) -> RepositoryResult<Option<Album>>;

    /// Returns the album with the given natural key, if any
    ///
    /// # Errors
    ///
    /// `RepositoryError::InvalidArgument` if `name` is blank
    async fn find_by_name_and_volume(
        &mut self,
        name: &str,
        volume: u32,
    ) -> RepositoryResult<Option<Album>>;

    /// Inserts the album if it has no id, updates it otherwise
    ///
    /// Returns the persisted album, carrying its generated id after an insert.
    async fn save(&mut self, album: &Album) -> RepositoryResult<Album>;

    /// Deletes the album row
    ///
    /// # Errors
    ///
    /// `RepositoryError::InvalidArgument` if the album has no id
    async fn delete(&mut self, album: &Album) -> RepositoryResult<()>;
}

/// Coin persistence contract
#[async_trait]
pub trait CoinRepository: Send {
    /// Returns every coin
    async fn find_all(&mut self) -> RepositoryResult<Vec<Coin>>;

    /// Returns the coin with the given id, if any
    async fn find_by_id(&mut self, id: CoinId) -> RepositoryResult<Option<Coin>>;

    /// Returns coins whose description contains `substring`
    async fn find_by_description(&mut self, substring: &str) -> RepositoryResult<Vec<Coin>>;

    /// Returns the coins held by an album
    async fn find_by_album(&mut self, album: AlbumId) -> RepositoryResult<Vec<Coin>>;

    /// Returns the coin with the given natural key, if any
    ///
    /// # Errors
    ///
    /// `RepositoryError::InvalidArgument` if country or description is blank
    async fn find_by_key(&mut self, key: &CoinKey) -> RepositoryResult<Option<Coin>>;

    /// Inserts the coin if it has no id, updates it otherwise
    async fn save(&mut self, coin: &Coin) -> RepositoryResult<Coin>;

    /// Deletes the coin row
    ///
    /// # Errors
    ///
    /// `RepositoryError::InvalidArgument` if the coin has no id
    async fn delete(&mut self, coin: &Coin) -> RepositoryResult<()>;
}

/// Handles available to a unit of work that touches albums only
pub trait AlbumStore: Send {
    /// Album repository bound to the current transaction
    fn albums(&mut self) -> Box<dyn AlbumRepository + '_>;
}

/// Handles available to a unit of work that touches albums and coins
pub trait CollectionStore: AlbumStore {
    /// Coin repository bound to the current transaction
    fn coins(&mut self) -> Box<dyn CoinRepository + '_>;
}

/// Why a unit of work stopped before completing
#[derive(Debug)]
pub enum Abort<E> {
    /// A repository call failed; the executor classifies it
    Repository(RepositoryError),
    /// Business logic raised its own error; the executor returns it unchanged
    Domain(E),
}

impl<E> From<RepositoryError> for Abort<E> {
    fn from(error: RepositoryError) -> Self {
        Abort::Repository(error)
    }
}

/// Future returned by a unit of work
pub type UnitOfWork<'s, T, E> = BoxFuture<'s, Result<T, Abort<E>>>;

/// Runs units of work inside one relational transaction
///
/// Contract for every entry point:
///
/// - a transaction is begun before the unit of work runs
/// - on success the transaction is committed and the value returned
/// - on `Abort::Repository` the transaction is rolled back and a
///   [`TransactionFailure`] classifying the cause is returned
/// - on `Abort::Domain` the transaction is rolled back and the domain error is
///   returned unchanged
/// - no transaction is left open when the call returns, even if the unit of
///   work panics or the call is abandoned
/// - nothing is retried
///
/// [`run_read`](Self::run_read) is for units of work that only read; a store
/// may run them without taking its write lock.
#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    /// Runs a unit of work over the album repository
    async fn run_albums<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<TransactionFailure> + Send + 'static,
        F: for<'s> FnOnce(&'s mut dyn AlbumStore) -> UnitOfWork<'s, T, E> + Send + 'static;

    /// Runs a unit of work over the album and coin repositories
    async fn run_collection<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<TransactionFailure> + Send + 'static,
        F: for<'s> FnOnce(&'s mut dyn CollectionStore) -> UnitOfWork<'s, T, E> + Send + 'static;

    /// Runs a unit of work that reads albums and coins but writes nothing
    ///
    /// The unit of work sees one consistent snapshot and never waits behind a
    /// writer's lock.
    async fn run_read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<TransactionFailure> + Send + 'static,
        F: for<'s> FnOnce(&'s mut dyn CollectionStore) -> UnitOfWork<'s, T, E> + Send + 'static;
}

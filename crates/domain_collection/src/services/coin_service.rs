//! Coin service
//!
//! Every coin mutation also adjusts album occupancy. The coin row and the
//! occupancy counters of the albums involved are written in one unit of work,
//! so they change together or not at all.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use core_kernel::{AlbumId, CoinId};

use crate::album::Album;
use crate::coin::Coin;
use crate::error::{AlbumLookup, CoinLookup, CollectionError};
use crate::ports::{Abort, CollectionStore, TransactionExecutor};
use crate::services::Work;

/// Service for coin lifecycle operations
pub struct CoinService<X> {
    executor: Arc<X>,
}

impl<X> Clone for CoinService<X> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<X: TransactionExecutor> CoinService<X> {
    /// Creates a new coin service on top of the given executor
    pub fn new(executor: Arc<X>) -> Self {
        Self { executor }
    }

    /// Returns every coin
    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<Coin>, CollectionError> {
        self.executor
            .run_read(|store| Box::pin(find_all(store)))
            .await
    }

    /// Returns the coin with the given id
    ///
    /// # Errors
    ///
    /// `CollectionError::CoinNotFound` if no such coin exists
    #[instrument(skip(self), fields(coin_id = %id))]
    pub async fn find_by_id(&self, id: CoinId) -> Result<Coin, CollectionError> {
        self.executor
            .run_read(move |store| Box::pin(find_by_id(store, id)))
            .await
    }

    /// Returns the coins held by an album
    ///
    /// An unknown album simply holds no coins.
    #[instrument(skip(self), fields(album_id = %album))]
    pub async fn find_by_album(&self, album: AlbumId) -> Result<Vec<Coin>, CollectionError> {
        self.executor
            .run_read(move |store| Box::pin(find_by_album(store, album)))
            .await
    }

    /// Returns coins whose description contains `substring`
    #[instrument(skip(self))]
    pub async fn find_by_description(&self, substring: &str) -> Result<Vec<Coin>, CollectionError> {
        let substring = substring.to_owned();
        self.executor
            .run_read(move |store| Box::pin(find_by_description(store, substring)))
            .await
    }

    /// Places a new coin in its album
    ///
    /// # Errors
    ///
    /// - `CollectionError::DuplicateCoin` if a coin with the same natural key exists
    /// - `CollectionError::AlbumNotFound` if the target album does not exist
    /// - `CollectionError::FullAlbum` if the target album has no free slot
    ///
    /// Nothing is written when any of these is raised.
    #[instrument(skip(self, coin), fields(coin = %coin, album_id = %coin.album))]
    pub async fn add(&self, coin: &Coin) -> Result<Coin, CollectionError> {
        let candidate = Coin {
            id: None,
            ..coin.clone()
        };
        let key = coin.key();

        let result = self
            .executor
            .run_collection(move |store| Box::pin(add(store, candidate)))
            .await;

        match result {
            Ok(stored) => {
                info!(coin_id = ?stored.id, "Coin added");
                Ok(stored)
            }
            Err(error) if error.is_unique_violation() => {
                debug!("Unique constraint rejected coin insert");
                Err(CollectionError::DuplicateCoin(key))
            }
            Err(error) => Err(error),
        }
    }

    /// Rewrites the descriptive attributes of a coin
    ///
    /// The album reference of the stored coin is kept; use [`Self::move_to`]
    /// to change albums.
    ///
    /// # Errors
    ///
    /// - `CollectionError::CoinNotFound` if the coin has no id or no longer exists
    /// - `CollectionError::DuplicateCoin` if another coin already has the new key
    #[instrument(skip(self, coin), fields(coin = %coin))]
    pub async fn update(&self, coin: &Coin) -> Result<Coin, CollectionError> {
        let id = coin.id.ok_or(CollectionError::CoinNotFound(CoinLookup::Unsaved))?;
        let changes = coin.clone();
        let key = coin.key();

        let result = self
            .executor
            .run_collection(move |store| Box::pin(update(store, id, changes)))
            .await;

        match result {
            Err(error) if error.is_unique_violation() => Err(CollectionError::DuplicateCoin(key)),
            other => other,
        }
    }

    /// Removes a coin and frees its slot
    ///
    /// # Errors
    ///
    /// `CollectionError::CoinNotFound` if the coin has no id or no longer
    /// exists when the transaction reads it
    #[instrument(skip(self, coin), fields(coin = %coin))]
    pub async fn delete(&self, coin: &Coin) -> Result<(), CollectionError> {
        let id = coin.id.ok_or(CollectionError::CoinNotFound(CoinLookup::Unsaved))?;

        self.executor
            .run_collection(move |store| Box::pin(delete(store, id)))
            .await?;

        info!(coin_id = %id, "Coin deleted");
        Ok(())
    }

    /// Moves a coin into another album
    ///
    /// Moving a coin into the album that already holds it succeeds without
    /// writing anything.
    ///
    /// # Errors
    ///
    /// - `CollectionError::CoinNotFound` if the coin has no id or no longer exists
    /// - `CollectionError::AlbumNotFound` if the source or target album is missing
    /// - `CollectionError::FullAlbum` if the target album has no free slot
    #[instrument(skip(self, coin), fields(coin = %coin, target = %new_album))]
    pub async fn move_to(&self, coin: &Coin, new_album: AlbumId) -> Result<Coin, CollectionError> {
        let id = coin.id.ok_or(CollectionError::CoinNotFound(CoinLookup::Unsaved))?;

        let moved = self
            .executor
            .run_collection(move |store| Box::pin(relocate(store, id, new_album)))
            .await?;

        info!(coin_id = %id, album_id = %moved.album, "Coin moved");
        Ok(moved)
    }
}

async fn find_all(store: &mut dyn CollectionStore) -> Work<Vec<Coin>> {
    Ok(store.coins().find_all().await?)
}

async fn find_by_id(store: &mut dyn CollectionStore, id: CoinId) -> Work<Coin> {
    fetch_coin(store, id).await
}

async fn find_by_album(store: &mut dyn CollectionStore, album: AlbumId) -> Work<Vec<Coin>> {
    Ok(store.coins().find_by_album(album).await?)
}

async fn find_by_description(store: &mut dyn CollectionStore, substring: String) -> Work<Vec<Coin>> {
    Ok(store.coins().find_by_description(&substring).await?)
}

async fn add(store: &mut dyn CollectionStore, coin: Coin) -> Work<Coin> {
    let key = coin.key();
    let existing = store.coins().find_by_key(&key).await?;
    if existing.is_some() {
        return Err(CollectionError::DuplicateCoin(key).into());
    }

    let mut album = fetch_album(store, coin.album).await?;
    if !album.occupy_slot() {
        return Err(full(&album));
    }

    let stored = store.coins().save(&coin).await?;
    store.albums().save(&album).await?;
    Ok(stored)
}

async fn update(store: &mut dyn CollectionStore, id: CoinId, changes: Coin) -> Work<Coin> {
    let mut coin = fetch_coin(store, id).await?;

    let key = changes.key();
    let holder = store.coins().find_by_key(&key).await?;
    if holder.is_some_and(|other| other.id != Some(id)) {
        return Err(CollectionError::DuplicateCoin(key).into());
    }

    coin.describe_as(&changes);
    Ok(store.coins().save(&coin).await?)
}

async fn delete(store: &mut dyn CollectionStore, id: CoinId) -> Work<()> {
    let coin = fetch_coin(store, id).await?;
    let mut album = fetch_album(store, coin.album).await?;

    store.coins().delete(&coin).await?;
    album.release_slot();
    store.albums().save(&album).await?;
    Ok(())
}

async fn relocate(store: &mut dyn CollectionStore, id: CoinId, target_id: AlbumId) -> Work<Coin> {
    let mut coin = fetch_coin(store, id).await?;
    let mut source = fetch_album(store, coin.album).await?;

    if coin.album == target_id {
        debug!("Coin already in target album");
        return Ok(coin);
    }

    let mut target = fetch_album(store, target_id).await?;
    if !target.occupy_slot() {
        return Err(full(&target));
    }
    source.release_slot();

    coin.album = target_id;
    let moved = store.coins().save(&coin).await?;
    store.albums().save(&source).await?;
    store.albums().save(&target).await?;
    Ok(moved)
}

async fn fetch_coin(store: &mut dyn CollectionStore, id: CoinId) -> Work<Coin> {
    let found = store.coins().find_by_id(id).await?;
    found.ok_or_else(|| CollectionError::CoinNotFound(CoinLookup::Id(id)).into())
}

async fn fetch_album(store: &mut dyn CollectionStore, id: AlbumId) -> Work<Album> {
    let found = store.albums().find_by_id(id).await?;
    found.ok_or_else(|| CollectionError::AlbumNotFound(AlbumLookup::Id(id)).into())
}

fn full(album: &Album) -> Abort<CollectionError> {
    CollectionError::FullAlbum {
        album: album.to_string(),
        slots: album.number_of_slots,
    }
    .into()
}

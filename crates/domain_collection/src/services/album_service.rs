//! Album service
//!
//! Adds, deletes and relocates albums. Deleting an album removes the coins
//! it holds in the same transaction, coins first, so a failure part way
//! through never leaves coins pointing at a deleted album.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use core_kernel::AlbumId;

use crate::album::Album;
use crate::error::{AlbumLookup, CollectionError};
use crate::ports::{AlbumStore, CollectionStore, TransactionExecutor};
use crate::services::Work;

/// Service for album lifecycle operations
///
/// Holds no state besides the executor; clones share it.
pub struct AlbumService<X> {
    executor: Arc<X>,
}

impl<X> Clone for AlbumService<X> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<X: TransactionExecutor> AlbumService<X> {
    /// Creates a new album service on top of the given executor
    pub fn new(executor: Arc<X>) -> Self {
        Self { executor }
    }

    /// Returns every album
    ///
    /// # Errors
    ///
    /// `CollectionError::Database` if the store fails
    #[instrument(skip(self))]
    pub async fn find_all(&self) -> Result<Vec<Album>, CollectionError> {
        self.executor
            .run_read(|store| Box::pin(find_all(store)))
            .await
    }

    /// Returns the albums that still have a free slot
    #[instrument(skip(self))]
    pub async fn find_with_free_slots(&self) -> Result<Vec<Album>, CollectionError> {
        let albums = self.find_all().await?;
        Ok(albums.into_iter().filter(|album| !album.is_full()).collect())
    }

    /// Returns the album with the given id
    ///
    /// # Errors
    ///
    /// `CollectionError::AlbumNotFound` if no such album exists
    #[instrument(skip(self), fields(album_id = %id))]
    pub async fn find_by_id(&self, id: AlbumId) -> Result<Album, CollectionError> {
        self.executor
            .run_read(move |store| Box::pin(find_by_id(store, id)))
            .await
    }

    /// Returns the album with the given name and volume
    ///
    /// # Errors
    ///
    /// `CollectionError::AlbumNotFound` if no such album exists
    #[instrument(skip(self))]
    pub async fn find_by_name_and_volume(
        &self,
        name: &str,
        volume: u32,
    ) -> Result<Album, CollectionError> {
        let name = name.to_owned();
        self.executor
            .run_read(move |store| Box::pin(find_by_name_and_volume(store, name, volume)))
            .await
    }

    /// Persists a new album
    ///
    /// The caller's album is not modified; the stored album, carrying its
    /// generated id and an empty occupancy, is returned.
    ///
    /// # Errors
    ///
    /// - `CollectionError::DuplicateAlbum` if an album with the same name and
    ///   volume exists, whether found by the pre-check or by the store's
    ///   unique constraint at write time
    /// - `CollectionError::InvalidArgument` if the album violates a value rule
    #[instrument(skip(self, album), fields(album = %album))]
    pub async fn add(&self, album: &Album) -> Result<Album, CollectionError> {
        let candidate = Album {
            id: None,
            occupied_slots: 0,
            ..album.clone()
        };
        let (name, volume) = (album.name.clone(), album.volume);

        let result = self
            .executor
            .run_albums(move |store| Box::pin(add(store, candidate)))
            .await;

        match result {
            Ok(stored) => {
                info!(album_id = ?stored.id, "Album added");
                Ok(stored)
            }
            Err(error) if error.is_unique_violation() => {
                debug!("Unique constraint rejected album insert");
                Err(CollectionError::DuplicateAlbum { name, volume })
            }
            Err(error) => Err(error),
        }
    }

    /// Deletes an album together with every coin it holds
    ///
    /// # Errors
    ///
    /// `CollectionError::AlbumNotFound` if the album has no id or no longer
    /// exists when the transaction reads it
    #[instrument(skip(self, album), fields(album = %album))]
    pub async fn delete(&self, album: &Album) -> Result<(), CollectionError> {
        let id = album.id.ok_or(CollectionError::AlbumNotFound(AlbumLookup::Unsaved))?;

        let removed_coins = self
            .executor
            .run_collection(move |store| Box::pin(delete(store, id)))
            .await?;

        info!(album_id = %id, removed_coins, "Album deleted");
        Ok(())
    }

    /// Moves an album to a new physical location
    ///
    /// # Errors
    ///
    /// `CollectionError::AlbumNotFound` if the album has no id or no longer
    /// exists when the transaction reads it
    #[instrument(skip(self, album), fields(album = %album))]
    pub async fn move_to(
        &self,
        album: &Album,
        new_location: &str,
    ) -> Result<Album, CollectionError> {
        let id = album.id.ok_or(CollectionError::AlbumNotFound(AlbumLookup::Unsaved))?;
        let new_location = new_location.to_owned();

        let moved = self
            .executor
            .run_albums(move |store| Box::pin(relocate(store, id, new_location)))
            .await?;

        info!(album_id = %id, location = %moved.location, "Album moved");
        Ok(moved)
    }
}

async fn find_all(store: &mut dyn CollectionStore) -> Work<Vec<Album>> {
    Ok(store.albums().find_all().await?)
}

async fn find_by_id(store: &mut dyn CollectionStore, id: AlbumId) -> Work<Album> {
    let found = store.albums().find_by_id(id).await?;
    found.ok_or_else(|| CollectionError::AlbumNotFound(AlbumLookup::Id(id)).into())
}

async fn find_by_name_and_volume(
    store: &mut dyn CollectionStore,
    name: String,
    volume: u32,
) -> Work<Album> {
    let found = store.albums().find_by_name_and_volume(&name, volume).await?;
    match found {
        Some(album) => Ok(album),
        None => Err(CollectionError::AlbumNotFound(AlbumLookup::NameAndVolume { name, volume }).into()),
    }
}

async fn add(store: &mut dyn AlbumStore, album: Album) -> Work<Album> {
    let existing = store
        .albums()
        .find_by_name_and_volume(&album.name, album.volume)
        .await?;
    if existing.is_some() {
        return Err(CollectionError::DuplicateAlbum {
            name: album.name,
            volume: album.volume,
        }
        .into());
    }

    Ok(store.albums().save(&album).await?)
}

async fn delete(store: &mut dyn CollectionStore, id: AlbumId) -> Work<usize> {
    let album = store
        .albums()
        .find_by_id(id)
        .await?
        .ok_or(CollectionError::AlbumNotFound(AlbumLookup::Id(id)))?;

    // Coins go first: the album row must outlive every coin row pointing at it.
    let coins = store.coins().find_by_album(id).await?;
    for coin in &coins {
        store.coins().delete(coin).await?;
    }
    store.albums().delete(&album).await?;

    Ok(coins.len())
}

async fn relocate(store: &mut dyn AlbumStore, id: AlbumId, location: String) -> Work<Album> {
    let mut album = store
        .albums()
        .find_by_id(id)
        .await?
        .ok_or(CollectionError::AlbumNotFound(AlbumLookup::Id(id)))?;

    album.location = location;
    Ok(store.albums().save(&album).await?)
}

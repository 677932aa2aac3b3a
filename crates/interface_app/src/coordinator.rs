//! UI coordinator
//!
//! Keeps cached album and coin lists for a presentation layer and refreshes
//! them after every mutation. The caches are a convenience for display;
//! correctness rests entirely on the transactional services.
//!
//! Each mutation holds the lock of every view it affects for the duration of
//! the service call, taking the coin view before the album view, so
//! concurrent mutations issued through one coordinator reach the services one
//! view at a time and never deadlock.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use core_kernel::AlbumId;
use domain_collection::{Album, AlbumService, Coin, CoinService, CollectionError, TransactionExecutor};

/// Coordinates service calls with cached album and coin views
pub struct Coordinator<X> {
    albums: AlbumService<X>,
    coins: CoinService<X>,
    album_view: Mutex<Vec<Album>>,
    coin_view: Mutex<Vec<Coin>>,
}

impl<X: TransactionExecutor> Coordinator<X> {
    /// Creates a coordinator with empty views; call [`Self::refresh`] to load them
    pub fn new(executor: Arc<X>) -> Self {
        Self {
            albums: AlbumService::new(Arc::clone(&executor)),
            coins: CoinService::new(executor),
            album_view: Mutex::new(Vec::new()),
            coin_view: Mutex::new(Vec::new()),
        }
    }

    /// Reloads both views from the store
    pub async fn refresh(&self) -> Result<(), CollectionError> {
        let mut coins = self.coin_view.lock().await;
        let mut albums = self.album_view.lock().await;
        *coins = self.coins.find_all().await?;
        *albums = self.albums.find_all().await?;
        Ok(())
    }

    /// Cached albums as of the last refresh
    pub async fn albums(&self) -> Vec<Album> {
        self.album_view.lock().await.clone()
    }

    /// Cached coins as of the last refresh
    pub async fn coins(&self) -> Vec<Coin> {
        self.coin_view.lock().await.clone()
    }

    pub async fn add_album(&self, album: &Album) -> Result<Album, CollectionError> {
        let mut albums = self.album_view.lock().await;
        let result = self.albums.add(album).await;
        self.settle_albums(&result, &mut albums).await;
        result
    }

    pub async fn move_album(&self, album: &Album, location: &str) -> Result<Album, CollectionError> {
        let mut albums = self.album_view.lock().await;
        let result = self.albums.move_to(album, location).await;
        self.settle_albums(&result, &mut albums).await;
        result
    }

    pub async fn delete_album(&self, album: &Album) -> Result<(), CollectionError> {
        let mut coins = self.coin_view.lock().await;
        let mut albums = self.album_view.lock().await;
        let result = self.albums.delete(album).await;
        self.settle_both(&result, &mut coins, &mut albums).await;
        result
    }

    pub async fn add_coin(&self, coin: &Coin) -> Result<Coin, CollectionError> {
        let mut coins = self.coin_view.lock().await;
        let mut albums = self.album_view.lock().await;
        let result = self.coins.add(coin).await;
        self.settle_both(&result, &mut coins, &mut albums).await;
        result
    }

    pub async fn update_coin(&self, coin: &Coin) -> Result<Coin, CollectionError> {
        let mut coins = self.coin_view.lock().await;
        let result = self.coins.update(coin).await;
        if needs_refresh(&result) {
            self.reload_coins(&mut coins).await;
        }
        result
    }

    pub async fn move_coin(&self, coin: &Coin, album: AlbumId) -> Result<Coin, CollectionError> {
        let mut coins = self.coin_view.lock().await;
        let mut albums = self.album_view.lock().await;
        let result = self.coins.move_to(coin, album).await;
        self.settle_both(&result, &mut coins, &mut albums).await;
        result
    }

    pub async fn delete_coin(&self, coin: &Coin) -> Result<(), CollectionError> {
        let mut coins = self.coin_view.lock().await;
        let mut albums = self.album_view.lock().await;
        let result = self.coins.delete(coin).await;
        self.settle_both(&result, &mut coins, &mut albums).await;
        result
    }

    async fn settle_albums<T>(
        &self,
        result: &Result<T, CollectionError>,
        albums: &mut MutexGuard<'_, Vec<Album>>,
    ) {
        if needs_refresh(result) {
            self.reload_albums(albums).await;
        }
    }

    async fn settle_both<T>(
        &self,
        result: &Result<T, CollectionError>,
        coins: &mut MutexGuard<'_, Vec<Coin>>,
        albums: &mut MutexGuard<'_, Vec<Album>>,
    ) {
        if needs_refresh(result) {
            self.reload_coins(coins).await;
            self.reload_albums(albums).await;
        }
    }

    async fn reload_albums(&self, view: &mut MutexGuard<'_, Vec<Album>>) {
        match self.albums.find_all().await {
            Ok(albums) => {
                debug!(count = albums.len(), "Album view refreshed");
                **view = albums;
            }
            Err(e) => warn!(error = %e, "Album view left stale"),
        }
    }

    async fn reload_coins(&self, view: &mut MutexGuard<'_, Vec<Coin>>) {
        match self.coins.find_all().await {
            Ok(coins) => {
                debug!(count = coins.len(), "Coin view refreshed");
                **view = coins;
            }
            Err(e) => warn!(error = %e, "Coin view left stale"),
        }
    }
}

/// Views are reloaded after a success and after a not-found error, which
/// means the cached view showed something that no longer exists
fn needs_refresh<T>(result: &Result<T, CollectionError>) -> bool {
    match result {
        Ok(_) => true,
        Err(error) => error.is_not_found(),
    }
}

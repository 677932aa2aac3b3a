//! In-memory transaction executor for service tests
//!
//! Each unit of work runs against a private copy of the tables while holding
//! the table lock; the copy replaces the committed tables only on success.
//! Repositories enforce the same constraints as the relational schema
//! (natural-key uniqueness, coin to album foreign key, value rules) so the
//! services see the same failures a real store would raise.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use core_kernel::{AlbumId, CoinId};
use domain_collection::{
    Abort, Album, AlbumRepository, AlbumService, AlbumStore, Coin, CoinKey, CoinRepository,
    CoinService, CollectionStore, Grade, RepositoryError, RepositoryResult, StoreErrorKind,
    TransactionExecutor, TransactionFailure, UnitOfWork,
};

/// Committed state of the in-memory store
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub albums: BTreeMap<AlbumId, Album>,
    pub coins: BTreeMap<CoinId, Coin>,
}

impl Tables {
    /// Number of coins referencing an album
    pub fn coins_in(&self, album: AlbumId) -> u32 {
        self.coins.values().filter(|coin| coin.album == album).count() as u32
    }
}

/// Failures to inject into the next units of work
#[derive(Debug, Clone, Default)]
pub struct Faults {
    /// Deleting a coin with this description fails with a store error
    pub fail_coin_delete: Option<String>,
    /// Natural-key lookups report nothing, as if a concurrent writer
    /// committed between the pre-check and the write
    pub hide_existing: bool,
}

#[derive(Default)]
pub struct MemoryExecutor {
    tables: Mutex<Tables>,
    faults: std::sync::Mutex<Faults>,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    reads: AtomicUsize,
}

impl MemoryExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn snapshot(&self) -> Tables {
        self.tables.lock().await.clone()
    }

    pub fn inject(&self, faults: Faults) {
        *self.faults.lock().unwrap() = faults;
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    /// Units of work run through the read-only entry point
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    async fn execute<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send,
        E: From<TransactionFailure> + Send,
        F: for<'s> FnOnce(&'s mut MemorySession) -> UnitOfWork<'s, T, E> + Send,
    {
        let mut committed = self.tables.lock().await;
        let faults = self.faults.lock().unwrap().clone();
        let mut session = MemorySession {
            tables: committed.clone(),
            faults,
        };

        let outcome = work(&mut session).await;
        match outcome {
            Ok(value) => {
                *committed = session.tables;
                self.commits.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            }
            Err(Abort::Domain(error)) => {
                self.rollbacks.fetch_add(1, Ordering::SeqCst);
                Err(error)
            }
            Err(Abort::Repository(error)) => {
                self.rollbacks.fetch_add(1, Ordering::SeqCst);
                Err(TransactionFailure::from(error).into())
            }
        }
    }
}

#[async_trait]
impl TransactionExecutor for MemoryExecutor {
    async fn run_albums<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<TransactionFailure> + Send + 'static,
        F: for<'s> FnOnce(&'s mut dyn AlbumStore) -> UnitOfWork<'s, T, E> + Send + 'static,
    {
        self.execute(move |session| work(session)).await
    }

    async fn run_collection<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<TransactionFailure> + Send + 'static,
        F: for<'s> FnOnce(&'s mut dyn CollectionStore) -> UnitOfWork<'s, T, E> + Send + 'static,
    {
        self.execute(move |session| work(session)).await
    }

    async fn run_read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<TransactionFailure> + Send + 'static,
        F: for<'s> FnOnce(&'s mut dyn CollectionStore) -> UnitOfWork<'s, T, E> + Send + 'static,
    {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.execute(move |session| work(session)).await
    }
}

pub struct MemorySession {
    tables: Tables,
    faults: Faults,
}

impl AlbumStore for MemorySession {
    fn albums(&mut self) -> Box<dyn AlbumRepository + '_> {
        Box::new(MemoryAlbums {
            tables: &mut self.tables,
            faults: &self.faults,
        })
    }
}

impl CollectionStore for MemorySession {
    fn coins(&mut self) -> Box<dyn CoinRepository + '_> {
        Box::new(MemoryCoins {
            tables: &mut self.tables,
            faults: &self.faults,
        })
    }
}

struct MemoryAlbums<'a> {
    tables: &'a mut Tables,
    faults: &'a Faults,
}

#[async_trait]
impl AlbumRepository for MemoryAlbums<'_> {
    async fn find_all(&mut self) -> RepositoryResult<Vec<Album>> {
        Ok(self.tables.albums.values().cloned().collect())
    }

    async fn find_by_id(&mut self, id: AlbumId) -> RepositoryResult<Option<Album>> {
        Ok(self.tables.albums.get(&id).cloned())
    }

    async fn find_by_name_and_volume(
        &mut self,
        name: &str,
        volume: u32,
    ) -> RepositoryResult<Option<Album>> {
        if name.trim().is_empty() {
            return Err(RepositoryError::invalid_argument("album name is required"));
        }
        if self.faults.hide_existing {
            return Ok(None);
        }
        Ok(self
            .tables
            .albums
            .values()
            .find(|album| album.name == name && album.volume == volume)
            .cloned())
    }

    async fn save(&mut self, album: &Album) -> RepositoryResult<Album> {
        album.validate()?;

        let clash = self.tables.albums.values().any(|other| {
            other.id != album.id && other.name == album.name && other.volume == album.volume
        });
        if clash {
            return Err(RepositoryError::store(
                StoreErrorKind::UniqueViolation,
                "UNIQUE constraint failed: albums.name, albums.volume",
            ));
        }

        let mut stored = album.clone();
        match album.id {
            Some(id) if !self.tables.albums.contains_key(&id) => {
                return Err(RepositoryError::store(StoreErrorKind::MissingRow, "no album row"));
            }
            Some(_) => {}
            None => stored.id = Some(AlbumId::generate()),
        }
        let id = stored.id.expect("id assigned above");
        self.tables.albums.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete(&mut self, album: &Album) -> RepositoryResult<()> {
        let id = album
            .id
            .ok_or_else(|| RepositoryError::invalid_argument("album id is required"))?;
        if self.tables.coins.values().any(|coin| coin.album == id) {
            return Err(RepositoryError::store(
                StoreErrorKind::ForeignKeyViolation,
                "FOREIGN KEY constraint failed",
            ));
        }
        self.tables
            .albums
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::store(StoreErrorKind::MissingRow, "no album row"))
    }
}

struct MemoryCoins<'a> {
    tables: &'a mut Tables,
    faults: &'a Faults,
}

#[async_trait]
impl CoinRepository for MemoryCoins<'_> {
    async fn find_all(&mut self) -> RepositoryResult<Vec<Coin>> {
        Ok(self.tables.coins.values().cloned().collect())
    }

    async fn find_by_id(&mut self, id: CoinId) -> RepositoryResult<Option<Coin>> {
        Ok(self.tables.coins.get(&id).cloned())
    }

    async fn find_by_description(&mut self, substring: &str) -> RepositoryResult<Vec<Coin>> {
        Ok(self
            .tables
            .coins
            .values()
            .filter(|coin| coin.description.contains(substring))
            .cloned()
            .collect())
    }

    async fn find_by_album(&mut self, album: AlbumId) -> RepositoryResult<Vec<Coin>> {
        Ok(self
            .tables
            .coins
            .values()
            .filter(|coin| coin.album == album)
            .cloned()
            .collect())
    }

    async fn find_by_key(&mut self, key: &CoinKey) -> RepositoryResult<Option<Coin>> {
        if self.faults.hide_existing {
            return Ok(None);
        }
        Ok(self.tables.coins.values().find(|coin| &coin.key() == key).cloned())
    }

    async fn save(&mut self, coin: &Coin) -> RepositoryResult<Coin> {
        coin.validate()?;

        if !self.tables.albums.contains_key(&coin.album) {
            return Err(RepositoryError::store(
                StoreErrorKind::ForeignKeyViolation,
                "FOREIGN KEY constraint failed",
            ));
        }
        let key = coin.key();
        if self
            .tables
            .coins
            .values()
            .any(|other| other.id != coin.id && other.key() == key)
        {
            return Err(RepositoryError::store(
                StoreErrorKind::UniqueViolation,
                "UNIQUE constraint failed: coins natural key",
            ));
        }

        let mut stored = coin.clone();
        match coin.id {
            Some(id) if !self.tables.coins.contains_key(&id) => {
                return Err(RepositoryError::store(StoreErrorKind::MissingRow, "no coin row"));
            }
            Some(_) => {}
            None => stored.id = Some(CoinId::generate()),
        }
        let id = stored.id.expect("id assigned above");
        self.tables.coins.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete(&mut self, coin: &Coin) -> RepositoryResult<()> {
        let id = coin
            .id
            .ok_or_else(|| RepositoryError::invalid_argument("coin id is required"))?;
        if self.faults.fail_coin_delete.as_deref() == Some(coin.description.as_str()) {
            return Err(RepositoryError::store(StoreErrorKind::Other, "injected delete failure"));
        }
        self.tables
            .coins
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::store(StoreErrorKind::MissingRow, "no coin row"))
    }
}

/// Both services over one fresh in-memory store
pub fn services() -> (
    Arc<MemoryExecutor>,
    AlbumService<MemoryExecutor>,
    CoinService<MemoryExecutor>,
) {
    let executor = MemoryExecutor::new();
    let albums = AlbumService::new(Arc::clone(&executor));
    let coins = CoinService::new(Arc::clone(&executor));
    (executor, albums, coins)
}

pub fn album(name: &str, slots: u32) -> Album {
    Album::new(name, 1, "Safe", slots).unwrap()
}

pub fn coin(description: &str, album: AlbumId) -> Coin {
    Coin::new(Grade::VeryFine, "Italy", 1970, description, "", album).unwrap()
}

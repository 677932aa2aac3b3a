//! SQLite transaction executor
//!
//! Writing units of work run inside one `BEGIN IMMEDIATE` transaction. SQLite
//! takes the database write lock at begin, so two writers never interleave
//! their reads and writes; a second writer waits up to the busy timeout and
//! is otherwise rejected as busy.
//!
//! Read-only units of work use a deferred `BEGIN`. Under WAL journaling they
//! read a committed snapshot without touching the write lock, so they neither
//! wait for nor hold up a writer.
//!
//! No transaction outlives the call that opened it:
//!
//! - success commits
//! - any abort rolls back
//! - a panic rolls back and then resumes unwinding
//! - a dropped call (cancellation, timeout) rolls back when the sqlx
//!   transaction guard is dropped

use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use sqlx::{Sqlite, Transaction};
use tracing::{debug, warn};

use domain_collection::{
    Abort, AlbumRepository, AlbumStore, CoinRepository, CollectionStore, RepositoryError,
    TransactionExecutor, TransactionFailure, UnitOfWork,
};

use crate::error::DatabaseError;
use crate::pool::DatabasePool;
use crate::repositories::{SqlxAlbumRepository, SqlxCoinRepository};

/// Takes the write lock at begin
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";
/// Takes a read snapshot at the first statement
const BEGIN_READ: &str = "BEGIN DEFERRED";

/// Handle bundle given to a unit of work
///
/// Both repositories borrow the connection of the open transaction.
pub struct SqliteSession {
    tx: Transaction<'static, Sqlite>,
}

impl AlbumStore for SqliteSession {
    fn albums(&mut self) -> Box<dyn AlbumRepository + '_> {
        Box::new(SqlxAlbumRepository::new(&mut *self.tx))
    }
}

impl CollectionStore for SqliteSession {
    fn coins(&mut self) -> Box<dyn CoinRepository + '_> {
        Box::new(SqlxCoinRepository::new(&mut *self.tx))
    }
}

/// Transaction executor backed by an SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteTransactionExecutor {
    pool: DatabasePool,
}

impl SqliteTransactionExecutor {
    /// Creates an executor drawing connections from `pool`
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    async fn execute<T, E, F>(&self, begin: &'static str, work: F) -> Result<T, E>
    where
        T: Send,
        E: From<TransactionFailure> + Send,
        F: for<'s> FnOnce(&'s mut SqliteSession) -> UnitOfWork<'s, T, E> + Send,
    {
        let tx = self
            .pool
            .begin_with(begin)
            .await
            .map_err(|e| store_failure::<E>(e, "begin"))?;
        let mut session = SqliteSession { tx };

        let outcome = AssertUnwindSafe(work(&mut session)).catch_unwind().await;

        match outcome {
            Ok(Ok(value)) => {
                session
                    .tx
                    .commit()
                    .await
                    .map_err(|e| store_failure::<E>(e, "commit"))?;
                debug!("Transaction committed");
                Ok(value)
            }
            Ok(Err(abort)) => {
                rollback(session).await;
                Err(match abort {
                    Abort::Domain(error) => error,
                    Abort::Repository(error) => {
                        debug!(error = %error, "Unit of work failed");
                        TransactionFailure::from(error).into()
                    }
                })
            }
            Err(panic) => {
                rollback(session).await;
                warn!("Unit of work panicked; transaction rolled back");
                std::panic::resume_unwind(panic)
            }
        }
    }
}

async fn rollback(session: SqliteSession) {
    match session.tx.rollback().await {
        Ok(()) => debug!("Transaction rolled back"),
        Err(e) => warn!(error = %e, "Rollback failed; connection discarded"),
    }
}

fn store_failure<E: From<TransactionFailure>>(error: sqlx::Error, stage: &str) -> E {
    let error = DatabaseError::from(error);
    warn!(error = %error, stage, "Transaction could not be completed");
    TransactionFailure::from(RepositoryError::from(error)).into()
}

#[async_trait]
impl TransactionExecutor for SqliteTransactionExecutor {
    async fn run_albums<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<TransactionFailure> + Send + 'static,
        F: for<'s> FnOnce(&'s mut dyn AlbumStore) -> UnitOfWork<'s, T, E> + Send + 'static,
    {
        self.execute(BEGIN_WRITE, move |session| work(session)).await
    }

    async fn run_collection<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<TransactionFailure> + Send + 'static,
        F: for<'s> FnOnce(&'s mut dyn CollectionStore) -> UnitOfWork<'s, T, E> + Send + 'static,
    {
        self.execute(BEGIN_WRITE, move |session| work(session)).await
    }

    async fn run_read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<TransactionFailure> + Send + 'static,
        F: for<'s> FnOnce(&'s mut dyn CollectionStore) -> UnitOfWork<'s, T, E> + Send + 'static,
    {
        self.execute(BEGIN_READ, move |session| work(session)).await
    }
}

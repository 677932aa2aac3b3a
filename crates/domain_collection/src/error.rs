//! Collection domain errors
//!
//! Three layers of failure exist, from the store outwards:
//!
//! - [`RepositoryError`]: raised by a repository call (invalid argument,
//!   store rejection, unreadable row)
//! - [`TransactionFailure`]: what the transaction executor turns a repository
//!   error into once the transaction has been rolled back
//! - [`CollectionError`]: the taxonomy the domain services expose to callers

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use core_kernel::{AlbumId, CoinId, CoreError};

use crate::coin::CoinKey;

/// Result alias for repository calls
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Why the store refused an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// A unique constraint was violated
    UniqueViolation,
    /// A foreign key constraint was violated
    ForeignKeyViolation,
    /// A check or not-null constraint was violated
    CheckViolation,
    /// The store is locked by another writer or the transaction conflicted
    Busy,
    /// The store could not be reached
    Connection,
    /// An update or delete addressed a row that does not exist
    MissingRow,
    /// Anything else
    Other,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StoreErrorKind::UniqueViolation => "unique violation",
            StoreErrorKind::ForeignKeyViolation => "foreign key violation",
            StoreErrorKind::CheckViolation => "check violation",
            StoreErrorKind::Busy => "busy",
            StoreErrorKind::Connection => "connection",
            StoreErrorKind::MissingRow => "missing row",
            StoreErrorKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// Errors raised by repository calls
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A required argument was absent or violated a value rule
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The store rejected the operation
    #[error("Store rejected operation ({kind}): {message}")]
    Store {
        kind: StoreErrorKind,
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// A persisted row could not be mapped back to an entity
    #[error("Invalid persisted data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// Creates an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        RepositoryError::InvalidArgument(message.into())
    }

    /// Creates a store rejection without an underlying driver error
    pub fn store(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        RepositoryError::Store {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Returns the store rejection kind, if this is a store rejection
    pub fn store_kind(&self) -> Option<StoreErrorKind> {
        match self {
            RepositoryError::Store { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<CoreError> for RepositoryError {
    fn from(error: CoreError) -> Self {
        RepositoryError::InvalidArgument(error.to_string())
    }
}

/// Classification of a failed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A repository call received invalid input
    InvalidArgument,
    /// The store refused the operation (constraint, connectivity, conflict)
    StoreRejected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidArgument => f.write_str("invalid argument"),
            FailureKind::StoreRejected => f.write_str("store rejected"),
        }
    }
}

/// A rolled-back transaction, classified by cause
#[derive(Debug, Error)]
#[error("Transaction failed ({kind})")]
pub struct TransactionFailure {
    kind: FailureKind,
    #[source]
    cause: RepositoryError,
}

impl TransactionFailure {
    /// Returns the failure classification
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Returns the repository error that caused the rollback
    pub fn cause(&self) -> &RepositoryError {
        &self.cause
    }

    /// Checks if the store rejected the operation on a unique constraint
    pub fn is_unique_violation(&self) -> bool {
        self.cause.store_kind() == Some(StoreErrorKind::UniqueViolation)
    }
}

impl From<RepositoryError> for TransactionFailure {
    fn from(cause: RepositoryError) -> Self {
        let kind = match cause {
            RepositoryError::InvalidArgument(_) => FailureKind::InvalidArgument,
            RepositoryError::Store { .. } | RepositoryError::InvalidData(_) => {
                FailureKind::StoreRejected
            }
        };
        Self { kind, cause }
    }
}

/// How a missing album was looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumLookup {
    /// The caller's album was never persisted
    Unsaved,
    Id(AlbumId),
    NameAndVolume { name: String, volume: u32 },
}

impl fmt::Display for AlbumLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlbumLookup::Unsaved => f.write_str("album without id"),
            AlbumLookup::Id(id) => write!(f, "{}", id),
            AlbumLookup::NameAndVolume { name, volume } => write!(f, "{} vol. {}", name, volume),
        }
    }
}

/// How a missing coin was looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoinLookup {
    /// The caller's coin was never persisted
    Unsaved,
    Id(CoinId),
}

impl fmt::Display for CoinLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinLookup::Unsaved => f.write_str("coin without id"),
            CoinLookup::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Errors exposed by the album and coin services
#[derive(Debug, Error)]
pub enum CollectionError {
    /// A required value was absent or invalid; a programming error at the call site
    #[error("Invalid argument")]
    InvalidArgument(#[source] TransactionFailure),

    /// The store failed to complete the operation
    #[error("Database operation failed")]
    Database(#[source] TransactionFailure),

    #[error("Album not found: {0}")]
    AlbumNotFound(AlbumLookup),

    #[error("Coin not found: {0}")]
    CoinNotFound(CoinLookup),

    #[error("Album '{name}' volume {volume} already exists")]
    DuplicateAlbum { name: String, volume: u32 },

    #[error("Coin already exists: {0}")]
    DuplicateCoin(CoinKey),

    #[error("Album '{album}' has no free slot ({slots} slots)")]
    FullAlbum { album: String, slots: u32 },
}

impl CollectionError {
    /// Checks if this error reports a missing album or coin
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CollectionError::AlbumNotFound(_) | CollectionError::CoinNotFound(_)
        )
    }

    /// Checks if the store rejected the operation on a unique constraint
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, CollectionError::Database(failure) if failure.is_unique_violation())
    }
}

impl From<TransactionFailure> for CollectionError {
    fn from(failure: TransactionFailure) -> Self {
        match failure.kind() {
            FailureKind::InvalidArgument => CollectionError::InvalidArgument(failure),
            FailureKind::StoreRejected => CollectionError::Database(failure),
        }
    }
}

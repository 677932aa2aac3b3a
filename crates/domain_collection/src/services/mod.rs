//! Collection domain services
//!
//! Each public service method runs as exactly one unit of work on the
//! transaction executor. Not-found, duplicate and capacity checks are made
//! inside that unit of work against fresh reads, so a concurrent writer can
//! never make a service act on a stale snapshot.

pub mod album_service;
pub mod coin_service;

pub use album_service::AlbumService;
pub use coin_service::CoinService;

use crate::error::CollectionError;
use crate::ports::Abort;

/// Outcome of a unit of work run by the collection services
type Work<T> = Result<T, Abort<CollectionError>>;

impl From<CollectionError> for Abort<CollectionError> {
    fn from(error: CollectionError) -> Self {
        Abort::Domain(error)
    }
}

//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for collection errors and album
//! occupancy that give more meaningful error messages than standard
//! assertions.

use domain_collection::{Album, CollectionError};

use crate::database::TestDatabase;

/// Asserts that an album has exactly `expected` occupied slots
pub fn assert_occupancy(album: &Album, expected: u32) {
    assert_eq!(
        album.occupied_slots, expected,
        "Album '{}' occupies {} of {} slots, expected {}",
        album, album.occupied_slots, album.number_of_slots, expected
    );
}

/// Asserts that an error reports a missing album or coin
pub fn assert_not_found(error: &CollectionError) {
    assert!(error.is_not_found(), "Expected a not-found error, got {:?}", error);
}

/// Asserts that an error reports a duplicate album or coin
pub fn assert_duplicate(error: &CollectionError) {
    assert!(
        matches!(
            error,
            CollectionError::DuplicateAlbum { .. } | CollectionError::DuplicateCoin(_)
        ),
        "Expected a duplicate error, got {:?}",
        error
    );
}

/// Asserts that an error reports a full album
pub fn assert_full(error: &CollectionError) {
    assert!(
        matches!(error, CollectionError::FullAlbum { .. }),
        "Expected a full-album error, got {:?}",
        error
    );
}

/// Asserts that every stored album's counter matches the coins it holds
/// and stays within its capacity
pub async fn assert_occupancy_consistent(db: &TestDatabase) {
    let rows: Vec<(String, i64, i64, i64)> = sqlx::query_as(
        "SELECT a.name, a.occupied_slots, a.number_of_slots, \
                (SELECT COUNT(*) FROM coins c WHERE c.album = a.id) \
         FROM albums a",
    )
    .fetch_all(db.pool())
    .await
    .expect("occupancy query");

    for (name, occupied, slots, held) in rows {
        assert!(
            (0..=slots).contains(&occupied),
            "Album '{}' occupies {} of {} slots",
            name,
            occupied,
            slots
        );
        assert_eq!(
            occupied, held,
            "Album '{}' counts {} occupied slots but holds {} coins",
            name, occupied, held
        );
    }
}

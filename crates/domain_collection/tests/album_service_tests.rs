//! Album service tests against the in-memory executor

mod common;

use common::{album, coin, services, Faults};
use domain_collection::{AlbumLookup, CollectionError, FailureKind};

// ============= ADD TESTS =============

#[tokio::test]
async fn test_add_assigns_id_and_empty_occupancy() {
    let (executor, albums, _) = services();

    let mut draft = album("Pre-euro", 10);
    draft.occupied_slots = 4;
    let stored = albums.add(&draft).await.unwrap();

    assert!(stored.id.is_some());
    assert_eq!(stored.occupied_slots, 0);
    assert_eq!(stored.name, "Pre-euro");
    assert!(draft.id.is_none(), "caller's album is left untouched");

    let tables = executor.snapshot().await;
    assert_eq!(tables.albums.len(), 1);
}

#[tokio::test]
async fn test_add_rejects_existing_name_and_volume() {
    let (executor, albums, _) = services();
    albums.add(&album("Pre-euro", 10)).await.unwrap();

    let error = albums.add(&album("Pre-euro", 5)).await.unwrap_err();

    assert!(matches!(
        error,
        CollectionError::DuplicateAlbum { ref name, volume: 1 } if name == "Pre-euro"
    ));
    assert_eq!(executor.snapshot().await.albums.len(), 1);
}

#[tokio::test]
async fn test_add_same_name_other_volume_is_allowed() {
    let (_, albums, _) = services();
    albums.add(&album("Pre-euro", 10)).await.unwrap();

    let mut second = album("Pre-euro", 10);
    second.volume = 2;
    albums.add(&second).await.unwrap();

    assert_eq!(albums.find_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_add_maps_store_unique_rejection_to_duplicate() {
    let (executor, albums, _) = services();
    albums.add(&album("Pre-euro", 10)).await.unwrap();

    executor.inject(Faults {
        hide_existing: true,
        ..Faults::default()
    });
    let error = albums.add(&album("Pre-euro", 10)).await.unwrap_err();

    assert!(matches!(error, CollectionError::DuplicateAlbum { .. }));
    assert_eq!(executor.snapshot().await.albums.len(), 1);
}

#[tokio::test]
async fn test_add_invalid_album_is_invalid_argument() {
    let (executor, albums, _) = services();

    let mut broken = album("Pre-euro", 10);
    broken.number_of_slots = 0;
    let error = albums.add(&broken).await.unwrap_err();

    match error {
        CollectionError::InvalidArgument(failure) => {
            assert_eq!(failure.kind(), FailureKind::InvalidArgument)
        }
        other => panic!("Expected InvalidArgument, got {other:?}"),
    }
    assert!(executor.snapshot().await.albums.is_empty());
}

// ============= QUERY TESTS =============

#[tokio::test]
async fn test_find_by_id_and_natural_key() {
    let (_, albums, _) = services();
    let stored = albums.add(&album("Pre-euro", 10)).await.unwrap();
    let id = stored.id.unwrap();

    assert_eq!(albums.find_by_id(id).await.unwrap(), stored);
    assert_eq!(
        albums.find_by_name_and_volume("Pre-euro", 1).await.unwrap(),
        stored
    );
}

#[tokio::test]
async fn test_find_unknown_album_is_not_found() {
    let (_, albums, _) = services();
    let stored = albums.add(&album("Pre-euro", 10)).await.unwrap();
    albums.delete(&stored).await.unwrap();

    let error = albums.find_by_id(stored.id.unwrap()).await.unwrap_err();
    assert!(matches!(error, CollectionError::AlbumNotFound(AlbumLookup::Id(_))));

    let error = albums
        .find_by_name_and_volume("Pre-euro", 2)
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        CollectionError::AlbumNotFound(AlbumLookup::NameAndVolume { volume: 2, .. })
    ));
}

#[tokio::test]
async fn test_find_by_blank_name_is_invalid_argument() {
    let (_, albums, _) = services();

    let error = albums.find_by_name_and_volume("  ", 1).await.unwrap_err();

    assert!(matches!(error, CollectionError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_find_all_is_stable_without_writes() {
    let (_, albums, _) = services();
    albums.add(&album("Pre-euro", 10)).await.unwrap();
    albums.add(&album("Euro", 10)).await.unwrap();

    let first = albums.find_all().await.unwrap();
    let second = albums.find_all().await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_find_with_free_slots_skips_full_albums() {
    let (_, albums, coins) = services();
    let small = albums.add(&album("Small", 1)).await.unwrap();
    albums.add(&album("Large", 10)).await.unwrap();
    coins
        .add(&coin("1 lira", small.id.unwrap()))
        .await
        .unwrap();

    let open = albums.find_with_free_slots().await.unwrap();

    assert_eq!(open.len(), 1);
    assert_eq!(open[0].name, "Large");
}

#[tokio::test]
async fn test_lookups_run_as_read_only_work() {
    let (executor, albums, _) = services();
    let stored = albums.add(&album("Pre-euro", 10)).await.unwrap();
    let id = stored.id.unwrap();

    albums.find_all().await.unwrap();
    albums.find_by_id(id).await.unwrap();
    albums.find_by_name_and_volume("Pre-euro", 1).await.unwrap();
    albums.find_with_free_slots().await.unwrap();

    assert_eq!(executor.reads(), 4);
    albums.move_to(&stored, "Attic").await.unwrap();
    assert_eq!(executor.reads(), 4);
}

// ============= DELETE TESTS =============

#[tokio::test]
async fn test_delete_removes_album_and_its_coins() {
    let (executor, albums, coins) = services();
    let kept = albums.add(&album("Kept", 10)).await.unwrap();
    let doomed = albums.add(&album("Doomed", 10)).await.unwrap();
    let doomed_id = doomed.id.unwrap();
    coins.add(&coin("1 lira", doomed_id)).await.unwrap();
    coins.add(&coin("2 lire", doomed_id)).await.unwrap();
    coins.add(&coin("5 lire", kept.id.unwrap())).await.unwrap();

    albums.delete(&doomed).await.unwrap();

    let tables = executor.snapshot().await;
    assert_eq!(tables.albums.len(), 1);
    assert_eq!(tables.coins_in(doomed_id), 0);
    assert_eq!(tables.coins.len(), 1);
}

#[tokio::test]
async fn test_delete_unsaved_album_is_not_found() {
    let (executor, albums, _) = services();

    let error = albums.delete(&album("Draft", 10)).await.unwrap_err();

    assert!(matches!(error, CollectionError::AlbumNotFound(AlbumLookup::Unsaved)));
    assert_eq!(executor.commits() + executor.rollbacks(), 0);
}

#[tokio::test]
async fn test_delete_twice_reports_not_found() {
    let (_, albums, _) = services();
    let stored = albums.add(&album("Pre-euro", 10)).await.unwrap();

    albums.delete(&stored).await.unwrap();
    let error = albums.delete(&stored).await.unwrap_err();

    assert!(error.is_not_found());
}

#[tokio::test]
async fn test_delete_failing_midway_rolls_everything_back() {
    let (executor, albums, coins) = services();
    let stored = albums.add(&album("Pre-euro", 10)).await.unwrap();
    let id = stored.id.unwrap();
    coins.add(&coin("1 lira", id)).await.unwrap();
    coins.add(&coin("2 lire", id)).await.unwrap();
    coins.add(&coin("5 lire", id)).await.unwrap();
    let before = executor.snapshot().await;

    executor.inject(Faults {
        fail_coin_delete: Some("2 lire".into()),
        ..Faults::default()
    });
    let error = albums.delete(&stored).await.unwrap_err();

    assert!(matches!(error, CollectionError::Database(_)));
    let after = executor.snapshot().await;
    assert_eq!(after.albums, before.albums);
    assert_eq!(after.coins, before.coins);
    assert_eq!(after.coins_in(id), 3);
}

// ============= MOVE TESTS =============

#[tokio::test]
async fn test_move_changes_location_only() {
    let (_, albums, coins) = services();
    let stored = albums.add(&album("Pre-euro", 10)).await.unwrap();
    coins
        .add(&coin("1 lira", stored.id.unwrap()))
        .await
        .unwrap();

    let moved = albums.move_to(&stored, "Bank vault").await.unwrap();

    assert_eq!(moved.location, "Bank vault");
    assert_eq!(moved.id, stored.id);
    assert_eq!(moved.occupied_slots, 1);
    assert_eq!(albums.find_by_id(stored.id.unwrap()).await.unwrap(), moved);
}

#[tokio::test]
async fn test_move_uses_fresh_occupancy_not_callers_snapshot() {
    let (_, albums, coins) = services();
    let stale = albums.add(&album("Pre-euro", 10)).await.unwrap();
    let id = stale.id.unwrap();
    coins.add(&coin("1 lira", id)).await.unwrap();
    coins.add(&coin("2 lire", id)).await.unwrap();

    let moved = albums.move_to(&stale, "Drawer").await.unwrap();

    assert_eq!(stale.occupied_slots, 0);
    assert_eq!(moved.occupied_slots, 2);
}

#[tokio::test]
async fn test_move_deleted_album_is_not_found() {
    let (_, albums, _) = services();
    let stored = albums.add(&album("Pre-euro", 10)).await.unwrap();
    albums.delete(&stored).await.unwrap();

    let error = albums.move_to(&stored, "Drawer").await.unwrap_err();

    assert!(matches!(error, CollectionError::AlbumNotFound(AlbumLookup::Id(_))));
}

//! Concurrency properties of the services against a shared SQLite file
//!
//! Every task gets its own service clone; all of them share one pool, so the
//! units of work really race for the database write lock.

use std::time::Duration;

use tokio::task::JoinHandle;

use domain_collection::CollectionError;
use test_utils::{
    assert_duplicate, assert_full, assert_not_found, assert_occupancy, assert_occupancy_consistent,
    create_impatient_test_database, AlbumFixtures, CoinFixtures, TestDatabase,
};

const WRITERS: usize = 8;

async fn join_all<T>(handles: Vec<JoinHandle<T>>) -> Vec<T> {
    futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_album_adds_yield_one_album() {
    let db = TestDatabase::new().await.unwrap();

    let handles = (0..WRITERS)
        .map(|_| {
            let albums = db.album_service();
            tokio::spawn(async move { albums.add(&AlbumFixtures::pre_euro()).await })
        })
        .collect();
    let results = join_all(handles).await;

    let (added, rejected): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    assert_eq!(added.len(), 1);
    assert_eq!(rejected.len(), WRITERS - 1);
    for result in &rejected {
        assert_duplicate(result.as_ref().unwrap_err());
    }
    assert_eq!(db.count_rows("albums").await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_coin_adds_yield_one_coin() {
    let db = TestDatabase::new().await.unwrap();
    let album = db.album_service().add(&AlbumFixtures::euro()).await.unwrap();
    let album_id = album.id.unwrap();

    let handles = (0..WRITERS)
        .map(|_| {
            let coins = db.coin_service();
            tokio::spawn(async move { coins.add(&CoinFixtures::euro_2(album_id)).await })
        })
        .collect();
    let results = join_all(handles).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for error in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_duplicate(error);
    }
    let album = db.album_service().find_by_id(album_id).await.unwrap();
    assert_occupancy(&album, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deletes_of_one_coin() {
    let db = TestDatabase::new().await.unwrap();
    let album = db.album_service().add(&AlbumFixtures::euro()).await.unwrap();
    let coin = db
        .coin_service()
        .add(&CoinFixtures::euro_2(album.id.unwrap()))
        .await
        .unwrap();

    let handles = (0..WRITERS)
        .map(|_| {
            let coins = db.coin_service();
            let coin = coin.clone();
            tokio::spawn(async move { coins.delete(&coin).await })
        })
        .collect();
    let results = join_all(handles).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for error in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_not_found(error);
    }
    let album = db.album_service().find_by_id(album.id.unwrap()).await.unwrap();
    assert_occupancy(&album, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_never_overfill() {
    let db = TestDatabase::new().await.unwrap();
    let album = db
        .album_service()
        .add(&AlbumFixtures::with_slots("Tight", 3))
        .await
        .unwrap();
    let album_id = album.id.unwrap();

    let handles = (0..WRITERS)
        .map(|index| {
            let coins = db.coin_service();
            tokio::spawn(async move { coins.add(&CoinFixtures::numbered(album_id, index)).await })
        })
        .collect();
    let results = join_all(handles).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
    for error in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_full(error);
    }
    assert_occupancy_consistent(&db).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_moves_into_last_free_slot() {
    let db = TestDatabase::new().await.unwrap();
    let albums = db.album_service();
    let coins = db.coin_service();
    let source = albums.add(&AlbumFixtures::euro()).await.unwrap();
    let target = albums
        .add(&AlbumFixtures::with_slots("Last slot", 1))
        .await
        .unwrap();
    let target_id = target.id.unwrap();

    let mut movers = Vec::new();
    for index in 0..WRITERS {
        movers.push(
            coins
                .add(&CoinFixtures::numbered(source.id.unwrap(), index))
                .await
                .unwrap(),
        );
    }

    let handles = movers
        .into_iter()
        .map(|coin| {
            let coins = db.coin_service();
            tokio::spawn(async move { coins.move_to(&coin, target_id).await })
        })
        .collect();
    let results = join_all(handles).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for error in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_full(error);
    }
    assert_occupancy(&albums.find_by_id(target_id).await.unwrap(), 1);
    assert_occupancy_consistent(&db).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_album_delete_racing_coin_add() {
    let db = TestDatabase::new().await.unwrap();
    let album = db.album_service().add(&AlbumFixtures::euro()).await.unwrap();
    let album_id = album.id.unwrap();

    let deleter = {
        let albums = db.album_service();
        let album = album.clone();
        tokio::spawn(async move { albums.delete(&album).await })
    };
    let adder = {
        let coins = db.coin_service();
        tokio::spawn(async move { coins.add(&CoinFixtures::euro_2(album_id)).await })
    };

    deleter.await.unwrap().unwrap();
    match adder.await.unwrap() {
        // The add committed first and the delete took the coin with it.
        Ok(_) => {}
        Err(error) => assert_not_found(&error),
    }

    assert_eq!(db.count_rows("albums").await.unwrap(), 0);
    assert_eq!(db.count_rows("coins").await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reads_proceed_while_a_writer_holds_the_lock() {
    let db = create_impatient_test_database(Duration::from_millis(100))
        .await
        .unwrap();
    let albums = db.album_service();
    let coins = db.coin_service();
    let album = albums.add(&AlbumFixtures::pre_euro()).await.unwrap();
    let album_id = album.id.unwrap();
    coins.add(&CoinFixtures::lire_100(album_id)).await.unwrap();

    let mut writer = db.pool().begin_with("BEGIN IMMEDIATE").await.unwrap();
    sqlx::query("UPDATE albums SET location = 'Bank vault'")
        .execute(&mut *writer)
        .await
        .unwrap();

    // readers see the last committed state, not the held update
    let seen = albums.find_by_id(album_id).await.unwrap();
    assert_eq!(seen.location, "Safe");
    assert_occupancy(&seen, 1);
    assert_eq!(albums.find_all().await.unwrap().len(), 1);
    assert_eq!(coins.find_by_album(album_id).await.unwrap().len(), 1);
    assert_eq!(coins.find_by_description("lire").await.unwrap().len(), 1);

    let error = albums.move_to(&album, "Drawer").await.unwrap_err();
    assert!(matches!(error, CollectionError::Database(_)), "got {:?}", error);

    writer.rollback().await.unwrap();
    let moved = albums.move_to(&album, "Drawer").await.unwrap();
    assert_eq!(moved.location, "Drawer");
    assert_occupancy(&moved, 1);
}

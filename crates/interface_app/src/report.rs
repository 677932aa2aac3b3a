//! Inventory report
//!
//! Lists every album with its occupancy and the coins it holds.

use std::fmt::Write;

use serde::Serialize;

use domain_collection::{Album, AlbumService, Coin, CoinService, CollectionError, TransactionExecutor};

/// One album and its coins
#[derive(Debug, Clone, Serialize)]
pub struct AlbumEntry {
    pub album: Album,
    pub free_slots: u32,
    pub coins: Vec<Coin>,
}

/// The whole collection, album by album
#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub albums: Vec<AlbumEntry>,
    pub total_coins: usize,
}

impl InventoryReport {
    /// Reads every album and coin through the services
    pub async fn collect<X: TransactionExecutor>(
        albums: &AlbumService<X>,
        coins: &CoinService<X>,
    ) -> Result<Self, CollectionError> {
        let albums = albums.find_all().await?;
        let coins = coins.find_all().await?;
        Ok(Self::assemble(albums, coins))
    }

    /// Groups coins under their albums, keeping the album order given
    pub fn assemble(albums: Vec<Album>, coins: Vec<Coin>) -> Self {
        let total_coins = coins.len();
        let albums = albums
            .into_iter()
            .map(|album| {
                let held = coins
                    .iter()
                    .filter(|coin| Some(coin.album) == album.id)
                    .cloned()
                    .collect();
                AlbumEntry {
                    free_slots: album.free_slots(),
                    album,
                    coins: held,
                }
            })
            .collect();

        Self {
            albums,
            total_coins,
        }
    }

    /// Renders the report as plain text
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.albums {
            let album = &entry.album;
            // Writing into a String cannot fail.
            let _ = writeln!(
                out,
                "{} @ {} [{}/{} slots]",
                album, album.location, album.occupied_slots, album.number_of_slots
            );
            for coin in &entry.coins {
                let _ = writeln!(out, "  - {}", coin);
            }
        }
        let _ = writeln!(
            out,
            "{} albums, {} coins",
            self.albums.len(),
            self.total_coins
        );
        out
    }
}

//! Pre-built Test Fixtures
//!
//! Provides ready-to-use albums and coins for common scenarios. Albums are
//! drafts (no id); coins need the id of a stored album.

use core_kernel::AlbumId;
use domain_collection::{Album, Coin, Grade};

/// Fixture for album test data
pub struct AlbumFixtures;

impl AlbumFixtures {
    /// Two-slot album for pre-euro coins
    pub fn pre_euro() -> Album {
        Album::new("Pre-euro", 1, "Safe", 2).expect("valid fixture")
    }

    /// Roomy album for euro coins
    pub fn euro() -> Album {
        Album::new("Euro", 1, "Bookshelf", 24).expect("valid fixture")
    }

    /// Album with the given number of slots
    pub fn with_slots(name: &str, slots: u32) -> Album {
        Album::new(name, 1, "Drawer", slots).expect("valid fixture")
    }
}

/// Fixture for coin test data
pub struct CoinFixtures;

impl CoinFixtures {
    /// Italian 100 lire, 1970
    pub fn lire_100(album: AlbumId) -> Coin {
        Coin::new(Grade::VeryFine, "Italy", 1970, "100 lire", "", album).expect("valid fixture")
    }

    /// French 1 franc, 1965
    pub fn franc_1(album: AlbumId) -> Coin {
        Coin::new(Grade::Fine, "France", 1965, "1 franc", "", album).expect("valid fixture")
    }

    /// Spanish 25 pesetas, 1980
    pub fn pesetas_25(album: AlbumId) -> Coin {
        Coin::new(Grade::Good, "Spain", 1980, "25 pesetas", "", album).expect("valid fixture")
    }

    /// German 2 euro, 2002
    pub fn euro_2(album: AlbumId) -> Coin {
        Coin::new(Grade::Uncirculated, "Germany", 2002, "2 euro", "", album)
            .expect("valid fixture")
    }

    /// A distinct coin per index, for filling albums
    pub fn numbered(album: AlbumId, index: usize) -> Coin {
        Coin::new(
            Grade::VeryFine,
            "Italy",
            1970,
            format!("{} lire", (index + 1) * 10),
            "",
            album,
        )
        .expect("valid fixture")
    }
}

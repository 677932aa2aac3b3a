//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else. `build` skips validation, so invalid
//! entities can be built on purpose.

use core_kernel::AlbumId;
use domain_collection::{Album, Coin, Grade};

/// Builder for constructing test albums
pub struct AlbumBuilder {
    album: Album,
}

impl Default for AlbumBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AlbumBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            album: Album {
                id: None,
                name: "Test album".to_string(),
                volume: 1,
                location: "Shelf".to_string(),
                number_of_slots: 10,
                occupied_slots: 0,
            },
        }
    }

    /// Sets the album name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.album.name = name.into();
        self
    }

    /// Sets the volume number
    pub fn with_volume(mut self, volume: u32) -> Self {
        self.album.volume = volume;
        self
    }

    /// Sets the storage location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.album.location = location.into();
        self
    }

    /// Sets the slot capacity
    pub fn with_slots(mut self, slots: u32) -> Self {
        self.album.number_of_slots = slots;
        self
    }

    /// Sets the occupied slot counter
    pub fn with_occupied(mut self, occupied: u32) -> Self {
        self.album.occupied_slots = occupied;
        self
    }

    /// Builds the album
    pub fn build(self) -> Album {
        self.album
    }
}

/// Builder for constructing test coins
pub struct CoinBuilder {
    coin: Coin,
}

impl CoinBuilder {
    /// Creates a new builder for a coin held by `album`
    pub fn new(album: AlbumId) -> Self {
        Self {
            coin: Coin {
                id: None,
                grade: Grade::VeryFine,
                country: "Italy".to_string(),
                minting_year: 1970,
                description: "100 lire".to_string(),
                note: String::new(),
                album,
            },
        }
    }

    /// Sets the grade
    pub fn with_grade(mut self, grade: Grade) -> Self {
        self.coin.grade = grade;
        self
    }

    /// Sets the issuing country
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.coin.country = country.into();
        self
    }

    /// Sets the minting year
    pub fn with_year(mut self, year: u16) -> Self {
        self.coin.minting_year = year;
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.coin.description = description.into();
        self
    }

    /// Sets the note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.coin.note = note.into();
        self
    }

    /// Builds the coin
    pub fn build(self) -> Coin {
        self.coin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_builder_defaults_are_valid() {
        assert!(AlbumBuilder::new().build().validate().is_ok());
        assert!(AlbumBuilder::new().with_slots(0).build().validate().is_err());
    }

    #[test]
    fn test_coin_builder_overrides() {
        let coin = CoinBuilder::new(AlbumId::generate())
            .with_grade(Grade::Proof)
            .with_year(1999)
            .with_note("Mint set")
            .build();

        assert_eq!(coin.grade, Grade::Proof);
        assert_eq!(coin.minting_year, 1999);
        assert!(coin.validate().is_ok());
    }
}

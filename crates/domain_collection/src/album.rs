//! Album entity
//!
//! An album is a physical container with a fixed number of coin slots and a
//! physical location. Its occupancy counter is owned by the coin service: it
//! only changes as a side effect of adding, deleting or moving coins.

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{AlbumId, CoreError};

/// A coin album
///
/// `id` is `None` until the album is first persisted; the store generates it
/// and it never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Store-generated identifier
    pub id: Option<AlbumId>,
    /// Album name; together with `volume` it identifies the album
    pub name: String,
    /// Volume number, starting at 1
    pub volume: u32,
    /// Where the album is physically kept
    pub location: String,
    /// Slot capacity
    pub number_of_slots: u32,
    /// Slots currently holding a coin
    pub occupied_slots: u32,
}

impl Album {
    /// Creates a new, empty, not yet persisted album
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the name is blank or the volume or
    /// slot count is zero
    pub fn new(
        name: impl Into<String>,
        volume: u32,
        location: impl Into<String>,
        number_of_slots: u32,
    ) -> Result<Self, CoreError> {
        let album = Self {
            id: None,
            name: name.into(),
            volume,
            location: location.into(),
            number_of_slots,
            occupied_slots: 0,
        };
        album.validate()?;
        Ok(album)
    }

    /// Checks the value rules of an album
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` describing the first violated rule
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("album name must not be blank"));
        }
        if self.volume == 0 {
            return Err(CoreError::validation("album volume must be positive"));
        }
        if self.number_of_slots == 0 {
            return Err(CoreError::validation("album must have at least one slot"));
        }
        if self.occupied_slots > self.number_of_slots {
            return Err(CoreError::validation(format!(
                "album occupies {} of {} slots",
                self.occupied_slots, self.number_of_slots
            )));
        }
        Ok(())
    }

    /// Returns the number of empty slots
    pub fn free_slots(&self) -> u32 {
        self.number_of_slots.saturating_sub(self.occupied_slots)
    }

    /// Returns true when no slot is left
    pub fn is_full(&self) -> bool {
        self.occupied_slots >= self.number_of_slots
    }

    /// Takes one slot for a coin
    ///
    /// Returns `false` and leaves the counter untouched if the album is full.
    pub fn occupy_slot(&mut self) -> bool {
        if self.is_full() {
            return false;
        }
        self.occupied_slots += 1;
        true
    }

    /// Gives back the slot of a removed coin
    ///
    /// The counter floors at zero; reaching the floor means the occupancy
    /// bookkeeping drifted and is reported with a warning.
    pub fn release_slot(&mut self) {
        if self.occupied_slots == 0 {
            tracing::warn!(album = %self, "Releasing a slot of an empty album");
            return;
        }
        self.occupied_slots -= 1;
    }
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vol. {}", self.name, self.volume)
    }
}

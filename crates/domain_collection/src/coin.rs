//! Coin entity and grading scale
//!
//! A coin occupies one slot of exactly one album. Two coins are "the same
//! coin" when their descriptive attributes match, see [`CoinKey`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{AlbumId, CoinId, CoreError};

/// Earliest minting year accepted; years are stored with four digits
pub const MIN_MINTING_YEAR: u16 = 1000;
/// Latest minting year accepted
pub const MAX_MINTING_YEAR: u16 = 9999;

/// Condition grade of a coin, ordered from lowest to highest
///
/// Uses the common eleven-step numismatic scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// Heavily worn, barely identifiable
    Poor,
    /// Identifiable, most detail gone
    Fair,
    AboutGood,
    Good,
    VeryGood,
    Fine,
    VeryFine,
    ExtremelyFine,
    AboutUncirculated,
    /// No trace of circulation wear
    Uncirculated,
    /// Specially struck collector piece
    Proof,
}

impl Grade {
    /// Every grade, lowest first
    pub const ALL: [Grade; 11] = [
        Grade::Poor,
        Grade::Fair,
        Grade::AboutGood,
        Grade::Good,
        Grade::VeryGood,
        Grade::Fine,
        Grade::VeryFine,
        Grade::ExtremelyFine,
        Grade::AboutUncirculated,
        Grade::Uncirculated,
        Grade::Proof,
    ];

    /// Returns the short grading code used for storage and display
    pub fn code(&self) -> &'static str {
        match self {
            Grade::Poor => "PO",
            Grade::Fair => "FR",
            Grade::AboutGood => "AG",
            Grade::Good => "G",
            Grade::VeryGood => "VG",
            Grade::Fine => "F",
            Grade::VeryFine => "VF",
            Grade::ExtremelyFine => "XF",
            Grade::AboutUncirculated => "AU",
            Grade::Uncirculated => "UNC",
            Grade::Proof => "PR",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Grade {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grade::ALL
            .iter()
            .copied()
            .find(|grade| grade.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::validation(format!("unknown grade code '{}'", s)))
    }
}

/// Natural key of a coin
///
/// No two coins may share the same key, independent of their ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoinKey {
    pub grade: Grade,
    pub country: String,
    pub minting_year: u16,
    pub description: String,
    pub note: String,
}

impl fmt::Display for CoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.country, self.minting_year, self.description, self.grade
        )?;
        if !self.note.is_empty() {
            write!(f, " [{}]", self.note)?;
        }
        Ok(())
    }
}

/// A coin placed in an album slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// Store-generated identifier, `None` until first persisted
    pub id: Option<CoinId>,
    pub grade: Grade,
    pub country: String,
    /// Four-digit minting year
    pub minting_year: u16,
    pub description: String,
    /// Free-form note, may be empty
    pub note: String,
    /// Album holding the coin
    pub album: AlbumId,
}

impl Coin {
    /// Creates a new, not yet persisted coin placed in `album`
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if country or description is blank or
    /// the year is not a four-digit year
    pub fn new(
        grade: Grade,
        country: impl Into<String>,
        minting_year: u16,
        description: impl Into<String>,
        note: impl Into<String>,
        album: AlbumId,
    ) -> Result<Self, CoreError> {
        let coin = Self {
            id: None,
            grade,
            country: country.into(),
            minting_year,
            description: description.into(),
            note: note.into(),
            album,
        };
        coin.validate()?;
        Ok(coin)
    }

    /// Checks the value rules of a coin
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` describing the first violated rule
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.country.trim().is_empty() {
            return Err(CoreError::validation("coin country must not be blank"));
        }
        if self.description.trim().is_empty() {
            return Err(CoreError::validation("coin description must not be blank"));
        }
        if !(MIN_MINTING_YEAR..=MAX_MINTING_YEAR).contains(&self.minting_year) {
            return Err(CoreError::validation(format!(
                "minting year {} is not a four-digit year",
                self.minting_year
            )));
        }
        Ok(())
    }

    /// Returns the natural key of this coin
    pub fn key(&self) -> CoinKey {
        CoinKey {
            grade: self.grade,
            country: self.country.clone(),
            minting_year: self.minting_year,
            description: self.description.clone(),
            note: self.note.clone(),
        }
    }

    /// Copies the descriptive attributes of `other`, keeping id and album
    pub fn describe_as(&mut self, other: &Coin) {
        self.grade = other.grade;
        self.country = other.country.clone();
        self.minting_year = other.minting_year;
        self.description = other.description.clone();
        self.note = other.note.clone();
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

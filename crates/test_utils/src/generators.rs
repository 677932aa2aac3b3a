//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use core_kernel::AlbumId;
use domain_collection::coin::{MAX_MINTING_YEAR, MIN_MINTING_YEAR};
use domain_collection::{Coin, CoinKey, Grade};
use proptest::prelude::*;

/// Strategy for generating any grade
pub fn grade_strategy() -> impl Strategy<Value = Grade> {
    proptest::sample::select(Grade::ALL.to_vec())
}

/// Strategy for generating a small set of issuing countries
pub fn country_strategy() -> impl Strategy<Value = String> {
    proptest::sample::select(vec!["Italy", "France", "Spain", "Germany", "Austria"])
        .prop_map(str::to_string)
}

/// Strategy for generating valid four-digit minting years
pub fn minting_year_strategy() -> impl Strategy<Value = u16> {
    MIN_MINTING_YEAR..=MAX_MINTING_YEAR
}

/// Strategy for generating non-blank descriptions
pub fn description_strategy() -> impl Strategy<Value = String> {
    "[0-9]{1,3} (lire|franc|pesetas|euro|schilling)"
}

/// Strategy for generating optional notes, empty half of the time
pub fn note_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z]{3,10}"]
}

/// Strategy for generating valid coin natural keys
pub fn coin_key_strategy() -> impl Strategy<Value = CoinKey> {
    (
        grade_strategy(),
        country_strategy(),
        minting_year_strategy(),
        description_strategy(),
        note_strategy(),
    )
        .prop_map(|(grade, country, minting_year, description, note)| CoinKey {
            grade,
            country,
            minting_year,
            description,
            note,
        })
}

/// Builds an unsaved coin with the given key held by `album`
pub fn coin_from_key(key: CoinKey, album: AlbumId) -> Coin {
    Coin {
        id: None,
        grade: key.grade,
        country: key.country,
        minting_year: key.minting_year,
        description: key.description,
        note: key.note,
        album,
    }
}

//! Album and coin identifiers
//!
//! Both are uuid newtypes so an album id can never be passed where a coin id
//! is expected. Ids are opaque to callers: the store generates one on first
//! persist and everything else only carries it around. The display form adds
//! a kind tag (`ALB-…`, `COIN-…`) for logs; the bare uuid is what gets stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Allocates a fresh id; v7 uuids sort by creation time
            pub fn generate() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Kind tag used in the display form
            pub fn prefix() -> &'static str {
                $tag
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $tag, self.0)
            }
        }

        /// Accepts the tagged display form or a bare uuid
        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($tag, "-")).unwrap_or(s);
                Uuid::parse_str(raw).map(Self).map_err(|e| {
                    CoreError::validation(format!("invalid {} '{}': {}", stringify!($name), s, e))
                })
            }
        }
    };
}

entity_id!(
    /// Identifies a stored album
    AlbumId,
    "ALB"
);
entity_id!(
    /// Identifies a stored coin
    CoinId,
    "COIN"
);

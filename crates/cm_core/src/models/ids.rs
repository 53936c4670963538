//! Numeric identifiers for season entities.
//!
//! All ids are plain `u32` newtypes so that they order, hash and serialize
//! deterministically (save files and replay audits depend on stable ordering).

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn value(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }
    };
}

numeric_id!(
    /// Club identity.
    TeamId,
    "T"
);
numeric_id!(
    /// Player identity, unique across clubs and the free-agent pool.
    PlayerId,
    "P"
);
numeric_id!(
    /// Fixture identity, assigned sequentially by the calendar.
    FixtureId,
    "F"
);
numeric_id!(ListingId, "L");
numeric_id!(BidId, "B");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(TeamId(3).to_string(), "T3");
        assert_eq!(PlayerId(12).to_string(), "P12");
        assert_eq!(FixtureId(0).to_string(), "F0");
        assert_eq!(BidId(7).to_string(), "B7");
    }

    #[test]
    fn test_transparent_serde() {
        let json = serde_json::to_string(&TeamId(42)).unwrap();
        assert_eq!(json, "42");
        let back: TeamId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TeamId(42));
    }
}

//! Identity types for host-owned entities
//!
//! The host hands out stable numeric identities for pawns, beds, rooms and
//! maps. The engine only ever stores these handles; the entities themselves
//! live in [`HouseholdState`](crate::models::state::HouseholdState).
//!
//! Ordinals matter: the final ranking tie-break prefers the lower bed id, and
//! every ordered container in the crate iterates in id order so repeated runs
//! over identical inputs make identical decisions.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw ordinal assigned by the host
            pub fn ordinal(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Identity of a pawn (agent)
    PawnId,
    "pawn#"
);

entity_id!(
    /// Identity of a bed
    BedId,
    "bed#"
);

entity_id!(
    /// Identity of a room
    RoomId,
    "room#"
);

entity_id!(
    /// Identity of a map (a settlement or any other location a pawn can be on)
    MapId,
    "map#"
);

//! Domain models for the bed assignment engine

pub mod bed;
pub mod event;
pub mod ids;
pub mod pawn;
pub mod room;
pub mod state;

// Re-exports
pub use bed::{Bed, BedStats, Designation};
pub use event::{Event, EventLog};
pub use ids::{BedId, MapId, PawnId, RoomId};
pub use pawn::{Faction, Pawn, PawnStatus, Thought, ThoughtKind, TraitKind};
pub use room::{ImpressivenessScale, Room};
pub use state::{AssignmentError, HouseholdState};

//! Bed Assign Core - Rust Engine
//!
//! Automatic bed reassignment for a colony household with deterministic
//! decisions.
//!
//! # Architecture
//!
//! - **models**: Domain types (Pawn, Bed, Room, HouseholdState, Event)
//! - **host**: Host compatibility rules the engine consumes
//! - **eligibility**: Which pawns and beds take part at all
//! - **registry**: Forced assignments and unusable-bed markers
//! - **ranking**: Bed comparison cascade with hysteresis
//! - **claim**: Claim/unclaim protocol, the only path to occupancy changes
//! - **policy**: The ordered reassignment pipeline
//! - **engine**: Host-facing entry point
//! - **scenario**: JSON household descriptions
//!
//! # Critical Invariants
//!
//! 1. No bed ever has more owners than sleeping slots
//! 2. Identical inputs produce identical decisions (ordered collections,
//!    stable tie-breaks)
//! 3. Every occupancy change goes through the claim protocol

// Module declarations
pub mod claim;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod host;
pub mod models;
pub mod policy;
pub mod ranking;
pub mod registry;
pub mod scenario;

// Re-exports for convenience
pub use claim::{try_claim, try_unclaim, ClaimOutcome, ClaimRejection, MakeSpace, UnclaimRejection};
pub use config::{ConfigError, ReassignmentSettings};
pub use engine::{BedAssigner, PassResult};
pub use host::{HostRules, RuleTable};
pub use models::{
    bed::Bed,
    event::{Event, EventLog},
    ids::{BedId, MapId, PawnId, RoomId},
    pawn::Pawn,
    state::{AssignmentError, HouseholdState},
};
pub use policy::{PenaltyKind, PolicyContext, PolicyError};
pub use ranking::{compare_beds, is_better_than, sorted_candidates, Preference, SortOrder};
pub use registry::{OverrideRegistry, RegistrySnapshot, Toggle, ToggleKind};
pub use scenario::{Scenario, ScenarioError};

//! Reassignment Policy
//!
//! The ordered rule pipeline run once per pawn when it seeks rest.
//!
//! # Pipeline
//!
//! ```text
//! off-map release ─▶ forced bed ─▶ Jealous ─▶ Greedy ─▶ Ascetic
//!       ─▶ better bed ─▶ partner separation ─▶ shared bed
//! ```
//!
//! Each step either changes occupancy and ends the pipeline, or falls
//! through. Skipped steps (toggle off, thought or trait absent, no partner)
//! never mutate and never notify.
//!
//! # Modules
//!
//! - [`penalty`]: static table of mood-penalty rules
//! - [`search`]: better-bed search shared by the penalty and better-bed
//!   steps, including joint claims with rollback
//! - [`partner`]: lover lookup, partner-separation and shared-bed rules
//! - [`pipeline`]: the ordered pipeline itself

pub mod partner;
pub mod penalty;
pub mod pipeline;
pub mod search;

use crate::claim::UnclaimRejection;
use crate::config::ReassignmentSettings;
use crate::host::HostRules;
use crate::models::{AssignmentError, HouseholdState, PawnId};
use crate::registry::OverrideRegistry;
use serde::Serialize;
use thiserror::Error;

pub use partner::Lovers;
pub use penalty::{PenaltyRule, PENALTY_RULES};
pub use pipeline::look_for_bed_reassignment;
pub use search::{claim_together, SearchOutcome, SearchRequest};

/// Mood penalties the pipeline tries to avoid by moving a pawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyKind {
    Jealous,
    Greedy,
    Ascetic,
}

impl PenaltyKind {
    pub fn label(self) -> &'static str {
        match self {
            PenaltyKind::Jealous => "Jealous",
            PenaltyKind::Greedy => "Greedy",
            PenaltyKind::Ascetic => "Ascetic",
        }
    }

    /// Whether avoiding the penalty means a better or a worse room
    pub fn direction_word(self) -> &'static str {
        match self {
            PenaltyKind::Ascetic => "worse",
            PenaltyKind::Jealous | PenaltyKind::Greedy => "better",
        }
    }
}

/// Unexpected failures inside one pipeline run
///
/// Normal negative outcomes (a claim that does not fit) are not errors.
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("Unknown pawn {0}")]
    UnknownPawn(PawnId),

    #[error("Assignment error: {0}")]
    Assignment(#[from] AssignmentError),

    #[error("Release failed: {0}")]
    Release(#[from] UnclaimRejection),
}

/// Everything one pipeline run reads and mutates
pub struct PolicyContext<'a> {
    pub state: &'a mut HouseholdState,
    pub registry: &'a mut OverrideRegistry,
    pub rules: &'a dyn HostRules,
    pub settings: &'a ReassignmentSettings,
}

impl<'a> PolicyContext<'a> {
    pub fn new(
        state: &'a mut HouseholdState,
        registry: &'a mut OverrideRegistry,
        rules: &'a dyn HostRules,
        settings: &'a ReassignmentSettings,
    ) -> Self {
        Self {
            state,
            registry,
            rules,
            settings,
        }
    }
}

//! Mood-penalty rules
//!
//! One table entry per penalty, evaluated in table order. Each entry bundles
//! its settings toggle, trigger thought, required trait, candidate order,
//! bed predicate and the owner traits whose beds are left alone.

use crate::config::ReassignmentSettings;
use crate::eligibility::pawn_eligible;
use crate::models::{BedId, HouseholdState, Pawn, Thought, ThoughtKind, TraitKind};
use crate::policy::PenaltyKind;
use crate::ranking::SortOrder;

/// Does moving the pawn to this bed avoid the penalty
pub type BedPredicate = fn(&HouseholdState, &Pawn, &Thought, BedId) -> bool;

pub struct PenaltyRule {
    pub kind: PenaltyKind,
    pub thought: ThoughtKind,
    pub required_trait: TraitKind,
    pub order: SortOrder,
    pub excluded_owner_traits: &'static [TraitKind],
    /// A mutual lover must carry the same thought, or the rule is skipped
    pub lover_shares_thought: bool,
    pub enabled: fn(&ReassignmentSettings) -> bool,
    pub satisfies: BedPredicate,
}

impl PenaltyRule {
    /// Gate check before any search: toggle on, pawn suffering the thought,
    /// and the partner requirement met
    pub fn triggered<'p>(
        &self,
        settings: &ReassignmentSettings,
        pawn: &'p Pawn,
        lover: Option<&Pawn>,
    ) -> Option<&'p Thought> {
        if !(self.enabled)(settings) {
            return None;
        }
        let thought = pawn.suffering_from(&self.thought)?;
        if self.lover_shares_thought {
            if let Some(lover) = lover {
                lover.thought(&self.thought)?;
            }
        }
        Some(thought)
    }
}

pub static PENALTY_RULES: [PenaltyRule; 3] = [
    PenaltyRule {
        kind: PenaltyKind::Jealous,
        thought: ThoughtKind::Jealous,
        required_trait: TraitKind::Jealous,
        order: SortOrder::Descending,
        excluded_owner_traits: &[TraitKind::Jealous],
        lover_shares_thought: false,
        enabled: |settings| settings.avoid_jealous_penalty,
        satisfies: not_outclassed,
    },
    PenaltyRule {
        kind: PenaltyKind::Greedy,
        thought: ThoughtKind::Greedy,
        required_trait: TraitKind::Greedy,
        order: SortOrder::Descending,
        excluded_owner_traits: &[TraitKind::Jealous, TraitKind::Greedy],
        lover_shares_thought: false,
        enabled: |settings| settings.avoid_greedy_penalty,
        satisfies: improves_stage,
    },
    PenaltyRule {
        kind: PenaltyKind::Ascetic,
        thought: ThoughtKind::Ascetic,
        required_trait: TraitKind::Ascetic,
        order: SortOrder::Ascending,
        excluded_owner_traits: &[TraitKind::Ascetic],
        lover_shares_thought: true,
        enabled: |settings| settings.avoid_ascetic_penalty,
        satisfies: improves_stage,
    },
];

/// No colonist on the pawn's map owns a room that beats the bed's room by
/// 10% of the bed's impressiveness or more
pub fn not_outclassed(state: &HouseholdState, pawn: &Pawn, _thought: &Thought, bed: BedId) -> bool {
    let Some(map) = pawn.map() else {
        return false;
    };
    let impressiveness = state.bed_impressiveness(bed);
    let margin = (impressiveness * 0.1).abs();
    state
        .pawns_on_map(map)
        .filter(|p| pawn_eligible(p))
        .all(|p| state.owned_room_impressiveness(p.id()) - impressiveness < margin)
}

/// The thought stage the bed's room would put the pawn in has a higher mood
/// effect than the current one
pub fn improves_stage(state: &HouseholdState, _pawn: &Pawn, thought: &Thought, bed: BedId) -> bool {
    let stage = state.scale().stage_index(state.bed_impressiveness(bed)) + 1;
    thought
        .stage_effect(stage)
        .map(|effect| effect > thought.mood_effect)
        .unwrap_or(false)
}

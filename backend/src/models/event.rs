//! Reassignment notifications
//!
//! Every affirmative pipeline outcome produces exactly one [`Event`]. Events
//! carry the ids of every pawn involved so a UI can highlight them; the
//! rendered message text is informational only.
//!
//! # Example
//!
//! ```rust
//! use bed_assign_core_rs::models::{BedId, Event, PawnId};
//!
//! let event = Event::UnclaimedOffMap {
//!     tick: 10,
//!     pawn: PawnId(1),
//!     bed: BedId(4),
//! };
//!
//! assert_eq!(event.tick(), 10);
//! assert_eq!(event.pawns(), vec![PawnId(1)]);
//! ```

use crate::models::ids::{BedId, PawnId};
use crate::models::state::HouseholdState;
use crate::policy::PenaltyKind;
use serde::Serialize;

/// A reassignment the engine performed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Pawn released a bed that is on a different map
    UnclaimedOffMap { tick: u64, pawn: PawnId, bed: BedId },

    /// Pawn moved into its forced bed, possibly evicting other owners
    ClaimedForcedBed {
        tick: u64,
        pawn: PawnId,
        bed: BedId,
        evicted: Vec<PawnId>,
    },

    /// Pawn (and mutual lover, if any) moved to dodge a room-quality penalty
    AvoidedPenalty {
        tick: u64,
        penalty: PenaltyKind,
        pawn: PawnId,
        partner: Option<PawnId>,
        bed: BedId,
    },

    /// Pawn (and mutual lover, if any) moved to a strictly better bed
    ClaimedBetterBed {
        tick: u64,
        pawn: PawnId,
        partner: Option<PawnId>,
        bed: BedId,
    },

    /// Pawn joined its lover's bed
    ClaimedLoverBed {
        tick: u64,
        pawn: PawnId,
        lover: PawnId,
        bed: BedId,
        one_sided: bool,
    },

    /// Mutual lovers claimed a bed together, possibly evicting its owners
    LoversClaimedBed {
        tick: u64,
        pawn: PawnId,
        lover: PawnId,
        bed: BedId,
        evicted: Vec<PawnId>,
    },

    /// Pawn released a bed it was sharing with a non-partner
    UnclaimedSharedBed { tick: u64, pawn: PawnId, bed: BedId },
}

impl Event {
    pub fn tick(&self) -> u64 {
        match self {
            Event::UnclaimedOffMap { tick, .. } => *tick,
            Event::ClaimedForcedBed { tick, .. } => *tick,
            Event::AvoidedPenalty { tick, .. } => *tick,
            Event::ClaimedBetterBed { tick, .. } => *tick,
            Event::ClaimedLoverBed { tick, .. } => *tick,
            Event::LoversClaimedBed { tick, .. } => *tick,
            Event::UnclaimedSharedBed { tick, .. } => *tick,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Event::UnclaimedOffMap { .. } => "UnclaimedOffMap",
            Event::ClaimedForcedBed { .. } => "ClaimedForcedBed",
            Event::AvoidedPenalty { .. } => "AvoidedPenalty",
            Event::ClaimedBetterBed { .. } => "ClaimedBetterBed",
            Event::ClaimedLoverBed { .. } => "ClaimedLoverBed",
            Event::LoversClaimedBed { .. } => "LoversClaimedBed",
            Event::UnclaimedSharedBed { .. } => "UnclaimedSharedBed",
        }
    }

    /// Pawn whose rest-seeking triggered the event
    pub fn pawn(&self) -> PawnId {
        match self {
            Event::UnclaimedOffMap { pawn, .. }
            | Event::ClaimedForcedBed { pawn, .. }
            | Event::AvoidedPenalty { pawn, .. }
            | Event::ClaimedBetterBed { pawn, .. }
            | Event::ClaimedLoverBed { pawn, .. }
            | Event::LoversClaimedBed { pawn, .. }
            | Event::UnclaimedSharedBed { pawn, .. } => *pawn,
        }
    }

    pub fn bed(&self) -> BedId {
        match self {
            Event::UnclaimedOffMap { bed, .. }
            | Event::ClaimedForcedBed { bed, .. }
            | Event::AvoidedPenalty { bed, .. }
            | Event::ClaimedBetterBed { bed, .. }
            | Event::ClaimedLoverBed { bed, .. }
            | Event::LoversClaimedBed { bed, .. }
            | Event::UnclaimedSharedBed { bed, .. } => *bed,
        }
    }

    /// Every pawn involved, triggering pawn first
    pub fn pawns(&self) -> Vec<PawnId> {
        let mut pawns = vec![self.pawn()];
        match self {
            Event::ClaimedForcedBed { evicted, .. } => pawns.extend(evicted),
            Event::AvoidedPenalty { partner, .. } | Event::ClaimedBetterBed { partner, .. } => {
                pawns.extend(partner)
            }
            Event::ClaimedLoverBed { lover, .. } => pawns.push(*lover),
            Event::LoversClaimedBed { lover, evicted, .. } => {
                pawns.push(*lover);
                pawns.extend(evicted);
            }
            Event::UnclaimedOffMap { .. } | Event::UnclaimedSharedBed { .. } => {}
        }
        pawns
    }

    pub fn involves(&self, pawn: PawnId) -> bool {
        self.pawns().contains(&pawn)
    }

    /// Human-readable notification text
    pub fn message(&self, state: &HouseholdState) -> String {
        let name = |id: PawnId| state.pawn_name(id);
        match self {
            Event::UnclaimedOffMap { pawn, .. } => {
                format!("{} unclaimed their bed due to being off-map.", name(*pawn))
            }
            Event::ClaimedForcedBed { pawn, evicted, .. } => {
                if evicted.is_empty() {
                    format!("{} claimed their forced bed.", name(*pawn))
                } else {
                    format!(
                        "{} claimed their forced bed, displacing {}.",
                        name(*pawn),
                        join_names(state, evicted)
                    )
                }
            }
            Event::AvoidedPenalty {
                penalty,
                pawn,
                partner,
                ..
            } => {
                let direction = penalty.direction_word();
                match partner {
                    Some(partner) => format!(
                        "Lovers {} and {} claimed a {} bed together so {} could avoid the {} mood penalty.",
                        name(*pawn),
                        name(*partner),
                        direction,
                        name(*pawn),
                        penalty.label()
                    ),
                    None => format!(
                        "{} claimed a {} bed to avoid the {} mood penalty.",
                        name(*pawn),
                        direction,
                        penalty.label()
                    ),
                }
            }
            Event::ClaimedBetterBed { pawn, partner, .. } => match partner {
                Some(partner) => format!(
                    "Lovers {} and {} claimed a better empty bed together.",
                    name(*pawn),
                    name(*partner)
                ),
                None => format!("{} claimed a better empty bed.", name(*pawn)),
            },
            Event::ClaimedLoverBed {
                pawn,
                lover,
                one_sided,
                ..
            } => {
                if *one_sided {
                    format!(
                        "{} claimed the bed of their polyamorous lover {}.",
                        name(*pawn),
                        name(*lover)
                    )
                } else {
                    format!("{} claimed the bed of their lover {}.", name(*pawn), name(*lover))
                }
            }
            Event::LoversClaimedBed {
                pawn,
                lover,
                evicted,
                ..
            } => {
                if evicted.is_empty() {
                    format!(
                        "Lovers {} and {} claimed an empty bed together.",
                        name(*pawn),
                        name(*lover)
                    )
                } else {
                    format!(
                        "Lovers {} and {} kicked {} out of their bed so they could claim it together.",
                        name(*pawn),
                        name(*lover),
                        join_names(state, evicted)
                    )
                }
            }
            Event::UnclaimedSharedBed { pawn, .. } => format!(
                "{} unclaimed their bed to avoid the bed sharing mood penalty.",
                name(*pawn)
            ),
        }
    }
}

fn join_names(state: &HouseholdState, pawns: &[PawnId]) -> String {
    pawns
        .iter()
        .map(|id| state.pawn_name(*id))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Ordered record of reassignment notifications
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Events that involve the pawn in any role
    pub fn events_for_pawn(&self, pawn: PawnId) -> Vec<&Event> {
        self.events.iter().filter(|e| e.involves(pawn)).collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

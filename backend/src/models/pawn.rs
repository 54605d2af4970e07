//! Pawn (agent) model
//!
//! A pawn is a simulated person that may own a bed. Everything here is a
//! precomputed host signal: traits, mood effects ("thoughts") and love
//! partners are read by the policy, never derived by it.
//!
//! The only fields the engine changes are the owned bed (through
//! [`HouseholdState::assign`](crate::models::state::HouseholdState::assign)),
//! the last-disturbance tick and the asleep flag.

use crate::models::ids::{BedId, MapId, PawnId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Faction a pawn belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// The controlling (player) faction
    #[default]
    Player,
    /// Any other faction
    Other,
}

/// Social status of a pawn within its faction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PawnStatus {
    /// Free colonist
    #[default]
    Free,
    Slave,
    Prisoner,
    Guest,
}

/// Behavioral traits the policy reacts to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitKind {
    Jealous,
    Greedy,
    Ascetic,
    /// Any trait the policy does not care about
    Other(String),
}

/// Mood effect definitions the policy reacts to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtKind {
    /// Someone else has a more impressive bedroom
    Jealous,
    /// Own bedroom is not impressive enough
    Greedy,
    /// Own bedroom is too impressive
    Ascetic,
    /// Sleeping apart from a spouse or lover
    WantToSleepWithPartner,
    /// Sharing a bed with someone who is not a partner
    SharedBed,
    Other(String),
}

/// An active mood effect on a pawn
///
/// `mood_effect` is the signed value of the stage the pawn is currently in.
/// `stage_effects` is the full stage table of the thought's definition, as
/// the host reports it; room-quality rules use it to predict the mood value
/// a different bedroom would produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thought {
    pub kind: ThoughtKind,
    pub mood_effect: f64,
    #[serde(default)]
    pub stage_effects: Vec<f64>,
}

impl Thought {
    pub fn new(kind: ThoughtKind, mood_effect: f64) -> Self {
        Self {
            kind,
            mood_effect,
            stage_effects: Vec::new(),
        }
    }

    /// Attach the definition's stage table
    pub fn with_stages(mut self, stage_effects: Vec<f64>) -> Self {
        self.stage_effects = stage_effects;
        self
    }

    /// A thought only counts as a penalty while its current effect is negative
    pub fn is_penalty(&self) -> bool {
        self.mood_effect < 0.0
    }

    /// Mood effect of the given stage, if the definition has one
    pub fn stage_effect(&self, stage: usize) -> Option<f64> {
        self.stage_effects.get(stage).copied()
    }
}

fn default_true() -> bool {
    true
}

/// A simulated person that can own a bed
///
/// # Example
///
/// ```
/// use bed_assign_core_rs::models::{MapId, Pawn, PawnId, ThoughtKind, TraitKind, Thought};
///
/// let pawn = Pawn::new(PawnId(1), "Ayla", MapId(0))
///     .with_trait(TraitKind::Jealous)
///     .with_thought(Thought::new(ThoughtKind::Jealous, -8.0));
///
/// assert!(pawn.has_trait(&TraitKind::Jealous));
/// assert!(pawn.suffering_from(&ThoughtKind::Jealous).is_some());
/// assert!(pawn.owned_bed().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pawn {
    id: PawnId,
    name: String,

    /// Map the pawn is currently on; `None` while travelling off every map
    #[serde(default)]
    map: Option<MapId>,

    #[serde(default)]
    faction: Faction,

    #[serde(default)]
    status: PawnStatus,

    #[serde(default = "default_true")]
    humanlike: bool,

    /// Whether the pawn can own buildings at all
    #[serde(default = "default_true")]
    has_ownership: bool,

    #[serde(default)]
    traits: BTreeSet<TraitKind>,

    #[serde(default)]
    thoughts: Vec<Thought>,

    /// Love partners, most liked first
    #[serde(default)]
    lovers: Vec<PawnId>,

    /// Derived from bed owner lists when the household is assembled
    #[serde(skip)]
    owned_bed: Option<BedId>,

    #[serde(default)]
    last_disturbance_tick: Option<u64>,

    #[serde(default)]
    asleep: bool,
}

impl Pawn {
    /// Create a free, humanlike player colonist on `map`
    pub fn new(id: PawnId, name: impl Into<String>, map: MapId) -> Self {
        Self {
            id,
            name: name.into(),
            map: Some(map),
            faction: Faction::Player,
            status: PawnStatus::Free,
            humanlike: true,
            has_ownership: true,
            traits: BTreeSet::new(),
            thoughts: Vec::new(),
            lovers: Vec::new(),
            owned_bed: None,
            last_disturbance_tick: None,
            asleep: false,
        }
    }

    pub fn with_trait(mut self, kind: TraitKind) -> Self {
        self.traits.insert(kind);
        self
    }

    pub fn with_thought(mut self, thought: Thought) -> Self {
        self.thoughts.push(thought);
        self
    }

    /// Append a love partner; call in descending order of opinion
    pub fn with_lover(mut self, lover: PawnId) -> Self {
        if !self.lovers.contains(&lover) {
            self.lovers.push(lover);
        }
        self
    }

    pub fn with_status(mut self, status: PawnStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_faction(mut self, faction: Faction) -> Self {
        self.faction = faction;
        self
    }

    pub fn non_humanlike(mut self) -> Self {
        self.humanlike = false;
        self
    }

    pub fn without_ownership(mut self) -> Self {
        self.has_ownership = false;
        self
    }

    pub fn asleep(mut self) -> Self {
        self.asleep = true;
        self
    }

    pub fn id(&self) -> PawnId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn map(&self) -> Option<MapId> {
        self.map
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn status(&self) -> PawnStatus {
        self.status
    }

    pub fn is_humanlike(&self) -> bool {
        self.humanlike
    }

    pub fn has_ownership(&self) -> bool {
        self.has_ownership
    }

    pub fn traits(&self) -> &BTreeSet<TraitKind> {
        &self.traits
    }

    pub fn has_trait(&self, kind: &TraitKind) -> bool {
        self.traits.contains(kind)
    }

    pub fn has_any_trait(&self, kinds: &[TraitKind]) -> bool {
        kinds.iter().any(|kind| self.traits.contains(kind))
    }

    pub fn thoughts(&self) -> &[Thought] {
        &self.thoughts
    }

    /// First active thought of the given kind, penalty or not
    pub fn thought(&self, kind: &ThoughtKind) -> Option<&Thought> {
        self.thoughts.iter().find(|t| &t.kind == kind)
    }

    /// The thought of the given kind, but only while its effect is negative
    pub fn suffering_from(&self, kind: &ThoughtKind) -> Option<&Thought> {
        self.thought(kind).filter(|t| t.is_penalty())
    }

    pub fn lovers(&self) -> &[PawnId] {
        &self.lovers
    }

    /// Whether a love relation links this pawn to `other` in either direction
    pub fn has_love_relation_with(&self, other: &Pawn) -> bool {
        self.lovers.contains(&other.id) || other.lovers.contains(&self.id)
    }

    pub fn owned_bed(&self) -> Option<BedId> {
        self.owned_bed
    }

    pub fn last_disturbance_tick(&self) -> Option<u64> {
        self.last_disturbance_tick
    }

    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    /// Host changed the pawn's standing, e.g. enslaved or released
    pub fn set_status(&mut self, status: PawnStatus) {
        self.status = status;
    }

    /// Move the pawn to another map, or off every map with `None`
    pub fn set_map(&mut self, map: Option<MapId>) {
        self.map = map;
    }

    pub fn set_asleep(&mut self, asleep: bool) {
        self.asleep = asleep;
    }

    /// Record a sleep disturbance and wake the pawn
    pub fn disturb(&mut self, tick: u64) {
        self.last_disturbance_tick = Some(tick);
        self.asleep = false;
    }

    pub(crate) fn set_owned_bed(&mut self, bed: Option<BedId>) {
        self.owned_bed = bed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pawn_defaults() {
        let pawn = Pawn::new(PawnId(1), "Ayla", MapId(0));
        assert_eq!(pawn.faction(), Faction::Player);
        assert_eq!(pawn.status(), PawnStatus::Free);
        assert!(pawn.is_humanlike());
        assert!(pawn.has_ownership());
        assert_eq!(pawn.map(), Some(MapId(0)));
    }

    #[test]
    fn test_positive_thought_is_not_suffering() {
        let pawn = Pawn::new(PawnId(1), "Ayla", MapId(0))
            .with_thought(Thought::new(ThoughtKind::Greedy, 3.0));
        assert!(pawn.thought(&ThoughtKind::Greedy).is_some());
        assert!(pawn.suffering_from(&ThoughtKind::Greedy).is_none());
    }

    #[test]
    fn test_love_relation_is_symmetric() {
        let a = Pawn::new(PawnId(1), "A", MapId(0)).with_lover(PawnId(2));
        let b = Pawn::new(PawnId(2), "B", MapId(0));
        assert!(a.has_love_relation_with(&b));
        assert!(b.has_love_relation_with(&a));
    }

    #[test]
    fn test_disturb_wakes() {
        let mut pawn = Pawn::new(PawnId(1), "A", MapId(0)).asleep();
        pawn.disturb(250);
        assert!(!pawn.is_asleep());
        assert_eq!(pawn.last_disturbance_tick(), Some(250));
    }

    #[test]
    fn test_stage_lookup() {
        let thought = Thought::new(ThoughtKind::Greedy, -6.0).with_stages(vec![-6.0, -3.0, 0.0]);
        assert_eq!(thought.stage_effect(1), Some(-3.0));
        assert_eq!(thought.stage_effect(5), None);
    }
}

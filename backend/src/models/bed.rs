//! Bed model
//!
//! A bed is a multi-slot sleeping resource. Its owner list is the shared
//! occupancy table the whole engine revolves around.
//!
//! # Critical Invariants
//!
//! 1. **Capacity**: `owners.len() <= slots` at all times
//! 2. **Consistency**: a pawn listed in `owners` has this bed as its owned bed
//! 3. **Single writer**: owners change only through `HouseholdState::assign`
//!    and `HouseholdState::unassign`

use crate::models::ids::{BedId, MapId, PawnId, RoomId};
use serde::{Deserialize, Serialize};

/// Pending orders on a bed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Designation {
    Deconstruct,
    Uninstall,
    Other(String),
}

impl Designation {
    /// Whether the order removes the bed from the map
    pub fn removes_building(&self) -> bool {
        matches!(self, Designation::Deconstruct | Designation::Uninstall)
    }
}

/// Per-bed stat values the ranking reads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BedStats {
    pub rest_effectiveness: f64,
    pub comfort: f64,
    pub beauty: f64,
}

impl Default for BedStats {
    fn default() -> Self {
        Self {
            rest_effectiveness: 1.0,
            comfort: 0.5,
            beauty: 0.0,
        }
    }
}

fn default_true() -> bool {
    true
}

/// A bed in the household
///
/// # Example
///
/// ```
/// use bed_assign_core_rs::models::{Bed, BedId, MapId, RoomId};
///
/// let bed = Bed::new(BedId(10), "Double bed", MapId(0), 2).in_room(RoomId(1));
/// assert_eq!(bed.slots(), 2);
/// assert_eq!(bed.free_slots(), 2);
/// assert!(!bed.is_designated_for_removal());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bed {
    id: BedId,
    label: String,

    #[serde(default)]
    map: Option<MapId>,

    /// Number of sleeping slots
    slots: usize,

    #[serde(default)]
    owners: Vec<PawnId>,

    #[serde(default)]
    room: Option<RoomId>,

    #[serde(default)]
    medical: bool,

    #[serde(default = "default_true")]
    for_colonists: bool,

    /// Bed category usable by humanlike pawns
    #[serde(default = "default_true")]
    humanlike: bool,

    /// Guest bed managed by a separate hospitality subsystem
    #[serde(default)]
    guest_bed: bool,

    #[serde(default)]
    designations: Vec<Designation>,

    #[serde(default)]
    stats: BedStats,
}

impl Bed {
    pub fn new(id: BedId, label: impl Into<String>, map: MapId, slots: usize) -> Self {
        Self {
            id,
            label: label.into(),
            map: Some(map),
            slots,
            owners: Vec::new(),
            room: None,
            medical: false,
            for_colonists: true,
            humanlike: true,
            guest_bed: false,
            designations: Vec::new(),
            stats: BedStats::default(),
        }
    }

    pub fn in_room(mut self, room: RoomId) -> Self {
        self.room = Some(room);
        self
    }

    pub fn medical(mut self) -> Self {
        self.medical = true;
        self
    }

    pub fn for_non_colonists(mut self) -> Self {
        self.for_colonists = false;
        self
    }

    pub fn guest_bed(mut self) -> Self {
        self.guest_bed = true;
        self
    }

    pub fn non_humanlike(mut self) -> Self {
        self.humanlike = false;
        self
    }

    pub fn with_stats(mut self, rest_effectiveness: f64, comfort: f64, beauty: f64) -> Self {
        self.stats = BedStats {
            rest_effectiveness,
            comfort,
            beauty,
        };
        self
    }

    pub fn with_designation(mut self, designation: Designation) -> Self {
        self.designations.push(designation);
        self
    }

    pub fn id(&self) -> BedId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn map(&self) -> Option<MapId> {
        self.map
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    pub fn owners(&self) -> &[PawnId] {
        &self.owners
    }

    pub fn is_owned_by(&self, pawn: PawnId) -> bool {
        self.owners.contains(&pawn)
    }

    pub fn free_slots(&self) -> usize {
        self.slots.saturating_sub(self.owners.len())
    }

    pub fn has_free_slot(&self) -> bool {
        self.owners.len() < self.slots
    }

    pub fn room(&self) -> Option<RoomId> {
        self.room
    }

    pub fn is_medical(&self) -> bool {
        self.medical
    }

    pub fn is_for_colonists(&self) -> bool {
        self.for_colonists
    }

    pub fn is_humanlike(&self) -> bool {
        self.humanlike
    }

    pub fn is_guest_bed(&self) -> bool {
        self.guest_bed
    }

    pub fn designations(&self) -> &[Designation] {
        &self.designations
    }

    /// Pending deconstruct or uninstall order
    pub fn is_designated_for_removal(&self) -> bool {
        self.designations.iter().any(Designation::removes_building)
    }

    pub fn stats(&self) -> BedStats {
        self.stats
    }

    pub fn set_medical(&mut self, medical: bool) {
        self.medical = medical;
    }

    pub fn set_room(&mut self, room: Option<RoomId>) {
        self.room = room;
    }

    pub fn set_stats(&mut self, stats: BedStats) {
        self.stats = stats;
    }

    pub fn add_designation(&mut self, designation: Designation) {
        self.designations.push(designation);
    }

    pub fn clear_designations(&mut self) {
        self.designations.clear();
    }

    pub(crate) fn push_owner(&mut self, pawn: PawnId) {
        self.owners.push(pawn);
    }

    pub(crate) fn remove_owner(&mut self, pawn: PawnId) -> bool {
        let before = self.owners.len();
        self.owners.retain(|owner| *owner != pawn);
        self.owners.len() != before
    }

    pub(crate) fn take_owners(&mut self) -> Vec<PawnId> {
        std::mem::take(&mut self.owners)
    }
}

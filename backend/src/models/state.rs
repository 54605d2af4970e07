//! Household State
//!
//! In-memory rendition of the host world the engine consults: pawns, beds,
//! rooms, the impressiveness scale and the current tick.
//!
//! # Critical Invariants
//!
//! 1. **Capacity**: no bed ever has more owners than sleeping slots
//! 2. **Consistency**: `pawn.owned_bed() == Some(bed)` iff `bed.owners()` lists the pawn
//! 3. **Single assignment**: a pawn owns at most one bed
//! 4. **Determinism**: all collections are ordered by id, so every scan the
//!    engine performs visits entities in the same order on every run
//!
//! [`assign`](HouseholdState::assign) and [`unassign`](HouseholdState::unassign)
//! are the host's occupancy mutation primitives. The policy reaches them only
//! through the claim protocol in [`crate::claim`].

use crate::models::bed::Bed;
use crate::models::ids::{BedId, MapId, PawnId, RoomId};
use crate::models::pawn::Pawn;
use crate::models::room::{ImpressivenessScale, Room};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by the host occupancy primitives
#[derive(Debug, Error, PartialEq)]
pub enum AssignmentError {
    #[error("Unknown pawn {0}")]
    UnknownPawn(PawnId),

    #[error("Unknown bed {0}")]
    UnknownBed(BedId),

    #[error("Bed {bed} is full ({slots} slot(s))")]
    BedFull { bed: BedId, slots: usize },

    #[error("Bed {0} is a medical bed and cannot be owned")]
    MedicalBed(BedId),

    #[error("Pawn {pawn} is listed as owner of both {first} and {second}")]
    DuplicateOwner {
        pawn: PawnId,
        first: BedId,
        second: BedId,
    },
}

/// Complete household state
///
/// # Example
///
/// ```rust
/// use bed_assign_core_rs::models::{Bed, BedId, HouseholdState, MapId, Pawn, PawnId};
///
/// let mut state = HouseholdState::new();
/// state.add_pawn(Pawn::new(PawnId(1), "Ayla", MapId(0)));
/// state.add_bed(Bed::new(BedId(10), "Bed", MapId(0), 1));
///
/// state.assign(PawnId(1), BedId(10)).unwrap();
/// assert_eq!(state.pawn(PawnId(1)).unwrap().owned_bed(), Some(BedId(10)));
/// assert!(state.occupancy_consistent());
/// ```
#[derive(Debug, Clone, Default)]
pub struct HouseholdState {
    tick: u64,
    pawns: BTreeMap<PawnId, Pawn>,
    beds: BTreeMap<BedId, Bed>,
    rooms: BTreeMap<RoomId, Room>,
    scale: ImpressivenessScale,
}

impl HouseholdState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a household from host data, honoring each bed's owner list
    ///
    /// Owners are seated in bed id order; owners beyond a bed's capacity,
    /// owners that do not exist and pawns listed by more than one bed are
    /// reported as errors.
    pub fn from_parts(
        pawns: Vec<Pawn>,
        beds: Vec<Bed>,
        rooms: Vec<Room>,
    ) -> Result<Self, AssignmentError> {
        let mut state = Self::new();
        for room in rooms {
            state.add_room(room);
        }
        for pawn in pawns {
            state.add_pawn(pawn);
        }
        let mut seats = Vec::new();
        for mut bed in beds {
            for owner in bed.take_owners() {
                seats.push((owner, bed.id()));
            }
            state.add_bed(bed);
        }
        for (pawn, bed) in seats {
            if let Some(existing) = state.pawn(pawn).and_then(Pawn::owned_bed) {
                if existing != bed {
                    return Err(AssignmentError::DuplicateOwner {
                        pawn,
                        first: existing,
                        second: bed,
                    });
                }
            }
            state.assign(pawn, bed)?;
        }
        Ok(state)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    pub fn advance_tick(&mut self, ticks: u64) {
        self.tick += ticks;
    }

    pub fn scale(&self) -> &ImpressivenessScale {
        &self.scale
    }

    pub fn set_scale(&mut self, scale: ImpressivenessScale) {
        self.scale = scale;
    }

    /// Add a pawn; any owned bed it claims to have is ignored
    pub fn add_pawn(&mut self, mut pawn: Pawn) {
        pawn.set_owned_bed(None);
        self.pawns.insert(pawn.id(), pawn);
    }

    /// Add an empty bed; owners are seated with [`assign`](Self::assign)
    pub fn add_bed(&mut self, mut bed: Bed) {
        bed.take_owners();
        self.beds.insert(bed.id(), bed);
    }

    pub fn add_room(&mut self, room: Room) {
        self.rooms.insert(room.id, room);
    }

    /// Host destroyed a pawn; its bed slot is released
    pub fn remove_pawn(&mut self, id: PawnId) -> Option<Pawn> {
        let pawn = self.pawns.remove(&id)?;
        if let Some(bed) = pawn.owned_bed().and_then(|bed| self.beds.get_mut(&bed)) {
            bed.remove_owner(id);
        }
        Some(pawn)
    }

    /// Host destroyed a bed; its owners become unassigned
    pub fn remove_bed(&mut self, id: BedId) -> Option<Bed> {
        let mut bed = self.beds.remove(&id)?;
        for owner in bed.take_owners() {
            if let Some(pawn) = self.pawns.get_mut(&owner) {
                pawn.set_owned_bed(None);
            }
        }
        Some(bed)
    }

    pub fn pawn(&self, id: PawnId) -> Option<&Pawn> {
        self.pawns.get(&id)
    }

    pub fn pawn_mut(&mut self, id: PawnId) -> Option<&mut Pawn> {
        self.pawns.get_mut(&id)
    }

    pub fn bed(&self, id: BedId) -> Option<&Bed> {
        self.beds.get(&id)
    }

    pub fn bed_mut(&mut self, id: BedId) -> Option<&mut Bed> {
        self.beds.get_mut(&id)
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(&id)
    }

    pub fn pawns(&self) -> impl Iterator<Item = &Pawn> {
        self.pawns.values()
    }

    pub fn beds(&self) -> impl Iterator<Item = &Bed> {
        self.beds.values()
    }

    pub fn pawn_ids(&self) -> Vec<PawnId> {
        self.pawns.keys().copied().collect()
    }

    pub fn num_pawns(&self) -> usize {
        self.pawns.len()
    }

    pub fn num_beds(&self) -> usize {
        self.beds.len()
    }

    pub fn beds_on_map(&self, map: MapId) -> impl Iterator<Item = &Bed> {
        self.beds.values().filter(move |bed| bed.map() == Some(map))
    }

    pub fn pawns_on_map(&self, map: MapId) -> impl Iterator<Item = &Pawn> {
        self.pawns.values().filter(move |pawn| pawn.map() == Some(map))
    }

    /// Room containing the bed, if the bed exists and sits in a known room
    pub fn room_of(&self, bed: BedId) -> Option<&Room> {
        self.bed(bed)
            .and_then(Bed::room)
            .and_then(|room| self.rooms.get(&room))
    }

    /// Impressiveness of the bed's room, 0 when it has none
    pub fn bed_impressiveness(&self, bed: BedId) -> f64 {
        self.room_of(bed).map(|room| room.impressiveness).unwrap_or(0.0)
    }

    /// Impressiveness of the room the pawn owns a bed in, 0 when none
    pub fn owned_room_impressiveness(&self, pawn: PawnId) -> f64 {
        self.pawn(pawn)
            .and_then(Pawn::owned_bed)
            .map(|bed| self.bed_impressiveness(bed))
            .unwrap_or(0.0)
    }

    /// Display name for messages; falls back to the id
    pub fn pawn_name(&self, id: PawnId) -> String {
        self.pawn(id)
            .map(|pawn| pawn.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// Seat `pawn` in `bed`, leaving any previous bed
    ///
    /// This is a single compare-and-set on occupancy: either the pawn ends up
    /// listed in `bed` and in no other bed, or nothing changes.
    ///
    /// # Returns
    ///
    /// The bed the pawn owned before, if any.
    pub fn assign(&mut self, pawn: PawnId, bed: BedId) -> Result<Option<BedId>, AssignmentError> {
        let previous = self
            .pawns
            .get(&pawn)
            .ok_or(AssignmentError::UnknownPawn(pawn))?
            .owned_bed();
        let target = self.beds.get(&bed).ok_or(AssignmentError::UnknownBed(bed))?;

        if previous == Some(bed) {
            return Ok(previous);
        }
        if target.is_medical() {
            return Err(AssignmentError::MedicalBed(bed));
        }
        if !target.has_free_slot() {
            return Err(AssignmentError::BedFull {
                bed,
                slots: target.slots(),
            });
        }

        if let Some(old) = previous.and_then(|old| self.beds.get_mut(&old)) {
            old.remove_owner(pawn);
        }
        if let Some(target) = self.beds.get_mut(&bed) {
            target.push_owner(pawn);
        }
        if let Some(p) = self.pawns.get_mut(&pawn) {
            p.set_owned_bed(Some(bed));
        }
        Ok(previous)
    }

    /// Release the pawn's bed
    ///
    /// # Returns
    ///
    /// The bed released, or `None` if the pawn owned nothing.
    pub fn unassign(&mut self, pawn: PawnId) -> Result<Option<BedId>, AssignmentError> {
        let owned = self
            .pawns
            .get(&pawn)
            .ok_or(AssignmentError::UnknownPawn(pawn))?
            .owned_bed();
        let Some(bed) = owned else {
            return Ok(None);
        };
        if let Some(b) = self.beds.get_mut(&bed) {
            b.remove_owner(pawn);
        }
        if let Some(p) = self.pawns.get_mut(&pawn) {
            p.set_owned_bed(None);
        }
        Ok(Some(bed))
    }

    /// Check capacity and owner/owned-bed consistency across the household
    pub fn occupancy_consistent(&self) -> bool {
        let beds_ok = self.beds.values().all(|bed| {
            bed.owners().len() <= bed.slots()
                && bed.owners().iter().all(|owner| {
                    self.pawns.get(owner).and_then(Pawn::owned_bed) == Some(bed.id())
                })
        });
        let pawns_ok = self.pawns.values().all(|pawn| match pawn.owned_bed() {
            Some(bed) => self
                .beds
                .get(&bed)
                .map(|b| b.is_owned_by(pawn.id()))
                .unwrap_or(false),
            None => true,
        });
        beds_ok && pawns_ok
    }

    /// Snapshot of every bed's owners, for determinism checks
    pub fn occupancy(&self) -> BTreeMap<BedId, Vec<PawnId>> {
        self.beds
            .values()
            .map(|bed| (bed.id(), bed.owners().to_vec()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pawns_one_bed(slots: usize) -> HouseholdState {
        let mut state = HouseholdState::new();
        state.add_pawn(Pawn::new(PawnId(1), "A", MapId(0)));
        state.add_pawn(Pawn::new(PawnId(2), "B", MapId(0)));
        state.add_bed(Bed::new(BedId(10), "Bed", MapId(0), slots));
        state
    }

    #[test]
    fn test_assign_respects_capacity() {
        let mut state = two_pawns_one_bed(1);
        assert_eq!(state.assign(PawnId(1), BedId(10)), Ok(None));
        assert_eq!(
            state.assign(PawnId(2), BedId(10)),
            Err(AssignmentError::BedFull {
                bed: BedId(10),
                slots: 1
            })
        );
        assert!(state.occupancy_consistent());
    }

    #[test]
    fn test_assign_moves_between_beds() {
        let mut state = two_pawns_one_bed(1);
        state.add_bed(Bed::new(BedId(11), "Other", MapId(0), 1));
        state.assign(PawnId(1), BedId(10)).unwrap();

        let previous = state.assign(PawnId(1), BedId(11)).unwrap();
        assert_eq!(previous, Some(BedId(10)));
        assert!(state.bed(BedId(10)).unwrap().owners().is_empty());
        assert!(state.occupancy_consistent());
    }

    #[test]
    fn test_assign_same_bed_is_noop() {
        let mut state = two_pawns_one_bed(1);
        state.assign(PawnId(1), BedId(10)).unwrap();
        assert_eq!(state.assign(PawnId(1), BedId(10)), Ok(Some(BedId(10))));
        assert_eq!(state.bed(BedId(10)).unwrap().owners(), &[PawnId(1)]);
    }

    #[test]
    fn test_medical_bed_rejected() {
        let mut state = two_pawns_one_bed(1);
        state.add_bed(Bed::new(BedId(12), "Hospital", MapId(0), 1).medical());
        assert_eq!(
            state.assign(PawnId(1), BedId(12)),
            Err(AssignmentError::MedicalBed(BedId(12)))
        );
    }

    #[test]
    fn test_remove_bed_unassigns_owners() {
        let mut state = two_pawns_one_bed(2);
        state.assign(PawnId(1), BedId(10)).unwrap();
        state.assign(PawnId(2), BedId(10)).unwrap();
        state.remove_bed(BedId(10));
        assert!(state.pawn(PawnId(1)).unwrap().owned_bed().is_none());
        assert!(state.occupancy_consistent());
    }

    #[test]
    fn test_from_parts_seats_owners() {
        let mut bed = Bed::new(BedId(10), "Bed", MapId(0), 2);
        bed.push_owner(PawnId(1));
        let state = HouseholdState::from_parts(
            vec![Pawn::new(PawnId(1), "A", MapId(0))],
            vec![bed],
            vec![Room::new(RoomId(1), 5.0)],
        )
        .unwrap();
        assert_eq!(state.pawn(PawnId(1)).unwrap().owned_bed(), Some(BedId(10)));
    }

    #[test]
    fn test_impressiveness_defaults_to_zero() {
        let state = two_pawns_one_bed(1);
        assert_eq!(state.bed_impressiveness(BedId(10)), 0.0);
        assert_eq!(state.owned_room_impressiveness(PawnId(1)), 0.0);
    }
}

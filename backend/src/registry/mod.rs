//! Override Registry
//!
//! The durable state of the engine: manual forced assignments (pawn → bed)
//! and the set of beds marked unusable for automatic ranking.
//!
//! # Critical Invariants
//!
//! 1. **Lazy purge**: every read that answers a policy question first drops
//!    entries that reference missing or ineligible pawns, missing beds, beds
//!    that fail [`bed_usable_ever`], and (forced table only) beds marked
//!    unusable
//! 2. **Deterministic order**: both tables are ordered by id, so snapshots
//!    and scans are reproducible
//! 3. **No capacity enforcement**: several pawns may force the same bed; the
//!    claim protocol decides who actually fits

pub mod snapshot;
pub mod toggles;

use crate::eligibility::{bed_usable_ever, bed_usable_now, pawn_eligible};
use crate::models::{BedId, HouseholdState, PawnId};
use std::collections::{BTreeMap, BTreeSet};

pub use snapshot::{ForcedEntry, RegistryError, RegistrySnapshot};
pub use toggles::{forced_assignment_toggles, unusable_toggle, Toggle, ToggleKind};

/// Forced assignments and unusable-bed markers
///
/// # Example
///
/// ```rust
/// use bed_assign_core_rs::models::{Bed, BedId, HouseholdState, MapId, Pawn, PawnId};
/// use bed_assign_core_rs::registry::OverrideRegistry;
///
/// let mut state = HouseholdState::new();
/// state.add_pawn(Pawn::new(PawnId(1), "Ayla", MapId(0)));
/// state.add_bed(Bed::new(BedId(10), "Bed", MapId(0), 1));
///
/// let mut registry = OverrideRegistry::new();
/// registry.set_forced(&state, PawnId(1), BedId(10));
/// assert_eq!(registry.forced_bed(&state, PawnId(1)), Some(BedId(10)));
///
/// // Destroying the bed orphans the entry; the next read drops it
/// state.remove_bed(BedId(10));
/// assert_eq!(registry.forced_bed(&state, PawnId(1)), None);
/// assert_eq!(registry.forced_len(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideRegistry {
    forced: BTreeMap<PawnId, BedId>,
    unusable: BTreeSet<BedId>,
}

impl OverrideRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw marker lookup, no purge
    pub fn is_marked_unusable(&self, bed: BedId) -> bool {
        self.unusable.contains(&bed)
    }

    /// Raw forced-table lookup, no purge and no map check
    pub fn forced_entry(&self, pawn: PawnId) -> Option<BedId> {
        self.forced.get(&pawn).copied()
    }

    pub fn forced_entries(&self) -> impl Iterator<Item = (PawnId, BedId)> + '_ {
        self.forced.iter().map(|(pawn, bed)| (*pawn, *bed))
    }

    pub fn unusable_beds(&self) -> impl Iterator<Item = BedId> + '_ {
        self.unusable.iter().copied()
    }

    pub fn forced_len(&self) -> usize {
        self.forced.len()
    }

    pub fn unusable_len(&self) -> usize {
        self.unusable.len()
    }

    /// Drop stale entries from both tables
    ///
    /// # Returns
    ///
    /// Number of entries removed.
    pub fn purge(&mut self, state: &HouseholdState) -> usize {
        let before = self.forced.len() + self.unusable.len();

        self.unusable
            .retain(|bed| state.bed(*bed).map(bed_usable_ever).unwrap_or(false));

        let unusable = &self.unusable;
        self.forced.retain(|pawn, bed| {
            let pawn_ok = state.pawn(*pawn).map(pawn_eligible).unwrap_or(false);
            let bed_ok = state.bed(*bed).map(bed_usable_ever).unwrap_or(false);
            pawn_ok && bed_ok && !unusable.contains(bed)
        });

        let removed = before - (self.forced.len() + self.unusable.len());
        if removed > 0 {
            tracing::debug!(removed, "purged stale registry entries");
        }
        removed
    }

    /// The pawn's forced bed, if the override is currently in force
    ///
    /// Requires the pawn to be eligible, the bed usable now and both on the
    /// same map.
    pub fn forced_bed(&mut self, state: &HouseholdState, pawn: PawnId) -> Option<BedId> {
        self.purge(state);
        let bed_id = *self.forced.get(&pawn)?;
        let pawn = state.pawn(pawn)?;
        let bed = state.bed(bed_id)?;
        let in_force = pawn_eligible(pawn)
            && bed_usable_now(bed, self)
            && pawn.map().is_some()
            && pawn.map() == bed.map();
        in_force.then_some(bed_id)
    }

    /// Pawns forced to `bed` and on the bed's map
    ///
    /// Empty when the bed itself is not usable now.
    pub fn forced_pawns(&mut self, state: &HouseholdState, bed: BedId) -> Vec<PawnId> {
        self.purge(state);
        let Some(target) = state.bed(bed) else {
            return Vec::new();
        };
        if !bed_usable_now(target, self) {
            return Vec::new();
        }
        self.forced
            .iter()
            .filter(|(_, forced)| **forced == bed)
            .filter(|(pawn, _)| {
                state
                    .pawn(**pawn)
                    .map(|p| p.map().is_some() && p.map() == target.map())
                    .unwrap_or(false)
            })
            .map(|(pawn, _)| *pawn)
            .collect()
    }

    /// Force `pawn` to `bed`, replacing any previous override
    ///
    /// # Returns
    ///
    /// Whether the entry survived validation.
    pub fn set_forced(&mut self, state: &HouseholdState, pawn: PawnId, bed: BedId) -> bool {
        self.forced.insert(pawn, bed);
        self.purge(state);
        self.forced.get(&pawn) == Some(&bed)
    }

    /// Remove the pawn's override
    ///
    /// # Returns
    ///
    /// Whether an entry was removed.
    pub fn clear_forced(&mut self, pawn: PawnId) -> bool {
        self.forced.remove(&pawn).is_some()
    }

    /// Flip the override of `pawn` to `bed`
    ///
    /// # Returns
    ///
    /// Whether the pawn is forced to `bed` afterwards.
    pub fn toggle_forced(&mut self, state: &HouseholdState, pawn: PawnId, bed: BedId) -> bool {
        if self.forced.get(&pawn) == Some(&bed) {
            self.forced.remove(&pawn);
            false
        } else {
            self.set_forced(state, pawn, bed)
        }
    }

    /// Exclude `bed` from automatic ranking
    ///
    /// Runs a purge pass, which also drops forced entries pointing at the bed.
    ///
    /// # Returns
    ///
    /// Whether the marker survived validation.
    pub fn mark_unusable(&mut self, state: &HouseholdState, bed: BedId) -> bool {
        self.unusable.insert(bed);
        self.purge(state);
        self.unusable.contains(&bed)
    }

    /// Lift the marker
    ///
    /// # Returns
    ///
    /// Whether a marker was removed.
    pub fn unmark_unusable(&mut self, state: &HouseholdState, bed: BedId) -> bool {
        let removed = self.unusable.remove(&bed);
        self.purge(state);
        removed
    }

    /// Flip the marker
    ///
    /// # Returns
    ///
    /// Whether the bed is marked afterwards.
    pub fn toggle_unusable(&mut self, state: &HouseholdState, bed: BedId) -> bool {
        if self.unusable.contains(&bed) {
            self.unmark_unusable(state, bed);
            false
        } else {
            self.mark_unusable(state, bed)
        }
    }

    pub(crate) fn insert_raw(&mut self, forced: Vec<(PawnId, BedId)>, unusable: Vec<BedId>) {
        self.forced.extend(forced);
        self.unusable.extend(unusable);
    }
}

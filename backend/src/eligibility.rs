//! Eligibility predicates
//!
//! Pure answers to "may this pawn or bed take part in reassignment at all".
//! Nothing here mutates state or reads anything beyond the entity itself,
//! the unusable-bed markers and the host rules.

use crate::host::HostRules;
use crate::models::{Bed, Faction, Pawn, PawnStatus};
use crate::registry::OverrideRegistry;

/// Free, humanlike player colonist that can own a bed
pub fn pawn_eligible(pawn: &Pawn) -> bool {
    pawn.has_ownership()
        && pawn.faction() == Faction::Player
        && pawn.status() == PawnStatus::Free
        && pawn.is_humanlike()
}

/// Bed that automatic reassignment could ever manage
///
/// Guest beds belong to a separate hospitality subsystem; medical beds and
/// beds reserved for non-colonists or animals are never assigned here.
pub fn bed_usable_ever(bed: &Bed) -> bool {
    !bed.is_guest_bed() && !bed.is_medical() && bed.is_for_colonists() && bed.is_humanlike()
}

/// Bed that automatic reassignment may use right now
pub fn bed_usable_now(bed: &Bed, registry: &OverrideRegistry) -> bool {
    bed_usable_ever(bed) && !registry.is_marked_unusable(bed.id()) && !bed.is_designated_for_removal()
}

/// Delegates to the host's compatibility rule
pub fn pawn_can_ever_use_bed(rules: &dyn HostRules, pawn: &Pawn, bed: &Bed) -> bool {
    rules.can_ever_use_bed(pawn, bed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BedId, Designation, HouseholdState, MapId, PawnId};

    #[test]
    fn test_pawn_eligibility() {
        let pawn = Pawn::new(PawnId(1), "A", MapId(0));
        assert!(pawn_eligible(&pawn));
        assert!(!pawn_eligible(&pawn.clone().with_status(PawnStatus::Slave)));
        assert!(!pawn_eligible(&pawn.clone().with_faction(Faction::Other)));
        assert!(!pawn_eligible(&pawn.clone().non_humanlike()));
        assert!(!pawn_eligible(&pawn.without_ownership()));
    }

    #[test]
    fn test_bed_usable_now_respects_markers_and_designations() {
        let mut state = HouseholdState::new();
        state.add_bed(Bed::new(BedId(1), "Bed", MapId(0), 1));
        let mut registry = OverrideRegistry::new();
        let bed = state.bed(BedId(1)).unwrap().clone();
        assert!(bed_usable_now(&bed, &registry));

        registry.mark_unusable(&state, BedId(1));
        assert!(!bed_usable_now(&bed, &registry));
        assert!(bed_usable_ever(&bed));

        let doomed = Bed::new(BedId(2), "Bed", MapId(0), 1).with_designation(Designation::Deconstruct);
        assert!(!bed_usable_now(&doomed, &registry));
    }
}

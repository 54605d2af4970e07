//! Override Registry Tests
//!
//! Forced assignments, unusable markers, lazy purge and the toggle surface.

use bed_assign_core_rs::models::{Bed, BedId, Designation, HouseholdState, MapId, Pawn, PawnId, PawnStatus};
use bed_assign_core_rs::registry::{forced_assignment_toggles, unusable_toggle};
use bed_assign_core_rs::{OverrideRegistry, Toggle, ToggleKind};

// ============================================================================
// Test Helpers
// ============================================================================

fn household() -> HouseholdState {
    let mut state = HouseholdState::new();
    for id in 1..=4 {
        state.add_pawn(Pawn::new(PawnId(id), format!("P{id}"), MapId(0)));
    }
    state.add_bed(Bed::new(BedId(10), "Single", MapId(0), 1));
    state.add_bed(Bed::new(BedId(11), "Double", MapId(0), 2));
    state.add_bed(Bed::new(BedId(12), "Hospital", MapId(0), 1).medical());
    state.add_bed(Bed::new(BedId(13), "Remote", MapId(1), 1));
    state
}

fn forced(pawn: u64, bed: u64, active: bool) -> Toggle {
    Toggle {
        kind: ToggleKind::Forced {
            pawn: PawnId(pawn),
            bed: BedId(bed),
        },
        active,
    }
}

// ============================================================================
// Forced Table
// ============================================================================

#[test]
fn test_set_forced_replaces_previous_entry() {
    let state = household();
    let mut registry = OverrideRegistry::new();

    assert!(registry.set_forced(&state, PawnId(1), BedId(10)));
    assert!(registry.set_forced(&state, PawnId(1), BedId(11)));
    assert_eq!(registry.forced_len(), 1);
    assert_eq!(registry.forced_entry(PawnId(1)), Some(BedId(11)));
}

#[test]
fn test_set_forced_rejects_medical_bed_and_ineligible_pawn() {
    let mut state = household();
    let pawn = state.remove_pawn(PawnId(2)).unwrap();
    state.add_pawn(pawn.with_status(PawnStatus::Slave));
    let mut registry = OverrideRegistry::new();

    assert!(!registry.set_forced(&state, PawnId(1), BedId(12)));
    assert!(!registry.set_forced(&state, PawnId(2), BedId(10)));
    assert_eq!(registry.forced_len(), 0);
}

#[test]
fn test_toggle_forced_flips() {
    let state = household();
    let mut registry = OverrideRegistry::new();

    assert!(registry.toggle_forced(&state, PawnId(1), BedId(10)));
    assert!(!registry.toggle_forced(&state, PawnId(1), BedId(10)));
    assert_eq!(registry.forced_entry(PawnId(1)), None);
}

#[test]
fn test_clear_forced() {
    let state = household();
    let mut registry = OverrideRegistry::new();
    registry.set_forced(&state, PawnId(1), BedId(10));

    assert!(registry.clear_forced(PawnId(1)));
    assert!(!registry.clear_forced(PawnId(1)));
}

#[test]
fn test_forced_bed_on_other_map_not_in_force() {
    let state = household();
    let mut registry = OverrideRegistry::new();
    assert!(registry.set_forced(&state, PawnId(1), BedId(13)));

    // Entry survives but does not apply while the pawn is elsewhere
    assert_eq!(registry.forced_bed(&state, PawnId(1)), None);
    assert_eq!(registry.forced_entry(PawnId(1)), Some(BedId(13)));
}

#[test]
fn test_several_pawns_may_force_one_bed() {
    let state = household();
    let mut registry = OverrideRegistry::new();
    registry.set_forced(&state, PawnId(1), BedId(10));
    registry.set_forced(&state, PawnId(2), BedId(10));

    assert_eq!(
        registry.forced_pawns(&state, BedId(10)),
        vec![PawnId(1), PawnId(2)]
    );
}

// ============================================================================
// Lazy Purge
// ============================================================================

#[test]
fn test_destroyed_bed_purged_on_read() {
    let mut state = household();
    let mut registry = OverrideRegistry::new();
    registry.set_forced(&state, PawnId(1), BedId(10));
    registry.mark_unusable(&state, BedId(11));

    state.remove_bed(BedId(10));
    state.remove_bed(BedId(11));

    assert_eq!(registry.forced_bed(&state, PawnId(1)), None);
    assert_eq!(registry.forced_len(), 0);
    assert_eq!(registry.unusable_len(), 0);
}

#[test]
fn test_pawn_turning_ineligible_purged() {
    let mut state = household();
    let mut registry = OverrideRegistry::new();
    registry.set_forced(&state, PawnId(1), BedId(10));

    let pawn = state.remove_pawn(PawnId(1)).unwrap();
    state.add_pawn(pawn.with_status(PawnStatus::Prisoner));

    assert_eq!(registry.purge(&state), 1);
    assert_eq!(registry.forced_len(), 0);
}

#[test]
fn test_marking_unusable_drops_forced_entries() {
    let state = household();
    let mut registry = OverrideRegistry::new();
    registry.set_forced(&state, PawnId(1), BedId(10));

    assert!(registry.mark_unusable(&state, BedId(10)));
    assert_eq!(registry.forced_entry(PawnId(1)), None);
}

#[test]
fn test_designated_bed_keeps_entries_but_is_not_in_force() {
    let mut state = household();
    let mut registry = OverrideRegistry::new();
    registry.set_forced(&state, PawnId(1), BedId(10));

    state
        .bed_mut(BedId(10))
        .unwrap()
        .add_designation(Designation::Deconstruct);

    assert_eq!(registry.forced_bed(&state, PawnId(1)), None);
    assert_eq!(registry.forced_len(), 1);

    state.bed_mut(BedId(10)).unwrap().clear_designations();
    assert_eq!(registry.forced_bed(&state, PawnId(1)), Some(BedId(10)));
}

// ============================================================================
// Unusable Markers
// ============================================================================

#[test]
fn test_medical_bed_cannot_be_marked() {
    let state = household();
    let mut registry = OverrideRegistry::new();
    assert!(!registry.mark_unusable(&state, BedId(12)));
    assert_eq!(registry.unusable_len(), 0);
}

#[test]
fn test_toggle_unusable_flips() {
    let state = household();
    let mut registry = OverrideRegistry::new();

    assert!(registry.toggle_unusable(&state, BedId(10)));
    assert!(registry.is_marked_unusable(BedId(10)));
    assert!(!registry.toggle_unusable(&state, BedId(10)));
    assert!(!registry.is_marked_unusable(BedId(10)));
    assert!(!registry.unmark_unusable(&state, BedId(10)));
}

// ============================================================================
// Toggle Surface
// ============================================================================

#[test]
fn test_forced_toggles_capped_at_capacity() {
    let mut state = household();
    state.assign(PawnId(3), BedId(11)).unwrap();
    state.assign(PawnId(4), BedId(11)).unwrap();
    let mut registry = OverrideRegistry::new();
    registry.set_forced(&state, PawnId(1), BedId(11));

    let toggles = forced_assignment_toggles(&state, &mut registry, BedId(11));
    assert_eq!(toggles, vec![forced(1, 11, true), forced(3, 11, false)]);
}

#[test]
fn test_forced_toggles_full_of_forced_pawns_hide_owners() {
    let mut state = household();
    state.assign(PawnId(3), BedId(11)).unwrap();
    let mut registry = OverrideRegistry::new();
    registry.set_forced(&state, PawnId(1), BedId(11));
    registry.set_forced(&state, PawnId(2), BedId(11));

    let toggles = forced_assignment_toggles(&state, &mut registry, BedId(11));
    assert_eq!(toggles, vec![forced(1, 11, true), forced(2, 11, true)]);
}

#[test]
fn test_no_forced_toggles_for_unusable_bed() {
    let mut state = household();
    state.assign(PawnId(1), BedId(10)).unwrap();
    let mut registry = OverrideRegistry::new();
    registry.mark_unusable(&state, BedId(10));

    assert!(forced_assignment_toggles(&state, &mut registry, BedId(10)).is_empty());
    assert!(forced_assignment_toggles(&state, &mut registry, BedId(12)).is_empty());
}

#[test]
fn test_unusable_toggle_reflects_marker() {
    let state = household();
    let mut registry = OverrideRegistry::new();

    let toggle = unusable_toggle(&state, &mut registry, BedId(10)).unwrap();
    assert_eq!(toggle.kind, ToggleKind::Unusable { bed: BedId(10) });
    assert!(!toggle.active);

    registry.mark_unusable(&state, BedId(10));
    assert!(unusable_toggle(&state, &mut registry, BedId(10)).unwrap().active);
    assert_eq!(unusable_toggle(&state, &mut registry, BedId(99)), None);
}

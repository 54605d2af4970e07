//! Bed Ranking Tests
//!
//! Properties of the comparison cascade: totality, antisymmetry,
//! transitivity, sort stability and the impressiveness hysteresis band.

use bed_assign_core_rs::models::{Bed, BedId, HouseholdState, MapId, Pawn, PawnId, Room, RoomId};
use bed_assign_core_rs::ranking::{deciding_stage, Stage};
use bed_assign_core_rs::{
    compare_beds, is_better_than, sorted_candidates, OverrideRegistry, Preference,
    ReassignmentSettings, RuleTable, SortOrder,
};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

/// (room impressiveness or no room, rest effectiveness, comfort, beauty)
type BedSpec = (Option<i32>, u8, u8, u8);

fn household(beds: &[BedSpec]) -> HouseholdState {
    let mut state = HouseholdState::new();
    state.add_pawn(Pawn::new(PawnId(1), "Sleeper", MapId(0)));
    for (index, (room, rest, comfort, beauty)) in beds.iter().enumerate() {
        let id = index as u64 + 1;
        let mut bed = Bed::new(BedId(id), format!("Bed {id}"), MapId(0), 1).with_stats(
            f64::from(*rest) / 10.0,
            f64::from(*comfort) / 10.0,
            f64::from(*beauty),
        );
        if let Some(impressiveness) = room {
            state.add_room(Room::new(RoomId(id), f64::from(*impressiveness)));
            bed = bed.in_room(RoomId(id));
        }
        state.add_bed(bed);
    }
    state
}

fn bed_spec() -> impl Strategy<Value = BedSpec> {
    (
        proptest::option::of(-20i32..60),
        5u8..15,
        0u8..10,
        0u8..5,
    )
}

// ============================================================================
// Example-based
// ============================================================================

#[test]
fn test_impressiveness_beyond_band_decides() {
    let state = household(&[(Some(10), 10, 5, 0), (Some(14), 10, 5, 0)]);
    let pawn = state.pawn(PawnId(1)).unwrap();
    let rules = RuleTable::new();
    let settings = ReassignmentSettings::default();
    let low = state.bed(BedId(1)).unwrap();
    let high = state.bed(BedId(2)).unwrap();

    assert_eq!(
        deciding_stage(&state, &rules, pawn, high, low, &settings),
        Some(Stage::Impressiveness)
    );
    assert!(is_better_than(&state, &rules, pawn, Some(high), Some(low), &settings));
}

#[test]
fn test_preference_has_no_cycle_across_the_band() {
    // Each neighbor pair sits inside the band, the outer pair does not
    let state = household(&[(Some(0), 13, 5, 0), (Some(2), 12, 5, 0), (Some(4), 11, 5, 0)]);
    let pawn = state.pawn(PawnId(1)).unwrap();
    let rules = RuleTable::new();
    let settings = ReassignmentSettings::default();
    let beds: Vec<_> = (1..=3).map(|id| state.bed(BedId(id)).unwrap()).collect();

    assert_eq!(compare_beds(&state, &rules, pawn, beds[0], beds[1], &settings), Preference::Second);
    assert_eq!(compare_beds(&state, &rules, pawn, beds[1], beds[2], &settings), Preference::Second);
    assert_eq!(compare_beds(&state, &rules, pawn, beds[0], beds[2], &settings), Preference::Second);

    // Improvement decisions still honor the band
    assert!(is_better_than(&state, &rules, pawn, Some(beds[0]), Some(beds[1]), &settings));
}

#[test]
fn test_lower_id_wins_full_tie() {
    let state = household(&[(None, 10, 5, 0), (None, 10, 5, 0)]);
    let pawn = state.pawn(PawnId(1)).unwrap();
    let rules = RuleTable::new();
    let settings = ReassignmentSettings::default();
    let first = state.bed(BedId(1)).unwrap();
    let second = state.bed(BedId(2)).unwrap();

    assert_eq!(compare_beds(&state, &rules, pawn, second, first, &settings), Preference::Second);
    assert_eq!(
        sorted_candidates(&state, &OverrideRegistry::new(), &rules, PawnId(1), SortOrder::Descending, &settings),
        vec![BedId(1), BedId(2)]
    );
}

#[test]
fn test_ascending_prefers_no_room_first() {
    let state = household(&[(Some(30), 10, 5, 0), (None, 10, 5, 0)]);
    let settings = ReassignmentSettings::default();
    assert_eq!(
        sorted_candidates(
            &state,
            &OverrideRegistry::new(),
            &RuleTable::new(),
            PawnId(1),
            SortOrder::Ascending,
            &settings
        ),
        vec![BedId(2), BedId(1)]
    );
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_compare_is_antisymmetric(a in bed_spec(), b in bed_spec(), threshold in 0u8..10) {
        let state = household(&[a, b]);
        let pawn = state.pawn(PawnId(1)).unwrap();
        let rules = RuleTable::new();
        let settings = ReassignmentSettings {
            better_bed_room_impressiveness_threshold: f64::from(threshold),
            ..Default::default()
        };
        let first = state.bed(BedId(1)).unwrap();
        let second = state.bed(BedId(2)).unwrap();

        let forward = compare_beds(&state, &rules, pawn, first, second, &settings);
        let backward = compare_beds(&state, &rules, pawn, second, first, &settings);
        prop_assert_ne!(forward, backward);
        prop_assert!(deciding_stage(&state, &rules, pawn, first, second, &settings).is_some());
    }

    #[test]
    fn prop_compare_is_transitive(
        a in bed_spec(),
        b in bed_spec(),
        c in bed_spec(),
        threshold in 0u8..10,
    ) {
        let state = household(&[a, b, c]);
        let pawn = state.pawn(PawnId(1)).unwrap();
        let rules = RuleTable::new();
        let settings = ReassignmentSettings {
            better_bed_room_impressiveness_threshold: f64::from(threshold),
            ..Default::default()
        };
        let first = state.bed(BedId(1)).unwrap();
        let second = state.bed(BedId(2)).unwrap();
        let third = state.bed(BedId(3)).unwrap();

        let first_over_second = compare_beds(&state, &rules, pawn, first, second, &settings) == Preference::First;
        let second_over_third = compare_beds(&state, &rules, pawn, second, third, &settings) == Preference::First;
        if first_over_second && second_over_third {
            prop_assert_eq!(
                compare_beds(&state, &rules, pawn, first, third, &settings),
                Preference::First
            );
        }
    }

    #[test]
    fn prop_improvement_is_never_mutual(a in bed_spec(), b in bed_spec()) {
        let state = household(&[a, b]);
        let pawn = state.pawn(PawnId(1)).unwrap();
        let rules = RuleTable::new();
        let settings = ReassignmentSettings::default();
        let first = state.bed(BedId(1));
        let second = state.bed(BedId(2));

        prop_assert!(
            !(is_better_than(&state, &rules, pawn, first, second, &settings)
                && is_better_than(&state, &rules, pawn, second, first, &settings))
        );
    }

    #[test]
    fn prop_sorting_is_stable_and_consistent(
        specs in proptest::collection::vec(bed_spec(), 1..12),
        ascending in any::<bool>(),
    ) {
        let state = household(&specs);
        let registry = OverrideRegistry::new();
        let rules = RuleTable::new();
        let order = if ascending { SortOrder::Ascending } else { SortOrder::Descending };
        let settings = ReassignmentSettings {
            better_bed_room_impressiveness_threshold: 0.0,
            ..Default::default()
        };

        let once = sorted_candidates(&state, &registry, &rules, PawnId(1), order, &settings);
        let twice = sorted_candidates(&state, &registry, &rules, PawnId(1), order, &settings);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.len(), specs.len());

        // The pairwise preference agrees with the sort
        if order == SortOrder::Descending {
            let pawn = state.pawn(PawnId(1)).unwrap();
            for pair in once.windows(2) {
                let better = state.bed(pair[0]).unwrap();
                let worse = state.bed(pair[1]).unwrap();
                prop_assert_eq!(
                    compare_beds(&state, &rules, pawn, better, worse, &settings),
                    Preference::First
                );
            }
        }
    }

    #[test]
    fn prop_hysteresis_band_falls_through(base in -20i32..60, delta in 0i32..3, rest_gap in 0u8..3) {
        // Default band is 3.0: differences of 0, 1 and 2 never decide
        let state = household(&[(Some(base), 10 + rest_gap, 5, 0), (Some(base + delta), 10, 5, 0)]);
        let pawn = state.pawn(PawnId(1)).unwrap();
        let rules = RuleTable::new();
        let settings = ReassignmentSettings::default();
        let first = state.bed(BedId(1)).unwrap();
        let second = state.bed(BedId(2)).unwrap();

        let stage = deciding_stage(&state, &rules, pawn, first, second, &settings);
        prop_assert_ne!(stage, Some(Stage::Impressiveness));
        if rest_gap > 0 {
            prop_assert_eq!(stage, Some(Stage::RestEffectiveness));
            prop_assert!(is_better_than(&state, &rules, pawn, Some(first), Some(second), &settings));
        }
        prop_assert!(!is_better_than(&state, &rules, pawn, Some(second), Some(first), &settings));
    }
}

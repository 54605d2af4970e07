//! Bed Ranking
//!
//! One comparator with named stages, evaluated as a strict lexicographic
//! cascade for a given pawn:
//!
//! 1. **Room**: a bed in a room outranks a bed without one
//! 2. **Impressiveness**: higher room impressiveness wins, but only when the
//!    difference exceeds the configured hysteresis band
//! 3. **Rest effectiveness** for the pawn
//! 4. **Comfort** for the pawn
//! 5. **Beauty** (can be disabled in settings)
//! 6. **Identity**: lower bed id wins
//!
//! # Critical Invariants
//!
//! - **Totality**: [`compare_beds`] always names exactly one winner
//! - **Antisymmetry**: swapping the arguments swaps the winner
//! - **Transitivity**: [`compare_beds`] and [`sorted_candidates`] use a
//!   zero-width band and `f64::total_cmp`, so they agree with one true total
//!   order; the hysteresis band only applies to improvement decisions
//!   ([`is_better_than`], [`deciding_stage`])
//! - **No caching**: candidate lists are rebuilt on every call

use crate::config::ReassignmentSettings;
use crate::eligibility::bed_usable_now;
use crate::host::{BedStat, HostRules};
use crate::models::{Bed, BedId, HouseholdState, Pawn, PawnId};
use crate::registry::OverrideRegistry;
use std::cmp::Ordering;

/// Winner of a pairwise comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    First,
    Second,
}

/// Direction of a candidate list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Best first
    #[default]
    Descending,
    /// Plainest room first; stat stages still prefer the better bed
    Ascending,
}

/// Comparator stages, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Room,
    Impressiveness,
    RestEffectiveness,
    Comfort,
    Beauty,
    Identity,
}

/// Everything the comparator looks at for one (pawn, bed) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonKey {
    pub bed: BedId,
    pub has_room: bool,
    pub impressiveness: f64,
    pub rest_effectiveness: f64,
    pub comfort: f64,
    pub beauty: f64,
}

impl ComparisonKey {
    pub fn new(state: &HouseholdState, rules: &dyn HostRules, pawn: &Pawn, bed: &Bed) -> Self {
        let room = state.room_of(bed.id());
        Self {
            bed: bed.id(),
            has_room: room.is_some(),
            impressiveness: room.map(|r| r.impressiveness).unwrap_or(0.0),
            rest_effectiveness: rules.bed_stat(pawn, bed, BedStat::RestEffectiveness),
            comfort: rules.bed_stat(pawn, bed, BedStat::Comfort),
            beauty: rules.bed_stat(pawn, bed, BedStat::Beauty),
        }
    }
}

/// How a cascade treats floats and direction
#[derive(Debug, Clone, Copy)]
struct Cascade {
    band: f64,
    lawful: bool,
    order: SortOrder,
    compare_beauty: bool,
}

impl Cascade {
    fn pairwise(settings: &ReassignmentSettings) -> Self {
        Self {
            band: settings.better_bed_room_impressiveness_threshold,
            lawful: false,
            order: SortOrder::Descending,
            compare_beauty: settings.compare_beauty,
        }
    }

    fn sorting(order: SortOrder, settings: &ReassignmentSettings) -> Self {
        Self {
            band: 0.0,
            lawful: true,
            order,
            compare_beauty: settings.compare_beauty,
        }
    }

    fn stat(&self, a: f64, b: f64) -> Ordering {
        if self.lawful {
            a.total_cmp(&b)
        } else {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
    }

    /// `Greater` means `a` is preferred at this stage
    fn stage(&self, stage: Stage, a: &ComparisonKey, b: &ComparisonKey) -> Ordering {
        let ordering = match stage {
            Stage::Room => a.has_room.cmp(&b.has_room),
            Stage::Impressiveness => {
                if !(a.has_room && b.has_room) {
                    Ordering::Equal
                } else if self.lawful {
                    a.impressiveness.total_cmp(&b.impressiveness)
                } else if (a.impressiveness - b.impressiveness).abs() > self.band {
                    self.stat(a.impressiveness, b.impressiveness)
                } else {
                    Ordering::Equal
                }
            }
            Stage::RestEffectiveness => self.stat(a.rest_effectiveness, b.rest_effectiveness),
            Stage::Comfort => self.stat(a.comfort, b.comfort),
            Stage::Beauty if self.compare_beauty => self.stat(a.beauty, b.beauty),
            Stage::Beauty => Ordering::Equal,
            Stage::Identity => b.bed.cmp(&a.bed),
        };
        match (self.order, stage) {
            (SortOrder::Ascending, Stage::Room | Stage::Impressiveness) => ordering.reverse(),
            _ => ordering,
        }
    }

    /// First stage that separates the two beds, with its verdict
    fn decide(&self, a: &ComparisonKey, b: &ComparisonKey) -> Option<(Stage, Ordering)> {
        const STAGES: [Stage; 6] = [
            Stage::Room,
            Stage::Impressiveness,
            Stage::RestEffectiveness,
            Stage::Comfort,
            Stage::Beauty,
            Stage::Identity,
        ];
        STAGES.iter().find_map(|stage| match self.stage(*stage, a, b) {
            Ordering::Equal => None,
            ordering => Some((*stage, ordering)),
        })
    }
}

/// Which of two beds the pawn prefers
///
/// Never reports a tie: identical keys only occur for the same bed, which
/// counts as `First`. Impressiveness is compared without the hysteresis band
/// so that preferences stay transitive across a bed list.
pub fn compare_beds(
    state: &HouseholdState,
    rules: &dyn HostRules,
    pawn: &Pawn,
    first: &Bed,
    second: &Bed,
    settings: &ReassignmentSettings,
) -> Preference {
    let a = ComparisonKey::new(state, rules, pawn, first);
    let b = ComparisonKey::new(state, rules, pawn, second);
    match Cascade::sorting(SortOrder::Descending, settings).decide(&a, &b) {
        Some((_, Ordering::Less)) => Preference::Second,
        _ => Preference::First,
    }
}

/// Stage that decided an improvement comparison (hysteresis band applied),
/// `None` for the same bed
pub fn deciding_stage(
    state: &HouseholdState,
    rules: &dyn HostRules,
    pawn: &Pawn,
    first: &Bed,
    second: &Bed,
    settings: &ReassignmentSettings,
) -> Option<Stage> {
    let a = ComparisonKey::new(state, rules, pawn, first);
    let b = ComparisonKey::new(state, rules, pawn, second);
    Cascade::pairwise(settings).decide(&a, &b).map(|(stage, _)| stage)
}

/// Whether moving from `current` to `candidate` is a real improvement
///
/// The identity stage never counts, so a pawn never moves between beds that
/// are equivalent up to the hysteresis band.
pub fn is_better_than(
    state: &HouseholdState,
    rules: &dyn HostRules,
    pawn: &Pawn,
    candidate: Option<&Bed>,
    current: Option<&Bed>,
    settings: &ReassignmentSettings,
) -> bool {
    let Some(candidate) = candidate else {
        return false;
    };
    let Some(current) = current else {
        return true;
    };
    let a = ComparisonKey::new(state, rules, pawn, candidate);
    let b = ComparisonKey::new(state, rules, pawn, current);
    matches!(
        Cascade::pairwise(settings).decide(&a, &b),
        Some((stage, Ordering::Greater)) if stage != Stage::Identity
    )
}

/// Beds on the pawn's map that are usable now, in ranking order
///
/// Empty for unknown pawns and pawns without a map.
pub fn sorted_candidates(
    state: &HouseholdState,
    registry: &OverrideRegistry,
    rules: &dyn HostRules,
    pawn: PawnId,
    order: SortOrder,
    settings: &ReassignmentSettings,
) -> Vec<BedId> {
    let Some(pawn) = state.pawn(pawn) else {
        return Vec::new();
    };
    let Some(map) = pawn.map() else {
        return Vec::new();
    };

    let mut keys: Vec<ComparisonKey> = state
        .beds_on_map(map)
        .filter(|bed| bed_usable_now(bed, registry))
        .map(|bed| ComparisonKey::new(state, rules, pawn, bed))
        .collect();

    let cascade = Cascade::sorting(order, settings);
    // Best first: reverse of "a preferred" ordering
    keys.sort_by(|a, b| {
        cascade
            .decide(a, b)
            .map(|(_, ordering)| ordering.reverse())
            .unwrap_or(Ordering::Equal)
    });
    keys.into_iter().map(|key| key.bed).collect()
}

//! Host compatibility rules
//!
//! The engine consumes a handful of judgements it cannot make itself: whether
//! a pawn's body and needs fit a bed class, whether a bed is reachable and
//! inside the pawn's allowed area, whether two pawns are willing to share a
//! bed, whether a belief system forbids an assignment, and per-pawn bed stat
//! values. [`HostRules`] is that seam.
//!
//! [`RuleTable`] is a data-driven implementation: permissive by default, with
//! explicit exception lists. Scenario files and tests use it; a real host
//! would implement the trait over its own world.

use crate::models::{Bed, BedId, Pawn, PawnId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Bed stats the ranking compares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedStat {
    RestEffectiveness,
    Comfort,
    Beauty,
}

/// Host-side judgements the claim protocol and ranking depend on
///
/// Implementations must not panic. Express failure through the return
/// values (e.g. `false` from [`can_reach`](Self::can_reach)); the engine
/// does not catch unwinds, so a panic leaves the current seek-rest
/// evaluation half done and propagates to the caller.
///
/// # Example
///
/// ```
/// use bed_assign_core_rs::host::HostRules;
/// use bed_assign_core_rs::models::{Bed, Pawn};
///
/// /// A host where nobody can reach anything
/// struct Walled;
///
/// impl HostRules for Walled {
///     fn can_reach(&self, _pawn: &Pawn, _bed: &Bed) -> bool {
///         false
///     }
/// }
/// ```
pub trait HostRules {
    /// Body size, special needs and bed class compatibility
    fn can_ever_use_bed(&self, pawn: &Pawn, bed: &Bed) -> bool {
        pawn.is_humanlike() == bed.is_humanlike()
    }

    /// Bed lies in the pawn's allowed area and a path exists to it
    fn can_reach(&self, pawn: &Pawn, bed: &Bed) -> bool {
        pawn.map().is_some() && pawn.map() == bed.map()
    }

    /// Both pawns accept sleeping in the same bed
    fn willing_to_share_bed(&self, _first: &Pawn, _second: &Pawn) -> bool {
        true
    }

    /// A belief-system restriction forbids assigning the pawn to the bed
    fn ideology_forbids(&self, _pawn: &Pawn, _bed: &Bed) -> bool {
        false
    }

    /// Stat value of the bed as experienced by the pawn
    fn bed_stat(&self, _pawn: &Pawn, bed: &Bed, stat: BedStat) -> f64 {
        let stats = bed.stats();
        match stat {
            BedStat::RestEffectiveness => stats.rest_effectiveness,
            BedStat::Comfort => stats.comfort,
            BedStat::Beauty => stats.beauty,
        }
    }
}

/// Per-pawn stat overrides for one bed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatOverride {
    pub rest_effectiveness: Option<f64>,
    pub comfort: Option<f64>,
    pub beauty: Option<f64>,
}

/// Data-driven host rules
///
/// Everything is allowed except the pairs listed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTable {
    /// (pawn, bed) pairs the pawn can never use
    pub incompatible: BTreeSet<(PawnId, BedId)>,

    /// (pawn, bed) pairs outside the allowed area or unreachable
    pub unreachable: BTreeSet<(PawnId, BedId)>,

    /// (pawn, bed) pairs a belief system forbids
    pub forbidden: BTreeSet<(PawnId, BedId)>,

    /// Pawns that refuse to share a bed with the other; order-insensitive
    pub unwilling_to_share: BTreeSet<(PawnId, PawnId)>,

    /// Stat values a specific pawn experiences in a specific bed
    pub stat_overrides: BTreeMap<PawnId, BTreeMap<BedId, StatOverride>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_incompatible(mut self, pawn: PawnId, bed: BedId) -> Self {
        self.incompatible.insert((pawn, bed));
        self
    }

    pub fn with_unreachable(mut self, pawn: PawnId, bed: BedId) -> Self {
        self.unreachable.insert((pawn, bed));
        self
    }

    pub fn with_forbidden(mut self, pawn: PawnId, bed: BedId) -> Self {
        self.forbidden.insert((pawn, bed));
        self
    }

    pub fn with_unwilling(mut self, first: PawnId, second: PawnId) -> Self {
        self.unwilling_to_share.insert((first, second));
        self
    }

    pub fn with_stat_override(mut self, pawn: PawnId, bed: BedId, stats: StatOverride) -> Self {
        self.stat_overrides.entry(pawn).or_default().insert(bed, stats);
        self
    }

    fn override_for(&self, pawn: PawnId, bed: BedId) -> Option<&StatOverride> {
        self.stat_overrides.get(&pawn).and_then(|beds| beds.get(&bed))
    }
}

impl HostRules for RuleTable {
    fn can_ever_use_bed(&self, pawn: &Pawn, bed: &Bed) -> bool {
        pawn.is_humanlike() == bed.is_humanlike()
            && !self.incompatible.contains(&(pawn.id(), bed.id()))
    }

    fn can_reach(&self, pawn: &Pawn, bed: &Bed) -> bool {
        pawn.map().is_some()
            && pawn.map() == bed.map()
            && !self.unreachable.contains(&(pawn.id(), bed.id()))
    }

    fn willing_to_share_bed(&self, first: &Pawn, second: &Pawn) -> bool {
        !self.unwilling_to_share.contains(&(first.id(), second.id()))
            && !self.unwilling_to_share.contains(&(second.id(), first.id()))
    }

    fn ideology_forbids(&self, pawn: &Pawn, bed: &Bed) -> bool {
        self.forbidden.contains(&(pawn.id(), bed.id()))
    }

    fn bed_stat(&self, pawn: &Pawn, bed: &Bed, stat: BedStat) -> f64 {
        let stats = bed.stats();
        let custom = self.override_for(pawn.id(), bed.id());
        match stat {
            BedStat::RestEffectiveness => custom
                .and_then(|c| c.rest_effectiveness)
                .unwrap_or(stats.rest_effectiveness),
            BedStat::Comfort => custom.and_then(|c| c.comfort).unwrap_or(stats.comfort),
            BedStat::Beauty => custom.and_then(|c| c.beauty).unwrap_or(stats.beauty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MapId;

    #[test]
    fn test_rule_table_defaults_are_permissive() {
        let rules = RuleTable::new();
        let pawn = Pawn::new(PawnId(1), "A", MapId(0));
        let other = Pawn::new(PawnId(2), "B", MapId(0));
        let bed = Bed::new(BedId(5), "Bed", MapId(0), 1);

        assert!(rules.can_ever_use_bed(&pawn, &bed));
        assert!(rules.can_reach(&pawn, &bed));
        assert!(rules.willing_to_share_bed(&pawn, &other));
        assert!(!rules.ideology_forbids(&pawn, &bed));
    }

    #[test]
    fn test_unwilling_is_order_insensitive() {
        let rules = RuleTable::new().with_unwilling(PawnId(2), PawnId(1));
        let a = Pawn::new(PawnId(1), "A", MapId(0));
        let b = Pawn::new(PawnId(2), "B", MapId(0));
        assert!(!rules.willing_to_share_bed(&a, &b));
        assert!(!rules.willing_to_share_bed(&b, &a));
    }

    #[test]
    fn test_unreachable_across_maps() {
        let rules = RuleTable::new();
        let pawn = Pawn::new(PawnId(1), "A", MapId(0));
        let bed = Bed::new(BedId(5), "Bed", MapId(1), 1);
        assert!(!rules.can_reach(&pawn, &bed));
    }

    #[test]
    fn test_stat_override() {
        let rules = RuleTable::new().with_stat_override(
            PawnId(1),
            BedId(5),
            StatOverride {
                comfort: Some(0.9),
                ..Default::default()
            },
        );
        let pawn = Pawn::new(PawnId(1), "A", MapId(0));
        let bed = Bed::new(BedId(5), "Bed", MapId(0), 1).with_stats(0.8, 0.4, 2.0);
        assert_eq!(rules.bed_stat(&pawn, &bed, BedStat::Comfort), 0.9);
        assert_eq!(rules.bed_stat(&pawn, &bed, BedStat::RestEffectiveness), 0.8);
    }
}

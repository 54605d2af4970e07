//! Better-bed search
//!
//! Walks ranked candidates looking for a bed that is "better" for the pawn:
//! either it satisfies a rule-specific predicate, or it beats the pawn's
//! current bed by the ranking. With a mutual lover, double beds are tried
//! first and claimed jointly.
//!
//! # Joint Claims
//!
//! A joint claim seats the pawn, then the lover. If the lover's claim fails,
//! the pawn is put back into the bed it owned before (or unassigned when it
//! owned none), so a failed joint claim never splits a couple across beds.

use crate::claim::{try_claim, MakeSpace};
use crate::eligibility::pawn_eligible;
use crate::models::{BedId, HouseholdState, PawnId, TraitKind};
use crate::policy::{PolicyContext, PolicyError};
use crate::ranking::{is_better_than, sorted_candidates, SortOrder};

/// Rule-specific "this bed avoids the problem" test
pub type Satisfies<'r> = &'r dyn Fn(&HouseholdState, BedId) -> bool;

/// Parameters of one search
pub struct SearchRequest<'r> {
    pub order: SortOrder,
    /// Pawn must carry this trait; also narrows which owned beds are skipped
    pub required_trait: Option<&'r TraitKind>,
    pub excluded_owner_traits: &'r [TraitKind],
    pub satisfies: Option<Satisfies<'r>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The pawn (and partner, if any) moved into `bed`
    Moved { bed: BedId, partner: Option<PawnId> },
    /// The search settled on beds already owned; stop without notifying
    Settled,
    NotFound,
}

/// Result of a successful joint claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointClaim {
    pub changed: bool,
    pub evicted: Vec<PawnId>,
}

/// Search the ranked candidates for a better bed
///
/// # Returns
///
/// - `Moved` when a claim changed occupancy
/// - `Settled` when the chosen bed is already the pawn's (and the lover's)
/// - `NotFound` otherwise
pub fn perform_better_bed_search(
    ctx: &mut PolicyContext<'_>,
    pawn: PawnId,
    lover: Option<PawnId>,
    request: &SearchRequest<'_>,
) -> Result<SearchOutcome, PolicyError> {
    let claimant = ctx.state.pawn(pawn).ok_or(PolicyError::UnknownPawn(pawn))?;
    if let Some(required) = request.required_trait {
        if !claimant.has_trait(required) {
            return Ok(SearchOutcome::NotFound);
        }
    }
    let current = claimant.owned_bed();
    let candidates = sorted_candidates(
        ctx.state,
        ctx.registry,
        ctx.rules,
        pawn,
        request.order,
        ctx.settings,
    );

    if let Some(lover) = lover {
        for bed in &candidates {
            if Some(*bed) != current && is_excluded(ctx.state, *bed, pawn, Some(lover), request) {
                continue;
            }
            let double = ctx.state.bed(*bed).map(|b| b.slots() >= 2).unwrap_or(false);
            if !double || !is_better(ctx, pawn, current, *bed, request) {
                continue;
            }
            let lover_current = ctx.state.pawn(lover).and_then(|p| p.owned_bed());
            if let Some(joint) = claim_together(ctx, pawn, lover, *bed)? {
                let moved = Some(*bed) != current || Some(*bed) != lover_current;
                return Ok(if moved || joint.changed {
                    SearchOutcome::Moved {
                        bed: *bed,
                        partner: Some(lover),
                    }
                } else {
                    SearchOutcome::Settled
                });
            }
        }
        // Rules without a trait of their own only move couples together
        if request.required_trait.is_none() {
            return Ok(SearchOutcome::NotFound);
        }
    }

    for bed in &candidates {
        if Some(*bed) != current && is_excluded(ctx.state, *bed, pawn, lover, request) {
            continue;
        }
        if !is_better(ctx, pawn, current, *bed, request) {
            continue;
        }
        match try_claim(ctx.state, ctx.registry, ctx.rules, pawn, *bed, MakeSpace::evict()) {
            Ok(outcome) if outcome.changed() => {
                return Ok(SearchOutcome::Moved {
                    bed: *bed,
                    partner: None,
                })
            }
            Ok(_) => return Ok(SearchOutcome::Settled),
            Err(reason) => tracing::debug!(%pawn, %bed, %reason, "candidate rejected"),
        }
    }
    Ok(SearchOutcome::NotFound)
}

fn is_better(
    ctx: &PolicyContext<'_>,
    pawn: PawnId,
    current: Option<BedId>,
    candidate: BedId,
    request: &SearchRequest<'_>,
) -> bool {
    let state = &*ctx.state;
    if let Some(satisfies) = request.satisfies {
        if satisfies(state, candidate) {
            return true;
        }
    }
    let Some(claimant) = state.pawn(pawn) else {
        return false;
    };
    is_better_than(
        state,
        ctx.rules,
        claimant,
        state.bed(candidate),
        current.and_then(|bed| state.bed(bed)),
        ctx.settings,
    )
}

/// Beds the search must leave alone
///
/// Owned beds are skipped; for trait rules only beds owned by another
/// eligible pawn with the same trait. Beds with another eligible owner
/// carrying an excluded trait are skipped too.
pub fn is_excluded(
    state: &HouseholdState,
    bed: BedId,
    pawn: PawnId,
    lover: Option<PawnId>,
    request: &SearchRequest<'_>,
) -> bool {
    let Some(bed) = state.bed(bed) else {
        return true;
    };
    let others: Vec<_> = bed
        .owners()
        .iter()
        .filter(|owner| **owner != pawn && Some(**owner) != lover)
        .filter_map(|owner| state.pawn(*owner))
        .filter(|owner| pawn_eligible(owner))
        .collect();

    let owned = match request.required_trait {
        None => !bed.owners().is_empty(),
        Some(required) => others.iter().any(|owner| owner.has_trait(required)),
    };
    owned
        || others
            .iter()
            .any(|owner| owner.has_any_trait(request.excluded_owner_traits))
}

/// Seat `pawn` and then `lover` in `bed`, rolling the pawn back if the lover
/// cannot follow
///
/// # Returns
///
/// - `Ok(Some(JointClaim))` when both now own the bed
/// - `Ok(None)` when either claim was rejected (the pawn is back where it was)
pub fn claim_together(
    ctx: &mut PolicyContext<'_>,
    pawn: PawnId,
    lover: PawnId,
    bed: BedId,
) -> Result<Option<JointClaim>, PolicyError> {
    let previous = ctx.state.pawn(pawn).ok_or(PolicyError::UnknownPawn(pawn))?.owned_bed();

    let first = match try_claim(
        ctx.state,
        ctx.registry,
        ctx.rules,
        pawn,
        bed,
        MakeSpace::Evict {
            protect: Some(lover),
        },
    ) {
        Ok(outcome) => outcome,
        Err(reason) => {
            tracing::debug!(%pawn, %bed, %reason, "joint claim rejected");
            return Ok(None);
        }
    };

    match try_claim(
        ctx.state,
        ctx.registry,
        ctx.rules,
        lover,
        bed,
        MakeSpace::Evict {
            protect: Some(pawn),
        },
    ) {
        Ok(second) => {
            let mut evicted = first.evicted().to_vec();
            evicted.extend_from_slice(second.evicted());
            Ok(Some(JointClaim {
                changed: first.changed() || second.changed(),
                evicted,
            }))
        }
        Err(reason) => {
            tracing::debug!(%lover, %bed, %reason, "partner claim rejected, rolling back");
            if first.changed() {
                roll_back(ctx, pawn, previous)?;
            }
            Ok(None)
        }
    }
}

/// Compensating claim back into `previous`, or release when there was none
fn roll_back(ctx: &mut PolicyContext<'_>, pawn: PawnId, previous: Option<BedId>) -> Result<(), PolicyError> {
    let Some(previous) = previous else {
        ctx.state.unassign(pawn)?;
        return Ok(());
    };
    if let Err(reason) = try_claim(ctx.state, ctx.registry, ctx.rules, pawn, previous, MakeSpace::No) {
        tracing::warn!(%pawn, bed = %previous, %reason, "rollback claim rejected, reseating directly");
        ctx.state.assign(pawn, previous)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReassignmentSettings;
    use crate::host::RuleTable;
    use crate::models::{Bed, MapId, Pawn};
    use crate::registry::OverrideRegistry;

    const EXCLUDED: &[TraitKind] = &[TraitKind::Jealous, TraitKind::Greedy];

    fn request(required_trait: Option<&TraitKind>) -> SearchRequest<'_> {
        SearchRequest {
            order: SortOrder::Descending,
            required_trait,
            excluded_owner_traits: EXCLUDED,
            satisfies: None,
        }
    }

    #[test]
    fn test_owned_beds_excluded_from_generic_search() {
        let mut state = HouseholdState::new();
        state.add_pawn(Pawn::new(PawnId(1), "A", MapId(0)));
        state.add_pawn(Pawn::new(PawnId(2), "B", MapId(0)));
        state.add_bed(Bed::new(BedId(1), "Bed", MapId(0), 2));
        state.assign(PawnId(2), BedId(1)).unwrap();

        assert!(is_excluded(&state, BedId(1), PawnId(1), None, &request(None)));
        assert!(!is_excluded(
            &state,
            BedId(1),
            PawnId(1),
            None,
            &request(Some(&TraitKind::Ascetic))
        ));
    }

    #[test]
    fn test_excluded_trait_owner() {
        let mut state = HouseholdState::new();
        state.add_pawn(Pawn::new(PawnId(1), "A", MapId(0)));
        state.add_pawn(Pawn::new(PawnId(2), "B", MapId(0)).with_trait(TraitKind::Greedy));
        state.add_bed(Bed::new(BedId(1), "Bed", MapId(0), 2));
        state.assign(PawnId(2), BedId(1)).unwrap();

        assert!(is_excluded(
            &state,
            BedId(1),
            PawnId(1),
            None,
            &request(Some(&TraitKind::Ascetic))
        ));
    }

    #[test]
    fn test_failed_joint_claim_restores_previous_bed() {
        let mut state = HouseholdState::new();
        state.add_pawn(Pawn::new(PawnId(1), "X", MapId(0)).with_lover(PawnId(2)));
        state.add_pawn(Pawn::new(PawnId(2), "Y", MapId(0)).with_lover(PawnId(1)));
        state.add_bed(Bed::new(BedId(3), "C", MapId(0), 1));
        state.add_bed(Bed::new(BedId(4), "D", MapId(0), 2));
        state.assign(PawnId(1), BedId(3)).unwrap();

        let mut registry = OverrideRegistry::new();
        let rules = RuleTable::new().with_unreachable(PawnId(2), BedId(4));
        let settings = ReassignmentSettings::default();
        let mut ctx = PolicyContext::new(&mut state, &mut registry, &rules, &settings);

        assert_eq!(claim_together(&mut ctx, PawnId(1), PawnId(2), BedId(4)), Ok(None));
        assert_eq!(state.pawn(PawnId(1)).unwrap().owned_bed(), Some(BedId(3)));
        assert!(state.bed(BedId(4)).unwrap().owners().is_empty());
    }

    #[test]
    fn test_failed_joint_claim_unassigns_when_no_previous_bed() {
        let mut state = HouseholdState::new();
        state.add_pawn(Pawn::new(PawnId(1), "X", MapId(0)).with_lover(PawnId(2)));
        state.add_pawn(Pawn::new(PawnId(2), "Y", MapId(1)).with_lover(PawnId(1)));
        state.add_bed(Bed::new(BedId(4), "D", MapId(0), 2));

        let mut registry = OverrideRegistry::new();
        let rules = RuleTable::new();
        let settings = ReassignmentSettings::default();
        let mut ctx = PolicyContext::new(&mut state, &mut registry, &rules, &settings);

        assert_eq!(claim_together(&mut ctx, PawnId(1), PawnId(2), BedId(4)), Ok(None));
        assert_eq!(state.pawn(PawnId(1)).unwrap().owned_bed(), None);
    }
}

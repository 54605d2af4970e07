//! The ordered reassignment pipeline

use crate::claim::{release_off_map, try_claim, MakeSpace};
use crate::eligibility::pawn_eligible;
use crate::models::{BedId, Event, HouseholdState, PawnId, TraitKind};
use crate::policy::partner::{avoid_bed_sharing, avoid_partner_separation, Lovers};
use crate::policy::penalty::{PenaltyRule, PENALTY_RULES};
use crate::policy::search::{perform_better_bed_search, SearchOutcome, SearchRequest};
use crate::policy::{PolicyContext, PolicyError};
use crate::ranking::SortOrder;

/// Owners the generic better-bed search never provokes
const BETTER_BED_EXCLUDED: &[TraitKind] = &[TraitKind::Jealous, TraitKind::Greedy];

/// What a step decided
enum Step {
    /// Preconditions not met, try the next step
    Continue,
    /// Pipeline ends here, with a notification if occupancy changed
    Done(Option<Event>),
}

/// Run the full pipeline for one pawn
///
/// # Returns
///
/// - `Ok(Some(event))` when a step changed occupancy
/// - `Ok(None)` when nothing changed
/// - `Err(PolicyError)` on unexpected failures; occupancy may have changed
///   partially (an eviction that stood)
pub fn look_for_bed_reassignment(
    ctx: &mut PolicyContext<'_>,
    pawn: PawnId,
) -> Result<Option<Event>, PolicyError> {
    let claimant = ctx.state.pawn(pawn).ok_or(PolicyError::UnknownPawn(pawn))?;
    if !claimant.has_ownership() {
        return Ok(None);
    }

    if let Step::Done(event) = release_if_off_map(ctx, pawn)? {
        return Ok(event);
    }
    if !ctx.state.pawn(pawn).map(pawn_eligible).unwrap_or(false) {
        return Ok(None);
    }

    if let Step::Done(event) = claim_forced_bed(ctx, pawn) {
        return Ok(event);
    }
    if ctx.state.pawn(pawn).and_then(|p| p.map()).is_none() {
        return Ok(None);
    }

    let lovers = Lovers::of(ctx.state, pawn);

    for rule in PENALTY_RULES.iter() {
        if let Step::Done(event) = avoid_penalty(ctx, pawn, &lovers, rule)? {
            return Ok(event);
        }
    }

    if let Step::Done(event) = claim_better_bed(ctx, pawn, &lovers)? {
        return Ok(event);
    }

    if let Some(event) = avoid_partner_separation(ctx, pawn, &lovers)? {
        return Ok(Some(event));
    }

    avoid_bed_sharing(ctx, pawn, &lovers)
}

/// Release a bed on another map, or any bed while the pawn is off every map
fn release_if_off_map(ctx: &mut PolicyContext<'_>, pawn: PawnId) -> Result<Step, PolicyError> {
    let Some(claimant) = ctx.state.pawn(pawn) else {
        return Ok(Step::Continue);
    };
    let Some(bed) = claimant.owned_bed() else {
        return Ok(Step::Continue);
    };
    let bed_map = ctx.state.bed(bed).and_then(|b| b.map());
    if claimant.map().is_some() && claimant.map() == bed_map {
        return Ok(Step::Continue);
    }

    release_off_map(ctx.state, pawn)?;
    Ok(Step::Done(Some(Event::UnclaimedOffMap {
        tick: ctx.state.tick(),
        pawn,
        bed,
    })))
}

fn claim_forced_bed(ctx: &mut PolicyContext<'_>, pawn: PawnId) -> Step {
    let Some(forced) = ctx.registry.forced_bed(ctx.state, pawn) else {
        return Step::Continue;
    };
    match try_claim(ctx.state, ctx.registry, ctx.rules, pawn, forced, MakeSpace::evict()) {
        Ok(outcome) if outcome.changed() => Step::Done(Some(Event::ClaimedForcedBed {
            tick: ctx.state.tick(),
            pawn,
            bed: forced,
            evicted: outcome.evicted().to_vec(),
        })),
        Ok(_) => Step::Done(None),
        Err(reason) => {
            tracing::debug!(%pawn, bed = %forced, %reason, "forced bed claim rejected");
            Step::Continue
        }
    }
}

fn avoid_penalty(
    ctx: &mut PolicyContext<'_>,
    pawn: PawnId,
    lovers: &Lovers,
    rule: &PenaltyRule,
) -> Result<Step, PolicyError> {
    let claimant = ctx.state.pawn(pawn).ok_or(PolicyError::UnknownPawn(pawn))?;
    let lover = lovers.mutual.and_then(|lover| ctx.state.pawn(lover));
    let Some(thought) = rule.triggered(ctx.settings, claimant, lover) else {
        return Ok(Step::Continue);
    };

    let thought = thought.clone();
    let claimant = claimant.clone();
    let predicate = move |state: &HouseholdState, bed: BedId| -> bool {
        (rule.satisfies)(state, &claimant, &thought, bed)
    };
    let satisfies: &dyn Fn(&HouseholdState, BedId) -> bool = &predicate;
    let request = SearchRequest {
        order: rule.order,
        required_trait: Some(&rule.required_trait),
        excluded_owner_traits: rule.excluded_owner_traits,
        satisfies: Some(satisfies),
    };

    Ok(match perform_better_bed_search(ctx, pawn, lovers.mutual, &request)? {
        SearchOutcome::Moved { bed, partner } => Step::Done(Some(Event::AvoidedPenalty {
            tick: ctx.state.tick(),
            penalty: rule.kind,
            pawn,
            partner,
            bed,
        })),
        SearchOutcome::Settled => Step::Done(None),
        SearchOutcome::NotFound => Step::Continue,
    })
}

fn claim_better_bed(ctx: &mut PolicyContext<'_>, pawn: PawnId, lovers: &Lovers) -> Result<Step, PolicyError> {
    if !ctx.settings.claim_better_beds || lovers.is_third_wheel(ctx.state) {
        return Ok(Step::Continue);
    }
    let request = SearchRequest {
        order: SortOrder::Descending,
        required_trait: None,
        excluded_owner_traits: BETTER_BED_EXCLUDED,
        satisfies: None,
    };

    Ok(match perform_better_bed_search(ctx, pawn, lovers.mutual, &request)? {
        SearchOutcome::Moved { bed, partner } => Step::Done(Some(Event::ClaimedBetterBed {
            tick: ctx.state.tick(),
            pawn,
            partner,
            bed,
        })),
        SearchOutcome::Settled => Step::Done(None),
        SearchOutcome::NotFound => Step::Continue,
    })
}

//! Partner rules
//!
//! Lover lookup plus the two steps that deal with sleeping arrangements
//! between partners: joining a partner the pawn is separated from, and
//! leaving a bed shared with someone who is not a partner.

use crate::claim::{try_claim, try_unclaim, MakeSpace};
use crate::eligibility::{pawn_can_ever_use_bed, pawn_eligible};
use crate::models::{BedId, Event, HouseholdState, PawnId, ThoughtKind, TraitKind};
use crate::policy::search::claim_together;
use crate::policy::{PolicyContext, PolicyError};
use crate::ranking::{sorted_candidates, SortOrder};

/// Owners with these traits are never kicked out for a couple
const COUPLE_KICK_EXCLUDED: &[TraitKind] = &[TraitKind::Jealous, TraitKind::Greedy];

/// The pawn's most liked lover and whether the feeling is mutual
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lovers {
    pub most_liked: Option<PawnId>,
    pub mutual: Option<PawnId>,
}

impl Lovers {
    pub fn of(state: &HouseholdState, pawn: PawnId) -> Self {
        let most_liked = most_liked_lover(state, pawn);
        let mutual = most_liked.filter(|lover| most_liked_lover(state, *lover) == Some(pawn));
        Self { most_liked, mutual }
    }

    /// Most liked lover does not return the feeling
    pub fn one_sided(&self) -> Option<PawnId> {
        match self.mutual {
            Some(_) => None,
            None => self.most_liked,
        }
    }

    /// Only a one-sided lover, whose bed is bigger than a double
    pub fn is_third_wheel(&self, state: &HouseholdState) -> bool {
        self.one_sided()
            .and_then(|lover| state.pawn(lover))
            .and_then(|lover| lover.owned_bed())
            .and_then(|bed| state.bed(bed))
            .map(|bed| bed.slots() > 2)
            .unwrap_or(false)
    }
}

/// Most liked existing lover on the same map, for eligible pawns only
pub fn most_liked_lover(state: &HouseholdState, pawn: PawnId) -> Option<PawnId> {
    let pawn = state.pawn(pawn).filter(|p| pawn_eligible(p))?;
    let lover = pawn.lovers().iter().find_map(|id| state.pawn(*id))?;
    (lover.map().is_some() && lover.map() == pawn.map()).then_some(lover.id())
}

fn owned_bed(state: &HouseholdState, pawn: PawnId) -> Option<BedId> {
    state.pawn(pawn).and_then(|p| p.owned_bed())
}

/// Join a lover the pawn is separated from
///
/// Only runs while the pawn suffers the "want to sleep with partner"
/// thought. A one-sided lover's bed is claimed only if it has room. A mutual
/// lover's bed is claimed (making space) when it is at least a double;
/// otherwise the couple looks for a double bed to claim together, kicking
/// out unpartnered owners first.
pub fn avoid_partner_separation(
    ctx: &mut PolicyContext<'_>,
    pawn: PawnId,
    lovers: &Lovers,
) -> Result<Option<Event>, PolicyError> {
    if !ctx.settings.avoid_partner_penalty {
        return Ok(None);
    }
    let claimant = ctx.state.pawn(pawn).ok_or(PolicyError::UnknownPawn(pawn))?;
    if claimant
        .suffering_from(&ThoughtKind::WantToSleepWithPartner)
        .is_none()
    {
        return Ok(None);
    }
    let current = claimant.owned_bed();
    let tick = ctx.state.tick();

    if let Some(lover) = lovers.one_sided() {
        let Some(lover_bed) = owned_bed(ctx.state, lover) else {
            return Ok(None);
        };
        if current == Some(lover_bed) {
            return Ok(None);
        }
        return Ok(
            match try_claim(ctx.state, ctx.registry, ctx.rules, pawn, lover_bed, MakeSpace::No) {
                Ok(_) => Some(Event::ClaimedLoverBed {
                    tick,
                    pawn,
                    lover,
                    bed: lover_bed,
                    one_sided: true,
                }),
                Err(reason) => {
                    tracing::debug!(%pawn, %lover, %reason, "lover's bed rejected");
                    None
                }
            },
        );
    }

    let Some(lover) = lovers.mutual else {
        return Ok(None);
    };
    let lover_bed = owned_bed(ctx.state, lover);
    if current == lover_bed {
        return Ok(None);
    }

    if let Some(lover_bed) = lover_bed {
        let double = ctx.state.bed(lover_bed).map(|b| b.slots() >= 2).unwrap_or(false);
        if double {
            let make_space = MakeSpace::Evict {
                protect: Some(lover),
            };
            match try_claim(ctx.state, ctx.registry, ctx.rules, pawn, lover_bed, make_space) {
                Ok(_) => {
                    return Ok(Some(Event::ClaimedLoverBed {
                        tick,
                        pawn,
                        lover,
                        bed: lover_bed,
                        one_sided: false,
                    }))
                }
                Err(reason) => tracing::debug!(%pawn, %lover, %reason, "lover's bed rejected"),
            }
        }
    }

    let candidates = sorted_candidates(
        ctx.state,
        ctx.registry,
        ctx.rules,
        pawn,
        SortOrder::Descending,
        ctx.settings,
    );
    for bed in candidates {
        if !fits_couple(ctx, pawn, lover, bed) {
            continue;
        }
        let Some(kicked) = make_room_for_couple(ctx, pawn, lover, bed) else {
            continue;
        };
        if let Some(joint) = claim_together(ctx, pawn, lover, bed)? {
            let mut evicted = kicked;
            evicted.extend(joint.evicted);
            return Ok(Some(Event::LoversClaimedBed {
                tick,
                pawn,
                lover,
                bed,
                evicted,
            }));
        }
    }
    Ok(None)
}

/// At least a double that both lovers can ever use
fn fits_couple(ctx: &PolicyContext<'_>, pawn: PawnId, lover: PawnId, bed: BedId) -> bool {
    let state = &*ctx.state;
    match (state.bed(bed), state.pawn(pawn), state.pawn(lover)) {
        (Some(bed), Some(pawn), Some(lover)) => {
            bed.slots() >= 2
                && pawn_can_ever_use_bed(ctx.rules, pawn, bed)
                && pawn_can_ever_use_bed(ctx.rules, lover, bed)
        }
        _ => false,
    }
}

/// Kick unpartnered owners out of `bed` for the couple
///
/// Owners partnered with either lover stay when the bed has three or more
/// slots. Any other owner blocks the bed if it is partnered, cannot be
/// released, or the bed has an owner the couple must not provoke.
///
/// # Returns
///
/// The pawns kicked out, or `None` when the bed is not available.
fn make_room_for_couple(
    ctx: &mut PolicyContext<'_>,
    pawn: PawnId,
    lover: PawnId,
    bed: BedId,
) -> Option<Vec<PawnId>> {
    let target = ctx.state.bed(bed)?;
    let slots = target.slots();
    let owners = target.owners().to_vec();
    let provocative = owners
        .iter()
        .filter(|owner| **owner != pawn && **owner != lover)
        .filter_map(|owner| ctx.state.pawn(*owner))
        .any(|owner| owner.has_any_trait(COUPLE_KICK_EXCLUDED));
    let others: Vec<PawnId> = owners
        .into_iter()
        .filter(|owner| *owner != pawn && *owner != lover)
        .filter(|owner| ctx.state.pawn(*owner).map(pawn_eligible).unwrap_or(false))
        .collect();

    let mut kicked = Vec::new();
    for sleeper in others.into_iter().rev() {
        let partner = most_liked_lover(ctx.state, sleeper);
        if slots >= 3 && (partner == Some(pawn) || partner == Some(lover)) {
            continue;
        }
        if provocative || partner.is_some() {
            return None;
        }
        match try_unclaim(ctx.state, ctx.registry, sleeper) {
            Ok(_) => kicked.push(sleeper),
            Err(reason) => {
                tracing::debug!(%sleeper, %bed, %reason, "could not make room for couple");
                return None;
            }
        }
    }
    kicked.reverse();
    Some(kicked)
}

/// Leave a bed shared with someone who is not a partner
pub fn avoid_bed_sharing(
    ctx: &mut PolicyContext<'_>,
    pawn: PawnId,
    lovers: &Lovers,
) -> Result<Option<Event>, PolicyError> {
    if !ctx.settings.avoid_sharing_penalty {
        return Ok(None);
    }
    let claimant = ctx.state.pawn(pawn).ok_or(PolicyError::UnknownPawn(pawn))?;
    if claimant.suffering_from(&ThoughtKind::SharedBed).is_none() {
        return Ok(None);
    }
    let Some(current) = claimant.owned_bed() else {
        return Ok(None);
    };
    let partner_shares = [lovers.mutual, lovers.most_liked]
        .into_iter()
        .flatten()
        .any(|lover| owned_bed(ctx.state, lover) == Some(current));
    if partner_shares {
        return Ok(None);
    }

    match try_unclaim(ctx.state, ctx.registry, pawn) {
        Ok(bed) => Ok(Some(Event::UnclaimedSharedBed {
            tick: ctx.state.tick(),
            pawn,
            bed,
        })),
        Err(reason) => {
            tracing::debug!(%pawn, %reason, "could not leave shared bed");
            Ok(None)
        }
    }
}

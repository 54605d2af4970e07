//! Claim Transaction
//!
//! The only path through which the policy changes bed occupancy.
//!
//! # Claim Flow
//!
//! ```text
//! already owned? ──yes──▶ AlreadyOwned
//!       │
//!   eligibility ─▶ map ─▶ forced elsewhere ─▶ bed class ─▶ ideology
//!       │
//!   forced occupants ─▶ reachability ─▶ make space (optional) ─▶ capacity
//!       │
//!   commit (one HouseholdState::assign)
//! ```
//!
//! Every rejection before "make space" leaves state untouched.
//!
//! # Critical Invariants
//!
//! - **Capacity**: a commit never exceeds the bed's sleeping slots
//! - **Single mutation**: a successful claim calls the host assignment
//!   primitive exactly once
//! - **Forced precedence**: a pawn with a forced bed in force can claim no
//!   other bed, and cannot release the forced one
//!
//! Evictions performed while making space are not undone when the capacity
//! check then fails; the freed slot stays free for whoever claims it next.
//! Joint claims and their rollback live in [`crate::policy`].

use crate::eligibility::{bed_usable_now, pawn_can_ever_use_bed, pawn_eligible};
use crate::host::HostRules;
use crate::models::{AssignmentError, BedId, HouseholdState, PawnId};
use crate::registry::OverrideRegistry;
use thiserror::Error;

/// Whether a claim may evict incompatible owners first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MakeSpace {
    No,
    /// Evict, sparing `protect` (a co-claimant seated in the same operation)
    Evict { protect: Option<PawnId> },
}

impl MakeSpace {
    pub fn evict() -> Self {
        MakeSpace::Evict { protect: None }
    }
}

/// Successful claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The pawn already owned the bed; nothing changed
    AlreadyOwned,
    Claimed {
        previous: Option<BedId>,
        evicted: Vec<PawnId>,
    },
}

impl ClaimOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, ClaimOutcome::Claimed { .. })
    }

    pub fn evicted(&self) -> &[PawnId] {
        match self {
            ClaimOutcome::AlreadyOwned => &[],
            ClaimOutcome::Claimed { evicted, .. } => evicted,
        }
    }
}

/// Why a claim was refused; a normal negative result, not a fault
#[derive(Debug, Error, PartialEq)]
pub enum ClaimRejection {
    #[error("Unknown pawn {0}")]
    UnknownPawn(PawnId),

    #[error("Unknown bed {0}")]
    UnknownBed(BedId),

    #[error("Pawn {0} is not eligible for reassignment")]
    PawnIneligible(PawnId),

    #[error("Bed {0} is not usable now")]
    BedUnusable(BedId),

    #[error("Pawn {pawn} and bed {bed} are on different maps")]
    DifferentMap { pawn: PawnId, bed: BedId },

    #[error("Pawn {pawn} is forced to {forced}")]
    ForcedElsewhere { pawn: PawnId, forced: BedId },

    #[error("Pawn {pawn} can never use bed {bed}")]
    CannotUseBed { pawn: PawnId, bed: BedId },

    #[error("Ideology forbids assigning {pawn} to {bed}")]
    IdeologyForbids { pawn: PawnId, bed: BedId },

    #[error("Bed {bed} is forced to {occupant}, who will not share with {pawn}")]
    ForcedOccupant {
        pawn: PawnId,
        bed: BedId,
        occupant: PawnId,
    },

    #[error("Bed {bed} is outside the allowed area of {pawn} or unreachable")]
    Unreachable { pawn: PawnId, bed: BedId },

    #[error("Bed {0} has no free slot")]
    BedFull(BedId),

    #[error("Assignment failed: {0}")]
    Assignment(#[from] AssignmentError),
}

/// Why a release was refused
#[derive(Debug, Error, PartialEq)]
pub enum UnclaimRejection {
    #[error("Unknown pawn {0}")]
    UnknownPawn(PawnId),

    #[error("Pawn {0} owns no bed")]
    NoBed(PawnId),

    #[error("Pawn {pawn} cannot release its forced bed {bed}")]
    ForcedBed { pawn: PawnId, bed: BedId },

    #[error("Pawn {0} cannot own a bed")]
    NoOwnership(PawnId),

    #[error("Assignment failed: {0}")]
    Assignment(#[from] AssignmentError),
}

/// Attempt to seat `pawn` in `bed`
///
/// # Arguments
///
/// * `state` - Household occupancy, mutated only on success or eviction
/// * `registry` - Forced assignments and unusable markers
/// * `rules` - Host compatibility judgements
/// * `pawn` - Claiming pawn
/// * `bed` - Target bed
/// * `make_space` - Whether incompatible owners may be evicted first
///
/// # Returns
///
/// - `Ok(AlreadyOwned)` when the pawn already owns the bed
/// - `Ok(Claimed { .. })` with the previous bed and any evicted owners
/// - `Err(ClaimRejection)` otherwise; see the module docs for which
///   rejections can follow an eviction
pub fn try_claim(
    state: &mut HouseholdState,
    registry: &mut OverrideRegistry,
    rules: &dyn HostRules,
    pawn: PawnId,
    bed: BedId,
    make_space: MakeSpace,
) -> Result<ClaimOutcome, ClaimRejection> {
    check_claim(state, registry, rules, pawn, bed)?;
    if state.pawn(pawn).and_then(|p| p.owned_bed()) == Some(bed) {
        return Ok(ClaimOutcome::AlreadyOwned);
    }

    let evicted = match make_space {
        MakeSpace::No => Vec::new(),
        MakeSpace::Evict { protect } => evict_incompatible(state, registry, rules, pawn, bed, protect),
    };

    let has_slot = state.bed(bed).map(|b| b.has_free_slot()).unwrap_or(false);
    if !has_slot {
        tracing::debug!(%pawn, %bed, evicted = evicted.len(), "claim failed: bed full");
        return Err(ClaimRejection::BedFull(bed));
    }

    let previous = state.assign(pawn, bed)?;
    tracing::debug!(%pawn, %bed, ?previous, "claim committed");
    Ok(ClaimOutcome::Claimed { previous, evicted })
}

/// Every check of [`try_claim`] that does not mutate
fn check_claim(
    state: &HouseholdState,
    registry: &mut OverrideRegistry,
    rules: &dyn HostRules,
    pawn_id: PawnId,
    bed_id: BedId,
) -> Result<(), ClaimRejection> {
    let pawn = state.pawn(pawn_id).ok_or(ClaimRejection::UnknownPawn(pawn_id))?;
    if pawn.owned_bed() == Some(bed_id) {
        return Ok(());
    }
    let bed = state.bed(bed_id).ok_or(ClaimRejection::UnknownBed(bed_id))?;

    if !pawn_eligible(pawn) {
        return Err(ClaimRejection::PawnIneligible(pawn_id));
    }
    if !bed_usable_now(bed, registry) {
        return Err(ClaimRejection::BedUnusable(bed_id));
    }
    if pawn.map().is_none() || pawn.map() != bed.map() {
        return Err(ClaimRejection::DifferentMap {
            pawn: pawn_id,
            bed: bed_id,
        });
    }

    let forced = registry.forced_bed(state, pawn_id);
    if let Some(forced) = forced.filter(|forced| *forced != bed_id) {
        return Err(ClaimRejection::ForcedElsewhere {
            pawn: pawn_id,
            forced,
        });
    }

    if bed.is_medical() || !pawn_can_ever_use_bed(rules, pawn, bed) {
        return Err(ClaimRejection::CannotUseBed {
            pawn: pawn_id,
            bed: bed_id,
        });
    }
    if rules.ideology_forbids(pawn, bed) {
        return Err(ClaimRejection::IdeologyForbids {
            pawn: pawn_id,
            bed: bed_id,
        });
    }

    let blocking = registry
        .forced_pawns(state, bed_id)
        .into_iter()
        .filter(|occupant| *occupant != pawn_id)
        .find(|occupant| match state.pawn(*occupant) {
            Some(sleeper) => {
                pawn_eligible(sleeper)
                    && (!pawn.has_love_relation_with(sleeper)
                        || !rules.willing_to_share_bed(pawn, sleeper))
            }
            None => false,
        });
    if let Some(occupant) = blocking {
        return Err(ClaimRejection::ForcedOccupant {
            pawn: pawn_id,
            bed: bed_id,
            occupant,
        });
    }

    if !rules.can_reach(pawn, bed) {
        return Err(ClaimRejection::Unreachable {
            pawn: pawn_id,
            bed: bed_id,
        });
    }
    Ok(())
}

/// Unclaim every owner of `bed` who should not share it with `pawn`
fn evict_incompatible(
    state: &mut HouseholdState,
    registry: &mut OverrideRegistry,
    rules: &dyn HostRules,
    pawn: PawnId,
    bed: BedId,
    protect: Option<PawnId>,
) -> Vec<PawnId> {
    let owners: Vec<PawnId> = state
        .bed(bed)
        .map(|b| b.owners().to_vec())
        .unwrap_or_default();

    let mut evicted = Vec::new();
    for sleeper in owners {
        if sleeper == pawn || Some(sleeper) == protect {
            continue;
        }
        let incompatible = match (state.pawn(pawn), state.pawn(sleeper)) {
            (Some(claimant), Some(owner)) => {
                !pawn_eligible(owner)
                    || !claimant.has_love_relation_with(owner)
                    || !rules.willing_to_share_bed(claimant, owner)
            }
            _ => true,
        };
        if !incompatible {
            continue;
        }
        match try_unclaim(state, registry, sleeper) {
            Ok(_) => evicted.push(sleeper),
            Err(reason) => tracing::debug!(%sleeper, %bed, %reason, "eviction skipped"),
        }
    }
    evicted
}

/// Release the pawn's bed
///
/// Refused for pawns without a bed and pawns whose forced bed is the one
/// they own. Eligibility is not checked, so making space can evict owners
/// that are no longer eligible. On success the pawn's sleep is disturbed and
/// it wakes up.
pub fn try_unclaim(
    state: &mut HouseholdState,
    registry: &mut OverrideRegistry,
    pawn_id: PawnId,
) -> Result<BedId, UnclaimRejection> {
    let pawn = state.pawn(pawn_id).ok_or(UnclaimRejection::UnknownPawn(pawn_id))?;
    let owned = pawn.owned_bed().ok_or(UnclaimRejection::NoBed(pawn_id))?;
    let pawn_map = pawn.map();

    registry.purge(state);
    if registry.forced_entry(pawn_id) == Some(owned)
        && state.bed(owned).and_then(|b| b.map()) == pawn_map
    {
        return Err(UnclaimRejection::ForcedBed {
            pawn: pawn_id,
            bed: owned,
        });
    }

    let tick = state.tick();
    if let Some(pawn) = state.pawn_mut(pawn_id) {
        pawn.disturb(tick);
    }
    state.unassign(pawn_id)?;
    Ok(owned)
}

/// Unconditionally release a bed the pawn owns; only needs the ownership
/// capability
pub fn release_off_map(state: &mut HouseholdState, pawn_id: PawnId) -> Result<Option<BedId>, UnclaimRejection> {
    let pawn = state.pawn(pawn_id).ok_or(UnclaimRejection::UnknownPawn(pawn_id))?;
    if !pawn.has_ownership() {
        return Err(UnclaimRejection::NoOwnership(pawn_id));
    }
    Ok(state.unassign(pawn_id)?)
}

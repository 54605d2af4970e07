//! Toggle surface
//!
//! What a host UI shows for one bed: a single unusable-marker switch and one
//! forced-assignment switch per relevant pawn. Toggles are plain data; the
//! host flips them through the registry entry points.

use crate::eligibility::{bed_usable_ever, bed_usable_now, pawn_eligible};
use crate::models::{BedId, HouseholdState, PawnId};
use crate::registry::OverrideRegistry;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToggleKind {
    Unusable { bed: BedId },
    Forced { pawn: PawnId, bed: BedId },
}

/// One switch; `active` mirrors the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Toggle {
    pub kind: ToggleKind,
    pub active: bool,
}

/// The unusable-marker switch for `bed`
///
/// `None` for beds automatic reassignment could never manage.
pub fn unusable_toggle(state: &HouseholdState, registry: &mut OverrideRegistry, bed: BedId) -> Option<Toggle> {
    let target = state.bed(bed)?;
    if !bed_usable_ever(target) {
        return None;
    }
    registry.purge(state);
    Some(Toggle {
        kind: ToggleKind::Unusable { bed },
        active: registry.is_marked_unusable(bed),
    })
}

/// Forced-assignment switches for `bed`
///
/// Pawns already forced to the bed come first (active). While that leaves
/// room under the bed's capacity, eligible current owners that are not forced
/// follow (inactive). Never more toggles than sleeping slots.
pub fn forced_assignment_toggles(
    state: &HouseholdState,
    registry: &mut OverrideRegistry,
    bed: BedId,
) -> Vec<Toggle> {
    registry.purge(state);
    let Some(target) = state.bed(bed) else {
        return Vec::new();
    };
    if !bed_usable_now(target, registry) {
        return Vec::new();
    }

    let forced: Vec<PawnId> = registry
        .forced_entries()
        .filter(|(_, forced_bed)| *forced_bed == bed)
        .map(|(pawn, _)| pawn)
        .collect();

    let mut toggles: Vec<Toggle> = forced
        .iter()
        .map(|pawn| Toggle {
            kind: ToggleKind::Forced { pawn: *pawn, bed },
            active: true,
        })
        .collect();

    if toggles.len() < target.slots() {
        toggles.extend(
            target
                .owners()
                .iter()
                .filter(|owner| !forced.contains(owner))
                .filter(|owner| state.pawn(**owner).map(pawn_eligible).unwrap_or(false))
                .map(|owner| Toggle {
                    kind: ToggleKind::Forced { pawn: *owner, bed },
                    active: false,
                }),
        );
    }
    toggles.truncate(target.slots());
    toggles
}

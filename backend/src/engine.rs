//! Bed Assigner - host-facing entry point
//!
//! Owns the household view, the override registry, the settings, the host
//! rules and the notification log. Every mutating entry point takes
//! `&mut self`, so claims from two pipeline runs can never interleave; a
//! host sharing the assigner across threads wraps it in a single mutex.
//!
//! # Invocation
//!
//! ```text
//! host scheduler ──on_pawn_seeks_rest(pawn)──▶ pipeline ──▶ Option<Event>
//!                                               │
//!                                     failures logged, never returned
//! ```
//!
//! # Example
//!
//! ```rust
//! use bed_assign_core_rs::config::ReassignmentSettings;
//! use bed_assign_core_rs::engine::BedAssigner;
//! use bed_assign_core_rs::host::RuleTable;
//! use bed_assign_core_rs::models::{Bed, BedId, HouseholdState, MapId, Pawn, PawnId};
//!
//! let mut state = HouseholdState::new();
//! state.add_pawn(Pawn::new(PawnId(1), "Ayla", MapId(0)));
//! state.add_bed(Bed::new(BedId(10), "Bed", MapId(0), 1));
//!
//! let mut assigner = BedAssigner::new(state, ReassignmentSettings::default(), Box::new(RuleTable::new()));
//! let event = assigner.on_pawn_seeks_rest(PawnId(1));
//!
//! assert!(event.is_some());
//! assert_eq!(assigner.state().pawn(PawnId(1)).unwrap().owned_bed(), Some(BedId(10)));
//! ```

use crate::config::ReassignmentSettings;
use crate::host::HostRules;
use crate::models::{BedId, Event, EventLog, HouseholdState, PawnId};
use crate::policy::{look_for_bed_reassignment, PolicyContext};
use crate::registry::{
    forced_assignment_toggles, unusable_toggle, OverrideRegistry, RegistryError, RegistrySnapshot,
    Toggle,
};

/// Summary of one pass over every pawn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassResult {
    /// Pawns the pipeline ran for
    pub evaluated: usize,
    /// Reassignments performed, in pawn id order
    pub events: Vec<Event>,
}

pub struct BedAssigner {
    state: HouseholdState,
    registry: OverrideRegistry,
    settings: ReassignmentSettings,
    rules: Box<dyn HostRules>,
    events: EventLog,
}

impl BedAssigner {
    pub fn new(state: HouseholdState, settings: ReassignmentSettings, rules: Box<dyn HostRules>) -> Self {
        Self {
            state,
            registry: OverrideRegistry::new(),
            settings,
            rules,
            events: EventLog::new(),
        }
    }

    pub fn with_registry(mut self, registry: OverrideRegistry) -> Self {
        self.registry = registry;
        self
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    /// Run the reassignment pipeline for one pawn about to seek rest
    ///
    /// Never fails: unexpected errors are logged with the pawn id and the
    /// pawn keeps whatever bed it has until it seeks rest again.
    ///
    /// # Panics
    ///
    /// Only if the [`HostRules`] implementation panics; that contract is
    /// documented on the trait.
    pub fn on_pawn_seeks_rest(&mut self, pawn: PawnId) -> Option<Event> {
        let mut ctx = PolicyContext::new(
            &mut self.state,
            &mut self.registry,
            self.rules.as_ref(),
            &self.settings,
        );
        match look_for_bed_reassignment(&mut ctx, pawn) {
            Ok(Some(event)) => {
                tracing::info!(
                    %pawn,
                    bed = %event.bed(),
                    event_type = event.event_type(),
                    "{}",
                    event.message(&self.state)
                );
                if self.settings.output_reassignment_messages {
                    self.events.log(event.clone());
                }
                Some(event)
            }
            Ok(None) => None,
            Err(error) => {
                tracing::error!(%pawn, %error, "bed reassignment failed");
                None
            }
        }
    }

    /// Run the pipeline once for every pawn, in id order
    pub fn run_pass(&mut self) -> PassResult {
        let pawns = self.state.pawn_ids();
        let mut result = PassResult {
            evaluated: pawns.len(),
            events: Vec::new(),
        };
        for pawn in pawns {
            if let Some(event) = self.on_pawn_seeks_rest(pawn) {
                result.events.push(event);
            }
        }
        result
    }

    // ========================================================================
    // Toggle surface
    // ========================================================================

    pub fn forced_assignment_toggles(&mut self, bed: BedId) -> Vec<Toggle> {
        forced_assignment_toggles(&self.state, &mut self.registry, bed)
    }

    pub fn unusable_toggle(&mut self, bed: BedId) -> Option<Toggle> {
        unusable_toggle(&self.state, &mut self.registry, bed)
    }

    pub fn set_forced(&mut self, pawn: PawnId, bed: BedId) -> bool {
        self.registry.set_forced(&self.state, pawn, bed)
    }

    pub fn clear_forced(&mut self, pawn: PawnId) -> bool {
        self.registry.clear_forced(pawn)
    }

    pub fn toggle_forced(&mut self, pawn: PawnId, bed: BedId) -> bool {
        self.registry.toggle_forced(&self.state, pawn, bed)
    }

    pub fn mark_unusable(&mut self, bed: BedId) -> bool {
        self.registry.mark_unusable(&self.state, bed)
    }

    pub fn unmark_unusable(&mut self, bed: BedId) -> bool {
        self.registry.unmark_unusable(&self.state, bed)
    }

    pub fn toggle_unusable(&mut self, bed: BedId) -> bool {
        self.registry.toggle_unusable(&self.state, bed)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn save_registry(&self) -> RegistrySnapshot {
        self.registry.to_snapshot()
    }

    /// Replace the registry with a saved one
    ///
    /// # Returns
    ///
    /// Number of saved entries that no longer resolve and were dropped.
    pub fn load_registry(&mut self, snapshot: &RegistrySnapshot) -> usize {
        let (registry, dropped) = OverrideRegistry::from_snapshot(snapshot, &self.state);
        self.registry = registry;
        if dropped > 0 {
            tracing::info!(dropped, "registry loaded with unresolvable entries dropped");
        }
        dropped
    }

    pub fn save_registry_json(&self) -> Result<String, RegistryError> {
        self.save_registry().to_json()
    }

    pub fn load_registry_json(&mut self, json: &str) -> Result<usize, RegistryError> {
        let snapshot = RegistrySnapshot::from_json(json)?;
        Ok(self.load_registry(&snapshot))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn state(&self) -> &HouseholdState {
        &self.state
    }

    /// Host-side world changes (new beds, pawns moving maps, ticks passing)
    pub fn state_mut(&mut self) -> &mut HouseholdState {
        &mut self.state
    }

    pub fn registry(&self) -> &OverrideRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &ReassignmentSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ReassignmentSettings) {
        self.settings = settings;
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

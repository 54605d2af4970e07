//! Scenario files
//!
//! A scenario is a JSON description of a household: rooms, beds (with their
//! current owners), pawns, host rules, settings and optionally a saved
//! registry. The CLI and the integration tests load households this way.
//!
//! # Example
//!
//! ```rust
//! use bed_assign_core_rs::scenario::Scenario;
//!
//! let scenario = Scenario::from_json(r#"{
//!     "pawns": [{ "id": 1, "name": "Ayla", "map": 0 }],
//!     "beds": [{ "id": 10, "label": "Bed", "map": 0, "slots": 1 }]
//! }"#).unwrap();
//!
//! let (mut assigner, dropped) = scenario.into_assigner().unwrap();
//! assert_eq!(dropped, 0);
//! assert!(assigner.run_pass().events.len() == 1);
//! ```

use crate::config::{ConfigError, ReassignmentSettings};
use crate::engine::BedAssigner;
use crate::host::RuleTable;
use crate::models::{AssignmentError, Bed, HouseholdState, ImpressivenessScale, Pawn, Room};
use crate::registry::RegistrySnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("Scenario parse error: {0}")]
    Parse(String),

    #[error("Invalid settings: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid occupancy: {0}")]
    Assignment(#[from] AssignmentError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub settings: ReassignmentSettings,

    #[serde(default)]
    pub rooms: Vec<Room>,

    #[serde(default)]
    pub beds: Vec<Bed>,

    #[serde(default)]
    pub pawns: Vec<Pawn>,

    #[serde(default)]
    pub rules: RuleTable,

    /// Saved forced assignments and unusable markers
    #[serde(default)]
    pub registry: Option<RegistrySnapshot>,

    /// Impressiveness stage thresholds; host defaults when absent
    #[serde(default)]
    pub scale: Option<ImpressivenessScale>,

    #[serde(default)]
    pub tick: Option<u64>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(json).map_err(|e| ScenarioError::Parse(e.to_string()))
    }

    /// Validate settings, seat bed owners and load the saved registry
    ///
    /// # Returns
    ///
    /// The assigner and the number of saved registry entries dropped because
    /// they no longer resolve.
    pub fn into_assigner(self) -> Result<(BedAssigner, usize), ScenarioError> {
        self.settings.validate()?;

        let mut state = HouseholdState::from_parts(self.pawns, self.beds, self.rooms)?;
        if let Some(scale) = self.scale {
            state.set_scale(scale);
        }
        if let Some(tick) = self.tick {
            state.set_tick(tick);
        }

        let mut assigner = BedAssigner::new(state, self.settings, Box::new(self.rules));
        let dropped = match &self.registry {
            Some(snapshot) => assigner.load_registry(snapshot),
            None => 0,
        };
        tracing::debug!(
            pawns = assigner.state().num_pawns(),
            beds = assigner.state().num_beds(),
            dropped,
            "scenario loaded"
        );
        Ok((assigner, dropped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BedId, PawnId};

    #[test]
    fn test_owners_are_seated() {
        let scenario = Scenario::from_json(
            r#"{
                "pawns": [{ "id": 1, "name": "A", "map": 0 }],
                "beds": [{ "id": 10, "label": "Bed", "map": 0, "slots": 1, "owners": [1] }]
            }"#,
        )
        .unwrap();
        let (assigner, _) = scenario.into_assigner().unwrap();
        assert_eq!(
            assigner.state().pawn(PawnId(1)).unwrap().owned_bed(),
            Some(BedId(10))
        );
    }

    #[test]
    fn test_overfull_bed_rejected() {
        let scenario = Scenario::from_json(
            r#"{
                "pawns": [
                    { "id": 1, "name": "A", "map": 0 },
                    { "id": 2, "name": "B", "map": 0 }
                ],
                "beds": [{ "id": 10, "label": "Bed", "map": 0, "slots": 1, "owners": [1, 2] }]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            scenario.into_assigner(),
            Err(ScenarioError::Assignment(AssignmentError::BedFull { .. }))
        ));
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let scenario = Scenario::from_json(
            r#"{ "settings": { "better_bed_room_impressiveness_threshold": 99.0 } }"#,
        )
        .unwrap();
        assert!(matches!(
            scenario.into_assigner(),
            Err(ScenarioError::Config(ConfigError::ThresholdOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Scenario::from_json("[]"),
            Err(ScenarioError::Parse(_))
        ));
    }
}

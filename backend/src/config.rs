//! Reassignment settings
//!
//! Read-only from the policy's point of view. Each optional rule has its own
//! toggle; all default to enabled.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted impressiveness hysteresis band
pub const MAX_IMPRESSIVENESS_THRESHOLD: f64 = 30.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Impressiveness threshold must be within 0..={max}, got {value}")]
    ThresholdOutOfRange { value: f64, max: f64 },

    #[error("Settings parse error: {0}")]
    Parse(String),
}

/// Rule toggles and tuning for the reassignment pipeline
///
/// # Example
///
/// ```
/// use bed_assign_core_rs::config::ReassignmentSettings;
///
/// let settings = ReassignmentSettings::from_json(r#"{ "avoid_sharing_penalty": false }"#).unwrap();
/// assert!(!settings.avoid_sharing_penalty);
/// assert!(settings.claim_better_beds);
/// assert_eq!(settings.better_bed_room_impressiveness_threshold, 3.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReassignmentSettings {
    /// Record a notification for every reassignment
    pub output_reassignment_messages: bool,

    pub avoid_jealous_penalty: bool,
    pub avoid_greedy_penalty: bool,
    pub avoid_ascetic_penalty: bool,

    /// Move to strictly better empty beds
    pub claim_better_beds: bool,

    /// Impressiveness improvement a room must exceed before it counts as
    /// better; keeps small score fluctuations from churning assignments
    pub better_bed_room_impressiveness_threshold: f64,

    /// "Want to sleep with partner"
    pub avoid_partner_penalty: bool,

    /// "Sharing bed"
    pub avoid_sharing_penalty: bool,

    /// Use bed beauty as the last stat stage of the ranking
    pub compare_beauty: bool,
}

impl Default for ReassignmentSettings {
    fn default() -> Self {
        Self {
            output_reassignment_messages: true,
            avoid_jealous_penalty: true,
            avoid_greedy_penalty: true,
            avoid_ascetic_penalty: true,
            claim_better_beds: true,
            better_bed_room_impressiveness_threshold: 3.0,
            avoid_partner_penalty: true,
            avoid_sharing_penalty: true,
            compare_beauty: true,
        }
    }
}

impl ReassignmentSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let value = self.better_bed_room_impressiveness_threshold;
        if !(0.0..=MAX_IMPRESSIVENESS_THRESHOLD).contains(&value) {
            return Err(ConfigError::ThresholdOutOfRange {
                value,
                max: MAX_IMPRESSIVENESS_THRESHOLD,
            });
        }
        Ok(())
    }

    /// Parse and validate settings; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

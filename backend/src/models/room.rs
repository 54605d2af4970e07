//! Rooms and the impressiveness scale
//!
//! Impressiveness is computed by the host and treated as opaque input. The
//! scale buckets a value into the host's stage index, which is what room
//! quality mood effects are keyed by.

use crate::models::ids::RoomId;
use serde::{Deserialize, Serialize};

/// A room containing one or more beds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub impressiveness: f64,
}

impl Room {
    pub fn new(id: RoomId, impressiveness: f64) -> Self {
        Self { id, impressiveness }
    }
}

/// Ordered lower bounds of the host's impressiveness stages
///
/// Stage `i` covers values from `thresholds[i]` up to (but excluding)
/// `thresholds[i + 1]`. The first threshold is normally negative infinity.
///
/// Serialized as a plain list; deserializing sorts it like [`new`](Self::new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<f64>", into = "Vec<f64>")]
pub struct ImpressivenessScale {
    thresholds: Vec<f64>,
}

impl ImpressivenessScale {
    pub fn new(mut thresholds: Vec<f64>) -> Self {
        thresholds.sort_by(f64::total_cmp);
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Stage index for an impressiveness value (0 when below every threshold)
    pub fn stage_index(&self, impressiveness: f64) -> usize {
        self.thresholds
            .iter()
            .rposition(|threshold| impressiveness >= *threshold)
            .unwrap_or(0)
    }
}

impl From<Vec<f64>> for ImpressivenessScale {
    fn from(thresholds: Vec<f64>) -> Self {
        Self::new(thresholds)
    }
}

impl From<ImpressivenessScale> for Vec<f64> {
    fn from(scale: ImpressivenessScale) -> Self {
        scale.thresholds
    }
}

impl Default for ImpressivenessScale {
    /// awful, dull, mediocre, decent, slightly/somewhat/very/extremely/
    /// unbelievably/wondrously impressive
    fn default() -> Self {
        Self::new(vec![
            f64::NEG_INFINITY,
            20.0,
            30.0,
            40.0,
            50.0,
            65.0,
            85.0,
            120.0,
            170.0,
            240.0,
        ])
    }
}

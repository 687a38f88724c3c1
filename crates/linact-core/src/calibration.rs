//! Calibration bounds and their store

use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw sensor values at both physical stops
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBounds {
    /// Sampled at full retraction
    pub min_sensor_position: f64,
    /// Sampled at full extension
    pub max_sensor_position: f64,
    /// When the homing run that produced these bounds finished
    pub calibrated_at: DateTime<Utc>,
}

impl CalibrationBounds {
    #[must_use]
    pub fn new(min_sensor_position: f64, max_sensor_position: f64) -> Self {
        Self {
            min_sensor_position,
            max_sensor_position,
            calibrated_at: Utc::now(),
        }
    }

    /// Raw sensor span between the two stops
    #[must_use]
    pub fn span(&self) -> f64 {
        self.max_sensor_position - self.min_sensor_position
    }

    /// Map a raw reading to length units, clamped to `[0, stroke_length]`
    #[must_use]
    pub fn normalize(&self, raw: f64, stroke_length: f64) -> f64 {
        let fraction = (raw - self.min_sensor_position) / self.span();
        (fraction * stroke_length).clamp(0.0, stroke_length)
    }
}

/// Holder for the bounds of the last successful homing run
///
/// Both bounds are stored as one value, so a reader never observes one
/// without the other.
#[derive(Debug, Default)]
pub struct CalibrationStore {
    bounds: RwLock<Option<CalibrationBounds>>,
}

impl CalibrationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bounds, if homed
    #[must_use]
    pub fn get(&self) -> Option<CalibrationBounds> {
        *self.bounds.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the bounds with those of a completed run
    pub fn commit(&self, bounds: CalibrationBounds) {
        *self.bounds.write().unwrap_or_else(PoisonError::into_inner) = Some(bounds);
    }

    #[must_use]
    pub fn is_homed(&self) -> bool {
        self.get().is_some()
    }
}

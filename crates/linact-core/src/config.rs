//! Configuration types for the linear actuator

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Transit time used when `max_extension_time` is not configured
pub const DEFAULT_TRANSIT_TIME: Duration = Duration::from_secs(30);

/// Attributes of a `linear-actuator` component
///
/// Missing fields decode to their zero values so that [`validate`] can name
/// exactly which one is absent.
///
/// [`validate`]: ActuatorConfig::validate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActuatorConfig {
    /// Physical travel distance in declared units
    #[serde(default)]
    pub stroke_length: i32,
    /// Seconds bounding one full extend or retract pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_extension_time: Option<i32>,
    /// Name of the motor driving the ram
    #[serde(default)]
    pub motor: String,
    /// Sensor reporting the ram position
    #[serde(default)]
    pub position_sensor: SensorConfig,
    /// Readings taken at each extreme; the bound is their median
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples_per_extreme: Option<u32>,
    /// End transit waits early once the sensor stops changing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle: Option<SettleConfig>,
    /// Smallest accepted `max - min` sensor span
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_sensor_span: Option<f64>,
}

/// Position sensor reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Name of the sensor component
    #[serde(default)]
    pub name: String,
    /// Reading field carrying the scalar position
    #[serde(default)]
    pub position_field: String,
}

/// Sensor polling used to detect that the ram reached its stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettleConfig {
    /// Delay between polls in milliseconds
    pub poll_interval_ms: u64,
    /// Largest change between polls still counted as stable
    #[serde(default)]
    pub tolerance: f64,
    /// Consecutive stable polls required
    #[serde(default = "default_stable_polls")]
    pub stable_polls: u32,
}

fn default_stable_polls() -> u32 {
    3
}

impl ActuatorConfig {
    /// Validate the config and return its implicit required dependencies
    ///
    /// `path` is the location of the resource in the host config and is
    /// carried in the error, e.g. `components.0`.
    ///
    /// # Errors
    /// Returns `ConfigError` naming the first missing or invalid field
    pub fn validate(&self, path: &str) -> Result<Vec<String>, ConfigError> {
        if self.stroke_length <= 0 {
            return Err(ConfigError::new(
                path,
                "stroke_length",
                "must be greater than 0",
            ));
        }
        if self.motor.is_empty() {
            return Err(ConfigError::new(path, "motor", "must be specified"));
        }
        if self.position_sensor.name.is_empty() {
            return Err(ConfigError::new(
                path,
                "position_sensor.name",
                "must be specified",
            ));
        }
        if self.position_sensor.position_field.is_empty() {
            return Err(ConfigError::new(
                path,
                "position_sensor.position_field",
                "must be specified",
            ));
        }

        if let Some(secs) = self.max_extension_time
            && secs <= 0
        {
            return Err(ConfigError::new(
                path,
                "max_extension_time",
                "must be greater than 0 when set",
            ));
        }
        if self.samples_per_extreme == Some(0) {
            return Err(ConfigError::new(
                path,
                "samples_per_extreme",
                "must be at least 1 when set",
            ));
        }
        if let Some(settle) = &self.settle {
            if settle.poll_interval_ms == 0 {
                return Err(ConfigError::new(
                    path,
                    "settle.poll_interval_ms",
                    "must be greater than 0",
                ));
            }
            if !(settle.tolerance >= 0.0) {
                return Err(ConfigError::new(
                    path,
                    "settle.tolerance",
                    "must be a non-negative number",
                ));
            }
            if settle.stable_polls == 0 {
                return Err(ConfigError::new(
                    path,
                    "settle.stable_polls",
                    "must be at least 1",
                ));
            }
        }
        if let Some(span) = self.min_sensor_span
            && !(span >= 0.0)
        {
            return Err(ConfigError::new(
                path,
                "min_sensor_span",
                "must be a non-negative number",
            ));
        }

        Ok(vec![
            self.motor.clone(),
            self.position_sensor.name.clone(),
        ])
    }

    /// Duration budgeted for one full extend or retract pass
    #[must_use]
    pub fn transit_time(&self) -> Duration {
        self.max_extension_time
            .and_then(|secs| u64::try_from(secs).ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TRANSIT_TIME, Duration::from_secs)
    }
}

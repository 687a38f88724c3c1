//! Simulated ram using `tokio::time`
//!
//! A single shared stroke model backs both a motor and a position sensor so
//! the actuator can be exercised without hardware. Position advances linearly
//! with power and saturates at both physical stops.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use crate::error::HalError;
use crate::readings::Readings;
use crate::traits::{Extra, Motor, PositionSensor};

/// Physical parameters of a simulated ram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedRamConfig {
    /// Time to travel the full stroke at full power
    #[serde(with = "duration_secs", default = "default_full_stroke_time")]
    pub full_stroke_time: Duration,
    /// Raw sensor value at full retraction
    #[serde(default)]
    pub retracted_raw: f64,
    /// Raw sensor value at full extension
    #[serde(default = "default_extended_raw")]
    pub extended_raw: f64,
    /// Field name the sensor reports position under
    #[serde(default = "default_position_field")]
    pub position_field: String,
    /// Starting position as a fraction of the stroke
    #[serde(default)]
    pub start_fraction: f64,
}

fn default_full_stroke_time() -> Duration {
    Duration::from_secs(5)
}

fn default_extended_raw() -> f64 {
    1023.0
}

fn default_position_field() -> String {
    "position".to_string()
}

impl Default for SimulatedRamConfig {
    fn default() -> Self {
        Self {
            full_stroke_time: default_full_stroke_time(),
            retracted_raw: 0.0,
            extended_raw: default_extended_raw(),
            position_field: default_position_field(),
            start_fraction: 0.0,
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug)]
struct RamState {
    /// Fraction of stroke, 0 retracted, 1 extended
    fraction: f64,
    power: f64,
    last_update: Instant,
    faulted: bool,
    power_log: Vec<f64>,
}

/// Shared stroke model for one simulated ram
#[derive(Debug, Clone)]
pub struct SimulatedRam {
    config: Arc<SimulatedRamConfig>,
    state: Arc<Mutex<RamState>>,
}

impl SimulatedRam {
    /// Create a new simulated ram at rest
    #[must_use]
    pub fn new(config: SimulatedRamConfig) -> Self {
        let state = RamState {
            fraction: config.start_fraction.clamp(0.0, 1.0),
            power: 0.0,
            last_update: Instant::now(),
            faulted: false,
            power_log: Vec::new(),
        };
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Motor handle driving this ram
    #[must_use]
    pub fn motor(&self) -> SimulatedMotor {
        SimulatedMotor { ram: self.clone() }
    }

    /// Sensor handle observing this ram
    #[must_use]
    pub fn sensor(&self) -> SimulatedPositionSensor {
        SimulatedPositionSensor { ram: self.clone() }
    }

    /// Make every subsequent motor and sensor call fail
    pub fn set_faulted(&self, faulted: bool) {
        self.lock().faulted = faulted;
    }

    /// Current stroke fraction
    #[must_use]
    pub fn fraction(&self) -> f64 {
        let mut state = self.lock();
        self.advance(&mut state);
        state.fraction
    }

    /// Current raw sensor value
    #[must_use]
    pub fn raw_position(&self) -> f64 {
        let fraction = self.fraction();
        self.raw_at(fraction)
    }

    /// Last commanded power
    #[must_use]
    pub fn power(&self) -> f64 {
        self.lock().power
    }

    /// Every power command accepted so far, in order
    #[must_use]
    pub fn power_log(&self) -> Vec<f64> {
        self.lock().power_log.clone()
    }

    fn raw_at(&self, fraction: f64) -> f64 {
        let span = self.config.extended_raw - self.config.retracted_raw;
        self.config.retracted_raw + fraction * span
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RamState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance(&self, state: &mut RamState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_update);
        state.last_update = now;

        let stroke_secs = self.config.full_stroke_time.as_secs_f64();
        if stroke_secs <= 0.0 {
            if state.power > 0.0 {
                state.fraction = 1.0;
            } else if state.power < 0.0 {
                state.fraction = 0.0;
            }
            return;
        }

        let delta = state.power * elapsed.as_secs_f64() / stroke_secs;
        state.fraction = (state.fraction + delta).clamp(0.0, 1.0);
    }
}

/// Motor half of a simulated ram
#[derive(Debug, Clone)]
pub struct SimulatedMotor {
    ram: SimulatedRam,
}

#[async_trait]
impl Motor for SimulatedMotor {
    #[instrument(skip(self, _extra), level = "debug")]
    async fn set_power(&self, power: f64, _extra: &Extra) -> Result<(), HalError> {
        if !(-1.0..=1.0).contains(&power) {
            return Err(HalError::PowerOutOfRange { power });
        }

        let mut state = self.ram.lock();
        if state.faulted {
            warn!(power, "simulated motor faulted, rejecting power command");
            return Err(HalError::CommandRejected("simulated fault".to_string()));
        }

        self.ram.advance(&mut state);
        state.power = power;
        state.power_log.push(power);

        debug!(power, fraction = state.fraction, "simulated motor power set");
        Ok(())
    }
}

/// Sensor half of a simulated ram
#[derive(Debug, Clone)]
pub struct SimulatedPositionSensor {
    ram: SimulatedRam,
}

#[async_trait]
impl PositionSensor for SimulatedPositionSensor {
    async fn readings(&self, _extra: &Extra) -> Result<Readings, HalError> {
        let (fraction, power) = {
            let mut state = self.ram.lock();
            if state.faulted {
                return Err(HalError::ReadFailed("simulated fault".to_string()));
            }
            self.ram.advance(&mut state);
            (state.fraction, state.power)
        };

        let mut readings = Readings::new();
        readings.insert(
            self.ram.config.position_field.clone(),
            Value::from(self.ram.raw_at(fraction)),
        );
        readings.insert("power".to_string(), Value::from(power));
        Ok(readings)
    }
}

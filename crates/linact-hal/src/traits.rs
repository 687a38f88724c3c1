//! Motor and position sensor capability traits

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::HalError;
use crate::readings::Readings;

/// Free-form per-call arguments forwarded to collaborators
pub type Extra = Map<String, Value>;

/// A motor driven by a signed power fraction
#[async_trait]
pub trait Motor: Send + Sync {
    /// Drive the motor at `power` in `[-1, 1]`; `0.0` stops it.
    async fn set_power(&self, power: f64, extra: &Extra) -> Result<(), HalError>;
}

/// A sensor producing a named-field reading set on demand
#[async_trait]
pub trait PositionSensor: Send + Sync {
    async fn readings(&self, extra: &Extra) -> Result<Readings, HalError>;
}

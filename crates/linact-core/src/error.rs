//! Core error types for linact-core

use linact_hal::{FieldError, HalError};
use thiserror::Error;

use crate::state::{CommandPhase, Extreme, HomingPhase};

/// A required config field is missing or invalid
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid config at {path:?}: {field} {reason}")]
pub struct ConfigError {
    /// Path of the resource in the host config, e.g. `components.0`
    pub path: String,
    /// Offending attribute
    pub field: &'static str,
    /// What is wrong with it
    pub reason: String,
}

impl ConfigError {
    pub(crate) fn new(path: &str, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            field,
            reason: reason.into(),
        }
    }
}

/// A named collaborator could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Nothing is registered under the name
    #[error("dependency {name:?} not found")]
    NotFound {
        /// Requested name
        name: String,
    },

    /// The name resolves to a different kind of collaborator
    #[error("dependency {name:?} is a {actual}, expected a {expected}")]
    WrongKind {
        /// Requested name
        name: String,
        /// Kind the actuator needs
        expected: &'static str,
        /// Kind actually registered
        actual: &'static str,
    },
}

/// Failure to obtain a position value from the sensor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    /// The sensor read itself failed
    #[error("failed to read position sensor: {0}")]
    Read(#[from] HalError),

    /// The reading set lacks a usable position field
    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Errors that can occur in actuator operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActuatorError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Collaborator resolution failed
    #[error("failed to resolve dependency: {0}")]
    Resolution(#[from] ResolutionError),

    /// Motor rejected a power command during homing
    #[error("failed to {phase} actuator: {source}")]
    Command {
        /// Which command failed
        phase: CommandPhase,
        /// Motor error
        source: HalError,
    },

    /// Sensor failed while sampling an extreme
    #[error("position sensor failed at {extreme} extreme: {source}")]
    Sensor {
        /// Extreme being sampled
        extreme: Extreme,
        /// Sensor error
        source: SensorError,
    },

    /// Sensor failed during a position query
    #[error("position query failed: {0}")]
    PositionRead(#[source] SensorError),

    /// Homing was cancelled by closing the actuator
    #[error("homing cancelled during {phase}")]
    Cancelled {
        /// Phase that was interrupted
        phase: HomingPhase,
    },

    /// Sampled bounds are equal, inverted, or too close together
    #[error(
        "degenerate calibration: max {max} does not exceed min {min} by more than {min_span}"
    )]
    DegenerateCalibration {
        /// Retracted sample
        min: f64,
        /// Extended sample
        max: f64,
        /// Required span
        min_span: f64,
    },

    /// Position requested before a successful homing
    #[error("actuator not yet homed")]
    NotHomed,

    /// Another homing run holds the actuator
    #[error("homing already in progress")]
    HomingInProgress,

    /// Actuator has been closed
    #[error("actuator closed")]
    Closed,

    /// Capability exists but has no behavior yet
    #[error("{0} not implemented")]
    Unimplemented(&'static str),

    /// No constructor registered for a model triple
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// Attributes do not decode into the native config
    #[error("invalid attributes: {0}")]
    InvalidAttributes(String),
}

impl ActuatorError {
    /// Check if error is a stable "not implemented" signal
    #[must_use]
    pub fn is_unimplemented(&self) -> bool {
        matches!(self, ActuatorError::Unimplemented(_))
    }

    /// Check if error came from cancellation
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ActuatorError::Cancelled { .. })
    }
}

/// Errors that can occur in `ModuleHost` operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModuleError {
    /// No resource with that name
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// A resource with that name already exists
    #[error("resource already exists: {0}")]
    ResourceExists(String),

    /// Building or operating the actuator failed
    #[error(transparent)]
    Actuator(#[from] ActuatorError),
}

//! linact-core: Linear actuator homing and gantry facade
//!
//! Implements config validation, the homing calibrator, the calibration
//! store, the `LinearActuator` gantry facade, the component registry, and the
//! `ModuleHost` actor that owns configured actuators.

pub mod actor;
pub mod actuator;
pub mod calibration;
pub mod config;
pub mod error;
pub mod gantry;
pub mod homing;
pub mod message;
pub mod registry;
pub mod state;

pub use actor::module_host::{ModuleHost, ModuleHostArgs};
pub use actuator::LinearActuator;
pub use calibration::{CalibrationBounds, CalibrationStore};
pub use config::{ActuatorConfig, DEFAULT_TRANSIT_TIME, SensorConfig, SettleConfig};
pub use error::{ActuatorError, ConfigError, ModuleError, ResolutionError, SensorError};
pub use gantry::{Gantry, Input, KinematicsModel};
pub use homing::{HomingCalibrator, HomingOptions, SettleOptions};
pub use message::{
    AddResource, GetResource, ListResources, ReconfigureResource, RemoveResource, ResourceStatus,
};
pub use registry::{
    Api, Dependencies, Dependency, GANTRY_API, LINEAR_ACTUATOR, Model, Registration, ResourceName,
};
pub use state::{CommandPhase, Extreme, HomingPhase};

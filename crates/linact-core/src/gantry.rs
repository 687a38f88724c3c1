//! Gantry capability surface
//!
//! The multi-axis positioning contract a host uses to drive any gantry
//! component. A single-axis linear actuator implements it with one axis.

use async_trait::async_trait;
use linact_hal::Extra;

use crate::error::ActuatorError;
use crate::registry::ResourceName;

/// One joint input in kinematic units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Input {
    pub value: f64,
}

/// Kinematic description of a gantry
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicsModel {
    pub name: String,
    /// `(min, max)` limits per axis
    pub limits: Vec<(f64, f64)>,
}

#[async_trait]
pub trait Gantry: Send + Sync {
    fn name(&self) -> &ResourceName;

    /// Position of each axis in length units
    async fn position(&self, extra: &Extra) -> Result<Vec<f64>, ActuatorError>;

    /// Length of each axis
    async fn lengths(&self, extra: &Extra) -> Result<Vec<f64>, ActuatorError>;

    /// Run the homing sequence; `Ok(true)` once completed
    async fn home(&self, extra: &Extra) -> Result<bool, ActuatorError>;

    /// Move to `positions`, blocking until done or superseded
    async fn move_to_position(
        &self,
        positions: &[f64],
        speeds: &[f64],
        extra: &Extra,
    ) -> Result<(), ActuatorError>;

    async fn stop(&self, extra: &Extra) -> Result<(), ActuatorError>;

    async fn kinematics(&self) -> Result<KinematicsModel, ActuatorError>;

    async fn current_inputs(&self) -> Result<Vec<Input>, ActuatorError>;

    async fn go_to_inputs(&self, input_steps: &[Vec<Input>]) -> Result<(), ActuatorError>;

    async fn do_command(&self, cmd: &Extra) -> Result<Extra, ActuatorError>;

    async fn is_moving(&self) -> Result<bool, ActuatorError>;

    /// Release the component; safe to call more than once
    async fn close(&self) -> Result<(), ActuatorError>;
}

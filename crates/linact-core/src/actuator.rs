//! `LinearActuator`: single-axis gantry backed by a motor and a position sensor
//!
//! Position is never commanded directly. It is read from the sensor and
//! mapped through the bounds learned by homing.

use std::sync::Arc;

use async_trait::async_trait;
use linact_hal::{Extra, Motor, PositionSensor, scalar_field};
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::calibration::{CalibrationBounds, CalibrationStore};
use crate::config::ActuatorConfig;
use crate::error::{ActuatorError, SensorError};
use crate::gantry::{Gantry, Input, KinematicsModel};
use crate::homing::{HomingCalibrator, HomingOptions};
use crate::registry::{Dependencies, GANTRY_API, Registration, ResourceName};
use crate::state::HomingPhase;

/// Linear actuator exposed as a one-axis gantry
pub struct LinearActuator {
    name: ResourceName,
    config: ActuatorConfig,
    motor: Arc<dyn Motor>,
    sensor: Arc<dyn PositionSensor>,
    calibration: CalibrationStore,
    options: HomingOptions,
    /// Governs every long-running operation this actuator starts
    cancel: CancellationToken,
    /// Held for the duration of a homing run
    homing: Mutex<()>,
    phase: watch::Sender<HomingPhase>,
}

impl LinearActuator {
    /// Validate `config` and resolve its collaborators from `deps`
    ///
    /// # Errors
    /// Returns `Config` for an invalid config and `Resolution` if the motor
    /// or sensor cannot be resolved
    pub fn new(
        name: ResourceName,
        config: ActuatorConfig,
        deps: &Dependencies,
    ) -> Result<Self, ActuatorError> {
        config.validate(&name.name)?;

        let cancel = CancellationToken::new();

        let motor = match deps.motor(&config.motor) {
            Ok(motor) => motor,
            Err(e) => {
                cancel.cancel();
                return Err(e.into());
            }
        };
        let sensor = match deps.sensor(&config.position_sensor.name) {
            Ok(sensor) => sensor,
            Err(e) => {
                cancel.cancel();
                return Err(e.into());
            }
        };

        info!(
            actuator = %name,
            motor = %config.motor,
            sensor = %config.position_sensor.name,
            stroke_length = config.stroke_length,
            "linear actuator created"
        );

        let options = HomingOptions::from_config(&config);
        let (phase, _) = watch::channel(HomingPhase::Idle);

        Ok(Self {
            name,
            config,
            motor,
            sensor,
            calibration: CalibrationStore::new(),
            options,
            cancel,
            homing: Mutex::new(()),
            phase,
        })
    }

    /// Override the homing options derived from the config
    #[must_use]
    pub fn with_homing_options(mut self, options: HomingOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ActuatorConfig {
        &self.config
    }

    /// Bounds of the last successful homing run
    #[must_use]
    pub fn calibration(&self) -> Option<CalibrationBounds> {
        self.calibration.get()
    }

    #[must_use]
    pub fn is_homed(&self) -> bool {
        self.calibration.is_homed()
    }

    /// Current homing phase
    #[must_use]
    pub fn phase(&self) -> HomingPhase {
        *self.phase.borrow()
    }

    /// Watch homing phase changes
    #[must_use]
    pub fn subscribe_phase(&self) -> watch::Receiver<HomingPhase> {
        self.phase.subscribe()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    async fn read_raw(&self, extra: &Extra) -> Result<f64, SensorError> {
        let readings = self.sensor.readings(extra).await?;
        Ok(scalar_field(
            &readings,
            &self.config.position_sensor.position_field,
        )?)
    }
}

#[async_trait]
impl Gantry for LinearActuator {
    fn name(&self) -> &ResourceName {
        &self.name
    }

    #[instrument(skip(self, extra), fields(actuator = %self.name))]
    async fn position(&self, extra: &Extra) -> Result<Vec<f64>, ActuatorError> {
        let bounds = self.calibration.get().ok_or(ActuatorError::NotHomed)?;

        let raw = self
            .read_raw(extra)
            .await
            .map_err(ActuatorError::PositionRead)?;
        let position = bounds.normalize(raw, f64::from(self.config.stroke_length));

        debug!(raw, position, "position read");
        Ok(vec![position])
    }

    async fn lengths(&self, _extra: &Extra) -> Result<Vec<f64>, ActuatorError> {
        Err(ActuatorError::Unimplemented("lengths"))
    }

    #[instrument(skip(self, extra), fields(actuator = %self.name))]
    async fn home(&self, extra: &Extra) -> Result<bool, ActuatorError> {
        if self.cancel.is_cancelled() {
            return Err(ActuatorError::Closed);
        }

        let Ok(_guard) = self.homing.try_lock() else {
            warn!("rejecting homing request, another run is in progress");
            return Err(ActuatorError::HomingInProgress);
        };

        let calibrator = HomingCalibrator::new(
            self.motor.as_ref(),
            self.sensor.as_ref(),
            &self.config.position_sensor.position_field,
            &self.options,
            &self.cancel,
            &self.phase,
            extra,
        );

        let bounds = calibrator.run().await?;
        self.calibration.commit(bounds);

        Ok(true)
    }

    async fn move_to_position(
        &self,
        _positions: &[f64],
        _speeds: &[f64],
        _extra: &Extra,
    ) -> Result<(), ActuatorError> {
        Err(ActuatorError::Unimplemented("move_to_position"))
    }

    async fn stop(&self, _extra: &Extra) -> Result<(), ActuatorError> {
        Err(ActuatorError::Unimplemented("stop"))
    }

    async fn kinematics(&self) -> Result<KinematicsModel, ActuatorError> {
        Err(ActuatorError::Unimplemented("kinematics"))
    }

    async fn current_inputs(&self) -> Result<Vec<Input>, ActuatorError> {
        Err(ActuatorError::Unimplemented("current_inputs"))
    }

    async fn go_to_inputs(&self, _input_steps: &[Vec<Input>]) -> Result<(), ActuatorError> {
        Err(ActuatorError::Unimplemented("go_to_inputs"))
    }

    async fn do_command(&self, _cmd: &Extra) -> Result<Extra, ActuatorError> {
        Err(ActuatorError::Unimplemented("do_command"))
    }

    async fn is_moving(&self) -> Result<bool, ActuatorError> {
        Err(ActuatorError::Unimplemented("is_moving"))
    }

    // The motor is not commanded here; an in-flight homing run stops it on
    // its way out, and close returns only after that run has finished.
    async fn close(&self) -> Result<(), ActuatorError> {
        if !self.cancel.is_cancelled() {
            info!(actuator = %self.name, "closing linear actuator");
            self.cancel.cancel();
        }

        let _idle = self.homing.lock().await;
        Ok(())
    }
}

fn decode(attributes: &Value) -> Result<ActuatorConfig, ActuatorError> {
    serde_json::from_value(attributes.clone())
        .map_err(|e| ActuatorError::InvalidAttributes(e.to_string()))
}

fn validate_attributes(attributes: &Value, path: &str) -> Result<Vec<String>, ActuatorError> {
    Ok(decode(attributes)?.validate(path)?)
}

fn construct(
    name: ResourceName,
    attributes: &Value,
    deps: &Dependencies,
) -> Result<Arc<dyn Gantry>, ActuatorError> {
    let config = decode(attributes)?;
    Ok(Arc::new(LinearActuator::new(name, config, deps)?))
}

/// Registry entry for the linear actuator model
#[must_use]
pub fn registration() -> Registration {
    Registration {
        api: GANTRY_API.clone(),
        validator: validate_attributes,
        constructor: construct,
    }
}

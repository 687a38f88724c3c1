//! Homing calibrator
//!
//! Drives the ram to full extension, samples the sensor, drives it to full
//! retraction, samples again, and returns the resulting bounds. The caller
//! commits the bounds; a failed or cancelled run returns no bounds at all.
//!
//! Transit waits are either a fixed duration or, with [`SettleOptions`], a
//! sensor poll that ends once successive readings agree. In both cases the
//! wait races the actuator's cancellation token and the motor is stopped
//! before a cancelled run returns.

use std::time::Duration;

use linact_hal::{Extra, Motor, PositionSensor, scalar_field};
use tokio::sync::watch;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::calibration::CalibrationBounds;
use crate::config::{ActuatorConfig, SettleConfig};
use crate::error::{ActuatorError, SensorError};
use crate::state::{Extreme, HomingPhase};

/// Tunables for one homing run
///
/// Built from an [`ActuatorConfig`] and adjusted with the `with_*` methods,
/// which keep at least one sample per extreme.
#[derive(Debug, Clone, PartialEq)]
pub struct HomingOptions {
    /// Upper bound for one extend or retract pass
    transit_time: Duration,
    /// Readings per extreme, never zero
    samples: u32,
    /// Early end of a transit wait on sensor stability
    settle: Option<SettleOptions>,
    /// Smallest accepted `max - min`
    min_span: f64,
}

/// Sensor polling parameters for settle detection
#[derive(Debug, Clone, PartialEq)]
pub struct SettleOptions {
    pub poll_interval: Duration,
    pub tolerance: f64,
    pub stable_polls: u32,
}

impl From<&SettleConfig> for SettleOptions {
    fn from(config: &SettleConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            tolerance: config.tolerance,
            stable_polls: config.stable_polls,
        }
    }
}

impl HomingOptions {
    #[must_use]
    pub fn from_config(config: &ActuatorConfig) -> Self {
        Self {
            transit_time: config.transit_time(),
            samples: config.samples_per_extreme.unwrap_or(1).max(1),
            settle: config.settle.as_ref().map(SettleOptions::from),
            min_span: config.min_sensor_span.unwrap_or(0.0),
        }
    }

    #[must_use]
    pub fn transit_time(&self) -> Duration {
        self.transit_time
    }

    #[must_use]
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Set the transit time
    #[must_use]
    pub fn with_transit_time(mut self, transit_time: Duration) -> Self {
        self.transit_time = transit_time;
        self
    }

    /// Set the number of samples per extreme
    #[must_use]
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples.max(1);
        self
    }

    /// Enable settle detection
    #[must_use]
    pub fn with_settle(mut self, settle: SettleOptions) -> Self {
        self.settle = Some(settle);
        self
    }
}

/// How a transit wait ended
enum Wait {
    Elapsed,
    Settled,
    Cancelled,
}

/// One homing run over borrowed collaborators
pub struct HomingCalibrator<'a> {
    motor: &'a dyn Motor,
    sensor: &'a dyn PositionSensor,
    position_field: &'a str,
    options: &'a HomingOptions,
    cancel: &'a CancellationToken,
    phase: &'a watch::Sender<HomingPhase>,
    extra: &'a Extra,
}

impl<'a> HomingCalibrator<'a> {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        motor: &'a dyn Motor,
        sensor: &'a dyn PositionSensor,
        position_field: &'a str,
        options: &'a HomingOptions,
        cancel: &'a CancellationToken,
        phase: &'a watch::Sender<HomingPhase>,
        extra: &'a Extra,
    ) -> Self {
        Self {
            motor,
            sensor,
            position_field,
            options,
            cancel,
            phase,
            extra,
        }
    }

    /// Execute the full extend/sample/retract/sample sequence
    ///
    /// # Errors
    /// Returns the first motor, sensor, span or cancellation failure
    #[instrument(skip(self), fields(transit = ?self.options.transit_time))]
    pub async fn run(&self) -> Result<CalibrationBounds, ActuatorError> {
        let result = self.run_sequence().await;

        match &result {
            Ok(bounds) => {
                self.enter(HomingPhase::Calibrated);
                info!(
                    min = bounds.min_sensor_position,
                    max = bounds.max_sensor_position,
                    "homing completed"
                );
            }
            Err(e) => {
                let phase = self.current_phase();
                self.enter(HomingPhase::Failed);
                error!(phase = %phase, error = %e, "homing failed");
            }
        }

        result
    }

    async fn run_sequence(&self) -> Result<CalibrationBounds, ActuatorError> {
        let max = self.drive_to(Extreme::Extended).await?;
        let min = self.drive_to(Extreme::Retracted).await?;

        // negated comparison also rejects NaN
        if !(max - min > self.options.min_span) {
            return Err(ActuatorError::DegenerateCalibration {
                min,
                max,
                min_span: self.options.min_span,
            });
        }

        Ok(CalibrationBounds::new(min, max))
    }

    /// Drive to one stop, stop the motor, and sample the sensor there
    async fn drive_to(&self, extreme: Extreme) -> Result<f64, ActuatorError> {
        self.enter(extreme.travel_phase());

        // nothing is powered yet, so no stop is needed
        if self.cancel.is_cancelled() {
            return Err(ActuatorError::Cancelled {
                phase: extreme.travel_phase(),
            });
        }

        self.motor
            .set_power(extreme.power(), self.extra)
            .await
            .map_err(|source| ActuatorError::Command {
                phase: extreme.start_command(),
                source,
            })?;

        match self.transit(extreme).await? {
            Wait::Cancelled => return Err(self.abort().await),
            Wait::Settled => debug!(%extreme, "sensor settled before transit time"),
            Wait::Elapsed => debug!(%extreme, "transit time elapsed"),
        }

        self.motor
            .set_power(0.0, self.extra)
            .await
            .map_err(|source| ActuatorError::Command {
                phase: extreme.stop_command(),
                source,
            })?;

        self.enter(extreme.sample_phase());
        self.sample(extreme).await
    }

    async fn transit(&self, extreme: Extreme) -> Result<Wait, ActuatorError> {
        let deadline = Instant::now() + self.options.transit_time;

        let Some(settle) = &self.options.settle else {
            return Ok(tokio::select! {
                biased;
                () = self.cancel.cancelled() => Wait::Cancelled,
                () = sleep_until(deadline) => Wait::Elapsed,
            });
        };

        let mut previous: Option<f64> = None;
        let mut stable = 0u32;

        loop {
            let next_poll = (Instant::now() + settle.poll_interval).min(deadline);
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Ok(Wait::Cancelled),
                () = sleep_until(next_poll) => {}
            }

            if Instant::now() >= deadline {
                return Ok(Wait::Elapsed);
            }

            let read = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Ok(Wait::Cancelled),
                read = self.read_position() => read,
            };

            let current = match read {
                Ok(value) => value,
                Err(source) => {
                    self.stop_best_effort().await;
                    return Err(ActuatorError::Sensor { extreme, source });
                }
            };

            if let Some(prev) = previous
                && (current - prev).abs() <= settle.tolerance
            {
                stable += 1;
                if stable >= settle.stable_polls {
                    return Ok(Wait::Settled);
                }
            } else {
                stable = 0;
            }
            previous = Some(current);
        }
    }

    /// Take the configured number of readings and return their median
    async fn sample(&self, extreme: Extreme) -> Result<f64, ActuatorError> {
        let mut values = Vec::with_capacity(self.options.samples as usize);

        for _ in 0..self.options.samples {
            let value = self
                .read_position()
                .await
                .map_err(|source| ActuatorError::Sensor { extreme, source })?;
            values.push(value);
        }

        let bound = median(&mut values);
        debug!(%extreme, bound, samples = values.len(), "sampled extreme");
        Ok(bound)
    }

    async fn read_position(&self) -> Result<f64, SensorError> {
        let readings = self.sensor.readings(self.extra).await?;
        Ok(scalar_field(&readings, self.position_field)?)
    }

    async fn abort(&self) -> ActuatorError {
        let phase = self.current_phase();
        warn!(phase = %phase, "homing cancelled, stopping motor");
        self.stop_best_effort().await;
        ActuatorError::Cancelled { phase }
    }

    async fn stop_best_effort(&self) {
        if let Err(e) = self.motor.set_power(0.0, self.extra).await {
            error!(error = %e, "failed to stop motor after aborted transit");
        }
    }

    fn current_phase(&self) -> HomingPhase {
        *self.phase.borrow()
    }

    fn enter(&self, next: HomingPhase) {
        let previous = self.phase.send_replace(next);
        debug_assert!(
            previous.can_transition_to(next),
            "illegal homing transition {previous} -> {next}"
        );
        info!(from = %previous, to = %next, "homing phase");
    }
}

/// Median of a non-empty sample set
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

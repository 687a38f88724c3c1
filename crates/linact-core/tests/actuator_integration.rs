use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kameo::actor::Spawn;
use kameo::error::SendError;
use serde_json::{Value, json};

use linact_core::homing::{HomingOptions, SettleOptions};
use linact_core::*;
use linact_hal::{Extra, HalError, Motor, PositionSensor, Readings};

// Mock implementations
#[derive(Default)]
struct MockMotor {
    commands: Mutex<Vec<f64>>,
    /// Reject the command with this index (0-based)
    fail_at: Option<usize>,
}

impl MockMotor {
    fn failing_at(index: usize) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            fail_at: Some(index),
        }
    }

    fn commands(&self) -> Vec<f64> {
        self.commands.lock().unwrap().clone()
    }

    /// Last nonzero power, i.e. the direction the ram last travelled
    fn last_direction(&self) -> f64 {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .rev()
            .copied()
            .find(|p| *p != 0.0)
            .unwrap_or(0.0)
    }
}

#[async_trait]
impl Motor for MockMotor {
    async fn set_power(&self, power: f64, _extra: &Extra) -> Result<(), HalError> {
        let mut commands = self.commands.lock().unwrap();
        if self.fail_at == Some(commands.len()) {
            commands.push(f64::NAN);
            return Err(HalError::CommandRejected("driver fault".to_string()));
        }
        commands.push(power);
        Ok(())
    }
}

/// Returns scripted reading sets in order, repeating the last one
struct ScriptedSensor {
    script: Mutex<VecDeque<Result<Readings, HalError>>>,
    last: Mutex<Option<Result<Readings, HalError>>>,
}

impl ScriptedSensor {
    fn new(script: Vec<Result<Readings, HalError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
        }
    }

    fn positions(values: &[f64]) -> Self {
        Self::new(values.iter().map(|v| Ok(pos(*v))).collect())
    }
}

#[async_trait]
impl PositionSensor for ScriptedSensor {
    async fn readings(&self, _extra: &Extra) -> Result<Readings, HalError> {
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(next) = next {
            *last = Some(next);
        }
        last.clone()
            .unwrap_or_else(|| Err(HalError::ReadFailed("empty script".to_string())))
    }
}

/// Reports 100.0 after extending and 0.0 after retracting
struct StrokeSensor {
    motor: Arc<MockMotor>,
}

#[async_trait]
impl PositionSensor for StrokeSensor {
    async fn readings(&self, _extra: &Extra) -> Result<Readings, HalError> {
        let value = if self.motor.last_direction() > 0.0 {
            100.0
        } else {
            0.0
        };
        Ok(pos(value))
    }
}

/// Never settles: every read moves by 10, optionally after a delay
struct DriftingSensor {
    reads: Mutex<u32>,
    delay: Duration,
}

impl DriftingSensor {
    fn new(delay: Duration) -> Self {
        Self {
            reads: Mutex::new(0),
            delay,
        }
    }
}

#[async_trait]
impl PositionSensor for DriftingSensor {
    async fn readings(&self, _extra: &Extra) -> Result<Readings, HalError> {
        tokio::time::sleep(self.delay).await;
        let value = {
            let mut reads = self.reads.lock().unwrap();
            *reads += 1;
            f64::from(*reads) * 10.0
        };
        Ok(pos(value))
    }
}

fn pos(value: f64) -> Readings {
    readings(&[("pos", json!(value))])
}

fn readings(pairs: &[(&str, Value)]) -> Readings {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn config() -> ActuatorConfig {
    ActuatorConfig {
        stroke_length: 200,
        max_extension_time: Some(5),
        motor: "ram-motor".to_string(),
        position_sensor: SensorConfig {
            name: "ram-pot".to_string(),
            position_field: "pos".to_string(),
        },
        ..ActuatorConfig::default()
    }
}

fn fast_options() -> HomingOptions {
    HomingOptions::from_config(&config()).with_transit_time(Duration::from_millis(20))
}

fn actuator_with(
    motor: Arc<MockMotor>,
    sensor: Arc<dyn PositionSensor>,
    options: HomingOptions,
) -> LinearActuator {
    let deps = Dependencies::new()
        .with_motor("ram-motor", motor)
        .with_sensor("ram-pot", sensor);

    LinearActuator::new(ResourceName::gantry("ram"), config(), &deps)
        .unwrap()
        .with_homing_options(options)
}

#[tokio::test]
async fn test_home_records_both_bounds() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::positions(&[100.0, 0.0]));
    let actuator = actuator_with(motor.clone(), sensor, fast_options());

    let homed = actuator.home(&Extra::new()).await.unwrap();

    assert!(homed);
    let bounds = actuator.calibration().unwrap();
    assert_eq!(bounds.max_sensor_position, 100.0);
    assert_eq!(bounds.min_sensor_position, 0.0);
    assert_eq!(motor.commands(), vec![1.0, 0.0, -1.0, 0.0]);
    assert_eq!(actuator.phase(), HomingPhase::Calibrated);
}

#[tokio::test]
async fn test_retract_sample_comes_from_second_read() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::positions(&[740.0, 12.0]));
    let actuator = actuator_with(motor, sensor, fast_options());

    actuator.home(&Extra::new()).await.unwrap();

    let bounds = actuator.calibration().unwrap();
    assert_eq!(bounds.min_sensor_position, 12.0);
    assert_ne!(bounds.min_sensor_position, bounds.max_sensor_position);
}

#[tokio::test]
async fn test_missing_field_fails_without_calibrating() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::new(vec![Ok(readings(&[(
        "voltage",
        json!(4.2),
    )]))]));
    let actuator = actuator_with(motor, sensor, fast_options());

    let err = actuator.home(&Extra::new()).await.unwrap_err();

    assert!(err.to_string().contains("pos"), "{err}");
    assert!(matches!(
        err,
        ActuatorError::Sensor {
            extreme: Extreme::Extended,
            ..
        }
    ));
    assert!(actuator.calibration().is_none());
    assert_eq!(actuator.phase(), HomingPhase::Failed);
}

#[tokio::test]
async fn test_non_numeric_field_is_rejected() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::new(vec![Ok(readings(&[(
        "pos",
        json!("100"),
    )]))]));
    let actuator = actuator_with(motor, sensor, fast_options());

    let err = actuator.home(&Extra::new()).await.unwrap_err();

    assert!(err.to_string().contains("string"), "{err}");
    assert!(actuator.calibration().is_none());
}

#[tokio::test]
async fn test_sensor_read_failure() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::new(vec![
        Ok(pos(100.0)),
        Err(HalError::NotConnected),
    ]));
    let actuator = actuator_with(motor, sensor, fast_options());

    let err = actuator.home(&Extra::new()).await.unwrap_err();

    assert_eq!(
        err,
        ActuatorError::Sensor {
            extreme: Extreme::Retracted,
            source: SensorError::Read(HalError::NotConnected),
        }
    );
    assert!(actuator.calibration().is_none());
}

#[tokio::test]
async fn test_motor_start_failure_aborts_immediately() {
    let motor = Arc::new(MockMotor::failing_at(0));
    let sensor = Arc::new(ScriptedSensor::positions(&[100.0, 0.0]));
    let actuator = actuator_with(motor.clone(), sensor, fast_options());

    let err = actuator.home(&Extra::new()).await.unwrap_err();

    assert!(matches!(
        err,
        ActuatorError::Command {
            phase: CommandPhase::ExtendStart,
            ..
        }
    ));
    assert!(
        err.to_string()
            .contains("failed to start motor power extending actuator")
    );
    assert_eq!(motor.commands().len(), 1);
    assert!(actuator.calibration().is_none());
}

#[tokio::test]
async fn test_motor_failure_names_phase() {
    let phases = [
        (1, CommandPhase::ExtendStop),
        (2, CommandPhase::RetractStart),
        (3, CommandPhase::RetractStop),
    ];

    for (index, expected) in phases {
        let motor = Arc::new(MockMotor::failing_at(index));
        let sensor = Arc::new(ScriptedSensor::positions(&[100.0, 0.0]));
        let actuator = actuator_with(motor, sensor, fast_options());

        let err = actuator.home(&Extra::new()).await.unwrap_err();

        assert!(
            matches!(err, ActuatorError::Command { phase, .. } if phase == expected),
            "command {index}: {err}"
        );
        assert!(actuator.calibration().is_none());
    }
}

#[tokio::test]
async fn test_failed_rehome_keeps_previous_bounds() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::new(vec![
        Ok(pos(100.0)),
        Ok(pos(0.0)),
        Ok(pos(98.0)),
        Ok(readings(&[("other", json!(1.0))])),
    ]));
    let actuator = actuator_with(motor, sensor, fast_options());

    actuator.home(&Extra::new()).await.unwrap();
    let before = actuator.calibration().unwrap();

    assert!(actuator.home(&Extra::new()).await.is_err());
    assert_eq!(actuator.calibration(), Some(before));
}

#[tokio::test]
async fn test_close_cancels_transit_and_stops_motor() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::positions(&[100.0, 0.0]));
    let actuator = Arc::new(actuator_with(
        motor.clone(),
        sensor,
        fast_options().with_transit_time(Duration::from_secs(30)),
    ));

    let homing = {
        let actuator = actuator.clone();
        tokio::spawn(async move { actuator.home(&Extra::new()).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    actuator.close().await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), homing)
        .await
        .expect("homing did not observe cancellation")
        .unwrap();

    assert_eq!(
        result,
        Err(ActuatorError::Cancelled {
            phase: HomingPhase::Extending
        })
    );
    assert_eq!(motor.commands(), vec![1.0, 0.0]);
    assert!(actuator.calibration().is_none());
}

#[tokio::test]
async fn test_concurrent_home_is_rejected() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::positions(&[100.0, 0.0]));
    let actuator = Arc::new(actuator_with(
        motor,
        sensor,
        fast_options().with_transit_time(Duration::from_secs(30)),
    ));

    let first = {
        let actuator = actuator.clone();
        tokio::spawn(async move { actuator.home(&Extra::new()).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(
        actuator.home(&Extra::new()).await,
        Err(ActuatorError::HomingInProgress)
    );

    actuator.close().await.unwrap();
    let first = first.await.unwrap();
    assert!(first.unwrap_err().is_cancelled());
}

#[tokio::test]
async fn test_equal_bounds_are_degenerate() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::positions(&[512.0, 512.0]));
    let actuator = actuator_with(motor, sensor, fast_options());

    let err = actuator.home(&Extra::new()).await.unwrap_err();

    assert!(matches!(err, ActuatorError::DegenerateCalibration { .. }));
    assert!(actuator.calibration().is_none());
}

#[tokio::test]
async fn test_inverted_bounds_are_degenerate() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::positions(&[0.0, 100.0]));
    let actuator = actuator_with(motor, sensor, fast_options());

    let err = actuator.home(&Extra::new()).await.unwrap_err();

    assert_eq!(
        err,
        ActuatorError::DegenerateCalibration {
            min: 100.0,
            max: 0.0,
            min_span: 0.0,
        }
    );
}

#[tokio::test]
async fn test_samples_use_median() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::positions(&[
        100.0, 900.0, 101.0, // extended, one outlier
        0.0, 1.0, -500.0, // retracted, one outlier
    ]));
    let actuator = actuator_with(motor, sensor, fast_options().with_samples(3));

    actuator.home(&Extra::new()).await.unwrap();

    let bounds = actuator.calibration().unwrap();
    assert_eq!(bounds.max_sensor_position, 101.0);
    assert_eq!(bounds.min_sensor_position, 0.0);
}

#[tokio::test]
async fn test_settle_ends_transit_early() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(StrokeSensor {
        motor: motor.clone(),
    });
    let options = fast_options()
        .with_transit_time(Duration::from_secs(30))
        .with_settle(SettleOptions {
            poll_interval: Duration::from_millis(5),
            tolerance: 0.5,
            stable_polls: 2,
        });
    let actuator = actuator_with(motor.clone(), sensor, options);

    let homed = tokio::time::timeout(Duration::from_secs(2), actuator.home(&Extra::new()))
        .await
        .expect("settle detection did not end the transit wait")
        .unwrap();

    assert!(homed);
    let bounds = actuator.calibration().unwrap();
    assert_eq!(bounds.max_sensor_position, 100.0);
    assert_eq!(bounds.min_sensor_position, 0.0);
    assert_eq!(motor.commands(), vec![1.0, 0.0, -1.0, 0.0]);
}

async fn close_during_settle_wait(sensor: DriftingSensor) {
    let motor = Arc::new(MockMotor::default());
    let options = fast_options()
        .with_transit_time(Duration::from_secs(30))
        .with_settle(SettleOptions {
            poll_interval: Duration::from_millis(5),
            tolerance: 0.5,
            stable_polls: 2,
        });
    let actuator = Arc::new(actuator_with(motor.clone(), Arc::new(sensor), options));

    let homing = {
        let actuator = actuator.clone();
        tokio::spawn(async move { actuator.home(&Extra::new()).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    tokio::time::timeout(Duration::from_secs(2), actuator.close())
        .await
        .expect("close did not wait out the homing run")
        .unwrap();

    // close returned, so the run has already finished
    let result = homing.await.unwrap();
    assert_eq!(
        result,
        Err(ActuatorError::Cancelled {
            phase: HomingPhase::Extending
        })
    );
    assert_eq!(motor.commands(), vec![1.0, 0.0]);
    assert!(actuator.calibration().is_none());
}

#[tokio::test]
async fn test_close_cancels_settle_polling() {
    close_during_settle_wait(DriftingSensor::new(Duration::ZERO)).await;
}

#[tokio::test]
async fn test_close_interrupts_slow_settle_read() {
    close_during_settle_wait(DriftingSensor::new(Duration::from_secs(60))).await;
}

#[tokio::test]
async fn test_position_maps_through_calibration() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::positions(&[100.0, 0.0, 25.0, 140.0]));
    let actuator = actuator_with(motor, sensor, fast_options());

    actuator.home(&Extra::new()).await.unwrap();

    assert_eq!(actuator.position(&Extra::new()).await.unwrap(), vec![50.0]);
    // beyond the extended stop clamps to the stroke length
    assert_eq!(actuator.position(&Extra::new()).await.unwrap(), vec![200.0]);
}

#[tokio::test]
async fn test_position_errors_are_distinct() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::new(vec![
        Ok(pos(100.0)),
        Ok(pos(0.0)),
        Err(HalError::ReadFailed("bus timeout".to_string())),
    ]));
    let actuator = actuator_with(motor, sensor, fast_options());

    assert_eq!(
        actuator.position(&Extra::new()).await,
        Err(ActuatorError::NotHomed)
    );

    actuator.home(&Extra::new()).await.unwrap();

    assert!(matches!(
        actuator.position(&Extra::new()).await,
        Err(ActuatorError::PositionRead(SensorError::Read(_)))
    ));
}

#[tokio::test]
async fn test_unsupported_surface() {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(ScriptedSensor::positions(&[100.0, 0.0]));
    let actuator = actuator_with(motor.clone(), sensor, fast_options());
    let extra = Extra::new();

    let results = [
        actuator.lengths(&extra).await.map(|_| ()),
        actuator.move_to_position(&[10.0], &[5.0], &extra).await,
        actuator.stop(&extra).await,
        actuator.kinematics().await.map(|_| ()),
        actuator.current_inputs().await.map(|_| ()),
        actuator.go_to_inputs(&[vec![Input { value: 1.0 }]]).await,
        actuator.do_command(&extra).await.map(|_| ()),
        actuator.is_moving().await.map(|_| ()),
    ];

    for result in results {
        assert!(result.unwrap_err().is_unimplemented());
    }
    assert!(motor.commands().is_empty());
}

#[tokio::test]
async fn test_construction_fails_for_unknown_motor() {
    let sensor: Arc<dyn PositionSensor> = Arc::new(ScriptedSensor::positions(&[0.0]));
    let deps = Dependencies::new().with_sensor("ram-pot", sensor);

    let result = LinearActuator::new(ResourceName::gantry("ram"), config(), &deps);

    assert!(matches!(
        result,
        Err(ActuatorError::Resolution(ResolutionError::NotFound { ref name })) if name == "ram-motor"
    ));
}

// ============================================================================
// ModuleHost
// ============================================================================

fn host_attributes() -> Value {
    json!({
        "stroke_length": 200,
        "max_extension_time": 30,
        "motor": "ram-motor",
        "position_sensor": { "name": "ram-pot", "position_field": "pos" },
        "settle": { "poll_interval_ms": 5, "tolerance": 0.5, "stable_polls": 2 }
    })
}

fn host_ram() -> (Arc<MockMotor>, Dependencies) {
    let motor = Arc::new(MockMotor::default());
    let sensor = Arc::new(StrokeSensor {
        motor: motor.clone(),
    });
    let deps = Dependencies::new()
        .with_motor("ram-motor", motor.clone())
        .with_sensor("ram-pot", sensor);
    (motor, deps)
}

fn host_dependencies() -> Dependencies {
    host_ram().1
}

#[tokio::test]
async fn test_module_host_add_and_home() {
    let host = ModuleHost::spawn(ModuleHostArgs {
        dependencies: host_dependencies(),
    });

    let deps = host
        .ask(AddResource {
            name: "ram".to_string(),
            path: "components.0".to_string(),
            model: LINEAR_ACTUATOR.clone(),
            attributes: host_attributes(),
        })
        .await
        .unwrap();
    assert_eq!(deps, vec!["ram-motor", "ram-pot"]);

    let gantry = host
        .ask(GetResource {
            name: "ram".to_string(),
        })
        .await
        .unwrap();
    let homed = tokio::time::timeout(Duration::from_secs(2), gantry.home(&Extra::new()))
        .await
        .unwrap()
        .unwrap();
    assert!(homed);
    assert_eq!(gantry.position(&Extra::new()).await.unwrap(), vec![0.0]);

    let statuses = host.ask(ListResources).await.unwrap();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].name, "ram");
    assert_eq!(statuses[0].model, *LINEAR_ACTUATOR);
    assert_eq!(statuses[0].api, *GANTRY_API);

    host.stop_gracefully().await.unwrap();
    host.wait_for_shutdown().await;
    // on_stop closed the component
    assert_eq!(gantry.home(&Extra::new()).await, Err(ActuatorError::Closed));
}

#[tokio::test]
async fn test_module_host_rejects_duplicates_and_bad_config() {
    let host = ModuleHost::spawn(ModuleHostArgs {
        dependencies: host_dependencies(),
    });

    host.ask(AddResource {
        name: "ram".to_string(),
        path: "components.0".to_string(),
        model: LINEAR_ACTUATOR.clone(),
        attributes: host_attributes(),
    })
    .await
    .unwrap();

    let duplicate = host
        .ask(AddResource {
            name: "ram".to_string(),
            path: "components.0".to_string(),
            model: LINEAR_ACTUATOR.clone(),
            attributes: host_attributes(),
        })
        .await;
    assert!(matches!(
        duplicate,
        Err(SendError::HandlerError(ModuleError::ResourceExists(_)))
    ));

    let invalid = host
        .ask(AddResource {
            name: "ram2".to_string(),
            path: "components.1".to_string(),
            model: LINEAR_ACTUATOR.clone(),
            attributes: json!({ "stroke_length": 0 }),
        })
        .await;
    match invalid {
        Err(SendError::HandlerError(ModuleError::Actuator(ActuatorError::Config(e)))) => {
            assert_eq!(e.path, "components.1");
            assert_eq!(e.field, "stroke_length");
        }
        other => panic!("expected config error, got {other:?}"),
    }

    host.stop_gracefully().await.unwrap();
}

#[tokio::test]
async fn test_module_host_reconfigure_rebuilds() {
    let host = ModuleHost::spawn(ModuleHostArgs {
        dependencies: host_dependencies(),
    });

    host.ask(AddResource {
        name: "ram".to_string(),
        path: "components.0".to_string(),
        model: LINEAR_ACTUATOR.clone(),
        attributes: host_attributes(),
    })
    .await
    .unwrap();
    let old = host
        .ask(GetResource {
            name: "ram".to_string(),
        })
        .await
        .unwrap();

    let mut attributes = host_attributes();
    attributes["stroke_length"] = json!(400);
    host.ask(ReconfigureResource {
        name: "ram".to_string(),
        path: "components.0".to_string(),
        model: LINEAR_ACTUATOR.clone(),
        attributes,
    })
    .await
    .unwrap();

    // the replaced instance is closed
    assert_eq!(
        old.home(&Extra::new()).await,
        Err(ActuatorError::Closed)
    );

    let new = host
        .ask(GetResource {
            name: "ram".to_string(),
        })
        .await
        .unwrap();
    assert!(!Arc::ptr_eq(&old, &new));

    host.ask(RemoveResource {
        name: "ram".to_string(),
    })
    .await
    .unwrap();
    assert_eq!(new.home(&Extra::new()).await, Err(ActuatorError::Closed));
    assert!(host.ask(ListResources).await.unwrap().is_empty());

    host.stop_gracefully().await.unwrap();
}

#[tokio::test]
async fn test_reconfigure_waits_for_old_homing_run() {
    let (motor, dependencies) = host_ram();
    let host = ModuleHost::spawn(ModuleHostArgs { dependencies });

    // fixed 30 s transit, so the old run is still extending when replaced
    let mut slow = host_attributes();
    slow.as_object_mut().unwrap().remove("settle");
    host.ask(AddResource {
        name: "ram".to_string(),
        path: "components.0".to_string(),
        model: LINEAR_ACTUATOR.clone(),
        attributes: slow,
    })
    .await
    .unwrap();
    let old = host
        .ask(GetResource {
            name: "ram".to_string(),
        })
        .await
        .unwrap();

    let old_run = {
        let old = old.clone();
        tokio::spawn(async move { old.home(&Extra::new()).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    host.ask(ReconfigureResource {
        name: "ram".to_string(),
        path: "components.0".to_string(),
        model: LINEAR_ACTUATOR.clone(),
        attributes: host_attributes(),
    })
    .await
    .unwrap();
    assert_eq!(motor.commands(), vec![1.0, 0.0]);

    let new = host
        .ask(GetResource {
            name: "ram".to_string(),
        })
        .await
        .unwrap();
    let homed = tokio::time::timeout(Duration::from_secs(2), new.home(&Extra::new()))
        .await
        .unwrap()
        .unwrap();
    assert!(homed);

    assert!(old_run.await.unwrap().unwrap_err().is_cancelled());
    // no stop from the old run lands inside the new run
    assert_eq!(motor.commands(), vec![1.0, 0.0, 1.0, 0.0, -1.0, 0.0]);

    host.stop_gracefully().await.unwrap();
}

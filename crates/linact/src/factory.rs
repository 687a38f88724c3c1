//! Dependency factory building simulated motors and sensors

use std::sync::Arc;

use linact_core::Dependencies;
use linact_hal::SimulatedRam;

use crate::config::RamConfig;

/// Builds the collaborators named in the config
pub struct DependencyFactory;

impl DependencyFactory {
    /// Create one simulated ram per record and register its motor and sensor
    pub fn build(rams: &[RamConfig]) -> Dependencies {
        let mut deps = Dependencies::new();

        for ram_config in rams {
            let ram = SimulatedRam::new(ram_config.sim.clone());
            deps.insert_motor(&ram_config.motor, Arc::new(ram.motor()));
            deps.insert_sensor(&ram_config.sensor, Arc::new(ram.sensor()));

            tracing::info!(
                motor = %ram_config.motor,
                sensor = %ram_config.sensor,
                full_stroke_time = ?ram_config.sim.full_stroke_time,
                "created simulated ram"
            );
        }

        deps
    }
}

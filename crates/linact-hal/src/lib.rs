//! linact-hal: Hardware collaborator abstraction
//!
//! Provides the motor and position sensor capabilities consumed by the
//! actuator, the loosely typed sensor readings they produce, and a simulated
//! ram for running without hardware.

pub mod error;
pub mod readings;
pub mod sim;
pub mod traits;

pub use error::HalError;
pub use readings::{FieldError, Readings, scalar_field, value_shape};
pub use sim::{SimulatedMotor, SimulatedPositionSensor, SimulatedRam, SimulatedRamConfig};
pub use traits::{Extra, Motor, PositionSensor};

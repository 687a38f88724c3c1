//! Error types for linact-hal

use thiserror::Error;

/// Errors reported by motor and sensor collaborators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HalError {
    /// Motor refused a power command
    #[error("power command rejected: {0}")]
    CommandRejected(String),

    /// Power outside the signed unit range
    #[error("power {power} out of range [-1, 1]")]
    PowerOutOfRange {
        /// Requested power
        power: f64,
    },

    /// Sensor could not produce a reading set
    #[error("sensor read failed: {0}")]
    ReadFailed(String),

    /// Device is not reachable
    #[error("device not connected")]
    NotConnected,
}

//! Homing state machine types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Phases of a homing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HomingPhase {
    Idle,
    Extending,
    SamplingMax,
    Retracting,
    SamplingMin,
    Calibrated,
    Failed,
}

impl HomingPhase {
    /// Check whether `next` is a legal successor of `self`
    #[must_use]
    pub fn can_transition_to(self, next: HomingPhase) -> bool {
        use HomingPhase::{Calibrated, Extending, Failed, Idle, Retracting, SamplingMax, SamplingMin};

        match (self, next) {
            // a new run may start from any resting phase
            (Idle | Calibrated | Failed, Extending) => true,
            (Extending, SamplingMax) | (SamplingMax, Retracting) | (Retracting, SamplingMin) => {
                true
            }
            (SamplingMin, Calibrated) => true,
            (Extending | SamplingMax | Retracting | SamplingMin, Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for HomingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HomingPhase::Idle => "idle",
            HomingPhase::Extending => "extending",
            HomingPhase::SamplingMax => "sampling_max",
            HomingPhase::Retracting => "retracting",
            HomingPhase::SamplingMin => "sampling_min",
            HomingPhase::Calibrated => "calibrated",
            HomingPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Motor commands issued by a homing run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPhase {
    ExtendStart,
    ExtendStop,
    RetractStart,
    RetractStop,
}

impl fmt::Display for CommandPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommandPhase::ExtendStart => "start motor power extending",
            CommandPhase::ExtendStop => "stop motor power extending",
            CommandPhase::RetractStart => "start motor power retracting",
            CommandPhase::RetractStop => "stop motor power retracting",
        };
        f.write_str(s)
    }
}

/// The two physical stops of the stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Extended,
    Retracted,
}

impl Extreme {
    /// Signed power that drives toward this stop
    #[must_use]
    pub fn power(self) -> f64 {
        match self {
            Extreme::Extended => 1.0,
            Extreme::Retracted => -1.0,
        }
    }

    #[must_use]
    pub fn start_command(self) -> CommandPhase {
        match self {
            Extreme::Extended => CommandPhase::ExtendStart,
            Extreme::Retracted => CommandPhase::RetractStart,
        }
    }

    #[must_use]
    pub fn stop_command(self) -> CommandPhase {
        match self {
            Extreme::Extended => CommandPhase::ExtendStop,
            Extreme::Retracted => CommandPhase::RetractStop,
        }
    }

    #[must_use]
    pub fn travel_phase(self) -> HomingPhase {
        match self {
            Extreme::Extended => HomingPhase::Extending,
            Extreme::Retracted => HomingPhase::Retracting,
        }
    }

    #[must_use]
    pub fn sample_phase(self) -> HomingPhase {
        match self {
            Extreme::Extended => HomingPhase::SamplingMax,
            Extreme::Retracted => HomingPhase::SamplingMin,
        }
    }
}

impl fmt::Display for Extreme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extreme::Extended => f.write_str("extended"),
            Extreme::Retracted => f.write_str("retracted"),
        }
    }
}

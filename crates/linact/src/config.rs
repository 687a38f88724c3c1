//! Configuration loading and types

use std::path::{Path, PathBuf};

use linact_core::Model;
use linact_hal::SimulatedRamConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level configuration for the linact module
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Module process settings
    #[serde(default)]
    pub module: ModuleConfig,
    /// Simulated rams providing motors and sensors
    #[serde(default)]
    pub ram: Vec<RamConfig>,
    /// Component records
    #[serde(default)]
    pub component: Vec<ComponentConfig>,
}

/// Module process settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// A simulated ram registered as one motor and one sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RamConfig {
    /// Name the motor resolves under
    pub motor: String,
    /// Name the sensor resolves under
    pub sensor: String,
    #[serde(flatten)]
    pub sim: SimulatedRamConfig,
}

/// One component to build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    pub model: Model,
    /// Model-specific attributes
    #[serde(default)]
    pub attributes: Value,
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from default paths or use defaults
    pub fn load_default() -> eyre::Result<Self> {
        if let Ok(path) = std::env::var("LINACT_CONFIG") {
            return Self::load(&PathBuf::from(path));
        }

        let paths = [
            PathBuf::from("linact.toml"),
            PathBuf::from("/etc/linact/linact.toml"),
            dirs::config_dir()
                .map(|p| p.join("linact/linact.toml"))
                .unwrap_or_default(),
        ];

        for path in paths {
            if path.exists() {
                return Self::load(&path);
            }
        }

        tracing::warn!("no config file found, using defaults");
        Ok(Config::default())
    }

    /// Find a component record by name
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&ComponentConfig> {
        self.component.iter().find(|c| c.name == name)
    }
}

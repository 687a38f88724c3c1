//! Component registry and dependency resolution
//!
//! Components are registered under a stable `namespace:family:name` model
//! triple so a host can discover them and build instances from matching
//! config records. Collaborators are resolved by name from `Dependencies`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock, Once, PoisonError, RwLock};

use linact_hal::{Motor, PositionSensor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ActuatorError, ResolutionError};
use crate::gantry::Gantry;

/// Model triple of the linear actuator component
pub static LINEAR_ACTUATOR: LazyLock<Model> = LazyLock::new(|| {
    Model::new(
        "gmulz",
        "linear-actuator-with-position",
        "linear-actuator",
    )
});

/// API triple of gantry components
pub static GANTRY_API: LazyLock<Api> = LazyLock::new(|| Api::new("rdk", "component", "gantry"));

static REGISTRY: LazyLock<RwLock<HashMap<Model, Registration>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// `namespace:family:name` identifier of a component model
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Model {
    pub namespace: String,
    pub family: String,
    pub name: String,
}

impl Model {
    pub fn new(
        namespace: impl Into<String>,
        family: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            family: family.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.family, self.name)
    }
}

impl FromStr for Model {
    type Err = ActuatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [namespace, family, name]
                if !namespace.is_empty() && !family.is_empty() && !name.is_empty() =>
            {
                Ok(Self::new(*namespace, *family, *name))
            }
            _ => Err(ActuatorError::UnknownModel(format!(
                "{s} (expected namespace:family:name)"
            ))),
        }
    }
}

impl TryFrom<String> for Model {
    type Error = ActuatorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        model.to_string()
    }
}

/// `namespace:type:subtype` identifier of a capability API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Api {
    pub namespace: String,
    pub kind: String,
    pub subtype: String,
}

impl Api {
    pub fn new(
        namespace: impl Into<String>,
        kind: impl Into<String>,
        subtype: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            kind: kind.into(),
            subtype: subtype.into(),
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.kind, self.subtype)
    }
}

/// Fully qualified name of a component instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName {
    pub api: Api,
    pub name: String,
}

impl ResourceName {
    pub fn new(api: Api, name: impl Into<String>) -> Self {
        Self {
            api,
            name: name.into(),
        }
    }

    /// Name of a gantry component
    pub fn gantry(name: impl Into<String>) -> Self {
        Self::new(GANTRY_API.clone(), name)
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api, self.name)
    }
}

/// A collaborator available for resolution
#[derive(Clone)]
pub enum Dependency {
    Motor(Arc<dyn Motor>),
    Sensor(Arc<dyn PositionSensor>),
}

impl Dependency {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Dependency::Motor(_) => "motor",
            Dependency::Sensor(_) => "sensor",
        }
    }
}

/// Name-keyed collaborators handed to constructors
#[derive(Clone, Default)]
pub struct Dependencies {
    entries: HashMap<String, Dependency>,
}

impl Dependencies {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_motor(&mut self, name: impl Into<String>, motor: Arc<dyn Motor>) {
        self.entries.insert(name.into(), Dependency::Motor(motor));
    }

    pub fn insert_sensor(&mut self, name: impl Into<String>, sensor: Arc<dyn PositionSensor>) {
        self.entries.insert(name.into(), Dependency::Sensor(sensor));
    }

    /// Add a motor
    #[must_use]
    pub fn with_motor(mut self, name: impl Into<String>, motor: Arc<dyn Motor>) -> Self {
        self.insert_motor(name, motor);
        self
    }

    /// Add a sensor
    #[must_use]
    pub fn with_sensor(mut self, name: impl Into<String>, sensor: Arc<dyn PositionSensor>) -> Self {
        self.insert_sensor(name, sensor);
        self
    }

    /// Resolve a motor by name
    ///
    /// # Errors
    /// Returns `ResolutionError` if the name is unknown or not a motor
    pub fn motor(&self, name: &str) -> Result<Arc<dyn Motor>, ResolutionError> {
        match self.get(name)? {
            Dependency::Motor(motor) => Ok(Arc::clone(motor)),
            other => Err(ResolutionError::WrongKind {
                name: name.to_string(),
                expected: "motor",
                actual: other.kind(),
            }),
        }
    }

    /// Resolve a position sensor by name
    ///
    /// # Errors
    /// Returns `ResolutionError` if the name is unknown or not a sensor
    pub fn sensor(&self, name: &str) -> Result<Arc<dyn PositionSensor>, ResolutionError> {
        match self.get(name)? {
            Dependency::Sensor(sensor) => Ok(Arc::clone(sensor)),
            other => Err(ResolutionError::WrongKind {
                name: name.to_string(),
                expected: "sensor",
                actual: other.kind(),
            }),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, name: &str) -> Result<&Dependency, ResolutionError> {
        self.entries.get(name).ok_or_else(|| ResolutionError::NotFound {
            name: name.to_string(),
        })
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, dep)| (name, dep.kind())))
            .finish()
    }
}

/// Validates raw attributes and returns the implicit dependencies
pub type Validator = fn(&Value, &str) -> Result<Vec<String>, ActuatorError>;

/// Builds a component from raw attributes and resolved collaborators
pub type Constructor =
    fn(ResourceName, &Value, &Dependencies) -> Result<Arc<dyn Gantry>, ActuatorError>;

/// How to validate and build one model
#[derive(Debug, Clone)]
pub struct Registration {
    pub api: Api,
    pub validator: Validator,
    pub constructor: Constructor,
}

/// Register a model; returns `false` if it replaced an earlier registration
pub fn register_component(model: Model, registration: Registration) -> bool {
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);

    let replaced = registry.insert(model.clone(), registration).is_some();
    if replaced {
        warn!(%model, "replaced existing component registration");
    } else {
        debug!(%model, "registered component");
    }
    !replaced
}

/// Register the models built into this crate, once per process
pub fn register_builtin() {
    static BUILTIN: Once = Once::new();
    BUILTIN.call_once(|| {
        register_component(
            LINEAR_ACTUATOR.clone(),
            crate::actuator::registration(),
        );
    });
}

#[must_use]
pub fn lookup(model: &Model) -> Option<Registration> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(model)
        .cloned()
}

/// Every registered `(api, model)` pair, sorted by model
#[must_use]
pub fn registered_models() -> Vec<(Api, Model)> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    let mut models: Vec<(Api, Model)> = registry
        .iter()
        .map(|(model, reg)| (reg.api.clone(), model.clone()))
        .collect();
    models.sort_by(|a, b| a.1.cmp(&b.1));
    models
}

/// Validate raw attributes against a registered model
///
/// # Errors
/// Returns `UnknownModel` if nothing is registered, otherwise the model's
/// validation error
pub fn validate(model: &Model, attributes: &Value, path: &str) -> Result<Vec<String>, ActuatorError> {
    let registration =
        lookup(model).ok_or_else(|| ActuatorError::UnknownModel(model.to_string()))?;
    (registration.validator)(attributes, path)
}

/// Build a component instance of a registered model
///
/// # Errors
/// Returns `UnknownModel` if nothing is registered, otherwise the model's
/// construction error
pub fn construct(
    model: &Model,
    name: &str,
    attributes: &Value,
    deps: &Dependencies,
) -> Result<Arc<dyn Gantry>, ActuatorError> {
    let registration =
        lookup(model).ok_or_else(|| ActuatorError::UnknownModel(model.to_string()))?;
    let resource_name = ResourceName::new(registration.api.clone(), name);
    (registration.constructor)(resource_name, attributes, deps)
}

//! Message types for actor communication
//!
//! Message handlers are implemented in their respective actor modules.

use kameo_macros::Reply;
use serde_json::Value;

use crate::registry::{Api, Model};

// ============================================================================
// ModuleHost Messages
// ============================================================================

/// Build and register a new component
#[derive(Debug)]
pub struct AddResource {
    /// Component name
    pub name: String,
    /// Location of the component in the host config, e.g. `components.0`
    pub path: String,
    /// Model triple to build
    pub model: Model,
    /// Raw component attributes
    pub attributes: Value,
}

/// Replace a component's config, rebuilding the instance
#[derive(Debug)]
pub struct ReconfigureResource {
    /// Component name
    pub name: String,
    /// Location of the component in the host config
    pub path: String,
    /// Model triple to build
    pub model: Model,
    /// New raw component attributes
    pub attributes: Value,
}

/// Close and drop a component
#[derive(Debug)]
pub struct RemoveResource {
    /// Component name
    pub name: String,
}

/// Get a handle to a component
#[derive(Debug)]
pub struct GetResource {
    /// Component name
    pub name: String,
}

/// List all hosted components
#[derive(Debug)]
pub struct ListResources;

/// Hosted component summary
#[derive(Debug, Clone, PartialEq, Reply)]
pub struct ResourceStatus {
    /// Component name
    pub name: String,
    /// API the component implements
    pub api: Api,
    /// Model it was built from
    pub model: Model,
    /// Dependencies named by its config
    pub dependencies: Vec<String>,
}

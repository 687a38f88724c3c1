//! `ModuleHost`: owner of configured components
//!
//! Builds components through the registry, hands out shared handles, and
//! applies the always-rebuild policy: a reconfigured component is replaced by
//! a fresh instance once the old one is closed and idle.

use std::collections::HashMap;
use std::sync::Arc;

use kameo::actor::{ActorRef, WeakActorRef};
use kameo::error::ActorStopReason;
use kameo::message::{Context, Message};
use kameo::prelude::*;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::ModuleError;
use crate::gantry::Gantry;
use crate::message::{
    AddResource, GetResource, ListResources, ReconfigureResource, RemoveResource, ResourceStatus,
};
use crate::registry::{self, Dependencies, Model};

/// Arguments for spawning a `ModuleHost`
pub struct ModuleHostArgs {
    /// Collaborators available to hosted components
    pub dependencies: Dependencies,
}

struct HostedResource {
    model: Model,
    dependencies: Vec<String>,
    gantry: Arc<dyn Gantry>,
}

/// Actor owning every configured component of a module
pub struct ModuleHost {
    /// Components by name
    resources: HashMap<String, HostedResource>,
    /// Collaborators available for resolution
    dependencies: Dependencies,
}

impl ModuleHost {
    /// Validate and build one component
    fn build(
        &self,
        name: &str,
        path: &str,
        model: &Model,
        attributes: &Value,
    ) -> Result<HostedResource, ModuleError> {
        let dependencies = registry::validate(model, attributes, path)?;
        let gantry = registry::construct(model, name, attributes, &self.dependencies)?;

        Ok(HostedResource {
            model: model.clone(),
            dependencies,
            gantry,
        })
    }

    async fn close_resource(name: &str, resource: &HostedResource) {
        if let Err(e) = resource.gantry.close().await {
            error!(resource = %name, error = %e, "failed to close resource");
        }
    }
}

impl Actor for ModuleHost {
    type Args = ModuleHostArgs;
    type Error = ModuleError;

    async fn on_start(args: Self::Args, actor_ref: ActorRef<Self>) -> Result<Self, Self::Error> {
        registry::register_builtin();

        info!(
            id = %actor_ref.id(),
            dependencies = args.dependencies.len(),
            "ModuleHost starting"
        );

        Ok(Self {
            resources: HashMap::new(),
            dependencies: args.dependencies,
        })
    }

    async fn on_stop(
        &mut self,
        _actor_ref: WeakActorRef<Self>,
        reason: ActorStopReason,
    ) -> Result<(), Self::Error> {
        info!(reason = ?reason, "ModuleHost stopping");

        for (name, resource) in &self.resources {
            Self::close_resource(name, resource).await;
        }

        Ok(())
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Message<AddResource> for ModuleHost {
    type Reply = Result<Vec<String>, ModuleError>;

    async fn handle(
        &mut self,
        msg: AddResource,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        if self.resources.contains_key(&msg.name) {
            return Err(ModuleError::ResourceExists(msg.name));
        }

        let resource = self.build(&msg.name, &msg.path, &msg.model, &msg.attributes)?;
        let dependencies = resource.dependencies.clone();

        info!(resource = %msg.name, model = %msg.model, "added resource");
        self.resources.insert(msg.name, resource);

        Ok(dependencies)
    }
}

impl Message<ReconfigureResource> for ModuleHost {
    type Reply = Result<(), ModuleError>;

    async fn handle(
        &mut self,
        msg: ReconfigureResource,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let Some(old) = self.resources.get(&msg.name) else {
            return Err(ModuleError::ResourceNotFound(msg.name));
        };

        // the old instance keeps serving if the new config is rejected
        let rebuilt = match self.build(&msg.name, &msg.path, &msg.model, &msg.attributes) {
            Ok(resource) => resource,
            Err(e) => {
                warn!(resource = %msg.name, error = %e, "rebuild rejected, keeping old instance");
                return Err(e);
            }
        };

        // both instances share the motor; the new one is handed out only
        // after the old one has stopped it
        Self::close_resource(&msg.name, old).await;
        self.resources.insert(msg.name.clone(), rebuilt);

        info!(resource = %msg.name, model = %msg.model, "rebuilt resource");
        Ok(())
    }
}

impl Message<RemoveResource> for ModuleHost {
    type Reply = Result<(), ModuleError>;

    async fn handle(
        &mut self,
        msg: RemoveResource,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let resource = self
            .resources
            .remove(&msg.name)
            .ok_or_else(|| ModuleError::ResourceNotFound(msg.name.clone()))?;

        Self::close_resource(&msg.name, &resource).await;
        info!(resource = %msg.name, "removed resource");

        Ok(())
    }
}

impl Message<GetResource> for ModuleHost {
    type Reply = Result<Arc<dyn Gantry>, ModuleError>;

    async fn handle(
        &mut self,
        msg: GetResource,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.resources
            .get(&msg.name)
            .map(|resource| Arc::clone(&resource.gantry))
            .ok_or(ModuleError::ResourceNotFound(msg.name))
    }
}

impl Message<ListResources> for ModuleHost {
    type Reply = Vec<ResourceStatus>;

    async fn handle(
        &mut self,
        _msg: ListResources,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let mut statuses: Vec<ResourceStatus> = self
            .resources
            .iter()
            .map(|(name, resource)| ResourceStatus {
                name: name.clone(),
                api: resource.gantry.name().api.clone(),
                model: resource.model.clone(),
                dependencies: resource.dependencies.clone(),
            })
            .collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }
}

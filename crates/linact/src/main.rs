//! linact module
//!
//! Hosts linear actuator components over simulated rams and exposes homing,
//! position queries and config validation on the command line.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use eyre::{WrapErr, eyre};
use kameo::actor::{ActorRef, Spawn};
use linact_core::registry::{self, register_builtin};
use linact_core::{AddResource, Gantry, GetResource, ListResources, ModuleHost, ModuleHostArgs};
use linact_hal::Extra;
use tracing_subscriber::EnvFilter;

mod config;
mod factory;

use config::Config;
use factory::DependencyFactory;

#[derive(Parser)]
#[command(name = "linact")]
#[command(about = "Linear actuator with position sensing", long_about = None)]
struct Cli {
    /// Config file (defaults to $LINACT_CONFIG or linact.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every component and print its dependencies
    #[command(name = "validate")]
    Validate,
    /// List registered component models
    #[command(name = "models")]
    Models,
    /// Run the homing sequence of a component
    #[command(name = "home")]
    Home {
        /// Component name
        name: String,
    },
    /// Home a component, then report its position
    #[command(name = "position")]
    Position {
        /// Component name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => Config::load_default()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.module.log_level)),
        )
        .init();

    register_builtin();

    match cli.command {
        Commands::Validate => validate(&config),
        Commands::Models => {
            for (api, model) in registry::registered_models() {
                println!("{api} {model}");
            }
            Ok(())
        }
        Commands::Home { name } => {
            let host = start_host(&config).await?;
            let gantry = resource(&host, &name).await?;
            let result = home(&gantry).await;
            if result.is_ok() {
                println!("{name}: homed");
            }
            shutdown(&host).await;
            result
        }
        Commands::Position { name } => {
            let host = start_host(&config).await?;
            let gantry = resource(&host, &name).await?;
            let result = match home(&gantry).await {
                Ok(()) => gantry
                    .position(&Extra::new())
                    .await
                    .map_err(|e| eyre!("position query failed: {e}")),
                Err(e) => Err(e),
            };
            shutdown(&host).await;
            println!("{name}: {:?}", result?);
            Ok(())
        }
    }
}

fn validate(config: &Config) -> Result<()> {
    let mut failures = 0;

    for (index, component) in config.component.iter().enumerate() {
        let path = format!("components.{index}");
        match registry::validate(&component.model, &component.attributes, &path) {
            Ok(deps) => println!("{}: ok (depends on {})", component.name, deps.join(", ")),
            Err(e) => {
                failures += 1;
                println!("{}: {e}", component.name);
            }
        }
    }

    if failures > 0 {
        return Err(eyre!("{failures} invalid component(s)"));
    }
    Ok(())
}

async fn start_host(config: &Config) -> Result<ActorRef<ModuleHost>> {
    let dependencies = DependencyFactory::build(&config.ram);
    let host = ModuleHost::spawn(ModuleHostArgs { dependencies });

    for (index, component) in config.component.iter().enumerate() {
        host.ask(AddResource {
            name: component.name.clone(),
            path: format!("components.{index}"),
            model: component.model.clone(),
            attributes: component.attributes.clone(),
        })
        .await
        .map_err(|e| eyre!("failed to add {}: {e}", component.name))?;
    }

    let resources = host
        .ask(ListResources)
        .await
        .map_err(|e| eyre!("failed to list resources: {e}"))?;
    tracing::info!(count = resources.len(), "module host ready");

    Ok(host)
}

/// Stop the host and wait for `on_stop` to close every component
async fn shutdown(host: &ActorRef<ModuleHost>) {
    if let Err(e) = host.stop_gracefully().await {
        tracing::warn!(error = %e, "failed to stop module host");
    }
    host.wait_for_shutdown().await;
}

async fn resource(host: &ActorRef<ModuleHost>, name: &str) -> Result<Arc<dyn Gantry>> {
    host.ask(GetResource {
        name: name.to_string(),
    })
    .await
    .map_err(|e| eyre!("{e}"))
}

/// Home in a task so Ctrl-C can close the component and let the run stop the
/// motor on its way out
async fn home(gantry: &Arc<dyn Gantry>) -> Result<()> {
    let task = {
        let gantry = Arc::clone(gantry);
        tokio::spawn(async move { gantry.home(&Extra::new()).await })
    };

    let abort = {
        let gantry = Arc::clone(gantry);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, closing actuator");
                gantry.close().await.ok();
            }
        })
    };

    let result = task.await?;
    abort.abort();

    result
        .map(|_| ())
        .map_err(|e| eyre!("homing {} failed: {e}", gantry.name()))
}

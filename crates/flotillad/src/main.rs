//! flotillad: the Flotilla daemon.
//!
//! Assembles the scalers and the rescheduler behind the REST API. In
//! standalone mode the orchestrator and cloud are in-memory simulations
//! seeded from the `[standalone]` config section: resizing a node group
//! on the simulated cloud makes the new nodes "join" after `join_delay`.
//!
//! # Usage
//!
//! ```text
//! flotillad standalone --config flotilla.toml --port 8080
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use flotilla_api::ApiState;
use flotilla_autoscale::{NodeScaler, ServiceScaler};
use flotilla_cloud::{MemoryCloud, NodeObserver};
use flotilla_core::{FlotillaConfig, NodeGroup, ServiceDescriptor, ServiceMode};
use flotilla_orchestrator::MemoryOrchestrator;
use flotilla_reschedule::{RescheduleSettings, Rescheduler};

#[derive(Parser)]
#[command(name = "flotillad", about = "Flotilla daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run against in-memory orchestrator and cloud backends.
    Standalone {
        /// Path to flotilla.toml. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on. Overrides `server.port`.
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,flotillad=debug,flotilla=debug")
            }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Standalone { config, port } => {
            let config = match config {
                Some(path) => FlotillaConfig::from_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => FlotillaConfig::default(),
            };
            run_standalone(config, port).await
        }
    }
}

async fn run_standalone(config: FlotillaConfig, port: Option<u16>) -> anyhow::Result<()> {
    info!("Flotilla daemon starting in standalone mode");

    // ── Initialize backends ────────────────────────────────────

    let orchestrator = Arc::new(seed_orchestrator(&config).await);
    info!(
        services = config.standalone.services.len(),
        "in-memory orchestrator seeded"
    );

    let join_delay = config.standalone.join_delay()?;
    let cloud = Arc::new(seed_cloud(&config, (*orchestrator).clone(), join_delay).await);
    info!(?join_delay, "in-memory cloud seeded");

    // ── Core services ──────────────────────────────────────────

    let services = Arc::new(ServiceScaler::new(
        orchestrator.clone(),
        config.service.clone(),
    ));
    let nodes = Arc::new(NodeScaler::new(
        cloud,
        orchestrator.clone(),
        config.node_bounds(NodeGroup::Manager).clone(),
        config.node_bounds(NodeGroup::Worker).clone(),
    ));
    let settings = RescheduleSettings::from_config(&config.reschedule)?;
    info!(
        filter = %format!("{}={}", settings.filter_label, settings.filter_value),
        env_key = %settings.env_key,
        "rescheduler initialized"
    );
    let rescheduler = Arc::new(Rescheduler::new(orchestrator, settings));

    // ── Start API server ───────────────────────────────────────

    let router = flotilla_api::build_router(ApiState {
        services,
        nodes,
        rescheduler: rescheduler.clone(),
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], port.unwrap_or(config.server.port)));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for Ctrl-C");
            }
            info!("shutdown signal received");
        })
        .await?;

    rescheduler.shutdown().await;

    info!("Flotilla daemon stopped");
    Ok(())
}

/// Build the in-memory orchestrator from the seed services and node counts.
async fn seed_orchestrator(config: &FlotillaConfig) -> MemoryOrchestrator {
    let orchestrator = MemoryOrchestrator::new();
    for seed in &config.standalone.services {
        let mode = if seed.global {
            ServiceMode::Global
        } else {
            ServiceMode::Replicated {
                replicas: seed.replicas,
            }
        };
        orchestrator
            .put_service(ServiceDescriptor {
                id: seed.name.clone(),
                name: seed.name.clone(),
                version: 1,
                labels: seed.labels.clone(),
                mode,
                env: Vec::new(),
            })
            .await;
    }
    orchestrator
        .set_node_count(NodeGroup::Manager, config.standalone.manager_nodes)
        .await;
    orchestrator
        .set_node_count(NodeGroup::Worker, config.standalone.worker_nodes)
        .await;
    orchestrator
}

/// Build the in-memory cloud. Accepted resizes reach the orchestrator's
/// node count after `join_delay`.
async fn seed_cloud(
    config: &FlotillaConfig,
    orchestrator: MemoryOrchestrator,
    join_delay: Duration,
) -> MemoryCloud {
    let cloud =
        MemoryCloud::new("memory").with_observer(join_observer(orchestrator, join_delay));

    let initial: HashMap<NodeGroup, u64> = [
        (NodeGroup::Manager, config.standalone.manager_nodes),
        (NodeGroup::Worker, config.standalone.worker_nodes),
    ]
    .into();
    for (group, count) in initial {
        let bounds = config.node_bounds(group);
        let max = bounds.default_max.max(bounds.default_min).max(count);
        let min = bounds.default_min.min(count);
        cloud.put_group(group, count, min, max).await;
    }
    cloud
}

fn join_observer(orchestrator: MemoryOrchestrator, join_delay: Duration) -> NodeObserver {
    Arc::new(move |group, count| {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move {
            tokio::time::sleep(join_delay).await;
            orchestrator.set_node_count(group, count).await;
            debug!(%group, count, "simulated nodes joined");
        });
    })
}

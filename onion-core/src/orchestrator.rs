//! Startup & shutdown sequence: builds the cluster, gateway, and socket;
//! runs the four services until a cancellation token fires; then tears
//! everything down in reverse order.

use crate::cluster::Cluster;
use crate::config::Config;
use crate::device::Device;
use crate::error::Result;
use crate::gateway::Gateway;
use crate::node::Node;
use crate::services::{connectivity, heartbeat, listener, supervisor};
use crate::transport::UdpTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Time given to the four services to collect an initial round of
/// heartbeats before the supervisor's first decisions are trusted.
const COLLECTION_DELAY: Duration = Duration::from_secs(2);

/// Build the cluster and gateway from a validated configuration, bind the
/// socket, run every service until `cancel` fires, then shut down cleanly.
///
/// Config validation, the PID file, and signal handlers are the caller's
/// responsibility since they are ambient/CLI concerns.
pub async fn run(config: Config, cancel: CancellationToken) -> Result<()> {
    let nodes: Vec<Arc<Node>> = config
        .cluster
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, address)| {
            Arc::new(Node::new(
                idx as u32 + 1,
                address.clone(),
                config.cluster.port,
                config.cluster.dead_time as u64,
            ))
        })
        .collect();

    let cluster = Arc::new(Cluster::new(nodes, &config.general.address)?);
    let gateway = Arc::new(Gateway::new(
        config.general.gateway.clone(),
        config.cluster.dead_time as u64,
    ));

    if config.general.init_delay > 0 {
        info!(seconds = config.general.init_delay, "waiting for init delay");
        tokio::time::sleep(Duration::from_secs(config.general.init_delay as u64)).await;
    }

    let transport = Arc::new(UdpTransport::bind(config.cluster.port).await?);
    info!(port = config.cluster.port, "socket bound, starting services");

    let mut services = JoinSet::new();
    services.spawn(heartbeat::run(cluster.clone(), transport.clone(), cancel.clone()));
    services.spawn(connectivity::run(cluster.clone(), gateway.clone(), cancel.clone()));
    services.spawn(listener::run(cluster.clone(), transport.clone(), cancel.clone()));
    services.spawn(supervisor::run_election(
        cluster.clone(),
        config.actions.active.clone(),
        config.actions.passive.clone(),
        cancel.clone(),
    ));
    services.spawn(supervisor::run_diagnostics(
        cluster.clone(),
        gateway.clone(),
        cancel.clone(),
    ));

    tokio::time::sleep(COLLECTION_DELAY).await;
    info!("initial heartbeat collection window elapsed");

    cancel.cancelled().await;
    info!("stop requested, shutting down");

    if cluster.current_node().is_active() {
        config.actions.passive.run("orchestrator").await;
    }

    while services.join_next().await.is_some() {}
    drop(transport);
    info!("shutdown complete");

    Ok(())
}

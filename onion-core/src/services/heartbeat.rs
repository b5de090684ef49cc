//! Heartbeat emitter: every 500ms, send `HELLO` to every peer.

use crate::cluster::Cluster;
use crate::status::HELLO;
use crate::transport::UdpTransport;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const INTERVAL: Duration = Duration::from_millis(500);

pub async fn run(cluster: Arc<Cluster>, transport: Arc<UdpTransport>, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(INTERVAL);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        for peer in cluster.peers() {
            if let Err(err) = transport.send(HELLO, peer.address(), peer.port()).await {
                debug!(peer = peer.address(), error = %err, "failed to send heartbeat");
            }
        }
    }
}

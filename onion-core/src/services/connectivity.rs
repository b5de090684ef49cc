//! Connectivity prober: refreshes the gateway's and the current node's
//! `last_seen` stamp on a successful ICMP echo to the configured gateway.

use crate::cluster::Cluster;
use crate::device::Device;
use crate::gateway::Gateway;
use crate::ping;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const PROBE_TIMEOUT: Duration = Duration::from_secs(1);
const SLEEP_ON_SUCCESS: Duration = Duration::from_millis(500);
const SLEEP_ON_FAILURE: Duration = Duration::from_millis(500);

pub async fn run(cluster: Arc<Cluster>, gateway: Arc<Gateway>, cancel: CancellationToken) {
    let Some(addr) = resolve(gateway.address()).await else {
        debug!(address = gateway.address(), "gateway address does not resolve; prober idle");
        return;
    };

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let reachable = ping::ping(addr, PROBE_TIMEOUT).await;
        let sleep = if reachable {
            gateway.last_seen().touch();
            cluster.current_node().last_seen().touch();
            SLEEP_ON_SUCCESS
        } else {
            SLEEP_ON_FAILURE
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(sleep) => {}
        }
    }
}

async fn resolve(address: &str) -> Option<IpAddr> {
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Some(ip);
    }
    tokio::net::lookup_host((address, 0))
        .await
        .ok()?
        .next()
        .map(|sockaddr| sockaddr.ip())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    #[tokio::test]
    async fn stops_promptly_on_cancellation() {
        let nodes = vec![Arc::new(Node::new(1, "127.0.0.1", 1, 3))];
        let cluster = Arc::new(Cluster::new(nodes, "127.0.0.1").unwrap());
        let gateway = Arc::new(Gateway::new("127.0.0.1", 3));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            run(cluster, gateway, cancel),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unresolvable_gateway_returns_immediately() {
        let nodes = vec![Arc::new(Node::new(1, "127.0.0.1", 1, 3))];
        let cluster = Arc::new(Cluster::new(nodes, "127.0.0.1").unwrap());
        let gateway = Arc::new(Gateway::new("not a valid host!!", 3));
        let cancel = CancellationToken::new();

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            run(cluster, gateway, cancel),
        )
        .await;
        assert!(result.is_ok());
    }
}

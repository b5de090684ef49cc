//! Inbound listener: receives datagrams, refreshes peer liveness on `HELLO`,
//! and answers loopback `GET STATUS` queries.

use crate::cluster::Cluster;
use crate::error::OnionError;
use crate::status::{format_status_dump, GET_STATUS, HELLO};
use crate::transport::{UdpTransport, DEFAULT_RECV_TIMEOUT};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub async fn run(cluster: Arc<Cluster>, transport: Arc<UdpTransport>, cancel: CancellationToken) {
    loop {
        let received = tokio::select! {
            _ = cancel.cancelled() => break,
            received = transport.receive(DEFAULT_RECV_TIMEOUT) => received,
        };

        match received {
            Ok((payload, src)) => handle_datagram(&cluster, &transport, &payload, src).await,
            Err(OnionError::Timeout) => continue,
            Err(err) => {
                debug!(error = %err, "listener socket error");
            }
        }
    }
}

async fn handle_datagram(
    cluster: &Cluster,
    transport: &UdpTransport,
    payload: &[u8],
    src: std::net::SocketAddr,
) {
    if payload == GET_STATUS && src.ip().is_loopback() {
        let dump = format_status_dump(cluster);
        if let Err(err) = transport
            .send(dump.as_bytes(), &src.ip().to_string(), src.port())
            .await
        {
            debug!(error = %err, "failed to reply to status query");
        }
        return;
    }

    match cluster.get(&src.ip().to_string()).await {
        Ok(node) => {
            if payload == HELLO {
                node.last_seen().touch();
            }
        }
        Err(_) => {
            warn!(address = %src.ip(), "possible port scan attack: request received from an unauthorized host");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Device;
    use crate::node::Node;

    #[tokio::test]
    async fn hello_from_known_peer_refreshes_last_seen() {
        let nodes = vec![
            Arc::new(Node::new(1, "127.0.0.1", 1, 3)),
            Arc::new(Node::new(2, "127.0.0.2", 2, 3)),
        ];
        let cluster = Cluster::new(nodes, "127.0.0.1").unwrap();
        let transport = UdpTransport::bind(0).await.unwrap();

        handle_datagram(
            &cluster,
            &transport,
            HELLO,
            "127.0.0.2:2".parse().unwrap(),
        )
        .await;

        assert!(cluster.nodes()[1].is_alive());
    }

    #[tokio::test]
    async fn status_query_does_not_change_liveness() {
        let nodes = vec![Arc::new(Node::new(1, "127.0.0.1", 1, 3))];
        let cluster = Cluster::new(nodes, "127.0.0.1").unwrap();
        let transport = UdpTransport::bind(0).await.unwrap();

        handle_datagram(
            &cluster,
            &transport,
            GET_STATUS,
            "127.0.0.1:9".parse().unwrap(),
        )
        .await;

        assert!(!cluster.nodes()[0].is_alive());
    }

    #[tokio::test]
    async fn unrecognized_source_does_not_panic() {
        let nodes = vec![Arc::new(Node::new(1, "127.0.0.1", 1, 3))];
        let cluster = Cluster::new(nodes, "127.0.0.1").unwrap();
        let transport = UdpTransport::bind(0).await.unwrap();

        handle_datagram(
            &cluster,
            &transport,
            HELLO,
            "203.0.113.9:1234".parse().unwrap(),
        )
        .await;
    }
}

//! `oniond status`: query a (possibly not running) local daemon.

use onion_core::status::{parse_status_dump, NodeRole, GET_STATUS};
use std::path::Path;
use std::time::Duration;
use tokio::net::UdpSocket;

const QUERY_TIMEOUT: Duration = Duration::from_secs(1);

pub async fn run(config_path: &Path) -> anyhow::Result<()> {
    let config = onion_core::Config::load(config_path).await?;

    let socket = UdpSocket::bind("127.0.0.1:0").await?;
    socket
        .send_to(GET_STATUS, ("127.0.0.1", config.cluster.port))
        .await?;

    let mut buf = [0u8; 1024];
    let received = tokio::time::timeout(QUERY_TIMEOUT, socket.recv(&mut buf)).await;

    let Ok(Ok(len)) = received else {
        println!("Onion HA is not running");
        return Ok(());
    };

    let line = String::from_utf8_lossy(&buf[..len]);
    let Some(records) = parse_status_dump(&line) else {
        println!("Onion HA is not running");
        return Ok(());
    };

    for record in records {
        let marker = match record.role {
            NodeRole::Active => "\x1b[32mACTIVE\x1b[0m",
            NodeRole::Passive => "\x1b[33mPASSIVE\x1b[0m",
            NodeRole::Failed => "\x1b[31mFAILED\x1b[0m",
        };
        println!("{:<20} {}", record.address, marker);
    }

    Ok(())
}

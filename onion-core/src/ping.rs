//! ICMP echo: the local connectivity oracle.
//!
//! The wire-level ICMP exchange is a black box from the coordination
//! engine's point of view — only the boolean "did a reply arrive in time"
//! outcome matters (see the connectivity prober in `services::connectivity`).

use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

const ECHO_PAYLOAD: &[u8] = b"onion-ha gateway probe";

/// Send one ICMP echo request to `addr` and wait up to `timeout` for a reply.
/// Returns `true` iff a reply was received in time.
pub async fn ping(addr: IpAddr, timeout: Duration) -> bool {
    let attempt = surge_ping::ping(addr, ECHO_PAYLOAD);
    match tokio::time::timeout(timeout, attempt).await {
        Ok(Ok(_)) => true,
        Ok(Err(err)) => {
            debug!(%addr, error = %err, "gateway probe failed");
            false
        }
        Err(_) => {
            debug!(%addr, "gateway probe timed out");
            false
        }
    }
}

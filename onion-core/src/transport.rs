//! UDP transport wrapper: bind/send/receive with timeout, no framing beyond
//! datagram boundaries.

use crate::error::{OnionError, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(5);
const RECV_BUFFER_SIZE: usize = 1024;

/// A single datagram socket shared by every service in the process.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind `0.0.0.0:port` with `SO_REUSEADDR` set.
    pub async fn bind(port: u16) -> Result<Self> {
        let addr: SocketAddr = ([0, 0, 0, 0], port).into();
        let socket2 = socket2::Socket::new(
            socket2::Domain::IPV4,
            socket2::Type::DGRAM,
            Some(socket2::Protocol::UDP),
        )
        .map_err(|err| OnionError::BindFailed(addr.to_string(), err))?;
        socket2
            .set_reuse_address(true)
            .map_err(|err| OnionError::BindFailed(addr.to_string(), err))?;
        socket2
            .set_nonblocking(true)
            .map_err(|err| OnionError::BindFailed(addr.to_string(), err))?;
        socket2
            .bind(&addr.into())
            .map_err(|err| OnionError::BindFailed(addr.to_string(), err))?;

        let socket = UdpSocket::from_std(socket2.into())
            .map_err(|err| OnionError::BindFailed(addr.to_string(), err))?;

        Ok(Self { socket })
    }

    /// Fire-and-forget send. Failures are the caller's to log; they never
    /// interrupt a service loop.
    pub async fn send(&self, payload: &[u8], addr: &str, port: u16) -> Result<()> {
        let target = format!("{addr}:{port}");
        let resolved = tokio::net::lookup_host(&target)
            .await?
            .next()
            .ok_or_else(|| {
                OnionError::Socket(std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    format!("could not resolve {target}"),
                ))
            })?;
        self.socket.send_to(payload, resolved).await?;
        Ok(())
    }

    /// Receive one datagram, waiting at most `timeout`.
    pub async fn receive(&self, timeout: Duration) -> Result<(Vec<u8>, SocketAddr)> {
        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        match tokio::time::timeout(timeout, self.socket.recv_from(&mut buf)).await {
            Ok(Ok((len, src))) => {
                buf.truncate(len);
                Ok((buf, src))
            }
            Ok(Err(err)) => {
                debug!(error = %err, "transient socket error");
                Err(OnionError::Socket(err))
            }
            Err(_) => Err(OnionError::Timeout),
        }
    }
}

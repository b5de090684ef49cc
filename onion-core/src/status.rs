//! The status-inspection protocol: `GET STATUS` request and its reply.
//!
//! Wire format: a single ASCII line, comma-separated, one `"<address>:<code>"`
//! record per configured node in priority order, no trailing separator, no
//! newline. `code` is 0 (failed), 1 (passive/alive) or 2 (active/alive).
//! This is produced and parsed by the same function so the daemon and the
//! `status` CLI command never disagree on the format.

use crate::cluster::Cluster;
use crate::device::Device as _;
use std::fmt;

pub const HELLO: &[u8] = b"HELLO";
pub const GET_STATUS: &[u8] = b"GET STATUS";

/// One node's role as seen in a status dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Failed,
    Passive,
    Active,
}

impl NodeRole {
    fn code(self) -> u8 {
        match self {
            NodeRole::Failed => 0,
            NodeRole::Passive => 1,
            NodeRole::Active => 2,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(NodeRole::Failed),
            1 => Some(NodeRole::Passive),
            2 => Some(NodeRole::Active),
            _ => None,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Failed => write!(f, "FAILED"),
            NodeRole::Passive => write!(f, "PASSIVE"),
            NodeRole::Active => write!(f, "ACTIVE"),
        }
    }
}

/// One record of a decoded status dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub address: String,
    pub role: NodeRole,
}

/// Render the current cluster state to the wire format.
pub fn format_status_dump(cluster: &Cluster) -> String {
    cluster
        .nodes()
        .iter()
        .map(|node| {
            let role = if !node.is_alive() {
                NodeRole::Failed
            } else if node.is_active() {
                NodeRole::Active
            } else {
                NodeRole::Passive
            };
            format!("{}:{}", node.address(), role.code())
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a status dump produced by [`format_status_dump`].
pub fn parse_status_dump(line: &str) -> Option<Vec<StatusRecord>> {
    if line.is_empty() {
        return Some(Vec::new());
    }
    line.split(',')
        .map(|record| {
            let (address, code) = record.rsplit_once(':')?;
            let code: u8 = code.parse().ok()?;
            Some(StatusRecord {
                address: address.to_string(),
                role: NodeRole::from_code(code)?,
            })
        })
        .collect()
}

//! The node device: a cluster member, possibly the current process.

use crate::device::{Device, LastSeen};
use parking_lot::RwLock;

/// One member of the cluster.
///
/// `is_current` and `is_active` are plain `RwLock<bool>` rather than atomics:
/// both are written only by the supervisor (see the single-writer discipline
/// in the crate's design notes), so the lock is never contended, and a lock
/// reads more clearly than a relaxed atomic at call sites that also touch
/// `active_node` bookkeeping.
#[derive(Debug)]
pub struct Node {
    id: u32,
    address: String,
    port: u16,
    /// Peers get one extra second of slack beyond the gateway deadtime to
    /// absorb network jitter on the heartbeat path.
    deadtime: u64,
    last_seen: LastSeen,
    is_current: RwLock<bool>,
    is_active: RwLock<bool>,
}

impl Node {
    pub fn new(id: u32, address: impl Into<String>, port: u16, cluster_deadtime: u64) -> Self {
        Self {
            id,
            address: address.into(),
            port,
            deadtime: cluster_deadtime + 1,
            last_seen: LastSeen::unset(),
            is_current: RwLock::new(false),
            is_active: RwLock::new(false),
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_current(&self) -> bool {
        *self.is_current.read()
    }

    pub fn set_current(&self, value: bool) {
        *self.is_current.write() = value;
    }

    pub fn is_active(&self) -> bool {
        *self.is_active.read()
    }

    pub(crate) fn set_active(&self, value: bool) {
        *self.is_active.write() = value;
    }
}

impl Device for Node {
    fn id(&self) -> u32 {
        self.id
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn deadtime(&self) -> u64 {
        self.deadtime
    }

    fn last_seen(&self) -> &LastSeen {
        &self.last_seen
    }

    fn display_name(&self) -> String {
        format!("node {}", self.address)
    }
}

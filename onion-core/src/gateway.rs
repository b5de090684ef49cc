//! The gateway device: the local connectivity oracle.

use crate::device::{Device, LastSeen};

/// The configured gateway. Deadtime equals the configured cluster deadtime;
/// only the connectivity prober ever refreshes its stamp.
#[derive(Debug)]
pub struct Gateway {
    address: String,
    deadtime: u64,
    last_seen: LastSeen,
}

impl Gateway {
    pub fn new(address: impl Into<String>, deadtime: u64) -> Self {
        Self {
            address: address.into(),
            deadtime,
            last_seen: LastSeen::unset(),
        }
    }
}

impl Device for Gateway {
    fn id(&self) -> u32 {
        0
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
        "gateway".to_string()
    }
}

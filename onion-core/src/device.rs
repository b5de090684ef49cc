//! Device model: the liveness primitive shared by nodes and the gateway.

use parking_lot::RwLock;
use std::time::Instant;

/// A monotonic "last seen" stamp. `None` means "never refreshed", which makes
/// the device permanently not-alive until its first heartbeat or probe.
///
/// Guarded by a `parking_lot::RwLock` rather than a bare atomic: per the
/// single-writer discipline (prober writes gateway+self, listener writes
/// peers, supervisor never writes this field) contention is never more than
/// one writer against any number of readers, so the lock stays uncontended
/// in practice while still being exact rather than "tolerates a stale read".
#[derive(Debug, Default)]
pub struct LastSeen(RwLock<Option<Instant>>);

impl LastSeen {
    /// A last-seen stamp that reads as "never seen" until first refreshed.
    pub fn unset() -> Self {
        Self(RwLock::new(None))
    }

    /// Refresh the stamp to "now".
    pub fn touch(&self) {
        *self.0.write() = Some(Instant::now());
    }

    /// Seconds elapsed since this stamp was last refreshed, or `u64::MAX` if
    /// it has never been touched.
    pub fn age_secs(&self) -> u64 {
        match *self.0.read() {
            Some(instant) => instant.elapsed().as_secs(),
            None => u64::MAX,
        }
    }
}

/// Common identity and liveness fields shared by [`crate::node::Node`] and
/// [`crate::gateway::Gateway`].
pub trait Device {
    /// Stable integer identifier (cluster-assigned for nodes, fixed for the gateway).
    fn id(&self) -> u32;

    /// Configured network address (IP preferred, FQDN accepted).
    fn address(&self) -> &str;

    /// Seconds after which, with no refresh, this device is considered dead.
    fn deadtime(&self) -> u64;

    fn last_seen(&self) -> &LastSeen;

    /// `is_alive ≡ now() − last_seen < deadtime`.
    fn is_alive(&self) -> bool {
        self.last_seen().age_secs() < self.deadtime()
    }

    /// A human-readable name used in log messages ("the gateway is down", "the node X is up").
    fn display_name(&self) -> String {
        self.address().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_touched_is_not_alive() {
        let stamp = LastSeen::unset();
        assert_eq!(stamp.age_secs(), u64::MAX);
    }

    #[test]
    fn touch_resets_age_to_zero() {
        let stamp = LastSeen::unset();
        stamp.touch();
        assert_eq!(stamp.age_secs(), 0);
    }
}

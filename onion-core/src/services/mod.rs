//! The four cooperating services: heartbeat emitter, connectivity prober,
//! inbound listener, and supervisor/election loop (plus its diagnostic
//! pass). Each is an independent loop; they never call one another
//! directly, only through the shared [`crate::cluster::Cluster`] and
//! [`crate::gateway::Gateway`].

pub mod connectivity;
pub mod heartbeat;
pub mod listener;
pub mod supervisor;

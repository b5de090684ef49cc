//! Cluster & device model: nodes, gateway, liveness predicate, active-node tracking.

use crate::device::Device;
use crate::error::{OnionError, Result};
use crate::node::Node;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// An ordered collection of [`Node`]s plus an address index, the current
/// node, and (when elected) the active node.
///
/// Order is insertion order, which is also identifier order and configured
/// priority: index 0 is the master. `register` is only called at startup;
/// there are no dynamic additions or removals for the lifetime of the
/// process.
pub struct Cluster {
    nodes: Vec<Arc<Node>>,
    by_address: HashMap<String, usize>,
    current: usize,
    active_node: RwLock<Option<usize>>,
    resolver: Option<hickory_resolver::TokioAsyncResolver>,
}

impl Cluster {
    /// Build a cluster from nodes in configured priority order, designating
    /// the one matching `current_address` as the current node.
    pub fn new(nodes: Vec<Arc<Node>>, current_address: &str) -> Result<Self> {
        let mut by_address = HashMap::with_capacity(nodes.len());
        let mut current = None;
        for (idx, node) in nodes.iter().enumerate() {
            by_address.insert(node.address().to_string(), idx);
            if node.address() == current_address {
                node.set_current(true);
                current = Some(idx);
            }
        }
        let current = current
            .ok_or_else(|| OnionError::LocalNodeNotInCluster(current_address.to_string()))?;

        let resolver = hickory_resolver::TokioAsyncResolver::tokio_from_system_conf().ok();

        Ok(Self {
            nodes,
            by_address,
            current,
            active_node: RwLock::new(None),
            resolver,
        })
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn current_node(&self) -> &Arc<Node> {
        &self.nodes[self.current]
    }

    /// Every registered node except the current one.
    pub fn peers(&self) -> impl Iterator<Item = &Arc<Node>> {
        self.nodes
            .iter()
            .enumerate()
            .filter(move |(idx, _)| *idx != self.current)
            .map(|(_, node)| node)
    }

    /// Nodes whose `is_alive` is true, in configured priority order.
    pub fn nodes_alive(&self) -> Vec<Arc<Node>> {
        self.nodes
            .iter()
            .filter(|node| node.is_alive())
            .cloned()
            .collect()
    }

    /// The highest-priority alive node, if any.
    pub fn get_next_active_node(&self) -> Option<Arc<Node>> {
        self.nodes.iter().find(|node| node.is_alive()).cloned()
    }

    pub fn active_node(&self) -> Option<Arc<Node>> {
        self.active_node.read().map(|idx| self.nodes[idx].clone())
    }

    /// Mark `node` active and clear the previously active node, if any. Does
    /// not invoke user commands; callers run those at the supervisor layer.
    pub fn activate(&self, node: &Arc<Node>) {
        let idx = self.by_address[node.address()];
        let mut active = self.active_node.write();
        if let Some(previous) = *active {
            if previous != idx {
                self.nodes[previous].set_active(false);
            }
        }
        node.set_active(true);
        *active = Some(idx);
    }

    pub fn reset_active_node(&self) {
        let mut active = self.active_node.write();
        if let Some(previous) = active.take() {
            self.nodes[previous].set_active(false);
        }
    }

    /// Resolve a source address to a registered node.
    ///
    /// Accepts, in order: the literal `127.0.0.1` (returns the current
    /// node); an exact match against registered addresses; otherwise the
    /// reverse-DNS canonical name of the address, matched against registered
    /// addresses. A resolver failure during the fallback is treated the same
    /// as no match.
    pub async fn get(&self, addr: &str) -> Result<Arc<Node>> {
        if addr == "127.0.0.1" {
            return Ok(self.current_node().clone());
        }
        if let Some(&idx) = self.by_address.get(addr) {
            return Ok(self.nodes[idx].clone());
        }
        if let Some(canonical) = self.reverse_lookup(addr).await {
            if let Some(&idx) = self.by_address.get(&canonical) {
                return Ok(self.nodes[idx].clone());
            }
        }
        Err(OnionError::UnknownNode(addr.to_string()))
    }

    async fn reverse_lookup(&self, addr: &str) -> Option<String> {
        let ip: IpAddr = addr.parse().ok()?;
        let resolver = self.resolver.as_ref()?;
        match resolver.reverse_lookup(ip).await {
            Ok(lookup) => lookup
                .iter()
                .next()
                .map(|name| name.to_string().trim_end_matches('.').to_string()),
            Err(err) => {
                debug!(%addr, error = %err, "reverse DNS lookup failed, treating as unknown node");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cluster() -> Cluster {
        let nodes = vec![
            Arc::new(Node::new(1, "10.0.0.1", 7500, 3)),
            Arc::new(Node::new(2, "10.0.0.2", 7500, 3)),
            Arc::new(Node::new(3, "10.0.0.3", 7500, 3)),
        ];
        Cluster::new(nodes, "10.0.0.1").unwrap()
    }

    #[test]
    fn current_node_is_flagged() {
        let cluster = make_cluster();
        assert!(cluster.current_node().is_current());
        assert_eq!(cluster.current_node().address(), "10.0.0.1");
    }

    #[test]
    fn peers_excludes_current_node() {
        let cluster = make_cluster();
        let peer_addrs: Vec<_> = cluster.peers().map(|n| n.address().to_string()).collect();
        assert_eq!(peer_addrs, vec!["10.0.0.2", "10.0.0.3"]);
    }

    #[test]
    fn no_node_alive_until_touched() {
        let cluster = make_cluster();
        assert!(cluster.nodes_alive().is_empty());
        assert!(cluster.get_next_active_node().is_none());
    }

    #[test]
    fn next_active_is_highest_priority_alive() {
        let cluster = make_cluster();
        cluster.nodes()[1].last_seen().touch();
        cluster.nodes()[2].last_seen().touch();
        let next = cluster.get_next_active_node().unwrap();
        assert_eq!(next.address(), "10.0.0.2");
    }

    #[test]
    fn activate_clears_previous_active() {
        let cluster = make_cluster();
        cluster.activate(&cluster.nodes()[0]);
        assert!(cluster.nodes()[0].is_active());
        cluster.activate(&cluster.nodes()[1]);
        assert!(!cluster.nodes()[0].is_active());
        assert!(cluster.nodes()[1].is_active());
        assert_eq!(cluster.active_node().unwrap().address(), "10.0.0.2");
    }

    #[test]
    fn reset_active_node_clears_flag() {
        let cluster = make_cluster();
        cluster.activate(&cluster.nodes()[0]);
        cluster.reset_active_node();
        assert!(!cluster.nodes()[0].is_active());
        assert!(cluster.active_node().is_none());
    }

    #[tokio::test]
    async fn get_matches_loopback_to_current_node() {
        let cluster = make_cluster();
        let node = cluster.get("127.0.0.1").await.unwrap();
        assert!(node.is_current());
    }

    #[tokio::test]
    async fn get_matches_exact_registered_address() {
        let cluster = make_cluster();
        let node = cluster.get("10.0.0.2").await.unwrap();
        assert_eq!(node.address(), "10.0.0.2");
    }

    #[tokio::test]
    async fn get_rejects_unregistered_address() {
        let cluster = make_cluster();
        let err = cluster.get("192.168.1.1").await.unwrap_err();
        assert!(matches!(err, OnionError::UnknownNode(_)));
    }

    #[test]
    fn new_rejects_current_address_not_in_cluster() {
        let nodes = vec![Arc::new(Node::new(1, "10.0.0.1", 7500, 3))];
        let err = Cluster::new(nodes, "10.0.0.99").unwrap_err();
        assert!(matches!(err, OnionError::LocalNodeNotInCluster(_)));
    }
}

//! Ring configuration and builder.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::node::Node;
use crate::partitioner::{Crc32Partitioner, Partitioner};
use crate::ring::hash_ring::HashRing;

/// Default number of replicas placed per node.
pub const DEFAULT_REPLICAS: usize = 100;

/// Upper bound on the replicas a single node places, weighted or not.
pub const MAX_REPLICAS: usize = 1 << 16;

/// Placement settings of a ring. Fixed for the lifetime of the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Replicas placed per node.
    pub replicas: usize,
    /// When set, a node receives `replicas * weight` replicas instead of
    /// `replicas`. Weight is part of the replica key either way.
    pub weighted: bool,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            replicas: DEFAULT_REPLICAS,
            weighted: false,
        }
    }
}

impl RingConfig {
    /// Number of replicas `node` places on the ring, capped at [`MAX_REPLICAS`].
    pub fn replicas_for(&self, node: &Node) -> usize {
        self.requested_replicas(node)
            .map_or(MAX_REPLICAS, |count| count.min(MAX_REPLICAS))
    }

    /// Whether `node` asks for more replicas than [`MAX_REPLICAS`].
    pub fn exceeds_cap(&self, node: &Node) -> bool {
        self.requested_replicas(node)
            .map_or(true, |count| count > MAX_REPLICAS)
    }

    fn requested_replicas(&self, node: &Node) -> Option<usize> {
        if self.weighted {
            self.replicas.checked_mul(node.weight as usize)
        } else {
            Some(self.replicas)
        }
    }
}

/// Builder for [`HashRing`].
///
/// # Example
///
/// ```rust
/// use corelib::{Node, RingBuilder};
///
/// let ring = RingBuilder::new()
///     .with_replicas(8)
///     .add_node(Node::new(1, "10.0.0.1", 6379, 1))
///     .add_node(Node::new(2, "10.0.0.2", 6379, 1))
///     .build();
/// assert_eq!(ring.node_count(), 2);
/// ```
#[derive(Debug)]
pub struct RingBuilder<P = Crc32Partitioner> {
    config: RingConfig,
    partitioner: P,
    nodes: Vec<Node>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self {
            config: RingConfig::default(),
            partitioner: Crc32Partitioner,
            nodes: Vec::new(),
        }
    }
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Partitioner> RingBuilder<P> {
    pub fn with_config(mut self, config: RingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.config.replicas = replicas;
        self
    }

    pub fn weighted(mut self, weighted: bool) -> Self {
        self.config.weighted = weighted;
        self
    }

    /// Replace the partitioner used to hash replica and lookup keys.
    pub fn with_partitioner<Q: Partitioner>(self, partitioner: Q) -> RingBuilder<Q> {
        RingBuilder {
            config: self.config,
            partitioner,
            nodes: self.nodes,
        }
    }

    pub fn add_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn add_nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.nodes.extend(nodes);
        self
    }

    /// Build the ring. Later nodes reusing an id are skipped.
    pub fn build(self) -> HashRing<P> {
        let ring = HashRing::with_partitioner(self.config, self.partitioner);
        for node in self.nodes {
            let id = node.id;
            if !ring.add_node(node) {
                debug!(node = %id, "builder skipped duplicate node id");
            }
        }
        ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeId;

    #[test]
    fn test_config_defaults() {
        let config = RingConfig::default();
        assert_eq!(config.replicas, DEFAULT_REPLICAS);
        assert!(!config.weighted);
    }

    #[test]
    fn test_config_partial_json() {
        let config: RingConfig = serde_json::from_str(r#"{"weighted":true}"#).unwrap();
        assert_eq!(config.replicas, DEFAULT_REPLICAS);
        assert!(config.weighted);
    }

    #[test]
    fn test_replicas_for() {
        let heavy = Node::new(1, "10.0.0.1", 6379, 3);
        let idle = Node::new(2, "10.0.0.2", 6379, 0);

        let uniform = RingConfig { replicas: 10, weighted: false };
        assert_eq!(uniform.replicas_for(&heavy), 10);
        assert_eq!(uniform.replicas_for(&idle), 10);

        let weighted = RingConfig { replicas: 10, weighted: true };
        assert_eq!(weighted.replicas_for(&heavy), 30);
        assert_eq!(weighted.replicas_for(&idle), 0);
    }

    #[test]
    fn test_replicas_for_is_capped() {
        let huge = Node::new(1, "10.0.0.1", 6379, u32::MAX);

        let weighted = RingConfig { replicas: 100, weighted: true };
        assert_eq!(weighted.replicas_for(&huge), MAX_REPLICAS);
        assert!(weighted.exceeds_cap(&huge));

        let overflow = RingConfig { replicas: usize::MAX, weighted: true };
        assert_eq!(overflow.replicas_for(&huge), MAX_REPLICAS);

        let unweighted = RingConfig { replicas: MAX_REPLICAS + 1, weighted: false };
        assert_eq!(unweighted.replicas_for(&huge), MAX_REPLICAS);

        let at_cap = RingConfig { replicas: MAX_REPLICAS, weighted: false };
        assert!(!at_cap.exceeds_cap(&huge));
    }

    #[test]
    fn test_builder_skips_duplicates() {
        let ring = RingBuilder::new()
            .with_replicas(4)
            .add_node(Node::new(1, "10.0.0.1", 6379, 1))
            .add_node(Node::new(1, "10.0.0.9", 6379, 1))
            .build();
        assert_eq!(ring.node_count(), 1);
        assert_eq!(ring.get_node_by_id(NodeId(1)).map(|n| n.address), Some("10.0.0.1".to_string()));
    }
}

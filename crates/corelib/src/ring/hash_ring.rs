//! Thread-safe consistent hash ring.

use std::fmt;

use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result};
use crate::node::{Node, NodeId};
use crate::partitioner::{Crc32Partitioner, Partitioner};
use crate::ring::builder::{RingConfig, MAX_REPLICAS};
use crate::ring::state::RingState;
use crate::token::Token;
use crate::topology::Ownership;
use crate::vnode::VirtualNode;

/// A consistent hash ring mapping keys to registered nodes.
///
/// Every registered node places a fixed number of replicas on a 32-bit ring.
/// A key belongs to the first replica at or after the key's hash, wrapping
/// around to the lowest replica past the end of the ring.
///
/// All operations take `&self`: mutations hold the write half of an internal
/// `RwLock` for their full duration, lookups hold the read half. A reader
/// therefore sees a node either with all of its replicas or with none of
/// them. Share the ring across threads with `Arc<HashRing>`.
///
/// # Examples
///
/// ```
/// use corelib::{HashRing, Node};
///
/// let ring = HashRing::with_replicas(3);
/// assert!(ring.add_node(Node::new(1, "10.0.0.1", 6379, 1)));
/// assert!(ring.add_node(Node::new(2, "10.0.0.2", 6379, 1)));
///
/// assert_eq!(ring.get_node("alpha").unwrap().id.0, 1);
/// assert_eq!(ring.get_node("beta").unwrap().id.0, 2);
/// ```
pub struct HashRing<P = Crc32Partitioner> {
    config: RingConfig,
    partitioner: P,
    state: RwLock<RingState>,
}

impl HashRing {
    /// Creates an empty ring with the default replica count.
    pub fn new() -> Self {
        Self::with_partitioner(RingConfig::default(), Crc32Partitioner)
    }

    /// Creates an empty ring placing `replicas` replicas per node.
    pub fn with_replicas(replicas: usize) -> Self {
        let config = RingConfig {
            replicas,
            ..RingConfig::default()
        };
        Self::with_partitioner(config, Crc32Partitioner)
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for HashRing<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("HashRing")
            .field("config", &self.config)
            .field("nodes", &state.node_count())
            .field("tokens", &state.token_count())
            .finish()
    }
}

impl<P: Partitioner> HashRing<P> {
    /// Creates an empty ring with explicit configuration and partitioner.
    pub fn with_partitioner(config: RingConfig, partitioner: P) -> Self {
        Self {
            config,
            partitioner,
            state: RwLock::new(RingState::default()),
        }
    }

    pub fn config(&self) -> RingConfig {
        self.config
    }

    /// Replicas placed per node (before weighting).
    pub fn replicas(&self) -> usize {
        self.config.replicas
    }

    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    /// Registers `node` and places its replicas.
    ///
    /// Returns `false` without touching the ring if a node with the same id is
    /// already registered. The ring keeps its own copy of `node`. A node never
    /// places more than [`MAX_REPLICAS`] replicas.
    ///
    /// [`MAX_REPLICAS`]: crate::ring::MAX_REPLICAS
    pub fn add_node(&self, node: Node) -> bool {
        if self.config.exceeds_cap(&node) {
            warn!(node = %node.id, weight = node.weight, cap = MAX_REPLICAS, "replica count capped");
        }
        let vnodes = VirtualNode::replicas_of(&self.partitioner, &node, self.config.replicas_for(&node));

        let mut state = self.state.write();
        if state.contains(node.id) {
            debug!(node = %node.id, "node already registered");
            return false;
        }

        let id = node.id;
        state.insert(node, &vnodes);
        info!(node = %id, replicas = vnodes.len(), tokens = state.token_count(), "added node to ring");
        record_size(&state);
        true
    }

    /// Unregisters the node with `node.id` and withdraws its replicas.
    ///
    /// Replica positions are derived from the copy registered by
    /// [`add_node`](Self::add_node), so only the id of `node` has to match.
    /// Removing an unknown node is a no-op.
    pub fn remove_node(&self, node: &Node) {
        let mut state = self.state.write();
        let Some(registered) = state.member(node.id).cloned() else {
            debug!(node = %node.id, "ignoring removal of unknown node");
            return;
        };
        if registered != *node {
            debug!(node = %node.id, registered = %registered, "removing node by id; registered data differs");
        }

        let vnodes =
            VirtualNode::replicas_of(&self.partitioner, &registered, self.config.replicas_for(&registered));
        state.remove(registered.id, &vnodes);
        info!(node = %registered, tokens = state.token_count(), "removed node from ring");
        record_size(&state);
    }

    /// Returns the node responsible for `key`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyRing`] if the ring holds no positions.
    pub fn get_node<K: AsRef<[u8]>>(&self, key: K) -> Result<Node> {
        let token = self.partitioner.partition(key.as_ref());

        let state = self.state.read();
        let resolved = state
            .successor(token)
            .and_then(|(position, slot)| state.member(slot.owner()).map(|node| (position, node.clone())));

        match resolved {
            Some((position, node)) => {
                metrics::counter!("hashring_lookups_total").increment(1);
                trace!(hash = %token, position = %position, node = %node.id, "resolved key");
                Ok(node)
            }
            None => {
                metrics::counter!("hashring_lookup_empty_total").increment(1);
                Err(Error::EmptyRing)
            }
        }
    }

    /// Returns the registered node with the given id.
    ///
    /// Every replica of a node carries the same node data, so the result does
    /// not depend on which replica would have been matched.
    pub fn get_node_by_id(&self, id: NodeId) -> Option<Node> {
        self.state.read().member(id).cloned()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.state.read().contains(id)
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.state.read().node_count()
    }

    /// Number of occupied ring positions.
    ///
    /// Smaller than the number of placed replicas when replica hashes collide.
    pub fn token_count(&self) -> usize {
        self.state.read().token_count()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().token_count() == 0
    }

    /// Registered nodes ordered by id.
    pub fn nodes(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = self.state.read().members().cloned().collect();
        nodes.sort_by_key(|node| node.id);
        nodes
    }

    /// Ring positions in ascending order with their owning node.
    pub fn tokens(&self) -> Vec<(Token, NodeId)> {
        self.state.read().positions().collect()
    }

    /// Share of the key space owned by each registered node.
    pub fn ownership(&self) -> Ownership {
        let state = self.state.read();
        let positions: Vec<(Token, NodeId)> = state.positions().collect();
        Ownership::from_positions(&positions, state.members().cloned())
    }
}

fn record_size(state: &RingState) {
    metrics::gauge!("hashring_nodes").set(state.node_count() as f64);
    metrics::gauge!("hashring_tokens").set(state.token_count() as f64);
}

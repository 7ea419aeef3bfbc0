//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Instead of each physical node owning a single position on the ring, every
//! node places several replicas (virtual nodes). This provides:
//!
//! 1. **Better Load Distribution**: more positions give a smoother split of the key space
//! 2. **Gradual Rebalancing**: when nodes join or leave, only a fraction of keys move
//!
//! # Replica Keys
//!
//! The position of replica `i` of a node is the hash of its replica key:
//!
//! ```text
//! {address}*{port}*{weight}*{i}      e.g. "10.0.0.1*6379*1*0"
//! ```
//!
//! Derivation is deterministic, so removing a node recomputes exactly the
//! positions that registering it produced.

use std::fmt;

use crate::node::{Node, NodeId};
use crate::partitioner::Partitioner;
use crate::token::Token;

/// Separator between the fields of a replica key.
const KEY_SEPARATOR: char = '*';

/// Build the replica key for replica `index` of `node`.
pub fn replica_key(node: &Node, index: usize) -> String {
    format!(
        "{addr}{sep}{port}{sep}{weight}{sep}{index}",
        addr = node.address,
        port = node.port,
        weight = node.weight,
        sep = KEY_SEPARATOR,
    )
}

/// A virtual node on the hash ring.
///
/// Represents a single token position owned by a physical node. Ordering is by
/// token first, so a sorted collection of vnodes is in ring order.
///
/// # Example
///
/// ```rust
/// use corelib::{Crc32Partitioner, Node, VirtualNode};
///
/// let node = Node::new(1, "10.0.0.1", 6379, 1);
/// let vnode = VirtualNode::for_replica(&Crc32Partitioner, &node, 0);
/// assert_eq!(vnode.node_id(), node.id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode {
    /// Token position on the ring.
    pub token: Token,

    /// The physical node that owns this virtual node.
    pub node_id: NodeId,
}

impl VirtualNode {
    /// Create a new virtual node.
    #[inline]
    pub fn new(token: Token, node_id: NodeId) -> Self {
        Self { token, node_id }
    }

    /// Create the virtual node for replica `index` of `node`.
    ///
    /// Hashes [`replica_key`] with the given partitioner.
    pub fn for_replica<P: Partitioner + ?Sized>(partitioner: &P, node: &Node, index: usize) -> Self {
        let key = replica_key(node, index);
        Self::new(partitioner.partition(key.as_bytes()), node.id)
    }

    /// Virtual nodes for replicas `0..count` of `node`, in replica order.
    pub fn replicas_of<P: Partitioner + ?Sized>(partitioner: &P, node: &Node, count: usize) -> Vec<Self> {
        (0..count)
            .map(|index| Self::for_replica(partitioner, node, index))
            .collect()
    }

    #[inline]
    pub fn token(&self) -> Token {
        self.token
    }

    #[inline]
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VNode(token={}, node={})", self.token, self.node_id)
    }
}

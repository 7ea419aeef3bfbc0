//! Node abstractions for the consistent hash ring.
//!
//! Nodes represent backend endpoints that can own keys. They are identified by
//! a compact `NodeId` that is cheap to compare and hash.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a node registered in the ring.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id)
    }
}

/// Backend endpoint participating in the ring.
///
/// The ring stores its own copy of every registered node and hands out
/// clones, so mutating a `Node` after registration never affects placement.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Host name or IP address.
    pub address: String,
    pub port: u16,
    /// Relative capacity. Always part of the replica key; scales the replica
    /// count only when the ring is configured as weighted.
    pub weight: u32,
}

impl Node {
    /// Construct a new node.
    pub fn new(id: u64, address: impl Into<String>, port: u16, weight: u32) -> Self {
        Self {
            id: NodeId(id),
            address: address.into(),
            port,
            weight,
        }
    }

    /// `address:port` of this node.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{}, weight {})", self.id, self.address, self.port, self.weight)
    }
}

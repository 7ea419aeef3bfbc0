//! Ownership view over the ring.
//!
//! A position owns the arc that ends at it: every key hashing into
//! `(predecessor, position]` resolves to that position. Summing the arcs of a
//! node's positions gives the share of the key space it serves.

use std::collections::HashMap;

use crate::node::{Node, NodeId};
use crate::token::{Token, RING_SIZE};

/// Key-space share of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOwnership {
    pub node: Node,
    /// Ring positions currently owned by the node.
    pub slots: usize,
    /// Owned fraction of the key space, in `[0, 1]`.
    pub fraction: f64,
}

/// Key-space shares of all registered nodes, ordered by node id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ownership {
    entries: Vec<NodeOwnership>,
}

impl Ownership {
    /// Compute ownership from ring positions in ascending token order.
    ///
    /// Every node in `nodes` gets an entry, including nodes that own nothing.
    pub fn from_positions(positions: &[(Token, NodeId)], nodes: impl IntoIterator<Item = Node>) -> Self {
        let mut arcs: HashMap<NodeId, (usize, u64)> = HashMap::new();

        if let Some(&(last, _)) = positions.last() {
            let mut predecessor = last;
            for &(token, owner) in positions {
                let arc = match predecessor.distance_to(&token) {
                    // A lone position covers the whole ring.
                    0 => RING_SIZE,
                    d => d,
                };
                let entry = arcs.entry(owner).or_default();
                entry.0 += 1;
                entry.1 += arc;
                predecessor = token;
            }
        }

        let mut entries: Vec<NodeOwnership> = nodes
            .into_iter()
            .map(|node| {
                let (slots, arc) = arcs.get(&node.id).copied().unwrap_or_default();
                NodeOwnership {
                    node,
                    slots,
                    fraction: arc as f64 / RING_SIZE as f64,
                }
            })
            .collect();
        entries.sort_by_key(|entry| entry.node.id);

        Self { entries }
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeOwnership> {
        self.entries.iter().find(|entry| entry.node.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeOwnership> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all fractions; 1.0 for any ring with at least one position.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|entry| entry.fraction).sum()
    }
}

impl<'a> IntoIterator for &'a Ownership {
    type Item = &'a NodeOwnership;
    type IntoIter = std::slice::Iter<'a, NodeOwnership>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

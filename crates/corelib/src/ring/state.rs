//! Lock-protected ring contents.
//!
//! `RingState` keeps the ordered positions and the membership table in one
//! structure so that a single lock acquisition covers both. Positions live in
//! a `BTreeMap`, which keeps them sorted and duplicate-free after every
//! mutation without an explicit re-sort.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::node::{Node, NodeId};
use crate::token::Token;
use crate::vnode::VirtualNode;

/// One occupied position on the ring.
///
/// Distinct replica keys can hash to the same token. Every replica that lands
/// on a position is recorded as a claim: the latest claim owns the position,
/// earlier ones are shadowed and take over again when it is withdrawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Slot {
    owner: NodeId,
    shadowed: Vec<NodeId>,
}

impl Slot {
    fn new(owner: NodeId) -> Self {
        Self {
            owner,
            shadowed: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn owner(&self) -> NodeId {
        self.owner
    }

    fn claim(&mut self, node_id: NodeId) {
        let previous = std::mem::replace(&mut self.owner, node_id);
        self.shadowed.push(previous);
    }

    /// Withdraw one claim of `node_id`. Returns `false` once no claim is left.
    fn withdraw(&mut self, node_id: NodeId) -> bool {
        if self.owner == node_id {
            match self.shadowed.pop() {
                Some(previous) => self.owner = previous,
                None => return false,
            }
        } else if let Some(pos) = self.shadowed.iter().rposition(|id| *id == node_id) {
            self.shadowed.remove(pos);
        }
        true
    }
}

#[derive(Debug, Default)]
pub(crate) struct RingState {
    slots: BTreeMap<Token, Slot>,
    members: HashMap<NodeId, Node>,
}

impl RingState {
    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.members.contains_key(&id)
    }

    pub(crate) fn member(&self, id: NodeId) -> Option<&Node> {
        self.members.get(&id)
    }

    pub(crate) fn members(&self) -> impl Iterator<Item = &Node> {
        self.members.values()
    }

    pub(crate) fn node_count(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn token_count(&self) -> usize {
        self.slots.len()
    }

    /// Ring positions in ascending order with their current owners.
    pub(crate) fn positions(&self) -> impl Iterator<Item = (Token, NodeId)> + '_ {
        self.slots.iter().map(|(token, slot)| (*token, slot.owner()))
    }

    /// Register `node` and claim every position in `vnodes`.
    ///
    /// The caller has already checked that the node is not a member.
    pub(crate) fn insert(&mut self, node: Node, vnodes: &[VirtualNode]) {
        for vnode in vnodes {
            match self.slots.get_mut(&vnode.token) {
                Some(slot) => {
                    debug!(
                        token = %vnode.token,
                        owner = %slot.owner(),
                        claimant = %vnode.node_id,
                        "replica hash collision, latest claimant takes the position"
                    );
                    slot.claim(vnode.node_id);
                }
                None => {
                    self.slots.insert(vnode.token, Slot::new(vnode.node_id));
                }
            }
        }
        self.members.insert(node.id, node);
    }

    /// Unregister `id` and withdraw its claim on every position in `vnodes`.
    /// Does nothing when `id` is not a member.
    pub(crate) fn remove(&mut self, id: NodeId, vnodes: &[VirtualNode]) {
        if self.members.remove(&id).is_none() {
            return;
        }
        for vnode in vnodes {
            let emptied = match self.slots.get_mut(&vnode.token) {
                Some(slot) => !slot.withdraw(id),
                None => false,
            };
            if emptied {
                self.slots.remove(&vnode.token);
            }
        }
    }

    /// The first position at or after `token`, wrapping to the lowest
    /// position when `token` is past the last one.
    pub(crate) fn successor(&self, token: Token) -> Option<(Token, &Slot)> {
        self.slots
            .range(token..)
            .next()
            .or_else(|| self.slots.iter().next())
            .map(|(token, slot)| (*token, slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_last_claim_wins() {
        let mut slot = Slot::new(NodeId(1));
        slot.claim(NodeId(2));
        assert_eq!(slot.owner(), NodeId(2));

        assert!(slot.withdraw(NodeId(2)));
        assert_eq!(slot.owner(), NodeId(1));
        assert!(!slot.withdraw(NodeId(1)));
    }

    #[test]
    fn test_slot_withdraw_shadowed_claim() {
        let mut slot = Slot::new(NodeId(1));
        slot.claim(NodeId(2));
        assert!(slot.withdraw(NodeId(1)));
        assert_eq!(slot.owner(), NodeId(2));
        assert!(!slot.withdraw(NodeId(2)));
    }

    #[test]
    fn test_successor_wraps() {
        let mut state = RingState::default();
        let node = Node::new(1, "a", 1, 1);
        state.insert(
            node,
            &[VirtualNode::new(Token(100), NodeId(1)), VirtualNode::new(Token(200), NodeId(1))],
        );

        assert_eq!(state.successor(Token(50)).map(|(t, _)| t), Some(Token(100)));
        assert_eq!(state.successor(Token(100)).map(|(t, _)| t), Some(Token(100)));
        assert_eq!(state.successor(Token(200)).map(|(t, _)| t), Some(Token(200)));
        assert_eq!(state.successor(Token(201)).map(|(t, _)| t), Some(Token(100)));
    }

    #[test]
    fn test_remove_non_member_keeps_positions() {
        let mut state = RingState::default();
        let vnodes = [VirtualNode::new(Token(100), NodeId(1))];
        state.insert(Node::new(1, "a", 1, 1), &vnodes);

        // Same positions, different id: nothing is withdrawn.
        state.remove(NodeId(2), &vnodes);
        assert_eq!(state.token_count(), 1);
        assert!(state.contains(NodeId(1)));

        state.remove(NodeId(1), &vnodes);
        assert_eq!(state.token_count(), 0);
        assert_eq!(state.node_count(), 0);
    }

    #[test]
    fn test_successor_empty() {
        let state = RingState::default();
        assert!(state.successor(Token(0)).is_none());
    }
}

//! Property tests: ring invariants under arbitrary membership changes.

use std::collections::BTreeSet;

use corelib::{HashRing, Node, NodeId};
use proptest::prelude::*;

const REPLICAS: usize = 8;

#[derive(Debug, Clone)]
enum Op {
    Add(u64),
    Remove(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![(0u64..8).prop_map(Op::Add), (0u64..8).prop_map(Op::Remove)]
}

fn node(id: u64) -> Node {
    Node::new(id, format!("10.0.0.{id}"), 6379, 1)
}

fn assert_well_formed(ring: &HashRing, members: &BTreeSet<u64>) -> Result<(), TestCaseError> {
    let tokens = ring.tokens();
    prop_assert!(tokens.windows(2).all(|w| w[0].0 < w[1].0), "positions must be strictly ascending");

    let ids: BTreeSet<u64> = ring.nodes().iter().map(|n| n.id.0).collect();
    prop_assert_eq!(&ids, members);
    prop_assert!(tokens.iter().all(|(_, owner)| members.contains(&owner.0)));
    prop_assert_eq!(ring.is_empty(), members.is_empty());
    Ok(())
}

proptest! {
    #[test]
    fn ring_stays_sorted_and_consistent(ops in prop::collection::vec(op(), 1..40)) {
        let ring = HashRing::with_replicas(REPLICAS);
        let mut members = BTreeSet::new();

        for op in ops {
            match op {
                Op::Add(id) => {
                    let added = ring.add_node(node(id));
                    prop_assert_eq!(added, members.insert(id));
                }
                Op::Remove(id) => {
                    ring.remove_node(&node(id));
                    members.remove(&id);
                }
            }
            assert_well_formed(&ring, &members)?;
        }
    }

    #[test]
    fn add_then_remove_restores_ring(
        initial in prop::collection::btree_set(0u64..8, 0..6),
        extra in 8u64..16,
    ) {
        let ring = HashRing::with_replicas(REPLICAS);
        for id in &initial {
            ring.add_node(node(*id));
        }
        let tokens = ring.tokens();
        let nodes = ring.nodes();

        prop_assert!(ring.add_node(node(extra)));
        prop_assert_eq!(ring.token_count(), tokens.len() + REPLICAS);
        ring.remove_node(&node(extra));

        prop_assert_eq!(ring.tokens(), tokens);
        prop_assert_eq!(ring.nodes(), nodes);
    }

    #[test]
    fn lookup_is_deterministic(
        ids in prop::collection::btree_set(0u64..16, 1..6),
        key in ".*",
    ) {
        let ring = HashRing::with_replicas(REPLICAS);
        for id in &ids {
            ring.add_node(node(*id));
        }

        let owner = ring.get_node(&key).unwrap();
        prop_assert!(ids.contains(&owner.id.0));
        prop_assert_eq!(ring.get_node(&key).unwrap(), owner.clone());
        prop_assert_eq!(ring.get_node_by_id(owner.id), Some(owner));
    }

    #[test]
    fn get_node_by_id_never_matches_other_nodes(
        ids in prop::collection::btree_set(0u64..8, 0..6),
        lookup_id in 0u64..16,
    ) {
        let ring = HashRing::with_replicas(REPLICAS);
        for id in &ids {
            ring.add_node(node(*id));
        }

        match ring.get_node_by_id(NodeId(lookup_id)) {
            Some(found) => {
                prop_assert!(ids.contains(&lookup_id));
                prop_assert_eq!(found, node(lookup_id));
            }
            None => prop_assert!(!ids.contains(&lookup_id)),
        }
    }
}

//! Core library for consistent hashing.
//!
//! This crate provides a thread-safe consistent hash ring:
//! - Node identities and endpoint data
//! - 32-bit tokens and the CRC-32 partitioner that produces them
//! - Virtual node (replica) key derivation
//! - The ring itself, its builder and configuration
//! - An ownership view of how the key space is split

pub mod error;
pub mod node;
pub mod partitioner;
pub mod ring;
pub mod token;
pub mod topology;
pub mod vnode;

pub use error::{Error, Result};
pub use node::{Node, NodeId};
pub use partitioner::{Crc32Partitioner, Partitioner};
pub use ring::{HashRing, RingBuilder, RingConfig, DEFAULT_REPLICAS, MAX_REPLICAS};
pub use token::Token;
pub use topology::{NodeOwnership, Ownership};
pub use vnode::VirtualNode;

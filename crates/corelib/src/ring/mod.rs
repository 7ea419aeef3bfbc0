//! Consistent hash ring implementation.
//!
//! The ring manages replica positions and provides efficient lookup
//! operations for finding nodes responsible for keys.

pub mod builder;
pub mod hash_ring;
mod state;

pub use builder::{RingBuilder, RingConfig, DEFAULT_REPLICAS, MAX_REPLICAS};
pub use hash_ring::HashRing;

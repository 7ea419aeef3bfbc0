//! Core partitioner trait definitions.

use crate::token::Token;

/// A partitioner converts keys into tokens for placement on the hash ring.
///
/// The same partitioner hashes replica keys when nodes are registered and
/// lookup keys when they are resolved, so it must be a pure function of its
/// input. Implementations are shared by concurrent readers of the ring.
pub trait Partitioner: Send + Sync + 'static {
    /// Converts a key into a token.
    fn partition(&self, key: &[u8]) -> Token;

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}

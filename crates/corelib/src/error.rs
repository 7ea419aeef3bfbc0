//! Error types for the core library.

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
///
/// Registering a node twice and removing an unknown node are not errors:
/// the first reports `false` from [`HashRing::add_node`], the second is a
/// no-op.
///
/// [`HashRing::add_node`]: crate::ring::HashRing::add_node
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Lookup against a ring that has no hash positions.
    #[error("no nodes registered in the ring")]
    EmptyRing,
}

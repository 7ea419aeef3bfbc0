//! Hash positions on the ring.
//!
//! A token is a point on the 32-bit circle `[0, 2^32)`. Both replica keys and
//! lookup keys are hashed to tokens by a [`Partitioner`](crate::Partitioner).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of distinct positions on the ring.
pub const RING_SIZE: u64 = 1 << 32;

/// A hash position on the ring.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(pub u32);

impl Token {
    /// Minimum token value (start of ring).
    pub const MIN: Token = Token(u32::MIN);
    /// Maximum token value (end of ring).
    pub const MAX: Token = Token(u32::MAX);

    /// Clockwise distance from `self` to `other` on the ring.
    ///
    /// The result is in `[0, 2^32)`, so the distance from a token to itself
    /// is zero rather than a full turn.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> u64 {
        u64::from(other.0.wrapping_sub(self.0))
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_forward() {
        assert_eq!(Token(100).distance_to(&Token(200)), 100);
        assert_eq!(Token(7).distance_to(&Token(7)), 0);
    }

    #[test]
    fn test_distance_wraps() {
        assert_eq!(Token::MAX.distance_to(&Token::MIN), 1);
        assert_eq!(Token(200).distance_to(&Token(100)), RING_SIZE - 100);
    }

    #[test]
    fn test_display_is_padded_hex() {
        assert_eq!(Token(0xcbf43926).to_string(), "cbf43926");
        assert_eq!(Token(1).to_string(), "00000001");
    }
}

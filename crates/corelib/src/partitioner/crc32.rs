//! CRC-32 partitioner implementation.

use crate::partitioner::traits::Partitioner;
use crate::token::Token;

/// CRC-32 (IEEE 802.3 polynomial) partitioner.
///
/// Produces the same checksum as zlib's `crc32`, so ring positions are
/// reproducible across implementations that hash with that function.
#[derive(Clone, Copy, Debug, Default)]
pub struct Crc32Partitioner;

impl Partitioner for Crc32Partitioner {
    #[inline]
    fn partition(&self, key: &[u8]) -> Token {
        Token(crc32fast::hash(key))
    }

    fn name(&self) -> &'static str {
        "Crc32Partitioner"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_check_value() {
        assert_eq!(Crc32Partitioner.partition(b"123456789"), Token(0xcbf4_3926));
    }

    #[test]
    fn test_crc32_empty_key() {
        assert_eq!(Crc32Partitioner.partition(b""), Token(0));
    }
}

//! # abibind-primitives
//!
//! Fixed-size values that appear on the ABI wire: 20-byte addresses,
//! 32-byte words and the 256-bit unsigned integer.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::{Address, AddressError};
pub use error::PrimitiveError;
pub use hash::{HashError, H256};

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Size of one ABI word in bytes
pub const WORD_SIZE: usize = 32;

/// Block number type
pub type BlockNumber = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_word_roundtrip() {
        let value = U256::from(0x1234_5678u64);
        let word = H256::from_u256(value);
        assert_eq!(word.to_u256(), value);
        assert_eq!(word.as_bytes().len(), WORD_SIZE);
    }
}

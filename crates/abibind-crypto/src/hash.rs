//! Keccak-256 hashing and the identifiers derived from it

use abibind_primitives::H256;
use sha3::{Digest, Keccak256};

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    H256::from_bytes(result.into())
}

/// First 4 bytes of keccak256(signature).
///
/// Used for functions and custom errors, e.g. `transfer(address,uint256)`.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// Full keccak256(signature), the topic-0 of a non-anonymous event
pub fn event_topic(signature: &str) -> H256 {
    keccak256(signature.as_bytes())
}

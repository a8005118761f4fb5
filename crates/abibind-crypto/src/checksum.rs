//! EIP-55 mixed-case checksum encoding for addresses

use abibind_primitives::Address;

use crate::error::CryptoError;
use crate::hash::keccak256;

/// Render an address in its canonical EIP-55 checksummed form
pub fn to_checksum(address: &Address) -> String {
    let lower = hex::encode(address.as_bytes());
    let hash = keccak256(lower.as_bytes());
    let hash = hash.as_bytes();

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse address text, enforcing the checksum when the input is mixed-case.
///
/// All-lowercase and all-uppercase inputs carry no checksum and are accepted
/// as-is.
pub fn parse_checksummed(s: &str) -> Result<Address, CryptoError> {
    let address = Address::from_hex(s).map_err(|e| CryptoError::InvalidAddress(e.to_string()))?;
    let digits = s.strip_prefix("0x").unwrap_or(s);

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        let expected = to_checksum(&address);
        if expected[2..] != *digits {
            return Err(CryptoError::ChecksumMismatch { expected });
        }
    }
    Ok(address)
}

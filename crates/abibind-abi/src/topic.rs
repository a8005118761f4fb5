//! Indexed event parameters as log topics
//!
//! Value types are stored in a topic as their ABI word. Strings, bytes,
//! arrays and tuples are stored as a Keccak-256 hash, so only the hash is
//! recoverable from a log.

use abibind_primitives::H256;

use crate::decode::decode_output;
use crate::encode::encode;
use crate::error::{AbiError, Result};
use crate::token::Token;
use crate::types::ParamType;

/// Topic word holding an indexed value-type parameter
pub fn encode_topic(param_type: &ParamType, token: &Token) -> Result<H256> {
    if !param_type.is_value_type() {
        return Err(AbiError::Encode(format!(
            "indexed {} is stored as a hash; filter by the hash instead",
            param_type
        )));
    }
    let word = encode(std::slice::from_ref(param_type), std::slice::from_ref(token))?;
    H256::from_slice(&word).map_err(|e| AbiError::Encode(e.to_string()))
}

/// Decode an indexed value-type parameter from its topic
pub fn decode_topic(param_type: &ParamType, topic: &H256) -> Result<Token> {
    if !param_type.is_value_type() {
        return Err(AbiError::Decode(format!(
            "indexed {} is stored as a hash",
            param_type
        )));
    }
    decode_output(param_type, topic.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use abibind_primitives::{Address, U256};

    #[test]
    fn test_address_topic() {
        let addr = Address::from_bytes([0x11; 20]);
        let topic = encode_topic(&ParamType::Address, &Token::Address(addr)).unwrap();
        assert_eq!(topic, addr.to_word());
        assert_eq!(
            decode_topic(&ParamType::Address, &topic).unwrap(),
            Token::Address(addr)
        );
    }

    #[test]
    fn test_uint_topic() {
        let topic = encode_topic(&ParamType::Uint(256), &Token::Uint(U256::from(42))).unwrap();
        assert_eq!(topic.to_u256(), U256::from(42));
    }

    #[test]
    fn test_hashed_types_rejected() {
        assert!(encode_topic(&ParamType::String, &Token::String("x".into())).is_err());
        assert!(decode_topic(&ParamType::Bytes, &H256::ZERO).is_err());
    }
}

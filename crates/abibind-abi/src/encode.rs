//! ABI encoding

use abibind_primitives::U256;

use crate::error::{AbiError, Result};
use crate::token::Token;
use crate::types::{head_size, ParamType};

/// Encode tokens as the given parameter types (head/tail layout).
///
/// Every token is checked against its type: integer widths, fixed sizes and
/// arity must match or the call fails with [`AbiError::Encode`].
pub fn encode(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>> {
    if types.len() != tokens.len() {
        return Err(AbiError::Encode(format!(
            "expected {} values, got {}",
            types.len(),
            tokens.len()
        )));
    }
    encode_params(types, tokens)
}

/// Encode function call (selector + params)
pub fn encode_function_call(
    selector: [u8; 4],
    types: &[ParamType],
    tokens: &[Token],
) -> Result<Vec<u8>> {
    let mut result = selector.to_vec();
    result.extend(encode(types, tokens)?);
    Ok(result)
}

/// Encode parameters
fn encode_params(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>> {
    // Calculate head size (fixed part)
    let head_size = head_size(types)?;

    let mut head = Vec::new();
    let mut tail = Vec::new();

    for (param_type, token) in types.iter().zip(tokens.iter()) {
        if param_type.is_dynamic() {
            let offset = head_size + tail.len();
            head.extend(encode_u256(&U256::from(offset)));
            tail.extend(encode_token(param_type, token)?);
        } else {
            head.extend(encode_token(param_type, token)?);
        }
    }

    head.extend(tail);
    Ok(head)
}

/// Encode a single token
fn encode_token(param_type: &ParamType, token: &Token) -> Result<Vec<u8>> {
    match (param_type, token) {
        (ParamType::Address, Token::Address(addr)) => Ok(addr.to_word().as_bytes().to_vec()),
        (ParamType::Uint(bits), Token::Uint(value)) => {
            if value.bits() > *bits {
                return Err(AbiError::Encode(format!(
                    "value {} does not fit in uint{}",
                    value, bits
                )));
            }
            Ok(encode_u256(value))
        }
        (ParamType::Int(bits), Token::Int(value)) => {
            if !value.fits(*bits) {
                return Err(AbiError::Encode(format!(
                    "value {} does not fit in int{}",
                    value, bits
                )));
            }
            Ok(value.to_word().to_vec())
        }
        (ParamType::Bool, Token::Bool(b)) => {
            let mut buf = [0u8; 32];
            buf[31] = u8::from(*b);
            Ok(buf.to_vec())
        }
        (ParamType::FixedBytes(size), Token::FixedBytes(data)) => {
            if data.len() != *size {
                return Err(AbiError::Encode(format!(
                    "bytes{} needs exactly {} bytes, got {}",
                    size,
                    size,
                    data.len()
                )));
            }
            let mut buf = [0u8; 32];
            buf[..data.len()].copy_from_slice(data);
            Ok(buf.to_vec())
        }
        (ParamType::Bytes, Token::Bytes(data)) => Ok(encode_bytes(data)),
        (ParamType::String, Token::String(s)) => Ok(encode_bytes(s.as_bytes())),
        (ParamType::Array(inner), Token::Array(tokens)) => {
            let mut result = encode_u256(&U256::from(tokens.len()));
            let inner_types = vec![(**inner).clone(); tokens.len()];
            result.extend(encode_params(&inner_types, tokens)?);
            Ok(result)
        }
        (ParamType::FixedArray(inner, size), Token::FixedArray(tokens)) => {
            if tokens.len() != *size {
                return Err(AbiError::Encode(format!(
                    "{} needs {} elements, got {}",
                    param_type,
                    size,
                    tokens.len()
                )));
            }
            let inner_types = vec![(**inner).clone(); *size];
            encode_params(&inner_types, tokens)
        }
        (ParamType::Tuple(types), Token::Tuple(tokens)) => encode(types, tokens),
        (expected, token) => Err(AbiError::Encode(format!(
            "cannot encode {} as {}",
            token.kind(),
            expected
        ))),
    }
}

/// Encode a U256 as 32 bytes
fn encode_u256(value: &U256) -> Vec<u8> {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes.to_vec()
}

/// Encode dynamic bytes
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut result = encode_u256(&U256::from(data.len()));

    // Pad to 32 bytes
    let padded_len = data.len().div_ceil(32) * 32;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    result.extend(padded);

    result
}

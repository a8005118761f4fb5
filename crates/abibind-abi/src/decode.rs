//! ABI decoding
//!
//! Decoding is strict: every word must be a canonical encoding of its type.
//! Dirty address or `bytesN` padding, out-of-range integers, booleans other
//! than 0/1 and truncated data are all rejected.

use abibind_primitives::{Address, U256};

use crate::error::{AbiError, Result};
use crate::token::{Token, I256};
use crate::types::ParamType;

/// Decode tokens from ABI-encoded data
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>> {
    decode_params(types, data, 0)
}

/// Decode a single return value
pub fn decode_output(param_type: &ParamType, data: &[u8]) -> Result<Token> {
    let mut tokens = decode(std::slice::from_ref(param_type), data)?;
    tokens
        .pop()
        .ok_or_else(|| AbiError::Decode("no value decoded".to_string()))
}

/// Decode a sequence of values laid out head/tail starting at `base`.
///
/// Offsets stored in the head are relative to `base`.
fn decode_params(types: &[ParamType], data: &[u8], base: usize) -> Result<Vec<Token>> {
    let mut tokens = Vec::with_capacity(types.len());
    let mut head = base;

    for param_type in types {
        if param_type.is_dynamic() {
            let offset = read_usize(data, head)?;
            let at = base
                .checked_add(offset)
                .ok_or_else(|| AbiError::Decode("offset overflow".to_string()))?;
            tokens.push(decode_value(param_type, data, at)?);
            head += 32;
        } else {
            tokens.push(decode_value(param_type, data, head)?);
            head = head
                .checked_add(param_type.head_length()?)
                .ok_or_else(|| AbiError::Decode("head overflow".to_string()))?;
        }
    }

    Ok(tokens)
}

/// Decode one value whose encoding starts at `at`
fn decode_value(param_type: &ParamType, data: &[u8], at: usize) -> Result<Token> {
    match param_type {
        ParamType::Address => {
            let word = read_word(data, at)?;
            Address::from_word(&word)
                .map(Token::Address)
                .ok_or_else(|| AbiError::Decode("address has non-zero padding".to_string()))
        }
        ParamType::Uint(bits) => {
            let value = U256::from_big_endian(&read_word(data, at)?);
            if value.bits() > *bits {
                return Err(AbiError::Decode(format!("value out of range for uint{}", bits)));
            }
            Ok(Token::Uint(value))
        }
        ParamType::Int(bits) => {
            let value = I256::from_word(&read_word(data, at)?);
            if !value.fits(*bits) {
                return Err(AbiError::Decode(format!("value out of range for int{}", bits)));
            }
            Ok(Token::Int(value))
        }
        ParamType::Bool => {
            let word = read_word(data, at)?;
            if word[..31].iter().any(|b| *b != 0) || word[31] > 1 {
                return Err(AbiError::Decode("invalid bool encoding".to_string()));
            }
            Ok(Token::Bool(word[31] == 1))
        }
        ParamType::FixedBytes(size) => {
            let word = read_word(data, at)?;
            if word[*size..].iter().any(|b| *b != 0) {
                return Err(AbiError::Decode(format!("bytes{} has non-zero padding", size)));
            }
            Ok(Token::FixedBytes(word[..*size].to_vec()))
        }
        ParamType::Bytes => Ok(Token::Bytes(read_bytes(data, at)?)),
        ParamType::String => {
            let bytes = read_bytes(data, at)?;
            String::from_utf8(bytes)
                .map(Token::String)
                .map_err(|e| AbiError::Decode(format!("invalid UTF-8: {}", e)))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, at)?;
            let start = at + 32;
            // Every element takes at least one head word
            let needed = len
                .checked_mul(32)
                .and_then(|n| n.checked_add(start))
                .ok_or_else(|| AbiError::Decode("array length overflow".to_string()))?;
            check_length(data, needed)?;
            let inner_types = vec![(**inner).clone(); len];
            decode_params(&inner_types, data, start).map(Token::Array)
        }
        ParamType::FixedArray(inner, size) => {
            check_length(data, size.saturating_mul(32).saturating_add(at))?;
            let inner_types = vec![(**inner).clone(); *size];
            decode_params(&inner_types, data, at).map(Token::FixedArray)
        }
        ParamType::Tuple(types) => decode_params(types, data, at).map(Token::Tuple),
    }
}

/// Read the 32-byte word at `at`
fn read_word(data: &[u8], at: usize) -> Result<[u8; 32]> {
    let end = at
        .checked_add(32)
        .ok_or_else(|| AbiError::Decode("offset overflow".to_string()))?;
    check_length(data, end)?;
    let mut word = [0u8; 32];
    word.copy_from_slice(&data[at..end]);
    Ok(word)
}

/// Read a length or offset word; values beyond the data length are invalid
fn read_usize(data: &[u8], at: usize) -> Result<usize> {
    let value = U256::from_big_endian(&read_word(data, at)?);
    if value > U256::from(data.len()) {
        return Err(AbiError::Decode(format!(
            "offset or length {} exceeds data size {}",
            value,
            data.len()
        )));
    }
    Ok(value.as_usize())
}

/// Decode length-prefixed bytes at `at`
fn read_bytes(data: &[u8], at: usize) -> Result<Vec<u8>> {
    let len = read_usize(data, at)?;
    let start = at + 32;
    let end = start
        .checked_add(len)
        .ok_or_else(|| AbiError::Decode("length overflow".to_string()))?;
    check_length(data, end)?;
    Ok(data[start..end].to_vec())
}

/// Check that data has at least `required` bytes
fn check_length(data: &[u8], required: usize) -> Result<()> {
    if data.len() < required {
        return Err(AbiError::Decode(format!(
            "insufficient data: need {} bytes, have {}",
            required,
            data.len()
        )));
    }
    Ok(())
}

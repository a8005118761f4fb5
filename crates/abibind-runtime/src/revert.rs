//! Revert payload decoding

use abibind_abi::{decode, ParamType, Token};
use abibind_primitives::U256;
use bytes::Bytes;

use crate::error::BindError;

/// Selector of `Error(string)`
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Selector of `Panic(uint256)`
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Human-readable reason for standard revert payloads.
///
/// `Error(string)` yields its message and `Panic(uint256)` yields
/// `panic: 0x<code>`. Custom errors and empty data yield `None`.
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let (selector, body) = data.split_at(4);

    if selector == ERROR_SELECTOR {
        match decode(&[ParamType::String], body).ok()?.pop()? {
            Token::String(reason) => Some(reason),
            _ => None,
        }
    } else if selector == PANIC_SELECTOR {
        match decode(&[ParamType::Uint(256)], body).ok()?.pop()? {
            Token::Uint(code) => Some(panic_reason(code)),
            _ => None,
        }
    } else {
        None
    }
}

fn panic_reason(code: U256) -> String {
    let description = match code.low_u64() {
        _ if code > U256::from(u8::MAX) => None,
        0x00 => Some("generic compiler panic"),
        0x01 => Some("assertion failed"),
        0x11 => Some("arithmetic overflow or underflow"),
        0x12 => Some("division or modulo by zero"),
        0x21 => Some("invalid enum value"),
        0x22 => Some("corrupted storage byte array"),
        0x31 => Some("pop on empty array"),
        0x32 => Some("array index out of bounds"),
        0x41 => Some("out of memory"),
        0x51 => Some("call to zero-initialized function"),
        _ => None,
    };
    match description {
        Some(text) => format!("panic: 0x{:x} ({})", code, text),
        None => format!("panic: 0x{:x}", code),
    }
}

/// Build the revert error for raw revert data
pub fn revert_error(data: Bytes) -> BindError {
    BindError::CallReverted {
        reason: decode_revert_reason(&data),
        data,
    }
}

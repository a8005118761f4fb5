//! ABI values: tokens, signed 256-bit integers and fixed byte strings

use std::fmt;
use std::ops::Deref;

use abibind_primitives::{Address, H256, U256};

use crate::error::{AbiError, Result};

/// Solidity ABI token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address (20 bytes)
    Address(Address),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Signed integer (8-256 bits)
    Int(I256),
    /// Boolean
    Bool(bool),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// Fixed-size bytes (1-32)
    FixedBytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Dynamic array
    Array(Vec<Token>),
    /// Fixed-size array
    FixedArray(Vec<Token>),
    /// Tuple (struct)
    Tuple(Vec<Token>),
}

impl Token {
    /// Short name of the token kind, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Token::Address(_) => "address",
            Token::Uint(_) => "uint",
            Token::Int(_) => "int",
            Token::Bool(_) => "bool",
            Token::Bytes(_) => "bytes",
            Token::FixedBytes(_) => "fixed bytes",
            Token::String(_) => "string",
            Token::Array(_) => "array",
            Token::FixedArray(_) => "fixed array",
            Token::Tuple(_) => "tuple",
        }
    }
}

/// Signed 256-bit integer in sign-magnitude form.
///
/// Zero is never negative; constructors normalize it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct I256 {
    /// Absolute value
    pub abs: U256,
    /// Sign (true if negative)
    pub negative: bool,
}

impl I256 {
    /// Create a new I256
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            abs,
            negative: negative && !abs.is_zero(),
        }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        Self::new(U256::from(value.unsigned_abs()), value < 0)
    }

    /// Convert to i128 if the value fits
    pub fn to_i128(&self) -> Option<i128> {
        if !self.fits(128) {
            return None;
        }
        let abs = self.abs.as_u128();
        Some(if self.negative {
            (abs as i128).wrapping_neg()
        } else {
            abs as i128
        })
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    /// Whether the value is representable as a `bits`-wide two's complement integer
    pub fn fits(&self, bits: usize) -> bool {
        if bits == 0 || bits > 256 {
            return false;
        }
        let limit = U256::one() << (bits - 1);
        if self.negative {
            self.abs <= limit
        } else {
            self.abs < limit
        }
    }

    /// 256-bit two's complement encoding
    pub fn to_word(&self) -> [u8; 32] {
        let raw = if self.negative {
            (!self.abs).overflowing_add(U256::one()).0
        } else {
            self.abs
        };
        let mut bytes = [0u8; 32];
        raw.to_big_endian(&mut bytes);
        bytes
    }

    /// Interpret a word as a 256-bit two's complement integer
    pub fn from_word(word: &[u8; 32]) -> Self {
        let raw = U256::from_big_endian(word);
        if word[0] & 0x80 != 0 {
            let abs = (!raw).overflowing_add(U256::one()).0;
            Self { abs, negative: true }
        } else {
            Self {
                abs: raw,
                negative: false,
            }
        }
    }
}

impl From<i128> for I256 {
    fn from(value: i128) -> Self {
        Self::from_i128(value)
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

/// Fixed-size byte string (`bytesN`)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedBytes<const N: usize>(pub [u8; N]);

impl<const N: usize> FixedBytes<N> {
    /// All-zero value
    pub const ZERO: Self = FixedBytes([0u8; N]);

    /// Create from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != N {
            return Err(AbiError::Decode(format!(
                "expected {} bytes, got {}",
                N,
                slice.len()
            )));
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(slice);
        Ok(FixedBytes(bytes))
    }

    /// Get as byte array
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl<const N: usize> Default for FixedBytes<N> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const N: usize> Deref for FixedBytes<N> {
    type Target = [u8; N];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const N: usize> AsRef<[u8]> for FixedBytes<N> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> From<[u8; N]> for FixedBytes<N> {
    fn from(bytes: [u8; N]) -> Self {
        FixedBytes(bytes)
    }
}

impl From<H256> for FixedBytes<32> {
    fn from(hash: H256) -> Self {
        FixedBytes(*hash.as_bytes())
    }
}

impl From<FixedBytes<32>> for H256 {
    fn from(bytes: FixedBytes<32>) -> Self {
        H256::from_bytes(bytes.0)
    }
}

impl<const N: usize> fmt::Debug for FixedBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedBytes<{}>({})", N, self.to_hex())
    }
}

impl<const N: usize> fmt::Display for FixedBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

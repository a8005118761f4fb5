//! Conversions between Rust values and ABI tokens
//!
//! Generated bindings move every argument and return value through
//! [`AbiValue`]. Each ABI type has exactly one Rust representation:
//!
//! | ABI | Rust |
//! |---|---|
//! | `uint8`..`uint256` | `u8`, `u16`, `u32`, `u64`, `u128`, `U256` |
//! | `int8`..`int256` | `i8`, `i16`, `i32`, `i64`, `i128`, `I256` |
//! | `address` | `Address` |
//! | `bool` | `bool` |
//! | `bytesN` | `FixedBytes<N>` |
//! | `bytes` | `Bytes` |
//! | `string` | `String` |
//! | `T[]` | `Vec<T>` |
//! | `T[K]` | `[T; K]` |
//! | tuples | Rust tuples up to 12 members |

use abibind_primitives::{Address, U256};
use bytes::Bytes;

use crate::error::{AbiError, Result};
use crate::token::{FixedBytes, Token, I256};

/// A Rust value with an ABI token representation
pub trait AbiValue: Sized {
    /// Convert into a token
    fn into_token(self) -> Token;

    /// Convert from a decoded token
    fn from_token(token: Token) -> Result<Self>;
}

fn mismatch(expected: &str, token: &Token) -> AbiError {
    AbiError::Decode(format!("expected {}, got {}", expected, token.kind()))
}

/// Convert a token list into a value, treating the list as a tuple
pub fn from_tokens<T: AbiValue>(tokens: Vec<Token>) -> Result<T> {
    T::from_token(Token::Tuple(tokens))
}

impl AbiValue for Token {
    fn into_token(self) -> Token {
        self
    }

    fn from_token(token: Token) -> Result<Self> {
        Ok(token)
    }
}

impl AbiValue for Address {
    fn into_token(self) -> Token {
        Token::Address(self)
    }

    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::Address(addr) => Ok(addr),
            other => Err(mismatch("address", &other)),
        }
    }
}

impl AbiValue for bool {
    fn into_token(self) -> Token {
        Token::Bool(self)
    }

    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl AbiValue for U256 {
    fn into_token(self) -> Token {
        Token::Uint(self)
    }

    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::Uint(value) => Ok(value),
            other => Err(mismatch("uint", &other)),
        }
    }
}

impl AbiValue for I256 {
    fn into_token(self) -> Token {
        Token::Int(self)
    }

    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::Int(value) => Ok(value),
            other => Err(mismatch("int", &other)),
        }
    }
}

macro_rules! impl_unsigned {
    ($($t:ty),+) => {$(
        impl AbiValue for $t {
            fn into_token(self) -> Token {
                Token::Uint(U256::from(self))
            }

            fn from_token(token: Token) -> Result<Self> {
                match token {
                    Token::Uint(value) if value.bits() <= <$t>::BITS as usize => {
                        Ok(value.low_u128() as $t)
                    }
                    Token::Uint(value) => Err(AbiError::Decode(format!(
                        "{} does not fit in {}",
                        value,
                        stringify!($t)
                    ))),
                    other => Err(mismatch("uint", &other)),
                }
            }
        }
    )+};
}

macro_rules! impl_signed {
    ($($t:ty),+) => {$(
        impl AbiValue for $t {
            fn into_token(self) -> Token {
                Token::Int(I256::from_i128(i128::from(self)))
            }

            fn from_token(token: Token) -> Result<Self> {
                match token {
                    Token::Int(value) => value
                        .to_i128()
                        .and_then(|v| <$t>::try_from(v).ok())
                        .ok_or_else(|| AbiError::Decode(format!(
                            "{} does not fit in {}",
                            value,
                            stringify!($t)
                        ))),
                    other => Err(mismatch("int", &other)),
                }
            }
        }
    )+};
}

impl_unsigned!(u8, u16, u32, u64, u128);
impl_signed!(i8, i16, i32, i64, i128);

impl AbiValue for String {
    fn into_token(self) -> Token {
        Token::String(self)
    }

    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl AbiValue for Bytes {
    fn into_token(self) -> Token {
        Token::Bytes(self.to_vec())
    }

    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::Bytes(data) => Ok(Bytes::from(data)),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

impl<const N: usize> AbiValue for FixedBytes<N> {
    fn into_token(self) -> Token {
        Token::FixedBytes(self.0.to_vec())
    }

    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::FixedBytes(data) => FixedBytes::from_slice(&data),
            other => Err(mismatch("fixed bytes", &other)),
        }
    }
}

impl<T: AbiValue> AbiValue for Vec<T> {
    fn into_token(self) -> Token {
        Token::Array(self.into_iter().map(AbiValue::into_token).collect())
    }

    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::Array(items) => items.into_iter().map(T::from_token).collect(),
            other => Err(mismatch("array", &other)),
        }
    }
}

impl<T: AbiValue, const N: usize> AbiValue for [T; N] {
    fn into_token(self) -> Token {
        Token::FixedArray(self.into_iter().map(AbiValue::into_token).collect())
    }

    fn from_token(token: Token) -> Result<Self> {
        match token {
            Token::FixedArray(items) => {
                let values = items
                    .into_iter()
                    .map(T::from_token)
                    .collect::<Result<Vec<T>>>()?;
                let len = values.len();
                values.try_into().map_err(|_| {
                    AbiError::Decode(format!("expected {} elements, got {}", N, len))
                })
            }
            other => Err(mismatch("fixed array", &other)),
        }
    }
}

macro_rules! impl_tuple {
    ($len:expr => $($name:ident),+) => {
        impl<$($name: AbiValue),+> AbiValue for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_token(self) -> Token {
                let ($($name,)+) = self;
                Token::Tuple(vec![$($name.into_token()),+])
            }

            fn from_token(token: Token) -> Result<Self> {
                match token {
                    Token::Tuple(items) if items.len() == $len => {
                        let mut items = items.into_iter();
                        Ok(($(
                            $name::from_token(items.next().ok_or_else(|| {
                                AbiError::Decode("tuple too short".to_string())
                            })?)?,
                        )+))
                    }
                    Token::Tuple(items) => Err(AbiError::Decode(format!(
                        "expected tuple of {}, got {}",
                        $len,
                        items.len()
                    ))),
                    other => Err(mismatch("tuple", &other)),
                }
            }
        }
    };
}

impl_tuple!(1 => A);
impl_tuple!(2 => A, B);
impl_tuple!(3 => A, B, C);
impl_tuple!(4 => A, B, C, D);
impl_tuple!(5 => A, B, C, D, E);
impl_tuple!(6 => A, B, C, D, E, F);
impl_tuple!(7 => A, B, C, D, E, F, G);
impl_tuple!(8 => A, B, C, D, E, F, G, H);
impl_tuple!(9 => A, B, C, D, E, F, G, H, I);
impl_tuple!(10 => A, B, C, D, E, F, G, H, I, J);
impl_tuple!(11 => A, B, C, D, E, F, G, H, I, J, K);
impl_tuple!(12 => A, B, C, D, E, F, G, H, I, J, K, L);

//! # abibind-abi
//!
//! Solidity ABI support for the abibind generator and runtime:
//!
//! - Parameter type grammar with canonical spelling ([`ParamType`])
//! - Head/tail wire encoding and strict decoding ([`encode`], [`decode`])
//! - JSON ABI documents and compiler artifacts ([`AbiDocument`])
//! - Canonical signatures and overload disambiguation
//! - Rust value conversions used by generated bindings ([`AbiValue`])
//!
//! # Example
//!
//! ```rust
//! use abibind_abi::{decode, encode_function_call, ParamType, Token};
//! use abibind_crypto::function_selector;
//! use abibind_primitives::{Address, U256};
//!
//! // Encode a transfer call
//! let selector = function_selector("transfer(address,uint256)");
//! let data = encode_function_call(
//!     selector,
//!     &[ParamType::Address, ParamType::Uint(256)],
//!     &[Token::Address(Address::ZERO), Token::Uint(U256::from(1000))],
//! )
//! .unwrap();
//! assert_eq!(data.len(), 68);
//!
//! // Decode a balance response
//! let return_data = [0u8; 32];
//! let balance = decode(&[ParamType::Uint(256)], &return_data).unwrap();
//! assert_eq!(balance, vec![Token::Uint(U256::zero())]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod decode;
mod encode;
mod error;
mod json;
mod signature;
mod token;
mod topic;
mod types;
mod value;

pub use decode::{decode, decode_output};
pub use encode::{encode, encode_function_call};
pub use error::{AbiError, Result};
pub use json::{
    param_types, parse_abi, AbiDocument, AbiEntry, AbiParam, CustomError, Event, Function,
    StateMutability,
};
pub use signature::{canonical_signature, check_duplicates, disambiguate, OverloadName};
pub use token::{FixedBytes, Token, I256};
pub use topic::{decode_topic, encode_topic};
pub use types::ParamType;
pub use value::{from_tokens, AbiValue};

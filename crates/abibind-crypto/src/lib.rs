//! # abibind-crypto
//!
//! Hashing used by contract bindings.
//!
//! - Keccak-256
//! - 4-byte function/error selectors
//! - 32-byte event topics
//! - EIP-55 checksummed address text

#![warn(missing_docs)]
#![warn(clippy::all)]

mod checksum;
mod error;
mod hash;

pub use checksum::{parse_checksummed, to_checksum};
pub use error::CryptoError;
pub use hash::{event_topic, function_selector, keccak256};

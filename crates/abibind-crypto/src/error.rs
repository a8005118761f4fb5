//! Crypto errors

use thiserror::Error;

/// Checksum validation error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Address text could not be parsed at all
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Mixed-case address whose casing does not match its EIP-55 checksum
    #[error("checksum mismatch: expected {expected}")]
    ChecksumMismatch {
        /// Correctly checksummed form
        expected: String,
    },
}

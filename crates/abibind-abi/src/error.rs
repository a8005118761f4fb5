//! ABI error types

use thiserror::Error;

/// Errors raised while parsing ABI definitions or moving values across the
/// ABI wire format
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AbiError {
    /// The ABI document is not valid JSON or is missing required fields
    #[error("malformed ABI: {0}")]
    MalformedAbi(String),

    /// A parameter type string outside the supported grammar
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// Two entries of one category share a canonical signature
    #[error("duplicate {kind} signature: {signature}")]
    DuplicateSignature {
        /// Entry category ("function", "event", "error")
        kind: &'static str,
        /// The repeated canonical signature
        signature: String,
    },

    /// A value could not be encoded as the requested type
    #[error("ABI encode error: {0}")]
    Encode(String),

    /// Wire data does not decode as the requested types
    #[error("ABI decode error: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for AbiError {
    fn from(err: serde_json::Error) -> Self {
        AbiError::MalformedAbi(err.to_string())
    }
}

/// Result alias for ABI operations
pub type Result<T> = std::result::Result<T, AbiError>;

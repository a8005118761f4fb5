//! Runtime error types

use abibind_abi::AbiError;
use bytes::Bytes;
use thiserror::Error;

/// Errors surfaced by generated bindings
#[derive(Debug, Clone, Error)]
pub enum BindError {
    /// The contract reverted; `reason` is set for `Error(string)` and
    /// `Panic(uint256)` payloads
    #[error("call reverted: {}", .reason.as_deref().unwrap_or("no reason given"))]
    CallReverted {
        /// Decoded revert reason
        reason: Option<String>,
        /// Raw revert data, possibly a custom error
        data: Bytes,
    },

    /// Transport/network error
    #[error("Transport error: {0}")]
    Transport(String),

    /// RPC error from node
    #[error("RPC error: {code} - {message}")]
    Rpc {
        /// Error code
        code: i64,
        /// Error message
        message: String,
        /// Error payload (revert data for code 3)
        data: Option<Bytes>,
    },

    /// Return data or a log does not decode as declared
    #[error("Decode error: {0}")]
    Decode(String),

    /// Live log subscription broke
    #[error("Subscription failed: {0}")]
    SubscriptionFailed(String),

    /// Call or transaction options are inconsistent
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// ABI error other than a decode failure
    #[error("ABI error: {0}")]
    Abi(AbiError),
}

impl BindError {
    /// Raw revert data, if this is a revert
    pub fn revert_data(&self) -> Option<&[u8]> {
        match self {
            BindError::CallReverted { data, .. } => Some(data),
            _ => None,
        }
    }
}

impl From<AbiError> for BindError {
    fn from(e: AbiError) -> Self {
        match e {
            AbiError::Decode(msg) => BindError::Decode(msg),
            other => BindError::Abi(other),
        }
    }
}

impl From<hex::FromHexError> for BindError {
    fn from(e: hex::FromHexError) -> Self {
        BindError::Decode(format!("invalid hex: {}", e))
    }
}

impl From<serde_json::Error> for BindError {
    fn from(e: serde_json::Error) -> Self {
        BindError::Transport(format!("serialization: {}", e))
    }
}

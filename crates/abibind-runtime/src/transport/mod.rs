//! Transport layer: the node operations bindings depend on

use async_trait::async_trait;
use abibind_primitives::H256;
use bytes::Bytes;

use crate::error::BindError;
use crate::log::{LiveLogs, Log, LogFilter};
use crate::types::{BlockId, CallRequest};

mod mock;
pub use mock::MockTransport;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::HttpTransport;

/// Node access used by generated bindings (object-safe)
///
/// Reverts are reported as [`BindError::Rpc`] carrying the revert data;
/// bindings turn them into [`BindError::CallReverted`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a read-only call and return the raw return data
    async fn call(&self, request: CallRequest, block: BlockId) -> Result<Bytes, BindError>;

    /// Submit a transaction from an account the node manages
    async fn send_transaction(&self, request: CallRequest) -> Result<H256, BindError>;

    /// Fetch historical logs matching the filter
    async fn query_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, BindError>;

    /// Open a live stream of logs matching the filter
    async fn subscribe_logs(&self, filter: &LogFilter) -> Result<LiveLogs, BindError>;
}

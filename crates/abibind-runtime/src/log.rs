//! Logs, log filters and live log streams

use std::fmt;

use abibind_primitives::{Address, BlockNumber, H256};
use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::BindError;
use crate::types::BlockId;

/// Log entry emitted during transaction execution
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Log {
    /// Contract address that emitted the log
    pub address: Address,
    /// Log topics (signature hash, then indexed parameters)
    pub topics: Vec<H256>,
    /// Log data (non-indexed parameters)
    pub data: Bytes,
    /// Block the log was included in; `None` while pending
    pub block_number: Option<BlockNumber>,
    /// Hash of that block
    pub block_hash: Option<H256>,
    /// Emitting transaction
    pub transaction_hash: Option<H256>,
    /// Position of the log in the block
    pub log_index: Option<u64>,
    /// Set when a chain reorganisation dropped the log
    pub removed: bool,
}

impl Log {
    /// Create a new log entry
    pub fn new(address: Address, topics: Vec<H256>, data: Bytes) -> Self {
        Self {
            address,
            topics,
            data,
            ..Default::default()
        }
    }

    /// Builder-style block number setter
    pub fn at_block(mut self, block_number: BlockNumber) -> Self {
        self.block_number = Some(block_number);
        self
    }

    /// Builder-style log index setter
    pub fn with_index(mut self, log_index: u64) -> Self {
        self.log_index = Some(log_index);
        self
    }

    /// Get the first topic (usually the event signature)
    pub fn topic0(&self) -> Option<&H256> {
        self.topics.first()
    }
}

/// Log query: emitting address, topic rules and block range.
///
/// `topics[i]` lists the accepted values at position `i`; a log matches when
/// every position accepts its topic. An empty list accepts anything, as does
/// a position past the end of `topics`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Only logs emitted by this contract
    pub address: Option<Address>,
    /// Accepted values per topic position
    pub topics: Vec<Vec<H256>>,
    /// First block (inclusive)
    pub from_block: Option<BlockId>,
    /// Last block (inclusive)
    pub to_block: Option<BlockId>,
}

impl LogFilter {
    /// Filter on the logs of one contract
    pub fn new(address: Address) -> Self {
        Self {
            address: Some(address),
            ..Default::default()
        }
    }

    /// Builder-style topic rules setter
    pub fn with_topics(mut self, topics: Vec<Vec<H256>>) -> Self {
        self.topics = topics;
        self
    }

    /// Builder-style block range setter
    pub fn with_range(mut self, from_block: Option<BlockId>, to_block: Option<BlockId>) -> Self {
        self.from_block = from_block;
        self.to_block = to_block;
        self
    }

    /// Check a log against the filter.
    ///
    /// Block bounds other than [`BlockId::Number`] depend on chain state and
    /// are not evaluated here.
    pub fn matches(&self, log: &Log) -> bool {
        if let Some(address) = &self.address {
            if &log.address != address {
                return false;
            }
        }

        if let (Some(BlockId::Number(from)), Some(block)) = (self.from_block, log.block_number) {
            if block < from {
                return false;
            }
        }
        if let (Some(BlockId::Number(to)), Some(block)) = (self.to_block, log.block_number) {
            if block > to {
                return false;
            }
        }

        self.topics.iter().enumerate().all(|(i, accepted)| {
            accepted.is_empty()
                || log
                    .topics
                    .get(i)
                    .map(|topic| accepted.contains(topic))
                    .unwrap_or(false)
        })
    }
}

impl Serialize for LogFilter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        if let Some(address) = &self.address {
            map.serialize_entry("address", address)?;
        }

        // Trailing wildcards carry no information
        let used = self
            .topics
            .iter()
            .rposition(|rule| !rule.is_empty())
            .map(|i| i + 1)
            .unwrap_or(0);
        if used > 0 {
            let topics: Vec<Option<&Vec<H256>>> = self.topics[..used]
                .iter()
                .map(|rule| if rule.is_empty() { None } else { Some(rule) })
                .collect();
            map.serialize_entry("topics", &topics)?;
        }

        if let Some(from) = &self.from_block {
            map.serialize_entry("fromBlock", from)?;
        }
        if let Some(to) = &self.to_block {
            map.serialize_entry("toBlock", to)?;
        }
        map.end()
    }
}

/// Sending half of a live log stream
pub type LogSender = mpsc::UnboundedSender<Result<Log, BindError>>;

/// Live stream of logs from a transport subscription.
///
/// The stream ends when the transport drops its sender. Dropping the stream
/// runs the transport's release hook (unsubscribe, uninstall filter).
pub struct LiveLogs {
    receiver: mpsc::UnboundedReceiver<Result<Log, BindError>>,
    on_close: Option<Box<dyn FnOnce() + Send>>,
}

impl LiveLogs {
    /// Create a stream and its sender; `on_close` runs once when the stream is dropped
    pub fn channel(on_close: impl FnOnce() + Send + 'static) -> (LogSender, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let logs = Self {
            receiver,
            on_close: Some(Box::new(on_close)),
        };
        (sender, logs)
    }

    /// Next log, error, or `None` once the transport has finished
    pub async fn recv(&mut self) -> Option<Result<Log, BindError>> {
        self.receiver.recv().await
    }
}

impl Drop for LiveLogs {
    fn drop(&mut self) {
        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
    }
}

impl fmt::Debug for LiveLogs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveLogs").finish_non_exhaustive()
    }
}

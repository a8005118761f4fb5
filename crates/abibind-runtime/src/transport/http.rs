//! HTTP JSON-RPC transport

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use abibind_primitives::{Address, H256};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinHandle;

use super::Transport;
use crate::error::BindError;
use crate::log::{LiveLogs, Log, LogFilter, LogSender};
use crate::types::{BlockId, CallRequest};

/// Default interval between `eth_getFilterChanges` polls
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(4);

struct HttpInner {
    client: reqwest::Client,
    url: String,
    request_id: AtomicU64,
}

/// HTTP transport for real RPC communication
///
/// Live subscriptions are served by polling: `eth_newFilter`, then
/// `eth_getFilterChanges` every poll interval, then `eth_uninstallFilter`
/// once the stream is dropped. A requested start block is replayed with
/// `eth_getLogs` up to the head seen after the filter was installed.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<HttpInner>,
    poll_interval: Duration,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(url: &str) -> Self {
        Self {
            inner: Arc::new(HttpInner {
                client: reqwest::Client::new(),
                url: url.to_string(),
                request_id: AtomicU64::new(1),
            }),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Builder-style poll interval setter
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.inner.url
    }
}

impl HttpInner {
    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Send an RPC request and get JSON response
    async fn request_json(&self, method: &str, params: Vec<Value>) -> Result<Value, BindError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id(),
            "method": method,
            "params": params,
        });
        tracing::debug!(method, "JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BindError::Transport(e.to_string()))?;

        let response: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| BindError::Transport(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(BindError::Rpc {
                code: error.code,
                message: error.message,
                data: error.data.as_ref().and_then(error_data),
            });
        }

        response.result.ok_or_else(|| BindError::Rpc {
            code: -32603,
            message: "No result in response".to_string(),
            data: None,
        })
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, BindError> {
        let value = self.request_json(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, BindError> {
        let logs: Vec<RpcLog> = self
            .request("eth_getLogs", vec![serde_json::to_value(filter)?])
            .await?;
        logs.into_iter().map(RpcLog::into_log).collect()
    }

    async fn block_number(&self) -> Result<u64, BindError> {
        let head: String = self.request("eth_blockNumber", Vec::new()).await?;
        parse_hex_u64(&head)
    }

    async fn uninstall_filter(&self, id: &str) {
        let result: Result<bool, BindError> = self
            .request("eth_uninstallFilter", vec![Value::String(id.to_string())])
            .await;
        if let Err(e) = result {
            tracing::warn!(filter = id, "Failed to uninstall log filter: {}", e);
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, request: CallRequest, block: BlockId) -> Result<Bytes, BindError> {
        let result: String = self
            .inner
            .request(
                "eth_call",
                vec![serde_json::to_value(&request)?, serde_json::to_value(block)?],
            )
            .await?;
        parse_hex_bytes(&result)
    }

    async fn send_transaction(&self, request: CallRequest) -> Result<H256, BindError> {
        self.inner
            .request("eth_sendTransaction", vec![serde_json::to_value(&request)?])
            .await
    }

    async fn query_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, BindError> {
        self.inner.get_logs(filter).await
    }

    async fn subscribe_logs(&self, filter: &LogFilter) -> Result<LiveLogs, BindError> {
        // Install first so nothing mined during the backlog query is missed
        let mut live_filter = filter.clone();
        live_filter.from_block = None;
        let id: String = self
            .inner
            .request("eth_newFilter", vec![serde_json::to_value(&live_filter)?])
            .await?;
        tracing::debug!(filter = %id, "Installed log filter");

        let (backlog, delivered) = match filter.from_block {
            Some(_) => {
                let replay = async {
                    let head = self.inner.block_number().await?;
                    let logs = self.inner.get_logs(&backlog_filter(filter, head)).await?;
                    Ok::<_, BindError>((logs, head))
                };
                match replay.await {
                    Ok((logs, head)) => {
                        let delivered = Delivered::new(head, &logs);
                        (logs, delivered)
                    }
                    Err(e) => {
                        self.inner.uninstall_filter(&id).await;
                        return Err(e);
                    }
                }
            }
            None => (Vec::new(), Delivered::default()),
        };

        let poller: Arc<Mutex<Option<JoinHandle<()>>>> = Arc::default();
        let release = {
            let inner = Arc::clone(&self.inner);
            let id = id.clone();
            let poller = Arc::clone(&poller);
            move || {
                if let Some(task) = poller.lock().take() {
                    task.abort();
                }
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    handle.spawn(async move { inner.uninstall_filter(&id).await });
                }
            }
        };

        let (sender, live) = LiveLogs::channel(release);
        for log in backlog {
            let _ = sender.send(Ok(log));
        }
        let task = tokio::spawn(poll_filter(
            Arc::clone(&self.inner),
            id,
            sender,
            delivered,
            self.poll_interval,
        ));
        *poller.lock() = Some(task);
        Ok(live)
    }
}

/// Backlog query: the requested range, capped at `head`
fn backlog_filter(filter: &LogFilter, head: u64) -> LogFilter {
    let mut backlog = filter.clone();
    backlog.to_block = match filter.to_block {
        Some(BlockId::Number(to)) => Some(BlockId::Number(to.min(head))),
        _ => Some(BlockId::Number(head)),
    };
    backlog
}

/// Positions of replayed logs, so the poller skips their second delivery
#[derive(Debug, Default)]
struct Delivered {
    head: Option<u64>,
    seen: HashSet<(u64, u64)>,
}

impl Delivered {
    fn new(head: u64, backlog: &[Log]) -> Self {
        Self {
            head: Some(head),
            seen: backlog.iter().filter_map(log_position).collect(),
        }
    }

    /// Whether `log` was already sent with the backlog
    fn contains(&self, log: &Log) -> bool {
        match (self.head, log_position(log)) {
            (Some(head), Some(position)) => position.0 <= head && self.seen.contains(&position),
            _ => false,
        }
    }
}

fn log_position(log: &Log) -> Option<(u64, u64)> {
    Some((log.block_number?, log.log_index?))
}

/// Poll filter changes until the stream is dropped or the node fails
async fn poll_filter(
    inner: Arc<HttpInner>,
    id: String,
    sender: LogSender,
    delivered: Delivered,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        if sender.is_closed() {
            return;
        }

        let changes: Result<Vec<RpcLog>, BindError> = inner
            .request("eth_getFilterChanges", vec![Value::String(id.clone())])
            .await;
        let logs = match changes.and_then(|logs| {
            logs.into_iter()
                .map(RpcLog::into_log)
                .collect::<Result<Vec<_>, _>>()
        }) {
            Ok(logs) => logs,
            Err(e) => {
                tracing::warn!(filter = %id, "Log filter polling failed: {}", e);
                let _ = sender.send(Err(BindError::SubscriptionFailed(e.to_string())));
                return;
            }
        };

        for log in logs.into_iter().filter(|log| !delivered.contains(log)) {
            if sender.send(Ok(log)).is_err() {
                return;
            }
        }
    }
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    data: Option<Value>,
}

/// Revert data arrives as a hex string, sometimes nested under `data`
fn error_data(value: &Value) -> Option<Bytes> {
    match value {
        Value::String(s) => parse_hex_bytes(s).ok(),
        Value::Object(map) => map.get("data").and_then(error_data),
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: Address,
    topics: Vec<H256>,
    data: String,
    block_number: Option<String>,
    block_hash: Option<H256>,
    transaction_hash: Option<H256>,
    log_index: Option<String>,
    #[serde(default)]
    removed: bool,
}

impl RpcLog {
    fn into_log(self) -> Result<Log, BindError> {
        Ok(Log {
            address: self.address,
            topics: self.topics,
            data: parse_hex_bytes(&self.data)?,
            block_number: self.block_number.as_deref().map(parse_hex_u64).transpose()?,
            block_hash: self.block_hash,
            transaction_hash: self.transaction_hash,
            log_index: self.log_index.as_deref().map(parse_hex_u64).transpose()?,
            removed: self.removed,
        })
    }
}

fn parse_hex_u64(s: &str) -> Result<u64, BindError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).map_err(|e| BindError::Decode(format!("invalid quantity: {}", e)))
}

fn parse_hex_bytes(s: &str) -> Result<Bytes, BindError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.is_empty() {
        return Ok(Bytes::new());
    }
    let bytes = hex::decode(s)?;
    Ok(Bytes::from(bytes))
}

//! In-memory transport for tests

use std::collections::HashMap;
use std::sync::Arc;

use abibind_crypto::keccak256;
use abibind_primitives::H256;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use super::Transport;
use crate::error::BindError;
use crate::log::{LiveLogs, Log, LogFilter, LogSender};
use crate::types::{BlockId, CallRequest};

/// JSON-RPC code nodes use for execution reverts
const REVERT_CODE: i64 = 3;

#[derive(Debug, Clone)]
enum CallOutcome {
    Return(Bytes),
    Revert(Bytes),
}

struct Subscriber {
    id: u64,
    filter: LogFilter,
    sender: LogSender,
}

#[derive(Default)]
struct MockState {
    outcomes: HashMap<[u8; 4], CallOutcome>,
    calls: Vec<(CallRequest, BlockId)>,
    transactions: Vec<CallRequest>,
    logs: Vec<Log>,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
    failure: Option<BindError>,
}

/// Mock transport for testing
///
/// Canned call results are keyed by function selector; calls without one
/// return empty data. Logs added with [`MockTransport::emit`] are stored for
/// historical queries and pushed to every live subscription whose filter
/// matches. Clones share state.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `data` for calls to `selector`
    pub fn set_call_result(&self, selector: [u8; 4], data: impl Into<Bytes>) {
        self.state
            .lock()
            .outcomes
            .insert(selector, CallOutcome::Return(data.into()));
    }

    /// Revert calls and transactions to `selector` with `data`
    pub fn set_revert(&self, selector: [u8; 4], data: impl Into<Bytes>) {
        self.state
            .lock()
            .outcomes
            .insert(selector, CallOutcome::Revert(data.into()));
    }

    /// Fail every request with `error` until cleared with `None`
    pub fn set_failure(&self, error: Option<BindError>) {
        self.state.lock().failure = error;
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<(CallRequest, BlockId)> {
        self.state.lock().calls.clone()
    }

    /// Transactions received so far
    pub fn transactions(&self) -> Vec<CallRequest> {
        self.state.lock().transactions.clone()
    }

    /// Store a log for historical queries without notifying subscribers
    pub fn add_log(&self, log: Log) {
        self.state.lock().logs.push(log);
    }

    /// Store a log and deliver it to matching live subscriptions
    pub fn emit(&self, log: Log) {
        let mut state = self.state.lock();
        state.logs.push(log.clone());
        state.subscribers.retain(|sub| {
            if !sub.filter.matches(&log) {
                return true;
            }
            sub.sender.send(Ok(log.clone())).is_ok()
        });
    }

    /// Push an error to every live subscription
    pub fn fail_subscriptions(&self, error: BindError) {
        let state = self.state.lock();
        for sub in &state.subscribers {
            let _ = sub.sender.send(Err(error.clone()));
        }
    }

    /// End every live subscription from the transport side
    pub fn complete_subscriptions(&self) {
        self.state.lock().subscribers.clear();
    }

    /// Number of subscriptions not yet released
    pub fn active_subscriptions(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    fn check_failure(&self) -> Result<(), BindError> {
        match &self.state.lock().failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn outcome(&self, request: &CallRequest) -> Option<CallOutcome> {
        let selector = request.selector()?;
        self.state.lock().outcomes.get(&selector).cloned()
    }
}

fn revert(data: Bytes) -> BindError {
    BindError::Rpc {
        code: REVERT_CODE,
        message: "execution reverted".to_string(),
        data: Some(data),
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, request: CallRequest, block: BlockId) -> Result<Bytes, BindError> {
        self.check_failure()?;
        let outcome = self.outcome(&request);
        self.state.lock().calls.push((request, block));

        match outcome {
            Some(CallOutcome::Return(data)) => Ok(data),
            Some(CallOutcome::Revert(data)) => Err(revert(data)),
            None => Ok(Bytes::new()),
        }
    }

    async fn send_transaction(&self, request: CallRequest) -> Result<H256, BindError> {
        self.check_failure()?;
        if let Some(CallOutcome::Revert(data)) = self.outcome(&request) {
            return Err(revert(data));
        }

        let mut state = self.state.lock();
        let nonce = state.transactions.len() as u64;
        state.transactions.push(request);
        Ok(keccak256(&nonce.to_be_bytes()))
    }

    async fn query_logs(&self, filter: &LogFilter) -> Result<Vec<Log>, BindError> {
        self.check_failure()?;
        let state = self.state.lock();
        Ok(state
            .logs
            .iter()
            .filter(|log| filter.matches(log))
            .cloned()
            .collect())
    }

    async fn subscribe_logs(&self, filter: &LogFilter) -> Result<LiveLogs, BindError> {
        self.check_failure()?;

        let mut state = self.state.lock();
        let id = state.next_subscription;
        state.next_subscription += 1;

        let shared = Arc::clone(&self.state);
        let (sender, live) = LiveLogs::channel(move || {
            shared.lock().subscribers.retain(|sub| sub.id != id);
        });

        // Replay history only when a start block was requested
        if filter.from_block.is_some() {
            for log in state.logs.iter().filter(|log| filter.matches(log)) {
                let _ = sender.send(Ok(log.clone()));
            }
        }

        state.subscribers.push(Subscriber {
            id,
            filter: filter.clone(),
            sender,
        });
        Ok(live)
    }
}

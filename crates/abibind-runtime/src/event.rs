//! Decoded event sequences: finite queries and live subscriptions

use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use abibind_abi::{decode_topic, AbiValue, ParamType};
use abibind_primitives::H256;
use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::error::BindError;
use crate::log::{LiveLogs, Log};

/// A typed event decoded from a log
pub trait ContractEvent: Sized + Send + 'static {
    /// Decode the event from a log emitted by the contract
    fn decode_log(log: Log) -> Result<Self, BindError>;

    /// The log the event was decoded from
    fn raw(&self) -> &Log;
}

/// Indexed-parameter topics of `log`.
///
/// When `signature` is given (non-anonymous events) topic 0 must equal it
/// and is skipped. Exactly `count` topics must remain.
pub fn indexed_topics<'a>(
    log: &'a Log,
    signature: Option<&H256>,
    count: usize,
) -> Result<&'a [H256], BindError> {
    let topics = match signature {
        Some(expected) => match log.topics.split_first() {
            Some((first, rest)) if first == expected => rest,
            _ => {
                return Err(BindError::Decode(format!(
                    "event signature mismatch, expected {}",
                    expected
                )))
            }
        },
        None => &log.topics[..],
    };
    if topics.len() != count {
        return Err(BindError::Decode(format!(
            "expected {} indexed topics, got {}",
            count,
            topics.len()
        )));
    }
    Ok(topics)
}

/// Decode an indexed value-type parameter from its topic
pub fn decode_indexed<T: AbiValue>(param_type: &ParamType, topic: &H256) -> Result<T, BindError> {
    Ok(T::from_token(decode_topic(param_type, topic)?)?)
}

// ==================== Historical queries ====================

/// Result of a historical event query.
///
/// Holds the fetched logs; every [`EventQuery::iter`] call starts a fresh
/// decoding pass over them.
pub struct EventQuery<E> {
    logs: Vec<Log>,
    _event: PhantomData<fn() -> E>,
}

impl<E: ContractEvent> EventQuery<E> {
    /// Wrap fetched logs
    pub fn new(logs: Vec<Log>) -> Self {
        Self {
            logs,
            _event: PhantomData,
        }
    }

    /// Number of matching logs
    pub fn len(&self) -> usize {
        self.logs.len()
    }

    /// Whether the query matched nothing
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Undecoded logs
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Lazily decode the logs in order; ends after the first failure
    pub fn iter(&self) -> EventIter<'_, E> {
        EventIter {
            logs: self.logs.iter(),
            failed: false,
            _event: PhantomData,
        }
    }

    /// Decode every log
    pub fn into_events(self) -> Result<Vec<E>, BindError> {
        self.logs.into_iter().map(E::decode_log).collect()
    }
}

impl<E> fmt::Debug for EventQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQuery")
            .field("logs", &self.logs.len())
            .finish()
    }
}

/// Decoding iterator over an [`EventQuery`]
pub struct EventIter<'a, E> {
    logs: std::slice::Iter<'a, Log>,
    failed: bool,
    _event: PhantomData<fn() -> E>,
}

impl<E: ContractEvent> Iterator for EventIter<'_, E> {
    type Item = Result<E, BindError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = E::decode_log(self.logs.next()?.clone());
        self.failed = result.is_err();
        Some(result)
    }
}

// ==================== Live subscriptions ====================

/// Lifecycle of an [`EventSubscription`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Receiving events
    Active,
    /// Upstream finished; buffered events are still delivered
    Draining,
    /// Cancelled or fully drained
    Closed,
    /// Upstream or decoding failed; the error is yielded once
    Failed,
}

struct Inner<E> {
    state: SubscriptionState,
    buffer: VecDeque<E>,
    error: Option<BindError>,
    listener: Option<JoinHandle<()>>,
}

struct Shared<E> {
    inner: Mutex<Inner<E>>,
    notify: Notify,
}

trait Cancel: Send + Sync {
    fn cancel(&self);
}

impl<E: Send> Cancel for Shared<E> {
    fn cancel(&self) {
        let listener = {
            let mut inner = self.inner.lock();
            inner.state = SubscriptionState::Closed;
            inner.buffer.clear();
            inner.error = None;
            inner.listener.take()
        };
        // Dropping the aborted task releases the transport subscription
        if let Some(task) = listener {
            task.abort();
        }
        self.notify.notify_one();
    }
}

impl<E> Shared<E> {
    fn push(&self, event: E) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != SubscriptionState::Active {
            return false;
        }
        inner.buffer.push_back(event);
        drop(inner);
        self.notify.notify_one();
        true
    }

    fn fail(&self, error: BindError) {
        let mut inner = self.inner.lock();
        if inner.state != SubscriptionState::Active {
            return;
        }
        inner.state = SubscriptionState::Failed;
        inner.error = Some(error);
        drop(inner);
        self.notify.notify_one();
    }

    fn finish(&self) {
        let mut inner = self.inner.lock();
        if inner.state == SubscriptionState::Active {
            inner.state = SubscriptionState::Draining;
        }
        drop(inner);
        self.notify.notify_one();
    }
}

/// Cancels a subscription from anywhere, including other tasks
#[derive(Clone)]
pub struct CancelHandle(Arc<dyn Cancel>);

impl CancelHandle {
    /// Close the subscription; nothing is delivered afterwards
    pub fn cancel(&self) {
        self.0.cancel();
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle").finish_non_exhaustive()
    }
}

/// Live, cancelable sequence of decoded events.
///
/// A listener task decodes logs as they arrive and buffers them in arrival
/// order. Dropping the subscription cancels it.
pub struct EventSubscription<E: ContractEvent> {
    shared: Arc<Shared<E>>,
}

impl<E: ContractEvent> EventSubscription<E> {
    /// Start the listener task over a live log stream.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(logs: LiveLogs) -> Self {
        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                state: SubscriptionState::Active,
                buffer: VecDeque::new(),
                error: None,
                listener: None,
            }),
            notify: Notify::new(),
        });

        let task = tokio::spawn(listen(Arc::clone(&shared), logs));
        shared.inner.lock().listener = Some(task);
        Self { shared }
    }

    /// Next event; `None` once the subscription is closed or exhausted
    pub async fn next(&mut self) -> Option<Result<E, BindError>> {
        loop {
            let notified = self.shared.notify.notified();
            {
                let mut inner = self.shared.inner.lock();
                if inner.state == SubscriptionState::Closed {
                    return None;
                }
                if let Some(event) = inner.buffer.pop_front() {
                    return Some(Ok(event));
                }
                match inner.state {
                    SubscriptionState::Draining => {
                        inner.state = SubscriptionState::Closed;
                        return None;
                    }
                    SubscriptionState::Failed => return inner.error.take().map(Err),
                    _ => {}
                }
            }
            notified.await;
        }
    }

    /// Current state
    pub fn state(&self) -> SubscriptionState {
        self.shared.inner.lock().state
    }

    /// Stop the listener and release the transport subscription
    pub fn cancel(&self) {
        self.shared.cancel();
    }

    /// Handle that cancels this subscription from another task
    pub fn cancel_handle(&self) -> CancelHandle {
        let shared: Arc<dyn Cancel> = self.shared.clone();
        CancelHandle(shared)
    }

    /// Adapt into a [`Stream`]
    pub fn into_stream(self) -> impl Stream<Item = Result<E, BindError>> + Send + 'static {
        futures::stream::unfold(self, |mut subscription| async move {
            let item = subscription.next().await?;
            Some((item, subscription))
        })
    }
}

impl<E: ContractEvent> Drop for EventSubscription<E> {
    fn drop(&mut self) {
        self.shared.cancel();
    }
}

impl<E: ContractEvent> fmt::Debug for EventSubscription<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSubscription")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

async fn listen<E: ContractEvent>(shared: Arc<Shared<E>>, mut logs: LiveLogs) {
    while let Some(item) = logs.recv().await {
        let result = item.and_then(E::decode_log);
        match result {
            Ok(event) => {
                if !shared.push(event) {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!("Event subscription failed: {}", e);
                shared.fail(e);
                return;
            }
        }
    }
    tracing::debug!("Event subscription upstream finished");
    shared.finish();
}

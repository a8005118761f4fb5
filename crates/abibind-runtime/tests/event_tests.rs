//! Event query and subscription tests for abibind-runtime
//!
//! Drives a hand-written `Transfer` event through `BoundContract` and
//! `MockTransport` the way generated filterers do.

use std::sync::Arc;

use abibind_crypto::event_topic;
use abibind_runtime::{
    decode_indexed, indexed_topics, topic_rule, Address, BindError, BoundContract, Bytes,
    ContractEvent, EventQuery, EventSubscription, FilterOpts, Log, MockTransport, ParamType,
    SubscriptionState, WatchOpts, H256, U256,
};

#[derive(Debug, Clone, PartialEq)]
struct Transfer {
    from: Address,
    to: Address,
    value: U256,
    raw: Log,
}

fn transfer_topic() -> H256 {
    event_topic("Transfer(address,address,uint256)")
}

impl ContractEvent for Transfer {
    fn decode_log(log: Log) -> Result<Self, BindError> {
        let topic0 = transfer_topic();
        let topics = indexed_topics(&log, Some(&topic0), 2)?;
        let from = decode_indexed(&ParamType::Address, &topics[0])?;
        let to = decode_indexed(&ParamType::Address, &topics[1])?;
        let (value,): (U256,) = abibind_runtime::from_tokens(abibind_runtime::decode(
            &[ParamType::Uint(256)],
            &log.data,
        )?)?;
        Ok(Self {
            from,
            to,
            value,
            raw: log,
        })
    }

    fn raw(&self) -> &Log {
        &self.raw
    }
}

fn token() -> Address {
    Address::from_bytes([0xcc; 20])
}

fn account(n: u8) -> Address {
    Address::from_bytes([n; 20])
}

fn transfer_log(from: Address, to: Address, value: u64, block: u64) -> Log {
    let data = H256::from_u256(U256::from(value));
    Log::new(
        token(),
        vec![transfer_topic(), from.to_word(), to.to_word()],
        Bytes::copy_from_slice(data.as_bytes()),
    )
    .at_block(block)
}

fn transfer_topics(from: &[Address], to: &[Address]) -> Vec<Vec<H256>> {
    vec![
        vec![transfer_topic()],
        topic_rule(&ParamType::Address, from).unwrap(),
        topic_rule(&ParamType::Address, to).unwrap(),
    ]
}

fn setup() -> (MockTransport, BoundContract) {
    let mock = MockTransport::new();
    let contract = BoundContract::new(token(), Arc::new(mock.clone()));
    (mock, contract)
}

async fn wait_for_release(mock: &MockTransport) {
    for _ in 0..100 {
        if mock.active_subscriptions() == 0 {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("subscription still registered");
}

// ==================== Historical Query Tests ====================

#[tokio::test]
async fn test_filter_or_within_position() {
    let (mock, contract) = setup();
    mock.add_log(transfer_log(account(1), account(9), 10, 1));
    mock.add_log(transfer_log(account(2), account(9), 20, 2));
    mock.add_log(transfer_log(account(3), account(9), 30, 3));

    let logs = contract
        .filter_logs(&FilterOpts::default(), transfer_topics(&[account(1), account(2)], &[]))
        .await
        .unwrap();
    let query = EventQuery::<Transfer>::new(logs);
    let values: Vec<U256> = query.iter().map(|e| e.unwrap().value).collect();
    assert_eq!(values, vec![U256::from(10), U256::from(20)]);
}

#[tokio::test]
async fn test_filter_and_across_positions() {
    let (mock, contract) = setup();
    mock.add_log(transfer_log(account(1), account(8), 1, 1));
    mock.add_log(transfer_log(account(1), account(9), 2, 1));

    let logs = contract
        .filter_logs(&FilterOpts::default(), transfer_topics(&[account(1)], &[account(9)]))
        .await
        .unwrap();
    let events = EventQuery::<Transfer>::new(logs).into_events().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].to, account(9));
    assert_eq!(events[0].raw().block_number, Some(1));
}

#[tokio::test]
async fn test_filter_block_range() {
    let (mock, contract) = setup();
    for block in 1..=5 {
        mock.add_log(transfer_log(account(1), account(2), block, block));
    }

    let opts = FilterOpts {
        start: 2,
        end: Some(4),
    };
    let logs = contract.filter_logs(&opts, transfer_topics(&[], &[])).await.unwrap();
    assert_eq!(logs.len(), 3);
}

#[tokio::test]
async fn test_query_stops_at_malformed_log() {
    let (mock, contract) = setup();
    mock.add_log(transfer_log(account(1), account(2), 1, 1));
    let mut broken = transfer_log(account(1), account(2), 2, 2);
    broken.data = Bytes::from_static(&[0u8; 5]);
    mock.add_log(broken);
    mock.add_log(transfer_log(account(1), account(2), 3, 3));

    let logs = contract
        .filter_logs(&FilterOpts::default(), transfer_topics(&[], &[]))
        .await
        .unwrap();
    let query = EventQuery::<Transfer>::new(logs);
    let items: Vec<_> = query.iter().collect();
    assert_eq!(items.len(), 2);
    assert!(matches!(items[1], Err(BindError::Decode(_))));
}

// ==================== Subscription Tests ====================

#[tokio::test]
async fn test_watch_delivers_in_order() {
    let (mock, contract) = setup();
    let logs = contract
        .watch_logs(&WatchOpts::default(), transfer_topics(&[], &[account(9)]))
        .await
        .unwrap();
    let mut sub = EventSubscription::<Transfer>::spawn(logs);

    mock.emit(transfer_log(account(1), account(9), 1, 10));
    mock.emit(transfer_log(account(1), account(8), 2, 10));
    mock.emit(transfer_log(account(2), account(9), 3, 11));

    assert_eq!(sub.next().await.unwrap().unwrap().value, U256::from(1));
    assert_eq!(sub.next().await.unwrap().unwrap().value, U256::from(3));
    assert_eq!(sub.state(), SubscriptionState::Active);
}

#[tokio::test]
async fn test_watch_replays_from_start_block() {
    let (mock, contract) = setup();
    mock.add_log(transfer_log(account(1), account(2), 1, 5));
    mock.add_log(transfer_log(account(1), account(2), 2, 15));

    let logs = contract
        .watch_logs(&WatchOpts { start: Some(10) }, transfer_topics(&[], &[]))
        .await
        .unwrap();
    let mut sub = EventSubscription::<Transfer>::spawn(logs);
    mock.emit(transfer_log(account(1), account(2), 3, 20));

    assert_eq!(sub.next().await.unwrap().unwrap().value, U256::from(2));
    assert_eq!(sub.next().await.unwrap().unwrap().value, U256::from(3));
}

#[tokio::test]
async fn test_cancel_releases_transport_subscription() {
    let (mock, contract) = setup();
    let logs = contract
        .watch_logs(&WatchOpts::default(), transfer_topics(&[], &[]))
        .await
        .unwrap();
    let mut sub = EventSubscription::<Transfer>::spawn(logs);
    assert_eq!(mock.active_subscriptions(), 1);

    mock.emit(transfer_log(account(1), account(2), 1, 1));
    sub.cancel();
    mock.emit(transfer_log(account(1), account(2), 2, 2));

    assert!(sub.next().await.is_none());
    assert_eq!(sub.state(), SubscriptionState::Closed);
    wait_for_release(&mock).await;
}

#[tokio::test]
async fn test_upstream_completion_drains() {
    let (mock, contract) = setup();
    let logs = contract
        .watch_logs(&WatchOpts::default(), transfer_topics(&[], &[]))
        .await
        .unwrap();
    let mut sub = EventSubscription::<Transfer>::spawn(logs);

    mock.emit(transfer_log(account(1), account(2), 1, 1));
    mock.emit(transfer_log(account(1), account(2), 2, 1));
    mock.complete_subscriptions();

    assert!(sub.next().await.unwrap().is_ok());
    assert!(sub.next().await.unwrap().is_ok());
    assert!(sub.next().await.is_none());
    assert_eq!(sub.state(), SubscriptionState::Closed);
}

#[tokio::test]
async fn test_transport_failure_yielded_once() {
    let (mock, contract) = setup();
    let logs = contract
        .watch_logs(&WatchOpts::default(), transfer_topics(&[], &[]))
        .await
        .unwrap();
    let mut sub = EventSubscription::<Transfer>::spawn(logs);

    mock.fail_subscriptions(BindError::SubscriptionFailed("node went away".into()));
    assert!(matches!(
        sub.next().await,
        Some(Err(BindError::SubscriptionFailed(_)))
    ));
    assert!(sub.next().await.is_none());
    assert_eq!(sub.state(), SubscriptionState::Failed);
    wait_for_release(&mock).await;
}

#[tokio::test]
async fn test_stream_cancelled_from_other_task() {
    use futures::StreamExt;

    let (mock, contract) = setup();
    let logs = contract
        .watch_logs(&WatchOpts::default(), transfer_topics(&[], &[]))
        .await
        .unwrap();
    let sub = EventSubscription::<Transfer>::spawn(logs);
    let handle = sub.cancel_handle();

    let consumer = tokio::spawn(async move { sub.into_stream().count().await });
    mock.emit(transfer_log(account(1), account(2), 1, 1));
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    handle.cancel();

    let delivered = consumer.await.unwrap();
    assert!(delivered <= 1);
    wait_for_release(&mock).await;
}

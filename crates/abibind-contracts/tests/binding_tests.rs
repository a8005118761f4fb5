//! Generated binding tests for abibind-contracts
//!
//! Drives the build-time generated `RegStore`, `RegRelay` and
//! `PaymentFactory` bindings against `MockTransport`.

use std::sync::Arc;

use abibind_contracts::payment_factory::{self, PaymentFactory};
use abibind_contracts::reg_relay::{self, RegRelay, RegRelayMetadataUpdate};
use abibind_contracts::reg_store::{
    self, RegStore, RegStoreApprovalForAll, RegStoreErrors, RegStoreTransfer,
};
use abibind_runtime::{
    decode, encode, Address, BindError, Bytes, CallOpts, ContractEvent, FilterOpts, FixedBytes,
    Log, MockTransport, ParamType, SubscriptionState, Token, TransactOpts, WatchOpts, H256, U256,
};

fn contract_address() -> Address {
    Address::from_bytes([0x42; 20])
}

fn account(n: u8) -> Address {
    Address::from_bytes([n; 20])
}

fn word(value: u64) -> Vec<u8> {
    encode(&[ParamType::Uint(256)], &[Token::Uint(U256::from(value))]).unwrap()
}

fn setup_store() -> (MockTransport, RegStore) {
    let mock = MockTransport::new();
    let store = RegStore::new(contract_address(), Arc::new(mock.clone()));
    (mock, store)
}

fn transfer_log(from: Address, to: Address, token_id: u64, block: u64) -> Log {
    Log::new(
        contract_address(),
        vec![
            H256::from_bytes(reg_store::topics::TRANSFER),
            from.to_word(),
            to.to_word(),
            H256::from_u256(U256::from(token_id)),
        ],
        Bytes::new(),
    )
    .at_block(block)
}

// ==================== Caller Tests ====================

#[tokio::test]
async fn test_call_decodes_single_output() {
    let (mock, store) = setup_store();
    mock.set_call_result(reg_store::selectors::BALANCE_OF, word(3));

    let balance = store
        .caller()
        .balance_of(&CallOpts::default(), account(1))
        .await
        .unwrap();
    assert_eq!(balance, U256::from(3));

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    let request = &calls[0].0;
    assert_eq!(request.to, Some(contract_address()));
    let data = request.data.clone().unwrap();
    assert_eq!(data[..4], [0x70, 0xa0, 0x82, 0x31]);
    assert_eq!(data[16..36], *account(1).as_bytes());
}

#[tokio::test]
async fn test_call_narrow_and_string_outputs() {
    let (mock, store) = setup_store();
    mock.set_call_result(reg_store::selectors::STORES_TO_USERS, word(2));
    mock.set_call_result(
        reg_store::selectors::NAME,
        encode(&[ParamType::String], &[Token::String("Stores".into())]).unwrap(),
    );

    let caller = store.caller();
    let acl = caller
        .stores_to_users(&CallOpts::default(), U256::from(1), account(5))
        .await
        .unwrap();
    assert_eq!(acl, 2u8);
    assert_eq!(caller.name(&CallOpts::default()).await.unwrap(), "Stores");
}

#[tokio::test]
async fn test_call_without_outputs() {
    let (_mock, store) = setup_store();
    store
        .caller()
        .require_only_admin_or_higher(&CallOpts::default(), U256::from(1), account(1))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_call_custom_error() {
    let (mock, store) = setup_store();
    let mut revert = reg_store::error_selectors::ERC721_NONEXISTENT_TOKEN.to_vec();
    revert.extend(word(7));
    mock.set_revert(reg_store::selectors::OWNER_OF, revert);

    let err = store
        .caller()
        .owner_of(&CallOpts::default(), U256::from(7))
        .await
        .unwrap_err();
    assert!(matches!(err, BindError::CallReverted { .. }));
    assert_eq!(
        RegStoreErrors::from_revert(&err),
        Some(RegStoreErrors::ERC721NonexistentToken {
            token_id: U256::from(7)
        })
    );
}

// ==================== Transactor Tests ====================

#[tokio::test]
async fn test_transact_overloads() {
    let (mock, store) = setup_store();
    let opts = TransactOpts::sender(account(1));
    let transactor = store.transactor();

    transactor
        .safe_transfer_from(&opts, account(1), account(2), U256::from(9))
        .await
        .unwrap();
    transactor
        .safe_transfer_from_0(&opts, account(1), account(2), U256::from(9), Bytes::from_static(b"hi"))
        .await
        .unwrap();

    let sent = mock.transactions();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].selector(), Some([0x42, 0x84, 0x2e, 0x0e]));
    assert_eq!(sent[1].selector(), Some([0xb8, 0x8d, 0x4f, 0xde]));
    assert_eq!(sent[0].from, Some(account(1)));
}

#[tokio::test]
async fn test_non_payable_rejects_value() {
    let (mock, store) = setup_store();
    let opts = TransactOpts::sender(account(1)).with_value(U256::from(1));
    let err = store
        .transactor()
        .approve(&opts, account(2), U256::from(1))
        .await
        .unwrap_err();
    assert!(matches!(err, BindError::InvalidOptions(_)));
    assert!(mock.transactions().is_empty());
}

#[tokio::test]
async fn test_transact_array_arguments() {
    let mock = MockTransport::new();
    let factory = PaymentFactory::new(contract_address(), Arc::new(mock.clone()));
    let hashes = vec![FixedBytes([0xab; 32]), FixedBytes([0xcd; 32])];

    factory
        .transactor()
        .batch(
            &TransactOpts::default(),
            vec![account(1), account(2)],
            vec![account(3), account(4)],
            vec![U256::from(10), U256::from(20)],
            vec![Address::ZERO, Address::ZERO],
            hashes,
        )
        .await
        .unwrap();

    let data = mock.transactions()[0].data.clone().unwrap();
    assert_eq!(data[..4], payment_factory::selectors::BATCH);
    let address_list = ParamType::Array(Box::new(ParamType::Address));
    let tokens = decode(
        &[
            address_list.clone(),
            address_list.clone(),
            ParamType::Array(Box::new(ParamType::Uint(256))),
            address_list,
            ParamType::Array(Box::new(ParamType::FixedBytes(32))),
        ],
        &data[4..],
    )
    .unwrap();
    assert_eq!(
        tokens[4],
        Token::Array(vec![
            Token::FixedBytes(vec![0xab; 32]),
            Token::FixedBytes(vec![0xcd; 32]),
        ])
    );
}

#[tokio::test]
async fn test_transaction_with_outputs_returns_pending() {
    let mock = MockTransport::new();
    let relay = RegRelay::new(contract_address(), Arc::new(mock.clone()));
    let pending = relay
        .transactor()
        .mint(&TransactOpts::default(), account(1), "ipfs://relay".to_string())
        .await
        .unwrap();
    assert_ne!(*pending.hash(), H256::ZERO);
    assert_eq!(
        mock.transactions()[0].selector(),
        Some(reg_relay::selectors::MINT)
    );
}

// ==================== Constructor Tests ====================

#[test]
fn test_constructor_args() {
    let encoded = RegStore::encode_constructor_args(account(7)).unwrap();
    assert_eq!(encoded.len(), 32);
    assert_eq!(encoded[12..], *account(7).as_bytes());

    assert!(RegRelay::encode_constructor_args().unwrap().is_empty());
}

// ==================== Filterer Tests ====================

#[tokio::test]
async fn test_filter_indexed_values() {
    let (mock, store) = setup_store();
    mock.add_log(transfer_log(account(1), account(2), 1, 10));
    mock.add_log(transfer_log(account(3), account(2), 2, 11));
    mock.add_log(transfer_log(account(1), account(4), 3, 12));

    let query = store
        .filterer()
        .filter_transfer(&FilterOpts::default(), &[account(1)], &[], &[])
        .await
        .unwrap();
    let events: Vec<RegStoreTransfer> = query.into_events().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].token_id, U256::from(1));
    assert_eq!(events[1].to, account(4));
    assert_eq!(events[1].raw().block_number, Some(12));

    let by_token = store
        .filterer()
        .filter_transfer(&FilterOpts::default(), &[], &[], &[U256::from(2)])
        .await
        .unwrap();
    assert_eq!(by_token.len(), 1);
}

#[tokio::test]
async fn test_watch_and_cancel() {
    let (mock, store) = setup_store();
    let mut sub = store
        .filterer()
        .watch_transfer(&WatchOpts::default(), &[], &[account(2)], &[])
        .await
        .unwrap();

    mock.emit(transfer_log(account(1), account(3), 1, 1));
    mock.emit(transfer_log(account(1), account(2), 2, 2));

    let event = sub.next().await.unwrap().unwrap();
    assert_eq!(event.token_id, U256::from(2));
    assert_eq!(event.from, account(1));

    sub.cancel();
    assert!(sub.next().await.is_none());
    assert_eq!(sub.state(), SubscriptionState::Closed);
}

#[tokio::test]
async fn test_watch_stream() {
    use futures::StreamExt;

    let (mock, store) = setup_store();
    let sub = store
        .filterer()
        .watch_transfer(&WatchOpts::default(), &[], &[], &[])
        .await
        .unwrap();
    mock.emit(transfer_log(account(1), account(2), 5, 1));
    mock.emit(transfer_log(account(1), account(2), 6, 1));
    mock.complete_subscriptions();

    let ids: Vec<U256> = sub
        .into_stream()
        .map(|event| event.unwrap().token_id)
        .collect()
        .await;
    assert_eq!(ids, vec![U256::from(5), U256::from(6)]);
}

#[test]
fn test_parse_data_field() {
    let (_mock, store) = setup_store();
    let log = Log::new(
        contract_address(),
        vec![
            H256::from_bytes(reg_store::topics::APPROVAL_FOR_ALL),
            account(1).to_word(),
            account(2).to_word(),
        ],
        Bytes::from(encode(&[ParamType::Bool], &[Token::Bool(true)]).unwrap()),
    );

    let event: RegStoreApprovalForAll = store.filterer().parse_approval_for_all(log.clone()).unwrap();
    assert_eq!(event.owner, account(1));
    assert_eq!(event.operator, account(2));
    assert!(event.approved);
    assert_eq!(event.raw, log);
}

#[test]
fn test_parse_rejects_wrong_event() {
    let (_mock, store) = setup_store();
    let log = transfer_log(account(1), account(2), 1, 1);
    let err = store.filterer().parse_approval(log.clone()).map(|_| ());
    // Approval and Transfer share a layout; only topic 0 tells them apart
    assert!(matches!(err, Err(BindError::Decode(_))));
    assert!(RegRelayMetadataUpdate::decode_log(log).is_err());
}

#[test]
fn test_parse_unindexed_event() {
    let mock = MockTransport::new();
    let relay = RegRelay::new(contract_address(), Arc::new(mock));
    let log = Log::new(
        contract_address(),
        vec![H256::from_bytes(reg_relay::topics::METADATA_UPDATE)],
        Bytes::from(word(44)),
    );
    let event = relay.filterer().parse_metadata_update(log).unwrap();
    assert_eq!(event.token_id, U256::from(44));
}

// ==================== Error Enum Tests ====================

#[test]
fn test_error_decode() {
    let mut data = reg_store::error_selectors::ERC721_INCORRECT_OWNER.to_vec();
    data.extend(
        encode(
            &[ParamType::Address, ParamType::Uint(256), ParamType::Address],
            &[
                Token::Address(account(1)),
                Token::Uint(U256::from(5)),
                Token::Address(account(2)),
            ],
        )
        .unwrap(),
    );

    let decoded = RegStoreErrors::decode(&data).unwrap().unwrap();
    assert_eq!(
        decoded,
        RegStoreErrors::ERC721IncorrectOwner {
            sender: account(1),
            token_id: U256::from(5),
            owner: account(2),
        }
    );
    assert_eq!(decoded.selector(), reg_store::error_selectors::ERC721_INCORRECT_OWNER);
}

#[test]
fn test_error_decode_unknown() {
    assert_eq!(RegStoreErrors::decode(&[0xde, 0xad, 0xbe, 0xef]).unwrap(), None);
    assert_eq!(RegStoreErrors::decode(&[0x01]).unwrap(), None);

    let truncated = reg_store::error_selectors::ERC721_INVALID_OWNER.to_vec();
    assert!(RegStoreErrors::decode(&truncated).is_err());
}

#[test]
fn test_abi_constant_embedded() {
    assert!(reg_store::ABI.starts_with("[{"));
    assert!(reg_store::ABI.contains("\"safeTransferFrom\""));
    assert!(payment_factory::ABI.contains("\"getPaymentAddress\""));
}

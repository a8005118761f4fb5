//! # abibind-runtime
//!
//! Runtime support for contract bindings generated by `abibind-gen`.
//!
//! Generated binders wrap a [`BoundContract`]: a contract address plus a
//! shared [`Transport`]. Calls, transactions and log queries go through the
//! transport; reverts come back as [`BindError::CallReverted`] with the
//! decoded reason and the raw data.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use abibind_runtime::{BoundContract, CallOpts, MockTransport, ParamType, Token, U256};
//! use abibind_runtime::Address;
//!
//! # tokio_test_block_on(async {
//! let mock = MockTransport::new();
//! let selector = [0x18, 0x16, 0x0d, 0xdd]; // totalSupply()
//! mock.set_call_result(selector, abibind_runtime::H256::from_u256(U256::from(7)).as_bytes().to_vec());
//!
//! let contract = BoundContract::new(Address::ZERO, Arc::new(mock));
//! let out = contract
//!     .call(&CallOpts::default(), selector, &[], vec![], &[ParamType::Uint(256)])
//!     .await
//!     .unwrap();
//! assert_eq!(out, vec![Token::Uint(U256::from(7))]);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod contract;
mod error;
mod event;
mod log;
mod revert;
mod transport;
mod types;

pub use contract::{bytecode_from_hex, encode_constructor, topic_rule, BoundContract};
pub use error::BindError;
pub use event::{
    decode_indexed, indexed_topics, CancelHandle, ContractEvent, EventIter, EventQuery,
    EventSubscription, SubscriptionState,
};
pub use log::{LiveLogs, Log, LogFilter, LogSender};
pub use revert::{decode_revert_reason, revert_error, ERROR_SELECTOR, PANIC_SELECTOR};
pub use transport::{MockTransport, Transport};
pub use types::{
    BlockId, CallOpts, CallRequest, FilterOpts, PendingTransaction, TransactOpts, WatchOpts,
};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

// Items generated bindings refer to through the runtime path
pub use abibind_abi::{
    decode, decode_topic, encode, encode_function_call, encode_topic, from_tokens, AbiError,
    AbiValue, FixedBytes, ParamType, Token, I256,
};
pub use abibind_primitives::{Address, H256, U256};
pub use bytes::Bytes;

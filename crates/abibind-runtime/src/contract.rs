//! Contract handle shared by the caller, transactor and filterer views

use std::fmt;
use std::sync::Arc;

use abibind_abi::{decode, encode, encode_function_call, encode_topic, AbiValue, ParamType, Token};
use abibind_crypto::to_checksum;
use abibind_primitives::{Address, H256};
use bytes::Bytes;

use crate::error::BindError;
use crate::log::{LiveLogs, Log, LogFilter};
use crate::revert::revert_error;
use crate::transport::Transport;
use crate::types::{BlockId, CallOpts, CallRequest, FilterOpts, PendingTransaction, TransactOpts, WatchOpts};

/// A deployed contract: address plus transport.
///
/// Immutable and cheap to clone; generated bindings hand out views over one
/// shared instance.
#[derive(Clone)]
pub struct BoundContract {
    address: Address,
    transport: Arc<dyn Transport>,
}

impl BoundContract {
    /// Bind to the contract at `address`
    pub fn new(address: Address, transport: Arc<dyn Transport>) -> Self {
        Self { address, transport }
    }

    /// Contract address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Underlying transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    // ==================== Calls ====================

    /// Execute raw calldata with `eth_call`
    pub async fn call_raw(&self, opts: &CallOpts, data: Bytes) -> Result<Bytes, BindError> {
        let request = CallRequest {
            from: opts.from,
            to: Some(self.address),
            data: Some(data),
            ..Default::default()
        };
        self.transport
            .call(request, opts.block)
            .await
            .map_err(into_revert)
    }

    /// Call a function and decode its outputs
    pub async fn call(
        &self,
        opts: &CallOpts,
        selector: [u8; 4],
        inputs: &[ParamType],
        args: Vec<Token>,
        outputs: &[ParamType],
    ) -> Result<Vec<Token>, BindError> {
        let data = encode_function_call(selector, inputs, &args)?;
        tracing::debug!(
            contract = %self.address,
            selector = %hex::encode(selector),
            "eth_call"
        );

        let output = self.call_raw(opts, Bytes::from(data)).await?;
        if output.is_empty() && !outputs.is_empty() {
            return Err(BindError::Decode(format!(
                "empty return data; is there a contract at {}?",
                self.address
            )));
        }
        Ok(decode(outputs, &output)?)
    }

    // ==================== Transactions ====================

    /// Send raw calldata as a transaction.
    ///
    /// A non-zero value is rejected unless `payable` is set.
    pub async fn transact_raw(
        &self,
        opts: &TransactOpts,
        data: Bytes,
        payable: bool,
    ) -> Result<PendingTransaction, BindError> {
        if !payable && !opts.value.is_zero() {
            return Err(BindError::InvalidOptions(format!(
                "value {} sent to a non-payable function",
                opts.value
            )));
        }

        let request = opts.to_request(Some(self.address), data);
        let hash = self
            .transport
            .send_transaction(request)
            .await
            .map_err(into_revert)?;
        tracing::debug!(contract = %self.address, tx = %hash, "Transaction sent");
        Ok(PendingTransaction::new(hash))
    }

    /// Encode and send a function call
    pub async fn transact(
        &self,
        opts: &TransactOpts,
        selector: [u8; 4],
        inputs: &[ParamType],
        args: Vec<Token>,
        payable: bool,
    ) -> Result<PendingTransaction, BindError> {
        let data = encode_function_call(selector, inputs, &args)?;
        self.transact_raw(opts, Bytes::from(data), payable).await
    }

    /// Send plain value with empty calldata (the `receive` function)
    pub async fn transfer(&self, opts: &TransactOpts) -> Result<PendingTransaction, BindError> {
        self.transact_raw(opts, Bytes::new(), true).await
    }

    // ==================== Logs ====================

    /// Filter over this contract's logs for the given topic rules
    pub fn log_filter(&self, topics: Vec<Vec<H256>>) -> LogFilter {
        LogFilter::new(self.address).with_topics(topics)
    }

    /// Historical logs matching the topic rules within the block range
    pub async fn filter_logs(
        &self,
        opts: &FilterOpts,
        topics: Vec<Vec<H256>>,
    ) -> Result<Vec<Log>, BindError> {
        let filter = self.log_filter(topics).with_range(
            Some(BlockId::Number(opts.start)),
            Some(opts.end.map(BlockId::Number).unwrap_or(BlockId::Latest)),
        );
        let logs = self.transport.query_logs(&filter).await?;
        tracing::debug!(contract = %self.address, count = logs.len(), "Fetched logs");
        Ok(logs)
    }

    /// Live logs matching the topic rules
    pub async fn watch_logs(
        &self,
        opts: &WatchOpts,
        topics: Vec<Vec<H256>>,
    ) -> Result<LiveLogs, BindError> {
        let filter = self
            .log_filter(topics)
            .with_range(opts.start.map(BlockId::Number), None);
        self.transport.subscribe_logs(&filter).await
    }
}

impl fmt::Debug for BoundContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundContract")
            .field("address", &to_checksum(&self.address))
            .finish_non_exhaustive()
    }
}

/// Treat execution-revert RPC errors as contract reverts.
///
/// Nodes report reverts as code 3, or as a server error (-32000 and the
/// like) whose message mentions the revert. Other node errors pass through
/// even when they carry `data`.
fn into_revert(error: BindError) -> BindError {
    match error {
        BindError::Rpc {
            code,
            ref message,
            data,
        } if is_revert(code, message) => revert_error(data.unwrap_or_default()),
        other => other,
    }
}

fn is_revert(code: i64, message: &str) -> bool {
    code == 3 || ((-32099..=-32000).contains(&code) && message.contains("revert"))
}

/// Constructor arguments appended to creation bytecode
pub fn encode_constructor(
    bytecode: Option<&[u8]>,
    inputs: &[ParamType],
    args: Vec<Token>,
) -> Result<Bytes, BindError> {
    let mut data = bytecode.map(<[u8]>::to_vec).unwrap_or_default();
    data.extend(encode(inputs, &args)?);
    Ok(Bytes::from(data))
}

/// Decode `0x`-prefixed hex bytecode
pub fn bytecode_from_hex(text: &str) -> Result<Vec<u8>, BindError> {
    Ok(hex::decode(text.strip_prefix("0x").unwrap_or(text))?)
}

/// Topic rule for an indexed value-type parameter: any of `values`
pub fn topic_rule<T: AbiValue + Clone>(
    param_type: &ParamType,
    values: &[T],
) -> Result<Vec<H256>, BindError> {
    values
        .iter()
        .map(|value| Ok(encode_topic(param_type, &value.clone().into_token())?))
        .collect()
}

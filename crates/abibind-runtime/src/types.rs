//! Request and option types shared by bindings and transports

use abibind_primitives::{Address, H256, U256};
use bytes::Bytes;
use serde::Serialize;

/// Block identifier for RPC queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockId {
    /// Block number
    Number(u64),
    /// Latest block
    #[default]
    Latest,
    /// Pending block (includes pending transactions)
    Pending,
    /// Earliest block (genesis)
    Earliest,
    /// Safe block (finalized by consensus)
    Safe,
    /// Finalized block
    Finalized,
}

impl Serialize for BlockId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            BlockId::Number(n) => serializer.serialize_str(&format!("0x{:x}", n)),
            BlockId::Latest => serializer.serialize_str("latest"),
            BlockId::Pending => serializer.serialize_str("pending"),
            BlockId::Earliest => serializer.serialize_str("earliest"),
            BlockId::Safe => serializer.serialize_str("safe"),
            BlockId::Finalized => serializer.serialize_str("finalized"),
        }
    }
}

/// Call request for eth_call and eth_sendTransaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRequest {
    /// Sender address
    pub from: Option<Address>,
    /// Recipient address (None for contract creation)
    pub to: Option<Address>,
    /// Gas limit
    pub gas: Option<u64>,
    /// Gas price (legacy)
    pub gas_price: Option<u128>,
    /// Max fee per gas (EIP-1559)
    pub max_fee_per_gas: Option<u128>,
    /// Max priority fee per gas (EIP-1559)
    pub max_priority_fee_per_gas: Option<u128>,
    /// Sender nonce
    pub nonce: Option<u64>,
    /// Value to transfer
    pub value: Option<U256>,
    /// Input data
    pub data: Option<Bytes>,
}

impl CallRequest {
    /// 4-byte selector at the start of the input data
    pub fn selector(&self) -> Option<[u8; 4]> {
        let data = self.data.as_ref()?;
        let mut selector = [0u8; 4];
        selector.copy_from_slice(data.get(..4)?);
        Some(selector)
    }
}

impl Serialize for CallRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;

        if let Some(from) = &self.from {
            map.serialize_entry("from", &from.to_hex())?;
        }
        if let Some(to) = &self.to {
            map.serialize_entry("to", &to.to_hex())?;
        }
        if let Some(gas) = &self.gas {
            map.serialize_entry("gas", &format!("0x{:x}", gas))?;
        }
        if let Some(gas_price) = &self.gas_price {
            map.serialize_entry("gasPrice", &format!("0x{:x}", gas_price))?;
        }
        if let Some(max_fee) = &self.max_fee_per_gas {
            map.serialize_entry("maxFeePerGas", &format!("0x{:x}", max_fee))?;
        }
        if let Some(max_priority) = &self.max_priority_fee_per_gas {
            map.serialize_entry("maxPriorityFeePerGas", &format!("0x{:x}", max_priority))?;
        }
        if let Some(nonce) = &self.nonce {
            map.serialize_entry("nonce", &format!("0x{:x}", nonce))?;
        }
        if let Some(value) = &self.value {
            map.serialize_entry("value", &format!("0x{:x}", value))?;
        }
        if let Some(data) = &self.data {
            map.serialize_entry("data", &format!("0x{}", hex::encode(data)))?;
        }

        map.end()
    }
}

/// Pending transaction handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Transaction hash
    pub hash: H256,
}

impl PendingTransaction {
    /// Create a new pending transaction
    pub fn new(hash: H256) -> Self {
        Self { hash }
    }

    /// Get the transaction hash
    pub fn hash(&self) -> &H256 {
        &self.hash
    }
}

/// Options for read-only calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOpts {
    /// Sender the call is simulated from
    pub from: Option<Address>,
    /// Block the call executes against
    pub block: BlockId,
}

impl CallOpts {
    /// Call against a specific block
    pub fn at_block(block: BlockId) -> Self {
        Self { from: None, block }
    }
}

/// Options for state-changing transactions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactOpts {
    /// Sending account (must be unlocked on the node)
    pub from: Option<Address>,
    /// Wei sent along; must be zero for non-payable functions
    pub value: U256,
    /// Gas limit
    pub gas: Option<u64>,
    /// Gas price (legacy)
    pub gas_price: Option<u128>,
    /// Max fee per gas (EIP-1559)
    pub max_fee_per_gas: Option<u128>,
    /// Max priority fee per gas (EIP-1559)
    pub max_priority_fee_per_gas: Option<u128>,
    /// Explicit nonce
    pub nonce: Option<u64>,
}

impl TransactOpts {
    /// Options sending from `from`
    pub fn sender(from: Address) -> Self {
        Self {
            from: Some(from),
            ..Default::default()
        }
    }

    /// Builder-style value setter
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub(crate) fn to_request(&self, to: Option<Address>, data: Bytes) -> CallRequest {
        CallRequest {
            from: self.from,
            to,
            gas: self.gas,
            gas_price: self.gas_price,
            max_fee_per_gas: self.max_fee_per_gas,
            max_priority_fee_per_gas: self.max_priority_fee_per_gas,
            nonce: self.nonce,
            value: if self.value.is_zero() { None } else { Some(self.value) },
            data: Some(data),
        }
    }
}

/// Block range of a historical log query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOpts {
    /// First block (inclusive)
    pub start: u64,
    /// Last block (inclusive); `None` means latest
    pub end: Option<u64>,
}

/// Starting point of a live subscription
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchOpts {
    /// Replay logs from this block before streaming new ones
    pub start: Option<u64>,
}

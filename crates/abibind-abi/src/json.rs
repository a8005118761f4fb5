//! JSON ABI documents
//!
//! Accepts either a plain ABI array or a compiler artifact object carrying
//! an `abi` array (and optionally `bytecode`, as a hex string or as
//! `{ "object": "0x..." }`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AbiError, Result};
use crate::signature::{canonical_signature, check_duplicates};
use crate::types::ParamType;

/// Function state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    /// Reads nothing from chain state
    Pure,
    /// Reads chain state
    View,
    /// Writes chain state, rejects value
    #[serde(rename = "nonpayable")]
    NonPayable,
    /// Writes chain state, accepts value
    Payable,
}

impl StateMutability {
    /// `view` and `pure` functions are served by `eth_call`
    pub fn is_read_only(&self) -> bool {
        matches!(self, StateMutability::Pure | StateMutability::View)
    }

    /// Legacy ABIs carry `constant`/`payable` flags instead
    fn from_legacy(constant: Option<bool>, payable: Option<bool>) -> Self {
        if constant == Some(true) {
            StateMutability::View
        } else if payable == Some(true) {
            StateMutability::Payable
        } else {
            StateMutability::NonPayable
        }
    }
}

/// One input or output parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    /// Parameter name, possibly empty
    #[serde(default)]
    pub name: String,
    /// Type string as written in the ABI (`uint256`, `tuple[]`, ...)
    #[serde(rename = "type")]
    pub ty: String,
    /// Compiler type annotation (`struct Foo`, `enum Bar`, `contract IERC20`)
    #[serde(rename = "internalType", default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
    /// Event parameter stored as a topic
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
    /// Members of a tuple type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    /// Resolve the parameter's type, including tuple components
    pub fn param_type(&self) -> Result<ParamType> {
        let components = self
            .components
            .iter()
            .map(AbiParam::param_type)
            .collect::<Result<Vec<_>>>()?;
        ParamType::resolve(&self.ty, &components)
    }
}

/// Resolve the types of a parameter list
pub fn param_types(params: &[AbiParam]) -> Result<Vec<ParamType>> {
    params.iter().map(AbiParam::param_type).collect()
}

/// Function entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Name as declared
    pub name: String,
    /// Ordered inputs
    pub inputs: Vec<AbiParam>,
    /// Ordered outputs
    pub outputs: Vec<AbiParam>,
    /// Mutability
    pub state_mutability: StateMutability,
}

impl Function {
    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> Result<String> {
        Ok(canonical_signature(&self.name, &param_types(&self.inputs)?))
    }

    /// 4-byte selector
    pub fn selector(&self) -> Result<[u8; 4]> {
        Ok(abibind_crypto::function_selector(&self.signature()?))
    }
}

/// Event entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Name as declared
    pub name: String,
    /// Ordered inputs, indexed and not
    pub inputs: Vec<AbiParam>,
    /// Anonymous events emit no signature topic
    pub anonymous: bool,
}

impl Event {
    /// Canonical signature, e.g. `Transfer(address,address,uint256)`
    pub fn signature(&self) -> Result<String> {
        Ok(canonical_signature(&self.name, &param_types(&self.inputs)?))
    }

    /// Topic-0: keccak256 of the signature
    pub fn topic(&self) -> Result<abibind_primitives::H256> {
        Ok(abibind_crypto::event_topic(&self.signature()?))
    }
}

/// Custom error entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomError {
    /// Name as declared
    pub name: String,
    /// Ordered inputs
    pub inputs: Vec<AbiParam>,
}

impl CustomError {
    /// Canonical signature, e.g. `ERC721NonexistentToken(uint256)`
    pub fn signature(&self) -> Result<String> {
        Ok(canonical_signature(&self.name, &param_types(&self.inputs)?))
    }

    /// 4-byte selector prefixing the revert data
    pub fn selector(&self) -> Result<[u8; 4]> {
        Ok(abibind_crypto::function_selector(&self.signature()?))
    }
}

/// One entry of an ABI document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiEntry {
    /// Callable function
    Function(Function),
    /// Log event
    Event(Event),
    /// Custom error
    Error(CustomError),
    /// Constructor
    Constructor {
        /// Constructor arguments
        inputs: Vec<AbiParam>,
        /// Mutability
        state_mutability: StateMutability,
    },
    /// Fallback function
    Fallback {
        /// Mutability
        state_mutability: StateMutability,
    },
    /// Plain ether receive function
    Receive {
        /// Mutability (always payable)
        state_mutability: StateMutability,
    },
}

/// Parsed ABI document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiDocument {
    /// Entries in source order
    pub entries: Vec<AbiEntry>,
    /// Creation bytecode from an artifact, `0x`-prefixed
    pub bytecode: Option<String>,
    /// Compact JSON rendering of the ABI array
    pub abi_json: String,
}

impl AbiDocument {
    /// Parse an ABI array or compiler artifact
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;

        let (abi, bytecode) = match value {
            Value::Array(_) => (value, None),
            Value::Object(mut object) => {
                let abi = object
                    .remove("abi")
                    .ok_or_else(|| AbiError::MalformedAbi("artifact has no \"abi\" field".into()))?;
                let bytecode = object.remove("bytecode").and_then(bytecode_text);
                (abi, bytecode)
            }
            _ => {
                return Err(AbiError::MalformedAbi(
                    "expected an ABI array or an artifact object".into(),
                ))
            }
        };

        if !abi.is_array() {
            return Err(AbiError::MalformedAbi("\"abi\" must be an array".into()));
        }
        let abi_json = serde_json::to_string(&abi)?;
        let raw: Vec<RawEntry> = serde_json::from_value(abi)?;

        let entries = raw
            .into_iter()
            .enumerate()
            .map(|(i, entry)| entry.into_entry(i))
            .collect::<Result<Vec<_>>>()?;

        check_all_duplicates(&entries)?;

        Ok(Self {
            entries,
            bytecode,
            abi_json,
        })
    }

    /// Functions in source order
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.entries.iter().filter_map(|e| match e {
            AbiEntry::Function(f) => Some(f),
            _ => None,
        })
    }

    /// Events in source order
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.entries.iter().filter_map(|e| match e {
            AbiEntry::Event(ev) => Some(ev),
            _ => None,
        })
    }

    /// Custom errors in source order
    pub fn errors(&self) -> impl Iterator<Item = &CustomError> {
        self.entries.iter().filter_map(|e| match e {
            AbiEntry::Error(err) => Some(err),
            _ => None,
        })
    }

    /// Constructor inputs and mutability, if declared
    pub fn constructor(&self) -> Option<(&[AbiParam], StateMutability)> {
        self.entries.iter().find_map(|e| match e {
            AbiEntry::Constructor {
                inputs,
                state_mutability,
            } => Some((inputs.as_slice(), *state_mutability)),
            _ => None,
        })
    }

    /// Fallback mutability, if declared
    pub fn fallback(&self) -> Option<StateMutability> {
        self.entries.iter().find_map(|e| match e {
            AbiEntry::Fallback { state_mutability } => Some(*state_mutability),
            _ => None,
        })
    }

    /// Whether a receive function is declared
    pub fn has_receive(&self) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, AbiEntry::Receive { .. }))
    }
}

/// Parse an ABI array or artifact and return its entries
pub fn parse_abi(json: &str) -> Result<Vec<AbiEntry>> {
    AbiDocument::parse(json).map(|doc| doc.entries)
}

fn bytecode_text(value: Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s,
        Value::Object(mut object) => match object.remove("object") {
            Some(Value::String(s)) => s,
            _ => return None,
        },
        _ => return None,
    };
    let digits = text.strip_prefix("0x").unwrap_or(&text);
    if digits.is_empty() {
        None
    } else {
        Some(format!("0x{}", digits))
    }
}

fn check_all_duplicates(entries: &[AbiEntry]) -> Result<()> {
    let mut functions = Vec::new();
    let mut events = Vec::new();
    let mut errors = Vec::new();
    for entry in entries {
        match entry {
            AbiEntry::Function(f) => functions.push(f.signature()?),
            AbiEntry::Event(e) => events.push(e.signature()?),
            AbiEntry::Error(e) => errors.push(e.signature()?),
            _ => {}
        }
    }
    check_duplicates("function", &functions)?;
    check_duplicates("event", &events)?;
    check_duplicates("error", &errors)
}

/// Wire form of an entry before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
    state_mutability: Option<StateMutability>,
    constant: Option<bool>,
    payable: Option<bool>,
    #[serde(default)]
    anonymous: bool,
}

impl RawEntry {
    fn into_entry(self, index: usize) -> Result<AbiEntry> {
        let kind = self
            .kind
            .as_deref()
            .ok_or_else(|| AbiError::MalformedAbi(format!("entry {} has no type", index)))?;
        let state_mutability = self
            .state_mutability
            .unwrap_or_else(|| StateMutability::from_legacy(self.constant, self.payable));

        let entry = match kind {
            "function" => AbiEntry::Function(Function {
                name: required_name(self.name, kind, index)?,
                inputs: self.inputs,
                outputs: self.outputs,
                state_mutability,
            }),
            "event" => AbiEntry::Event(Event {
                name: required_name(self.name, kind, index)?,
                inputs: self.inputs,
                anonymous: self.anonymous,
            }),
            "error" => AbiEntry::Error(CustomError {
                name: required_name(self.name, kind, index)?,
                inputs: self.inputs,
            }),
            "constructor" => AbiEntry::Constructor {
                inputs: self.inputs,
                state_mutability,
            },
            "fallback" => AbiEntry::Fallback { state_mutability },
            "receive" => AbiEntry::Receive {
                state_mutability: StateMutability::Payable,
            },
            other => {
                return Err(AbiError::MalformedAbi(format!(
                    "entry {} has unknown type \"{}\"",
                    index, other
                )))
            }
        };

        validate_types(&entry, index)?;
        Ok(entry)
    }
}

fn required_name(name: Option<String>, kind: &str, index: usize) -> Result<String> {
    match name {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(AbiError::MalformedAbi(format!(
            "{} entry {} has no name",
            kind, index
        ))),
    }
}

fn validate_types(entry: &AbiEntry, index: usize) -> Result<()> {
    let params: Vec<&AbiParam> = match entry {
        AbiEntry::Function(f) => f.inputs.iter().chain(f.outputs.iter()).collect(),
        AbiEntry::Event(e) => e.inputs.iter().collect(),
        AbiEntry::Error(e) => e.inputs.iter().collect(),
        AbiEntry::Constructor { inputs, .. } => inputs.iter().collect(),
        AbiEntry::Fallback { .. } | AbiEntry::Receive { .. } => Vec::new(),
    };
    for param in params {
        param.param_type().map_err(|e| {
            AbiError::MalformedAbi(format!("entry {} parameter \"{}\": {}", index, param.name, e))
        })?;
    }
    Ok(())
}

//! ABI types as Rust types in generated code

use abibind_abi::{AbiError, AbiParam, ParamType};

/// Largest tuple the runtime converts to and from Rust tuples
pub const MAX_TUPLE_LEN: usize = 12;

/// How one ABI parameter type appears in generated code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiTypeDescriptor {
    /// Resolved ABI type
    pub param: ParamType,
    /// Canonical ABI spelling (`uint256`, `(address,bool)[]`)
    pub canonical: String,
    /// Rust type the binding exposes
    pub rust_type: String,
    /// Rust expression that builds `param` at runtime
    pub codec: String,
}

/// Maps ABI types to Rust types under a runtime crate path
#[derive(Debug, Clone)]
pub struct TypeMapper {
    runtime: String,
}

impl TypeMapper {
    /// Mapper emitting paths under `runtime` (e.g. `::abibind_runtime`)
    pub fn new(runtime: &str) -> Self {
        Self {
            runtime: runtime.trim_end_matches("::").to_string(),
        }
    }

    /// Runtime crate path
    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    /// `{runtime}::{item}`
    pub fn path(&self, item: &str) -> String {
        format!("{}::{}", self.runtime, item)
    }

    /// Descriptor for a JSON ABI parameter
    pub fn descriptor(&self, param: &AbiParam) -> Result<AbiTypeDescriptor, AbiError> {
        self.describe(&param.param_type()?)
    }

    /// Descriptor for an indexed event parameter.
    ///
    /// Only value types survive in topics; everything else is exposed as the
    /// `H256` hash the log carries.
    pub fn indexed_descriptor(&self, param: &AbiParam) -> Result<AbiTypeDescriptor, AbiError> {
        let mut descriptor = self.descriptor(param)?;
        if !descriptor.param.is_value_type() {
            descriptor.rust_type = self.path("H256");
        }
        Ok(descriptor)
    }

    /// Descriptor for a resolved type
    pub fn describe(&self, param: &ParamType) -> Result<AbiTypeDescriptor, AbiError> {
        Ok(AbiTypeDescriptor {
            param: param.clone(),
            canonical: param.to_string(),
            rust_type: self.rust_type(param)?,
            codec: self.codec(param),
        })
    }

    /// Rust type for `param`
    pub fn rust_type(&self, param: &ParamType) -> Result<String, AbiError> {
        let ty = match param {
            ParamType::Address => self.path("Address"),
            ParamType::Bool => "bool".to_string(),
            ParamType::Uint(bits) => match bits {
                0..=8 => "u8".to_string(),
                9..=16 => "u16".to_string(),
                17..=32 => "u32".to_string(),
                33..=64 => "u64".to_string(),
                65..=128 => "u128".to_string(),
                _ => self.path("U256"),
            },
            ParamType::Int(bits) => match bits {
                0..=8 => "i8".to_string(),
                9..=16 => "i16".to_string(),
                17..=32 => "i32".to_string(),
                33..=64 => "i64".to_string(),
                65..=128 => "i128".to_string(),
                _ => self.path("I256"),
            },
            ParamType::FixedBytes(n) => format!("{}<{}>", self.path("FixedBytes"), n),
            ParamType::Bytes => self.path("Bytes"),
            ParamType::String => "String".to_string(),
            ParamType::Array(inner) => format!("Vec<{}>", self.rust_type(inner)?),
            ParamType::FixedArray(inner, len) => format!("[{}; {}]", self.rust_type(inner)?, len),
            ParamType::Tuple(components) => {
                if components.len() > MAX_TUPLE_LEN {
                    return Err(AbiError::UnsupportedType(format!(
                        "{}: tuples are limited to {} components",
                        param, MAX_TUPLE_LEN
                    )));
                }
                let parts = components
                    .iter()
                    .map(|c| self.rust_type(c))
                    .collect::<Result<Vec<_>, _>>()?;
                tuple_type(&parts)
            }
        };
        Ok(ty)
    }

    /// Expression rebuilding `param` as a runtime `ParamType`
    pub fn codec(&self, param: &ParamType) -> String {
        let base = self.path("ParamType");
        match param {
            ParamType::Address => format!("{}::Address", base),
            ParamType::Bool => format!("{}::Bool", base),
            ParamType::Uint(bits) => format!("{}::Uint({})", base, bits),
            ParamType::Int(bits) => format!("{}::Int({})", base, bits),
            ParamType::FixedBytes(n) => format!("{}::FixedBytes({})", base, n),
            ParamType::Bytes => format!("{}::Bytes", base),
            ParamType::String => format!("{}::String", base),
            ParamType::Array(inner) => {
                format!("{}::Array(Box::new({}))", base, self.codec(inner))
            }
            ParamType::FixedArray(inner, len) => {
                format!("{}::FixedArray(Box::new({}), {})", base, self.codec(inner), len)
            }
            ParamType::Tuple(components) => {
                let parts: Vec<String> = components.iter().map(|c| self.codec(c)).collect();
                format!("{}::Tuple(vec![{}])", base, parts.join(", "))
            }
        }
    }
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self::new(crate::DEFAULT_RUNTIME_PATH)
    }
}

/// Rust tuple type from its element types; one element keeps the trailing comma
pub fn tuple_type(parts: &[String]) -> String {
    match parts {
        [single] => format!("({},)", single),
        _ => format!("({})", parts.join(", ")),
    }
}

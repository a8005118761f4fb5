//! ABI parameter types and their canonical spelling

use std::fmt;
use std::str::FromStr;

use crate::error::{AbiError, Result};

/// Solidity parameter types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Address
    Address,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Boolean
    Bool,
    /// Dynamic bytes
    Bytes,
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// UTF-8 string
    String,
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
    /// Tuple
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Parse a type string such as `uint256`, `bytes32[]` or `(address,uint8)[2]`.
    ///
    /// `uint`/`int` normalize to 256 bits and `byte` to `bytes1`. The JSON
    /// spelling `tuple` needs its components; use [`ParamType::resolve`].
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AbiError::UnsupportedType("empty type".to_string()));
        }

        let (base, suffix) = if s.starts_with('(') {
            let close = matching_paren(s)
                .ok_or_else(|| AbiError::UnsupportedType(s.to_string()))?;
            let members = split_top_level(&s[1..close])
                .into_iter()
                .map(ParamType::parse)
                .collect::<Result<Vec<_>>>()?;
            (ParamType::Tuple(members), &s[close + 1..])
        } else {
            let split = s.find('[').unwrap_or(s.len());
            (parse_elementary(&s[..split])?, &s[split..])
        };

        apply_array_suffix(base, suffix, s)
    }

    /// Resolve a JSON ABI `type` field, substituting `components` for the
    /// `tuple` keyword (`tuple`, `tuple[]`, `tuple[3][]`, ...)
    pub fn resolve(ty: &str, components: &[ParamType]) -> Result<Self> {
        let ty = ty.trim();
        match ty.strip_prefix("tuple") {
            Some(suffix) if suffix.is_empty() || suffix.starts_with('[') => {
                apply_array_suffix(ParamType::Tuple(components.to_vec()), suffix, ty)
            }
            _ => ParamType::parse(ty),
        }
    }

    /// Check if this type is dynamic (variable length)
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(types) => types.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }

    /// Elementary value types fit in one word and are stored verbatim in
    /// event topics; everything else is hashed when indexed.
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            ParamType::Address
                | ParamType::Uint(_)
                | ParamType::Int(_)
                | ParamType::Bool
                | ParamType::FixedBytes(_)
        )
    }

    /// Number of bytes this type occupies in the head of an encoding.
    ///
    /// Fails when a static fixed array is too large for its head to be
    /// addressed.
    pub fn head_length(&self) -> Result<usize> {
        match self {
            ParamType::FixedArray(inner, size) if !inner.is_dynamic() => inner
                .head_length()?
                .checked_mul(*size)
                .ok_or_else(|| AbiError::UnsupportedType(self.to_string())),
            ParamType::Tuple(types) if !self.is_dynamic() => head_size(types),
            _ => Ok(32),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Int(bits) => write!(f, "int{}", bits),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::FixedBytes(size) => write!(f, "bytes{}", size),
            ParamType::String => write!(f, "string"),
            ParamType::Array(inner) => write!(f, "{}[]", inner),
            ParamType::FixedArray(inner, size) => write!(f, "{}[{}]", inner, size),
            ParamType::Tuple(types) => {
                write!(f, "(")?;
                for (i, t) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl FromStr for ParamType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self> {
        ParamType::parse(s)
    }
}

fn parse_elementary(s: &str) -> Result<ParamType> {
    let unsupported = || AbiError::UnsupportedType(s.to_string());

    match s {
        "address" => return Ok(ParamType::Address),
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "bytes" => return Ok(ParamType::Bytes),
        "byte" => return Ok(ParamType::FixedBytes(1)),
        "uint" => return Ok(ParamType::Uint(256)),
        "int" => return Ok(ParamType::Int(256)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("uint") {
        return integer_width(rest).map(ParamType::Uint).ok_or_else(unsupported);
    }
    if let Some(rest) = s.strip_prefix("int") {
        return integer_width(rest).map(ParamType::Int).ok_or_else(unsupported);
    }
    if let Some(rest) = s.strip_prefix("bytes") {
        return parse_size(rest)
            .filter(|n| (1..=32).contains(n))
            .map(ParamType::FixedBytes)
            .ok_or_else(unsupported);
    }

    Err(unsupported())
}

/// Integer widths are 8..=256 in steps of 8
fn integer_width(s: &str) -> Option<usize> {
    parse_size(s).filter(|bits| *bits <= 256 && bits % 8 == 0)
}

/// Strict decimal: digits only, no sign, no leading zero, non-zero
fn parse_size(s: &str) -> Option<usize> {
    if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Combined head length of a parameter list
pub(crate) fn head_size(types: &[ParamType]) -> Result<usize> {
    types.iter().try_fold(0usize, |total, ty| {
        total
            .checked_add(ty.head_length()?)
            .ok_or_else(|| AbiError::UnsupportedType(ParamType::Tuple(types.to_vec()).to_string()))
    })
}

fn apply_array_suffix(base: ParamType, suffix: &str, full: &str) -> Result<ParamType> {
    let unsupported = || AbiError::UnsupportedType(full.to_string());

    let mut ty = base;
    let mut rest = suffix;
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[').ok_or_else(unsupported)?;
        let close = inner.find(']').ok_or_else(unsupported)?;
        let dim = &inner[..close];
        ty = if dim.is_empty() {
            ParamType::Array(Box::new(ty))
        } else {
            let size = parse_size(dim).ok_or_else(unsupported)?;
            let array = ParamType::FixedArray(Box::new(ty), size);
            array.head_length().map_err(|_| unsupported())?;
            array
        };
        rest = &inner[close + 1..];
    }
    Ok(ty)
}

/// Index of the parenthesis closing the one at position 0
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas that are not nested inside parentheses
fn split_top_level(s: &str) -> Vec<&str> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

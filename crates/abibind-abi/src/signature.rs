//! Canonical signatures and overload disambiguation

use std::collections::HashSet;

use crate::error::{AbiError, Result};
use crate::types::ParamType;

/// `name(t1,t2,...)` with canonical type spelling
pub fn canonical_signature(name: &str, types: &[ParamType]) -> String {
    let params: Vec<String> = types.iter().map(ParamType::to_string).collect();
    format!("{}({})", name, params.join(","))
}

/// Fail if any signature appears twice in one entry category
pub fn check_duplicates(kind: &'static str, signatures: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(signatures.len());
    for signature in signatures {
        if !seen.insert(signature.as_str()) {
            return Err(AbiError::DuplicateSignature {
                kind,
                signature: signature.clone(),
            });
        }
    }
    Ok(())
}

/// A declared name plus the overload suffix assigned to it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverloadName {
    /// Name as declared in the ABI
    pub base: String,
    /// `None` for the first occurrence, `Some(n)` for later overloads
    pub suffix: Option<usize>,
}

impl OverloadName {
    /// Base name with the suffix appended directly (`safeTransferFrom0`)
    pub fn joined(&self) -> String {
        match self.suffix {
            Some(n) => format!("{}{}", self.base, n),
            None => self.base.clone(),
        }
    }
}

/// Assign identifiers to one entry category, in source order.
///
/// The first occurrence of a name keeps it bare; each later occurrence gets
/// the next free zero-based suffix. A suffix whose joined form collides with
/// another name of the category is skipped.
pub fn disambiguate<'a, I>(names: I) -> Vec<OverloadName>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: Vec<&str> = names.into_iter().collect();
    let mut taken: HashSet<String> = names.iter().map(|n| n.to_string()).collect();
    let mut first_seen: HashSet<&str> = HashSet::new();
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        if first_seen.insert(name) {
            result.push(OverloadName {
                base: name.to_string(),
                suffix: None,
            });
            continue;
        }

        let mut n = 0;
        while taken.contains(&format!("{}{}", name, n)) {
            n += 1;
        }
        taken.insert(format!("{}{}", name, n));
        result.push(OverloadName {
            base: name.to_string(),
            suffix: Some(n),
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use abibind_crypto::function_selector;

    #[test]
    fn test_canonical_signature() {
        let types = vec![
            ParamType::Address,
            ParamType::parse("uint").unwrap(),
            ParamType::parse("(bool,byte)[]").unwrap(),
        ];
        assert_eq!(
            canonical_signature("f", &types),
            "f(address,uint256,(bool,bytes1)[])"
        );
        assert_eq!(canonical_signature("name", &[]), "name()");
    }

    #[test]
    fn test_check_duplicates() {
        let sigs = vec!["a()".to_string(), "b()".to_string()];
        assert!(check_duplicates("function", &sigs).is_ok());

        let dup = vec!["a()".to_string(), "a()".to_string()];
        assert!(matches!(
            check_duplicates("event", &dup),
            Err(AbiError::DuplicateSignature { kind: "event", .. })
        ));
    }

    // ==================== Overloads ====================

    #[test]
    fn test_disambiguate_overloads() {
        let names = disambiguate(["safeTransferFrom", "approve", "safeTransferFrom"]);
        assert_eq!(names[0].joined(), "safeTransferFrom");
        assert_eq!(names[1].joined(), "approve");
        assert_eq!(names[2].joined(), "safeTransferFrom0");
        assert_eq!(names[2].suffix, Some(0));
    }

    #[test]
    fn test_disambiguate_three_way() {
        let names = disambiguate(["f", "f", "f"]);
        let joined: Vec<_> = names.iter().map(OverloadName::joined).collect();
        assert_eq!(joined, vec!["f", "f0", "f1"]);
    }

    #[test]
    fn test_disambiguate_skips_taken_suffix() {
        let names = disambiguate(["f", "f0", "f"]);
        let joined: Vec<_> = names.iter().map(OverloadName::joined).collect();
        assert_eq!(joined, vec!["f", "f0", "f1"]);
    }

    #[test]
    fn test_overloads_keep_distinct_selectors() {
        let first = canonical_signature(
            "safeTransferFrom",
            &[ParamType::Address, ParamType::Address, ParamType::Uint(256)],
        );
        let second = canonical_signature(
            "safeTransferFrom",
            &[
                ParamType::Address,
                ParamType::Address,
                ParamType::Uint(256),
                ParamType::Bytes,
            ],
        );
        assert_ne!(function_selector(&first), function_selector(&second));
    }
}

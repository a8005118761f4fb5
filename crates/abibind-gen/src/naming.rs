//! Rust identifiers for ABI names

use std::collections::HashSet;

use abibind_abi::OverloadName;

/// Rust keywords (strict and reserved) that cannot be plain identifiers
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "union", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Whether `ident` is a Rust keyword
pub fn is_keyword(ident: &str) -> bool {
    KEYWORDS.contains(&ident)
}

/// `balanceOf` -> `balance_of`, `tokenURI` -> `token_uri`,
/// `ERC721InvalidOwner` -> `erc721_invalid_owner`
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).map_or(false, |n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower);
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.push(c.to_ascii_lowercase());
    }

    out.trim_end_matches('_').to_string()
}

/// `reg_store` -> `RegStore`, `registry-relay` -> `RegistryRelay`.
/// Capitals inside a word are kept.
pub fn pascal_case(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `safeTransferFrom` -> `SAFE_TRANSFER_FROM`
pub fn screaming_snake_case(name: &str) -> String {
    snake_case(name).to_ascii_uppercase()
}

/// Snake-case accessor name with its overload suffix (`safe_transfer_from_0`)
pub fn method_name(name: &OverloadName) -> String {
    escape(&with_suffix(snake_case(&name.base), name.suffix, "_"))
}

/// Constant name with its overload suffix (`SAFE_TRANSFER_FROM_0`)
pub fn constant_name(name: &OverloadName) -> String {
    with_suffix(screaming_snake_case(&name.base), name.suffix, "_")
}

/// Type name with its overload suffix (`Transfer0`)
pub fn type_name(name: &OverloadName) -> String {
    with_suffix(pascal_case(&name.base), name.suffix, "")
}

fn with_suffix(ident: String, suffix: Option<usize>, separator: &str) -> String {
    match suffix {
        Some(n) => format!("{}{}{}", ident, separator, n),
        None => ident,
    }
}

/// Make a snake-case name usable as an identifier
pub fn escape(ident: &str) -> String {
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("n{}", ident)
    } else if is_keyword(ident) {
        format!("{}_", ident)
    } else {
        ident.to_string()
    }
}

/// Argument or field names for an ordered parameter list.
///
/// Empty names become `arg0`, `arg1`, ... by position. Names listed in
/// `reserved` get a trailing underscore; repeated names get the position
/// appended.
pub fn param_names<'a, I>(names: I, reserved: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut used = HashSet::new();
    let mut result = Vec::new();

    for (i, name) in names.into_iter().enumerate() {
        let base = snake_case(name);
        let mut ident = if base.is_empty() {
            format!("arg{}", i)
        } else {
            escape(&base)
        };
        if reserved.contains(&ident.as_str()) {
            ident.push('_');
        }
        if used.contains(&ident) {
            ident = format!("{}_{}", ident.trim_end_matches('_'), i);
        }
        used.insert(ident.clone());
        result.push(ident);
    }
    result
}

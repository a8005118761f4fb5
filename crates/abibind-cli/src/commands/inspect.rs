//! `selectors` and `find-error` commands

use std::path::PathBuf;

use abibind_abi::AbiDocument;
use clap::Args;
use serde_json::{json, Value};

use super::read_abi;
use crate::{config::Config, output::Output, CliError};

/// Revert payloads every contract can produce
const BUILTIN_ERRORS: &[(&str, [u8; 4])] = &[
    ("Error(string)", [0x08, 0xc3, 0x79, 0xa0]),
    ("Panic(uint256)", [0x4e, 0x48, 0x7b, 0x71]),
];

/// Arguments of `abibind selectors`
#[derive(Debug, Args)]
pub struct SelectorsArgs {
    /// ABI JSON file
    pub abi: PathBuf,
}

impl SelectorsArgs {
    /// List function selectors, event topics and error selectors
    pub fn execute(self, _config: &Config, json: bool) -> Result<(), CliError> {
        let doc = read_abi(&self.abi)?;
        let mut lines = Vec::new();

        let mut functions = Vec::new();
        for function in doc.functions() {
            let signature = function.signature()?;
            let selector = hex::encode(function.selector()?);
            lines.push(format!("function 0x{}  {}", selector, signature));
            functions.push(json!({ "signature": signature, "selector": format!("0x{}", selector) }));
        }

        let mut events = Vec::new();
        for event in doc.events() {
            let signature = event.signature()?;
            let topic = event.topic()?.to_hex();
            let kind = if event.anonymous { "event*" } else { "event" };
            lines.push(format!("{:<8} {}  {}", kind, topic, signature));
            events.push(json!({
                "signature": signature,
                "topic": topic,
                "anonymous": event.anonymous,
            }));
        }

        let errors = error_rows(&doc)?;
        for (signature, selector) in &errors {
            lines.push(format!("error    {}  {}", selector, signature));
        }

        Output::new(json)
            .field_value("functions", Value::from(functions))
            .field_value("events", Value::from(events))
            .field_value("errors", rows_json(&errors))
            .lines(lines)
            .print();
        Ok(())
    }
}

/// Arguments of `abibind find-error`
#[derive(Debug, Args)]
pub struct FindErrorArgs {
    /// ABI JSON file
    pub abi: PathBuf,
    /// Error selector or revert data (hex, `0x` optional); a prefix is enough
    pub selector: Option<String>,
}

impl FindErrorArgs {
    /// List error selectors, or name the error matching `selector`
    pub fn execute(self, _config: &Config, json: bool) -> Result<(), CliError> {
        let doc = read_abi(&self.abi)?;
        let errors = error_rows(&doc)?;

        let query = match self.selector {
            None => {
                Output::new(json)
                    .field_value("errors", rows_json(&errors))
                    .lines(
                        errors
                            .iter()
                            .map(|(sig, sel)| format!("Found error type: {} with selector: {}", sig, sel)),
                    )
                    .print();
                return Ok(());
            }
            Some(selector) => normalize_selector(&selector)?,
        };

        let builtin = BUILTIN_ERRORS
            .iter()
            .map(|(sig, sel)| (sig.to_string(), format!("0x{}", hex::encode(sel))));
        let found = errors
            .into_iter()
            .chain(builtin)
            .find(|(_, selector)| selector.starts_with(&query));

        match found {
            Some((signature, selector)) => {
                Output::new(json)
                    .field("signature", &signature)
                    .field("selector", &selector)
                    .line(format!("Matched Error: {} -> {}", signature, selector))
                    .print();
                Ok(())
            }
            None => Err(CliError::NotFound(format!(
                "No matching error found for selector {}",
                query
            ))),
        }
    }
}

/// `(signature, 0x-selector)` for every custom error, in declaration order
fn error_rows(doc: &AbiDocument) -> Result<Vec<(String, String)>, CliError> {
    doc.errors()
        .map(|error| {
            Ok((
                error.signature()?,
                format!("0x{}", hex::encode(error.selector()?)),
            ))
        })
        .collect()
}

fn rows_json(rows: &[(String, String)]) -> Value {
    Value::from(
        rows.iter()
            .map(|(signature, selector)| json!({ "signature": signature, "selector": selector }))
            .collect::<Vec<_>>(),
    )
}

/// Lowercase `0x`-prefixed selector prefix; revert data is cut to 4 bytes
fn normalize_selector(input: &str) -> Result<String, CliError> {
    let digits = input.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits)
        .to_ascii_lowercase();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CliError::InvalidInput(format!("not a hex selector: {}", input)));
    }
    let end = digits.len().min(8);
    Ok(format!("0x{}", &digits[..end]))
}

//! Subcommand implementations

pub mod generate;
pub mod inspect;

use std::path::Path;

use abibind_abi::AbiDocument;

use crate::CliError;

/// Read and parse one ABI file
pub(crate) fn read_abi(path: &Path) -> Result<AbiDocument, CliError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| CliError::InvalidInput(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(AbiDocument::parse(&json)?)
}

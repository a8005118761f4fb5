//! CLI error types

use std::path::PathBuf;

use abibind_abi::AbiError;
use abibind_gen::GenError;
use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Generation failed
    #[error(transparent)]
    Gen(#[from] GenError),

    /// ABI could not be parsed
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Nothing matched the query
    #[error("{0}")]
    NotFound(String),

    /// Generated files differ from their ABIs
    #[error("Bindings out of date: {}", format_paths(.0))]
    Stale(Vec<PathBuf>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

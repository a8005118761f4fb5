//! Generator error types

use std::path::PathBuf;

use abibind_abi::AbiError;
use thiserror::Error;

/// Errors raised while generating bindings
#[derive(Debug, Error)]
pub enum GenError {
    /// The ABI could not be parsed or mapped to Rust types
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// The contract name yields no usable Rust identifier
    #[error("invalid contract name: {0:?}")]
    InvalidName(String),

    /// Two ABI files resolve to the same output module
    #[error("{} and {} both generate module `{module}`", .first.display(), .second.display())]
    DuplicateModule {
        /// Module name both files map to
        module: String,
        /// First ABI file
        first: PathBuf,
        /// ABI file that collided with it
        second: PathBuf,
    },

    /// Reading an ABI file or writing generated source failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}

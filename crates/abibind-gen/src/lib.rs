//! # abibind-gen
//!
//! Generates typed Rust bindings from Ethereum contract ABIs.
//!
//! Each ABI produces one self-contained module holding:
//!
//! - `ABI` (and `BYTECODE` for compiler artifacts)
//! - `selectors`, `topics` and `error_selectors` constant modules
//! - a binder struct with `Caller`, `Transactor` and `Filterer` views
//! - one struct per event and an `Errors` enum for custom errors
//!
//! The emitted code only depends on the runtime crate (`abibind-runtime`
//! by default) and is meant to be pulled in with `include!`.
//!
//! ## Example
//!
//! ```rust
//! let abi = r#"[{"type":"function","name":"totalSupply","stateMutability":"view",
//!                "inputs":[],"outputs":[{"name":"","type":"uint256"}]}]"#;
//!
//! let source = abibind_gen::generate("Token", abi, None).unwrap();
//! assert!(source.contains("pub struct Token {"));
//! assert!(source.contains("pub async fn total_supply("));
//! assert!(source.contains("pub const TOTAL_SUPPLY: [u8; 4] = [0x18, 0x16, 0x0d, 0xdd];"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod binding;
mod emit;
mod error;
mod naming;
mod types;

use std::fs;
use std::path::{Path, PathBuf};

use abibind_abi::AbiDocument;
use tracing::{debug, info};

pub use binding::{ContractBinding, ErrorBinding, EventBinding, FunctionBinding, ParamBinding};
pub use emit::{render_index, HEADER};
pub use error::GenError;
pub use naming::{pascal_case, snake_case};
pub use types::{AbiTypeDescriptor, TypeMapper, MAX_TUPLE_LEN};

/// Runtime crate path used when none is configured
pub const DEFAULT_RUNTIME_PATH: &str = "::abibind_runtime";

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GenError>;

/// Parse `abi_json` and resolve the binding model for contract `name`
pub fn bind(name: &str, abi_json: &str, runtime_path: Option<&str>) -> Result<ContractBinding> {
    let doc = AbiDocument::parse(abi_json)?;
    let mapper = TypeMapper::new(runtime_path.unwrap_or(DEFAULT_RUNTIME_PATH));
    let binding = ContractBinding::new(name, &doc, &mapper)?;
    debug!(
        contract = %binding.name,
        functions = binding.functions.len(),
        events = binding.events.len(),
        errors = binding.errors.len(),
        "Resolved binding"
    );
    Ok(binding)
}

/// Generate the binding module source for contract `name`.
///
/// Output is a pure function of the inputs.
pub fn generate(name: &str, abi_json: &str, runtime_path: Option<&str>) -> Result<String> {
    Ok(bind(name, abi_json, runtime_path)?.render())
}

/// Contract name derived from an ABI file name (`RegStore.json` -> `RegStore`)
pub fn contract_name(abi_path: &Path) -> Result<String> {
    let stem = abi_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| GenError::InvalidName(abi_path.display().to_string()))?;
    // `Foo.abi.json` and similar
    let stem = stem.split('.').next().unwrap_or(stem);
    let name = pascal_case(stem);
    if name.is_empty() {
        return Err(GenError::InvalidName(stem.to_string()));
    }
    Ok(name)
}

/// Generate bindings for one ABI file into `out_dir/{module}.rs`.
///
/// `name` defaults to the file stem. Returns the written path.
pub fn generate_file(
    abi_path: &Path,
    name: Option<&str>,
    out_dir: &Path,
    runtime_path: Option<&str>,
) -> Result<PathBuf> {
    let binding = bind_file(abi_path, name, runtime_path)?;
    write_binding(abi_path, &binding, out_dir)
}

/// Generate every ABI in `abi_paths` plus a `mod.rs` declaring them.
///
/// All ABIs are resolved before anything is written; two files mapping to
/// the same module are rejected. Returns the written module files, `mod.rs`
/// last.
pub fn generate_all(
    abi_paths: &[PathBuf],
    out_dir: &Path,
    runtime_path: Option<&str>,
) -> Result<Vec<PathBuf>> {
    let mut bindings: Vec<(&Path, ContractBinding)> = Vec::with_capacity(abi_paths.len());
    for abi_path in abi_paths {
        let binding = bind_file(abi_path, None, runtime_path)?;
        if let Some((first, _)) = bindings.iter().find(|(_, b)| b.module == binding.module) {
            return Err(GenError::DuplicateModule {
                module: binding.module,
                first: first.to_path_buf(),
                second: abi_path.clone(),
            });
        }
        bindings.push((abi_path.as_path(), binding));
    }

    let mut written = Vec::with_capacity(bindings.len() + 1);
    for (abi_path, binding) in &bindings {
        written.push(write_binding(abi_path, binding, out_dir)?);
    }

    let modules: Vec<String> = bindings.into_iter().map(|(_, b)| b.module).collect();
    let index_path = out_dir.join("mod.rs");
    write_if_changed(&index_path, &render_index(&modules))?;
    written.push(index_path);
    Ok(written)
}

fn bind_file(
    abi_path: &Path,
    name: Option<&str>,
    runtime_path: Option<&str>,
) -> Result<ContractBinding> {
    let abi_json = fs::read_to_string(abi_path).map_err(|e| GenError::io(abi_path, e))?;
    let name = match name {
        Some(name) => name.to_string(),
        None => contract_name(abi_path)?,
    };
    bind(&name, &abi_json, runtime_path)
}

fn write_binding(abi_path: &Path, binding: &ContractBinding, out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir).map_err(|e| GenError::io(out_dir, e))?;
    let out_path = out_dir.join(format!("{}.rs", binding.module));
    write_if_changed(&out_path, &binding.render())?;

    info!(
        abi = %abi_path.display(),
        output = %out_path.display(),
        contract = %binding.name,
        "Generated binding"
    );
    Ok(out_path)
}

/// Write `contents` unless `path` already holds exactly that text.
///
/// Returns whether the file was written. Unchanged output keeps its mtime,
/// so build scripts watching it do not retrigger.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<bool> {
    if let Ok(existing) = fs::read_to_string(path) {
        if existing == contents {
            debug!(path = %path.display(), "Output unchanged");
            return Ok(false);
        }
    }
    fs::write(path, contents).map_err(|e| GenError::io(path, e))?;
    Ok(true)
}

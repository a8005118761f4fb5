// Generates the contract bindings from the shared `abis/` directory.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

const CONTRACTS: &[&str] = &["RegStore", "RegRelay", "PaymentFactory"];

fn main() -> Result<()> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let abi_dir = manifest_dir.join("../../abis");
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    let inputs: Vec<PathBuf> = CONTRACTS
        .iter()
        .map(|name| abi_dir.join(format!("{}.json", name)))
        .collect();
    for input in &inputs {
        println!("cargo:rerun-if-changed={}", input.display());
    }

    abibind_gen::generate_all(&inputs, &out_dir, None)
        .with_context(|| format!("generating bindings from {}", abi_dir.display()))?;
    Ok(())
}

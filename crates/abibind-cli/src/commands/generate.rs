//! `generate` and `check` commands

use std::fs;
use std::path::{Path, PathBuf};

use abibind_gen::{
    bind, contract_name, generate_all, generate_file, render_index, write_if_changed,
};
use clap::Args;
use serde_json::Value;

use crate::{config::Config, output::Output, CliError};

/// Arguments of `abibind generate`
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// ABI JSON files (plain arrays or compiler artifacts)
    #[arg(required = true)]
    pub abis: Vec<PathBuf>,
    /// Output directory [default: from config]
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    /// Contract name; only valid with a single ABI [default: file stem]
    #[arg(long)]
    pub name: Option<String>,
    /// Runtime crate path used by the generated code [default: from config]
    #[arg(long)]
    pub runtime_path: Option<String>,
}

impl GenerateArgs {
    /// Write one module per ABI plus a `mod.rs` listing them
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        check_single_abi(self.name.as_deref(), &self.abis)?;
        let out_dir = self.out_dir.unwrap_or_else(|| config.out_dir.clone());
        let runtime = self
            .runtime_path
            .unwrap_or_else(|| config.runtime_path.clone());

        let written = match &self.name {
            Some(name) => {
                let path = generate_file(&self.abis[0], Some(name), &out_dir, Some(&runtime))?;
                let index = out_dir.join("mod.rs");
                write_if_changed(&index, &render_index(&[module_of(&path)]))?;
                vec![path, index]
            }
            None => generate_all(&self.abis, &out_dir, Some(&runtime))?,
        };

        let paths: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
        Output::new(json)
            .field("out_dir", &out_dir.display().to_string())
            .field_value("files", Value::from(paths.clone()))
            .lines(paths.iter().map(|p| format!("wrote {}", p)))
            .print();
        Ok(())
    }
}

/// Arguments of `abibind check`
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// ABI JSON files the bindings were generated from
    #[arg(required = true)]
    pub abis: Vec<PathBuf>,
    /// Directory holding the generated bindings [default: from config]
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    /// Contract name the bindings were generated with; only valid with a single ABI
    #[arg(long)]
    pub name: Option<String>,
    /// Runtime crate path the bindings were generated with [default: from config]
    #[arg(long)]
    pub runtime_path: Option<String>,
}

impl CheckArgs {
    /// Regenerate in memory and compare with the files on disk
    pub fn execute(self, config: &Config, json: bool) -> Result<(), CliError> {
        check_single_abi(self.name.as_deref(), &self.abis)?;
        let out_dir = self.out_dir.unwrap_or_else(|| config.out_dir.clone());
        let runtime = self
            .runtime_path
            .unwrap_or_else(|| config.runtime_path.clone());

        let mut stale = Vec::new();
        let mut modules = Vec::with_capacity(self.abis.len());
        for abi in &self.abis {
            let abi_json = fs::read_to_string(abi).map_err(|e| {
                CliError::InvalidInput(format!("cannot read {}: {}", abi.display(), e))
            })?;
            let name = match &self.name {
                Some(name) => name.clone(),
                None => contract_name(abi)?,
            };
            let binding = bind(&name, &abi_json, Some(&runtime))?;
            let path = out_dir.join(format!("{}.rs", binding.module));
            if !matches_disk(&path, &binding.render()) {
                stale.push(path);
            }
            modules.push(binding.module);
        }

        let index = out_dir.join("mod.rs");
        if !matches_disk(&index, &render_index(&modules)) {
            stale.push(index);
        }

        if !stale.is_empty() {
            tracing::debug!(count = stale.len(), "Stale bindings");
            return Err(CliError::Stale(stale));
        }

        Output::new(json)
            .field("status", "up-to-date")
            .field_value("checked", Value::from(modules.len()))
            .line(format!("{} binding(s) up to date", modules.len()))
            .print();
        Ok(())
    }
}

fn check_single_abi(name: Option<&str>, abis: &[PathBuf]) -> Result<(), CliError> {
    if name.is_some() && abis.len() != 1 {
        return Err(CliError::InvalidInput(
            "--name can only be used with a single ABI".to_string(),
        ));
    }
    Ok(())
}

fn matches_disk(path: &Path, expected: &str) -> bool {
    fs::read_to_string(path).map_or(false, |on_disk| on_disk == expected)
}

fn module_of(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

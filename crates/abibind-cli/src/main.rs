//! # abibind
//!
//! Command-line front end for the abibind binding generator.
//!
//! ## Usage
//!
//! ```bash
//! # Generate bindings (one module per ABI plus mod.rs)
//! abibind generate abis/RegStore.json abis/RegRelay.json --out-dir src/bindings
//! abibind generate artifact.json --name Vault --runtime-path crate::runtime
//!
//! # Fail when generated files no longer match their ABIs
//! abibind check abis/*.json --out-dir src/bindings
//!
//! # Inspect an ABI
//! abibind selectors abis/RegStore.json
//! abibind find-error abis/RegStore.json 0x7e273289
//!
//! # Configuration (~/.abibind/config.toml)
//! abibind config --show
//! abibind config --set-out-dir generated
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// Ethereum ABI binding generator
#[derive(Parser, Debug)]
#[command(name = "abibind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Log filter (e.g. `debug`, `abibind_gen=trace`); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate Rust bindings from ABI files
    Generate(commands::generate::GenerateArgs),
    /// Check that generated bindings match their ABIs
    Check(commands::generate::CheckArgs),
    /// List selectors and topics of an ABI
    Selectors(commands::inspect::SelectorsArgs),
    /// List custom errors or find the one matching a selector
    FindError(commands::inspect::FindErrorArgs),
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set the default output directory
        #[arg(long)]
        set_out_dir: Option<std::path::PathBuf>,
        /// Set the default runtime crate path
        #[arg(long)]
        set_runtime_path: Option<String>,
    },
}

fn init_logging(cli_level: Option<&str>, config: &Config) {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let (mut config, load_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_logging(cli.log_level.as_deref(), &config);
    if let Some(e) = load_error {
        tracing::warn!(error = %e, "Ignoring unreadable config");
    }
    tracing::debug!(?config, "Loaded configuration");

    let result = match cli.command {
        Commands::Generate(args) => args.execute(&config, cli.json),
        Commands::Check(args) => args.execute(&config, cli.json),
        Commands::Selectors(args) => args.execute(&config, cli.json),
        Commands::FindError(args) => args.execute(&config, cli.json),
        Commands::Config {
            show,
            set_out_dir,
            set_runtime_path,
        } => handle_config(&mut config, show, set_out_dir, set_runtime_path, cli.json),
    };

    if let Err(e) = result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn handle_config(
    config: &mut Config,
    show: bool,
    set_out_dir: Option<std::path::PathBuf>,
    set_runtime_path: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(out_dir) = set_out_dir {
        config.out_dir = out_dir;
        modified = true;
    }

    if let Some(runtime_path) = set_runtime_path {
        if runtime_path.trim().is_empty() {
            return Err(CliError::Config("runtime path cannot be empty".to_string()));
        }
        config.runtime_path = runtime_path;
        modified = true;
    }

    if modified {
        let path = config.save()?;
        Output::new(json)
            .field("status", "saved")
            .field("path", &path.display().to_string())
            .line(format!("Configuration saved to {}", path.display()))
            .print();
    } else if show {
        Output::new(json)
            .field("out_dir", &config.out_dir.display().to_string())
            .field("runtime_path", &config.runtime_path)
            .field("log_level", &config.log_level)
            .line(format!("Output dir:   {}", config.out_dir.display()))
            .line(format!("Runtime path: {}", config.runtime_path))
            .line(format!("Log level:    {}", config.log_level))
            .print();
    } else {
        Output::new(json)
            .line("Use --show to display config, or --set-out-dir/--set-runtime-path to modify")
            .print();
    }

    Ok(())
}

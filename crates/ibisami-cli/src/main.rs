//! ibisami CLI: inspect IBIS and IBIS-AMI model files.
//!
//! Thin wrapper over `lib-ibis`; all parsing semantics live there.

mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ibisami")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate an AMI parameter file
    ParseAmi {
        /// Path to the .ami file
        file: PathBuf,
    },

    /// Parse and validate an IBIS file
    ParseIbis {
        /// Path to the .ibs file
        file: PathBuf,
    },

    /// Build the AMI_Init inputs for a model
    AmiInit {
        /// Path to the init configuration file (TOML, or JSON by extension)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::ParseAmi { file } => {
            parse_ami(&file, cli.format)?;
        }
        Commands::ParseIbis { file } => {
            parse_ibis(&file, cli.format)?;
        }
        Commands::AmiInit { config } => {
            ami_init(&config, cli.format)?;
        }
    }

    Ok(())
}

fn parse_ami(file: &Path, format: OutputFormat) -> Result<()> {
    tracing::info!("Parsing AMI file: {:?}", file);

    let ami = lib_ibis::parse_ami_path(file)
        .with_context(|| format!("Failed to parse {:?}", file))?;

    output::print_ami(&ami, format)
}

fn parse_ibis(file: &Path, format: OutputFormat) -> Result<()> {
    tracing::info!("Parsing IBIS file: {:?}", file);

    let ibis = lib_ibis::parse_ibs_path(file)
        .with_context(|| format!("Failed to parse {:?}", file))?;

    output::print_ibis(&ibis, format)
}

fn ami_init(config_path: &Path, format: OutputFormat) -> Result<()> {
    tracing::info!("Loading configuration from {:?}", config_path);

    let config = config::load_config(config_path)?;
    let mut ami = lib_ibis::parse_ami_path(&config.ami)
        .with_context(|| format!("Failed to parse {:?}", config.ami))?;

    if ami.diagnostics.has_errors() {
        tracing::warn!(
            "{:?} has {} error(s); AMI_Init inputs may be incomplete",
            config.ami,
            ami.diagnostics.errors().count()
        );
    }

    config.apply(&mut ami)?;
    let init = ami.initializer(&config.init);

    output::print_init(&init, format)
}

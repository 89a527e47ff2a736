//! clearsign CLI: maintenance tooling for clear-signing descriptors.
//!
//! # Commands
//! ```text
//! clearsign migrate     <path>... [--dry-run] [--json]
//! clearsign check       <file> [--chain-id <id> | --all-chains] [--config <yaml>] [--json]
//! clearsign resolve     <file> [--output <file>]
//! clearsign selector    <signature>
//! clearsign encode-type <file> <primary-type>
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use clearsign_observability::{init_tracing, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cmd_check;
mod cmd_migrate;
mod cmd_tools;

#[derive(Parser)]
#[command(
    name = "clearsign",
    about = "Migrate clear-signing descriptors and check them against deployed contracts",
    long_about = "
clearsign: migrate clear-signing descriptors between schema versions and
verify that their format keys match the ABI of the deployed contracts.

ENVIRONMENT VARIABLES:
  ETHERSCAN_API_KEY   Etherscan v2 API key (used by `check`)
  RUST_LOG            Overrides the log filter
",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate first-version descriptors to the second schema version, in place
    Migrate {
        /// Descriptor files or directories (searched recursively for *.json)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
        /// Print the batch report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check format keys against the deployed contract ABIs
    Check {
        /// Descriptor file (includes are resolved first)
        file: PathBuf,
        /// Chain to check (default: first deployment chain with a usable provider)
        #[arg(long, conflicts_with = "all_chains")]
        chain_id: Option<u64>,
        /// Check every deployment chain, skipping chains without a provider
        #[arg(long)]
        all_chains: bool,
        /// Explorer configuration (YAML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a descriptor with its includes resolved
    Resolve {
        file: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Normalize a function signature and print its selector
    Selector {
        signature: String,
    },

    /// Print the EIP-712 encodeType string and type hash of a type
    #[command(name = "encode-type")]
    EncodeType {
        /// Descriptor or `{ "types": … }` schema file
        file: PathBuf,
        /// Primary type name
        primary: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&LogConfig::for_cli(cli.verbose, cli.log_json));

    match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Migrate { paths, dry_run, json } => cmd_migrate::run(&paths, dry_run, json),

        Commands::Check {
            file,
            chain_id,
            all_chains,
            config,
            json,
        } => cmd_check::run(&file, chain_id, all_chains, config.as_deref(), json).await,

        Commands::Resolve { file, output } => cmd_tools::resolve(&file, output.as_deref()),

        Commands::Selector { signature } => cmd_tools::selector(&signature),

        Commands::EncodeType { file, primary } => cmd_tools::encode_type(&file, &primary),
    }
}

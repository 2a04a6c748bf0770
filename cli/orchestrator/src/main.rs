//! `chia-rpc`: talk to Chia node services from the command line.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;
use std::process::ExitCode;

use chia_rpc_cli::{CliError, Result, DEFAULT_ORIGIN};
use clap::{Parser, Subcommand};

/// Command-line interface configuration for chia-rpc.
#[derive(Parser, Debug)]
#[command(name = "chia-rpc", about = "Client for Chia node services", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
    /// Node root directory (defaults to $CHIA_ROOT or ~/.chia/mainnet)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Log filter, e.g. `info` or `websocket=debug`; RUST_LOG wins when set
    #[arg(long, global = true)]
    log_level: Option<String>,
}

/// Available chia-rpc commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one command to a service and print the reply
    Call {
        /// Service, e.g. `full_node` or `chia_wallet`
        service: String,
        /// Command name, e.g. `get_blockchain_state`
        command: String,
        /// Request data as a JSON object
        #[arg(long)]
        data: Option<String>,
        /// Post to the service's HTTPS server instead of going through the daemon
        #[arg(long)]
        http: bool,
    },
    /// Print messages broadcast by the daemon until interrupted
    Watch {
        /// Name to register with the daemon
        #[arg(long, default_value = "wallet_ui")]
        origin: String,
    },
    /// Generate proxy methods from an OpenAPI document
    Generate {
        /// OpenAPI document, YAML or JSON
        #[arg(long)]
        input: PathBuf,
        /// Proxy type the methods belong to, e.g. `FullNodeProxy`
        #[arg(long)]
        proxy: String,
        /// File to write; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Convert between puzzle hashes and addresses
    Address {
        #[command(subcommand)]
        cmd: AddressCommands,
    },
}

#[derive(Subcommand, Debug)]
enum AddressCommands {
    /// Puzzle hash (hex) to address
    Encode {
        puzzle_hash: String,
        /// Network prefix; defaults to the configured network's, then `xch`
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Address to puzzle hash
    Decode { address: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = chia_rpc_cli::load_config(cli.root.as_deref());
    let level = match (&cli.log_level, &config) {
        (Some(level), _) => level.clone(),
        (None, Ok(config)) => config.log_level().to_string(),
        (None, Err(_)) => "warn".to_string(),
    };
    logging::init(&level, None)?;
    if let Err(e) = &config {
        tracing::debug!("no node configuration: {}", e);
    }

    match cli.cmd {
        Commands::Call { service, command, data, http } => {
            let config = config?;
            let data = chia_rpc_cli::parse_data(data.as_deref())?;
            let reply = runtime()?.block_on(chia_rpc_cli::call(
                &config, &service, &command, data, http,
            ))?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Commands::Watch { origin } => {
            let config = config?;
            let origin = if origin.is_empty() { DEFAULT_ORIGIN.to_string() } else { origin };
            runtime()?.block_on(chia_rpc_cli::watch(
                &config,
                &origin,
                |message| match message.to_json() {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::warn!("unprintable message: {}", e),
                },
                async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!("cannot listen for ctrl-c: {}", e);
                    }
                },
            ))?;
        }
        Commands::Generate { input, proxy, output } => {
            if let Some(source) = chia_rpc_cli::generate(&input, &proxy, output.as_deref())? {
                print!("{}", source);
            }
        }
        Commands::Address { cmd: AddressCommands::Encode { puzzle_hash, prefix } } => {
            let prefix = match (prefix, &config) {
                (Some(prefix), _) => prefix,
                (None, Ok(config)) => config.address_prefix().to_string(),
                (None, Err(_)) => "xch".to_string(),
            };
            println!("{}", chia_rpc_cli::encode_address(&puzzle_hash, &prefix)?);
        }
        Commands::Address { cmd: AddressCommands::Decode { address } } => {
            let (prefix, puzzle_hash) = chia_rpc_cli::decode_address(&address)?;
            println!("{} {}", puzzle_hash, prefix);
        }
    }
    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread().enable_all().build().map_err(CliError::Io)
}

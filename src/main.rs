//! Escrow Wallet CLI Application
//!
//! A command-line interface for creating 2-of-2 escrow wallets and
//! co-signing transactions that spend from them.

use clap::{Parser, Subcommand};
use escrow_wallet::cli;
use escrow_wallet::crypto::Network;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "escrow")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Two-party 2-of-2 P2SH escrow wallet", long_about = None)]
struct Cli {
    /// JSON config file with `network` and `wif`
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Network (mainnet or testnet); overrides the config file
    #[arg(short, long, global = true)]
    network: Option<Network>,

    /// Holder private key (WIF); a new key is generated when omitted
    #[arg(short, long, global = true)]
    wif: Option<String>,

    /// Counterparty public key (hex, compressed)
    #[arg(short = 'p', long, global = true)]
    counterparty: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an escrow wallet and show its addresses
    New,

    /// Add the holder's signature to a transaction input
    Sign {
        /// Raw transaction hex
        #[arg(short, long)]
        tx: String,

        /// Index of the input spending the escrow output
        #[arg(short, long, default_value = "0")]
        input: usize,
    },

    /// Show which signatures an input already carries
    Status {
        /// Raw transaction hex
        #[arg(short, long)]
        tx: String,

        /// Index of the input spending the escrow output
        #[arg(short, long, default_value = "0")]
        input: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = cli::resolve_config(cli.config.as_deref(), cli.network, cli.wif.as_deref())?;
    // An absent key is reported by the wallet as a missing public key
    let counterparty = cli.counterparty.unwrap_or_default();

    match cli.command {
        Commands::New => {
            cli::cmd_new(&counterparty, config)?;
        }

        Commands::Sign { tx, input } => {
            cli::cmd_sign(&counterparty, config, &tx, input)?;
        }

        Commands::Status { tx, input } => {
            cli::cmd_status(&counterparty, config, &tx, input)?;
        }
    }

    Ok(())
}

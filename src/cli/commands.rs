//! CLI commands for the escrow wallet
//!
//! Implements all command handlers for the CLI interface.

use crate::crypto::Network;
use crate::multisig::{EscrowConfig, EscrowWallet, SignatureSlot};
use std::path::Path;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Merge a config file with command-line overrides
///
/// Flags win over values read from the file.
pub fn resolve_config(
    config_path: Option<&Path>,
    network: Option<Network>,
    wif: Option<&str>,
) -> CliResult<EscrowConfig> {
    let mut config = match config_path {
        Some(path) => EscrowConfig::load(path)?,
        None => EscrowConfig::default(),
    };

    if let Some(network) = network {
        config.network = network;
    }
    if let Some(wif) = wif {
        config.private_key_wif = Some(wif.to_string());
    }

    Ok(config)
}

/// Create (or restore) an escrow wallet and print its details
pub fn cmd_new(counterparty: &str, config: EscrowConfig) -> CliResult<()> {
    let generated = config.private_key_wif.is_none();
    let wallet = EscrowWallet::new(counterparty, config)?;

    if generated {
        println!("🔐 New escrow wallet created!");
    } else {
        println!("🔐 Escrow wallet restored");
    }
    println!("   🌐 Network: {}", wallet.network());
    println!("   🔑 Holder public key: {}", wallet.holder_public_key_hex());
    println!("   📍 Local address: {}", wallet.local_address());
    println!("   🏦 Escrow address: {}", wallet.escrow_address());
    println!("   📜 Redeem script: {}", wallet.redeem_script_hex());

    if generated {
        println!("\n   ⚠️  IMPORTANT: Store this private key, it is not saved anywhere:");
        println!("   {}", wallet.export_private_key());
    }

    Ok(())
}

/// Sign one input and print the resulting transaction
pub fn cmd_sign(
    counterparty: &str,
    config: EscrowConfig,
    tx_hex: &str,
    input_index: usize,
) -> CliResult<()> {
    let wallet = EscrowWallet::new(counterparty, config)?;
    let signed = wallet.sign(tx_hex, input_index)?;

    if wallet.is_complete(&signed, input_index)? {
        println!("✅ Input {} is fully signed", input_index);
    } else {
        println!("✍️  Input {} is signed by us, awaiting counterparty", input_index);
    }
    println!("{}", signed);

    Ok(())
}

/// Print the signature state of one input
pub fn cmd_status(
    counterparty: &str,
    config: EscrowConfig,
    tx_hex: &str,
    input_index: usize,
) -> CliResult<()> {
    let wallet = EscrowWallet::new(counterparty, config)?;
    let status = wallet.signature_status(tx_hex, input_index)?;

    let description = match status {
        SignatureSlot::Empty => "no signatures",
        SignatureSlot::HolderSigned => "signed by us only",
        SignatureSlot::CounterpartySigned => "signed by counterparty only",
        SignatureSlot::BothSigned => "fully signed",
        SignatureSlot::Misordered => "fully signed, out of key order (sign to reorder)",
    };

    println!("🔍 Input {}: {}", input_index, description);
    println!("   Signatures: {}/2", status.signature_count());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PUBKEY: &str = "03b3931eec7cf5357b3405c7127fd827f985d0ee2a7779a63fb06605626536d6ca";
    const TESTNET_WIF: &str = "cNRtPuxr4iWGMPxch2LUC7fzEuZKjUyHNok85UKtpt3omDmGf5ta";

    #[test]
    fn test_resolve_defaults() {
        let config = resolve_config(None, None, None).unwrap();
        assert_eq!(config, EscrowConfig::default());
    }

    #[test]
    fn test_flags_override_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("escrow.json");
        fs::write(&path, r#"{ "network": "mainnet", "wif": "ignored" }"#).unwrap();

        let config =
            resolve_config(Some(&path), Some(Network::Testnet), Some(TESTNET_WIF)).unwrap();
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.private_key_wif.as_deref(), Some(TESTNET_WIF));
    }

    #[test]
    fn test_commands_surface_errors() {
        assert!(cmd_new("", EscrowConfig::default()).is_err());

        let config = EscrowConfig::new(Network::Testnet).with_private_key(TESTNET_WIF);
        assert!(cmd_sign(PUBKEY, config.clone(), "notahex", 0).is_err());
        assert!(cmd_status(PUBKEY, config, "notahex", 0).is_err());
    }
}

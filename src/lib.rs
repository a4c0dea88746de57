//! Escrow Wallet: a two-party 2-of-2 P2SH multisig wallet in Rust
//!
//! This crate provides:
//! - Holder key generation and WIF import/export (secp256k1)
//! - 2-of-2 redeem script construction with a fixed key order
//! - P2SH escrow and P2PKH local address derivation for mainnet and testnet
//! - Partial signing that merges with an existing counterparty signature
//!
//! # Example
//!
//! ```rust
//! use escrow_wallet::crypto::Network;
//! use escrow_wallet::multisig::{EscrowConfig, EscrowWallet};
//!
//! let counterparty = "03b3931eec7cf5357b3405c7127fd827f985d0ee2a7779a63fb06605626536d6ca";
//! let config = EscrowConfig::new(Network::Testnet)
//!     .with_private_key("cNRtPuxr4iWGMPxch2LUC7fzEuZKjUyHNok85UKtpt3omDmGf5ta");
//!
//! let wallet = EscrowWallet::new(counterparty, config).unwrap();
//! assert_eq!(wallet.escrow_address(), "2MtTdqqodWoXKkoNtvTKGb2NoPbZdTLDizD");
//! assert_eq!(wallet.local_address(), "mrpJ6H8GVJ9diCCRG85LXEJWT57HSTKEtx");
//! ```

pub mod cli;
pub mod crypto;
pub mod multisig;

// Re-export commonly used types
pub use crypto::{KeyError, KeyPair, Network};
pub use multisig::{
    ConfigError, EscrowConfig, EscrowError, EscrowWallet, PartialSigner, RedeemScript,
    SignatureSlot,
};

//! Two-party 2-of-2 escrow over a P2SH multisig output
//!
//! The holder's key and the counterparty's public key form a redeem
//! script; its hash is the escrow address. Either party can add their
//! signature to a spending transaction, in either order.
//!
//! # Example
//!
//! ```ignore
//! use escrow_wallet::crypto::Network;
//! use escrow_wallet::multisig::{EscrowConfig, EscrowWallet};
//!
//! let config = EscrowConfig::new(Network::Testnet).with_private_key(wif);
//! let wallet = EscrowWallet::new(counterparty_pubkey_hex, config)?;
//!
//! // Fund this address, then build a spending transaction
//! println!("{}", wallet.escrow_address());
//!
//! // Add our signature; the counterparty adds theirs afterwards (or before)
//! let semi_signed = wallet.sign(&unsigned_tx_hex, 0)?;
//! ```

pub mod config;
pub mod redeem_script;
pub mod signer;
pub mod wallet;

pub use config::{ConfigError, EscrowConfig};
pub use redeem_script::RedeemScript;
pub use signer::{decode_transaction, encode_transaction, PartialSigner, SignatureSlot};
pub use wallet::{EscrowError, EscrowWallet, COUNTERPARTY_SLOT, HOLDER_SLOT};

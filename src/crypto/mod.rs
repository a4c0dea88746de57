//! Cryptographic utilities for the escrow wallet
//!
//! This module provides:
//! - SHA-256 and HASH160 hashing
//! - ECDSA key management (secp256k1) with WIF import/export
//! - Network parameters and Base58Check address encoding

pub mod address;
pub mod hash;
pub mod keys;

pub use address::{
    base58check_decode, base58check_encode, p2pkh_address, p2sh_address, Network, UnknownNetwork,
};
pub use hash::{double_sha256, hash160, sha256};
pub use keys::{verify_der_signature, KeyError, KeyPair};

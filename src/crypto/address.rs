//! Network parameters and Base58Check address encoding
//!
//! Mainnet and testnet differ only in the version bytes prepended to
//! key hashes, script hashes and encoded private keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::hash::{double_sha256, hash160};
use super::keys::KeyError;

/// Length of the Base58Check checksum suffix
pub const CHECKSUM_LEN: usize = 4;

/// Returned when a network name is not recognized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown network: {0} (expected mainnet or testnet)")]
pub struct UnknownNetwork(pub String);

/// The Bitcoin network a wallet operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    #[serde(alias = "bitcoin")]
    Mainnet,
    Testnet,
}

impl Network {
    /// Version byte for pay-to-public-key-hash addresses
    pub fn p2pkh_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6f,
        }
    }

    /// Version byte for pay-to-script-hash addresses
    pub fn p2sh_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x05,
            Network::Testnet => 0xc4,
        }
    }

    /// Version byte for WIF-encoded private keys
    pub fn wif_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x80,
            Network::Testnet => 0xef,
        }
    }

    /// Find the network a WIF version byte belongs to
    pub fn from_wif_version(version: u8) -> Option<Self> {
        [Network::Mainnet, Network::Testnet]
            .into_iter()
            .find(|n| n.wif_version() == version)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "bitcoin" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            _ => Err(UnknownNetwork(s.to_string())),
        }
    }
}

/// Encode `version || payload || checksum` in Base58
pub fn base58check_encode(version: u8, payload: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    bytes.push(version);
    bytes.extend_from_slice(payload);

    // Checksum is the first 4 bytes of double SHA256
    let checksum = double_sha256(&bytes);
    bytes.extend_from_slice(&checksum[..CHECKSUM_LEN]);

    bs58::encode(bytes).into_string()
}

/// Decode a Base58Check string, returning `(version, payload)`
pub fn base58check_decode(encoded: &str) -> Result<(u8, Vec<u8>), KeyError> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| KeyError::InvalidEncoding(e.to_string()))?;

    if bytes.len() < 1 + CHECKSUM_LEN {
        return Err(KeyError::InvalidEncoding(format!(
            "decoded length {} is too short",
            bytes.len()
        )));
    }

    let (body, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    if double_sha256(body)[..CHECKSUM_LEN] != *checksum {
        return Err(KeyError::InvalidEncoding("checksum mismatch".to_string()));
    }

    Ok((body[0], body[1..].to_vec()))
}

/// P2PKH address for a serialized public key
pub fn p2pkh_address(public_key: &[u8], network: Network) -> String {
    base58check_encode(network.p2pkh_version(), &hash160(public_key))
}

/// P2SH address for a 20-byte script hash
pub fn p2sh_address(script_hash: &[u8; 20], network: Network) -> String {
    base58check_encode(network.p2sh_version(), script_hash)
}

//! Escrow wallet configuration

use crate::crypto::Network;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Options recognized when constructing an escrow wallet
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscrowConfig {
    /// Network used for key and address encoding
    pub network: Network,
    /// WIF-encoded holder key; a random key is generated when absent
    #[serde(alias = "wif")]
    pub private_key_wif: Option<String>,
}

impl EscrowConfig {
    /// Configuration for a network with a freshly generated key
    pub fn new(network: Network) -> Self {
        Self {
            network,
            private_key_wif: None,
        }
    }

    /// Use an existing WIF-encoded holder key
    pub fn with_private_key(mut self, wif: &str) -> Self {
        self.private_key_wif = Some(wif.to_string());
        self
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl std::fmt::Debug for EscrowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowConfig")
            .field("network", &self.network)
            .field(
                "private_key_wif",
                &self.private_key_wif.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

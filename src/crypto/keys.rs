//! ECDSA key management for the escrow wallet
//!
//! Provides key pair generation, WIF import/export, and signing of
//! transaction digests using the secp256k1 elliptic curve.

use rand::rngs::OsRng;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::address::{base58check_decode, base58check_encode, p2pkh_address, Network};

/// Suffix marking a WIF key whose public key is serialized compressed
const COMPRESSED_FLAG: u8 = 0x01;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("Invalid network version: expected {expected}, found {found:#04x}")]
    NetworkMismatch { expected: Network, found: u8 },
}

/// A private key together with its public key and network
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
    /// Whether the public key is serialized in 33-byte compressed form
    pub compressed: bool,
    pub network: Network,
}

impl KeyPair {
    /// Generate a new random key pair (compressed)
    pub fn generate(network: Network) -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
            compressed: true,
            network,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey, compressed: bool, network: Network) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
            compressed,
            network,
        }
    }

    /// Import a WIF-encoded private key for the given network
    ///
    /// The embedded version byte must match `network`.
    pub fn from_wif(wif: &str, network: Network) -> Result<Self, KeyError> {
        let (version, payload) = base58check_decode(wif)?;

        if version != network.wif_version() {
            return Err(KeyError::NetworkMismatch {
                expected: network,
                found: version,
            });
        }

        let compressed = match payload.len() {
            32 => false,
            33 if payload[32] == COMPRESSED_FLAG => true,
            33 => {
                return Err(KeyError::InvalidEncoding(format!(
                    "unexpected compression flag {:#04x}",
                    payload[32]
                )))
            }
            n => {
                return Err(KeyError::InvalidEncoding(format!(
                    "unexpected key length {}",
                    n
                )))
            }
        };

        let secret_key =
            SecretKey::from_slice(&payload[..32]).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key, compressed, network))
    }

    /// Export the private key in Wallet Import Format
    pub fn to_wif(&self) -> String {
        let mut payload = self.secret_key.secret_bytes().to_vec();
        if self.compressed {
            payload.push(COMPRESSED_FLAG);
        }
        base58check_encode(self.network.wif_version(), &payload)
    }

    /// Serialized public key (33 bytes compressed, 65 otherwise)
    pub fn public_key_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.public_key.serialize().to_vec()
        } else {
            self.public_key.serialize_uncompressed().to_vec()
        }
    }

    /// Get the public key as a hex string
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    /// Single-key P2PKH address: Base58Check(version || HASH160(pubkey))
    pub fn address(&self) -> String {
        p2pkh_address(&self.public_key_bytes(), self.network)
    }

    /// Sign a 32-byte digest, returning a DER-encoded low-S signature
    ///
    /// Nonces are derived deterministically (RFC 6979), so the same key
    /// and digest always produce the same signature.
    pub fn sign_digest(&self, digest: [u8; 32]) -> Vec<u8> {
        let secp = Secp256k1::new();
        let message = Message::from_digest(digest);
        let signature = secp.sign_ecdsa(&message, &self.secret_key);
        signature.serialize_der().to_vec()
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key_hex())
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

/// Verify a DER signature over a 32-byte digest against a serialized public key
///
/// High-S signatures are normalized before verification.
pub fn verify_der_signature(
    public_key: &[u8],
    digest: [u8; 32],
    der_signature: &[u8],
) -> Result<bool, KeyError> {
    let secp = Secp256k1::verification_only();

    let public_key = PublicKey::from_slice(public_key).map_err(|_| KeyError::InvalidPublicKey)?;
    let mut signature =
        Signature::from_der(der_signature).map_err(|_| KeyError::InvalidSignature)?;
    signature.normalize_s();

    let message = Message::from_digest(digest);
    Ok(secp.verify_ecdsa(&message, &signature, &public_key).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::sha256;

    const MAINNET_WIF: &str = "KwjWwzCT6qqWESMS5pFBys8F5Nhkff54HCrKL7LATxtE8SckHNnL";
    const TESTNET_WIF: &str = "cNRtPuxr4iWGMPxch2LUC7fzEuZKjUyHNok85UKtpt3omDmGf5ta";

    fn digest(data: &[u8]) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&sha256(data));
        out
    }

    #[test]
    fn test_key_pair_generation() {
        let kp = KeyPair::generate(Network::Mainnet);
        assert_eq!(kp.public_key_bytes().len(), 33);
        assert!(kp.address().starts_with('1'));

        let wif = kp.to_wif();
        assert_eq!(wif.len(), 52);
        assert!(wif.starts_with('K') || wif.starts_with('L'));
    }

    #[test]
    fn test_wif_roundtrip() {
        let kp = KeyPair::from_wif(MAINNET_WIF, Network::Mainnet).unwrap();
        assert!(kp.compressed);
        assert_eq!(kp.to_wif(), MAINNET_WIF);
        assert_eq!(
            kp.public_key_hex(),
            "034cf00a951ec0289b570c3cd72e8abe18d52ac035e5f977f707165b3200ab78f6"
        );
        assert_eq!(kp.address(), "1AkNdFYKjwkoXp1NX5dGkCK5vmckhEQ1RS");
    }

    #[test]
    fn test_testnet_wif() {
        let kp = KeyPair::from_wif(TESTNET_WIF, Network::Testnet).unwrap();
        assert_eq!(
            kp.public_key_hex(),
            "02236919c606bce80134eaff2bb988e3a274527f6084dc90cef56ee6438532d5f9"
        );
        assert_eq!(kp.address(), "mrpJ6H8GVJ9diCCRG85LXEJWT57HSTKEtx");
    }

    #[test]
    fn test_wif_network_mismatch() {
        let result = KeyPair::from_wif(TESTNET_WIF, Network::Mainnet);
        assert!(matches!(
            result,
            Err(KeyError::NetworkMismatch { found: 0xef, .. })
        ));
    }

    #[test]
    fn test_wif_garbage() {
        assert!(KeyPair::from_wif("not-a-wif", Network::Mainnet).is_err());
        assert!(KeyPair::from_wif("", Network::Mainnet).is_err());
    }

    #[test]
    fn test_uncompressed_wif() {
        let compressed = KeyPair::from_wif(MAINNET_WIF, Network::Mainnet).unwrap();
        let uncompressed =
            KeyPair::from_secret_key(compressed.secret_key, false, Network::Mainnet);

        let wif = uncompressed.to_wif();
        assert_eq!(wif.len(), 51);

        let imported = KeyPair::from_wif(&wif, Network::Mainnet).unwrap();
        assert!(!imported.compressed);
        assert_eq!(imported.public_key_bytes().len(), 65);
        assert_ne!(imported.address(), compressed.address());
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = KeyPair::generate(Network::Testnet);
        let hash = digest(b"Hello, escrow!");

        let signature = kp.sign_digest(hash);
        assert!(verify_der_signature(&kp.public_key_bytes(), hash, &signature).unwrap());

        let other = digest(b"Something else");
        assert!(!verify_der_signature(&kp.public_key_bytes(), other, &signature).unwrap());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let kp = KeyPair::from_wif(MAINNET_WIF, Network::Mainnet).unwrap();
        let hash = digest(b"same message");
        assert_eq!(kp.sign_digest(hash), kp.sign_digest(hash));
    }

    #[test]
    fn test_verify_rejects_malformed_inputs() {
        let kp = KeyPair::generate(Network::Mainnet);
        let hash = digest(b"msg");
        let signature = kp.sign_digest(hash);

        assert!(matches!(
            verify_der_signature(&[0x05; 33], hash, &signature),
            Err(KeyError::InvalidPublicKey)
        ));
        assert!(matches!(
            verify_der_signature(&kp.public_key_bytes(), hash, &[0x30, 0x01]),
            Err(KeyError::InvalidSignature)
        ));
    }
}

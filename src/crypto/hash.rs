//! Hashing utilities for keys, scripts and addresses
//!
//! Provides the SHA-256 and RIPEMD-160 compositions used by Bitcoin:
//! double SHA-256 for Base58Check checksums and HASH160 for key and
//! script hashes.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256(data))
}

/// Computes HASH160: RIPEMD-160 of the SHA-256 digest
///
/// Used for both public key hashes (P2PKH) and script hashes (P2SH).
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));

    let mut out = [0u8; 20];
    out.copy_from_slice(&ripemd.finalize());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let hash = sha256(b"hello world");
        assert_eq!(hash.len(), 32);
        assert_eq!(
            hex::encode(hash),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_double_sha256() {
        let hash = double_sha256(b"hello world");
        assert_eq!(hash.len(), 32);
        assert_ne!(hash, sha256(b"hello world"));
    }

    #[test]
    fn test_hash160_empty() {
        assert_eq!(
            hex::encode(hash160(b"")),
            "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb"
        );
    }
}

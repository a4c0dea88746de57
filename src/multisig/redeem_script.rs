//! 2-of-2 multisig redeem script and P2SH address derivation

use bitcoin::hashes::Hash;
use bitcoin::opcodes::all::OP_CHECKMULTISIG;
use bitcoin::script::{Builder, PushBytesBuf, Script, ScriptBuf};
use bitcoin::ScriptHash;

use crate::crypto::{hash160, p2sh_address, Network};
use crate::multisig::wallet::EscrowError;

/// Signatures required to spend (M in M-of-N)
pub const REQUIRED_SIGNATURES: i64 = 2;

/// Keys committed to by the script (N in M-of-N)
pub const TOTAL_KEYS: i64 = 2;

/// Wrap raw bytes as a script push
pub(crate) fn push_bytes(bytes: &[u8]) -> Result<PushBytesBuf, EscrowError> {
    PushBytesBuf::try_from(bytes.to_vec())
        .map_err(|_| EscrowError::PushTooLarge(bytes.len()))
}

/// `OP_2 <key0> <key1> OP_2 OP_CHECKMULTISIG`
///
/// Keys keep the positional order they were given in; they are never
/// sorted. Changing the order changes the script hash and the address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemScript {
    keys: [Vec<u8>; 2],
    script: ScriptBuf,
}

impl RedeemScript {
    /// Build the redeem script over two serialized public keys
    pub fn two_of_two(first: &[u8], second: &[u8]) -> Result<Self, EscrowError> {
        let script = Builder::new()
            .push_int(REQUIRED_SIGNATURES)
            .push_slice(push_bytes(first)?)
            .push_slice(push_bytes(second)?)
            .push_int(TOTAL_KEYS)
            .push_opcode(OP_CHECKMULTISIG)
            .into_script();

        log::debug!("Built 2-of-2 redeem script {}", hex::encode(script.as_bytes()));

        Ok(Self {
            keys: [first.to_vec(), second.to_vec()],
            script,
        })
    }

    /// Public keys in script order
    pub fn keys(&self) -> &[Vec<u8>; 2] {
        &self.keys
    }

    /// Script slot holding `public_key`, if present
    pub fn position_of(&self, public_key: &[u8]) -> Option<usize> {
        self.keys.iter().position(|k| k.as_slice() == public_key)
    }

    pub fn as_script(&self) -> &Script {
        &self.script
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.script.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// HASH160 of the serialized script
    pub fn script_hash(&self) -> [u8; 20] {
        hash160(self.as_bytes())
    }

    /// `OP_HASH160 <scriptHash> OP_EQUAL`
    pub fn script_pubkey(&self) -> ScriptBuf {
        ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(self.script_hash()))
    }

    /// Base58Check P2SH address for `network`
    pub fn address(&self, network: Network) -> String {
        p2sh_address(&self.script_hash(), network)
    }
}

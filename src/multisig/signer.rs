//! Partial signing of 2-of-2 P2SH escrow inputs
//!
//! An input spending the escrow output carries the unlocking script
//! `OP_0 <sig|OP_0> <sig|OP_0> <redeemScript>`, with one signature slot
//! per redeem script key in script order. A missing signature is encoded
//! as `OP_0`. Signing fills the signer's own slot and keeps whatever the
//! other party already placed in theirs.

use bitcoin::consensus::encode;
use bitcoin::hashes::Hash;
use bitcoin::opcodes::all::OP_PUSHBYTES_0;
use bitcoin::script::{Builder, Instruction, ScriptBuf};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::Transaction;

use crate::crypto::{verify_der_signature, KeyPair};
use crate::multisig::redeem_script::{push_bytes, RedeemScript};
use crate::multisig::wallet::EscrowError;

/// Signature per redeem script key, in script order
type Slots = [Option<Vec<u8>>; 2];

/// Signatures found on an input, and whether they appeared in key order
struct ParsedInput {
    slots: Slots,
    in_key_order: bool,
}

/// Signature state of one escrow input, relative to the signing key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureSlot {
    /// No signatures yet
    Empty,
    /// Only the holder (this signer) has signed
    HolderSigned,
    /// Only the other party has signed
    CounterpartySigned,
    /// Both signatures are present; the input is spendable
    BothSigned,
    /// Both signatures are present but not in redeem script key order,
    /// so OP_CHECKMULTISIG rejects them until the script is rewritten
    Misordered,
}

impl SignatureSlot {
    fn from_parsed(parsed: &ParsedInput, own: usize) -> Self {
        match (parsed.slots[own].is_some(), parsed.slots[1 - own].is_some()) {
            (false, false) => SignatureSlot::Empty,
            (true, false) => SignatureSlot::HolderSigned,
            (false, true) => SignatureSlot::CounterpartySigned,
            (true, true) if parsed.in_key_order => SignatureSlot::BothSigned,
            (true, true) => SignatureSlot::Misordered,
        }
    }

    pub fn is_complete(self) -> bool {
        self == SignatureSlot::BothSigned
    }

    pub fn signature_count(self) -> usize {
        match self {
            SignatureSlot::Empty => 0,
            SignatureSlot::HolderSigned | SignatureSlot::CounterpartySigned => 1,
            SignatureSlot::BothSigned | SignatureSlot::Misordered => 2,
        }
    }
}

/// Decode a raw transaction from hex
pub fn decode_transaction(tx_hex: &str) -> Result<Transaction, EscrowError> {
    let bytes =
        hex::decode(tx_hex).map_err(|_| EscrowError::MalformedHex("Invalid hex string".into()))?;
    encode::deserialize(&bytes)
        .map_err(|e| EscrowError::MalformedHex(format!("not a valid transaction: {}", e)))
}

/// Encode a transaction as hex
pub fn encode_transaction(tx: &Transaction) -> String {
    hex::encode(encode::serialize(tx))
}

/// Legacy (pre-segwit) signature hash with the redeem script as script code
fn legacy_sighash(
    tx: &Transaction,
    input_index: usize,
    redeem_script: &RedeemScript,
    sighash_type: u32,
) -> Result<[u8; 32], EscrowError> {
    let sighash = SighashCache::new(tx)
        .legacy_signature_hash(input_index, redeem_script.as_script(), sighash_type)
        .map_err(|_| EscrowError::InputIndexOutOfRange(input_index))?;
    Ok(sighash.to_byte_array())
}

/// Applies one key's signature to escrow inputs
#[derive(Debug, Clone, Copy)]
pub struct PartialSigner<'a> {
    redeem_script: &'a RedeemScript,
    key_pair: &'a KeyPair,
    position: usize,
}

impl<'a> PartialSigner<'a> {
    /// Create a signer for whichever redeem script key `key_pair` holds
    pub fn new(
        redeem_script: &'a RedeemScript,
        key_pair: &'a KeyPair,
    ) -> Result<Self, EscrowError> {
        let position = redeem_script
            .position_of(&key_pair.public_key_bytes())
            .ok_or_else(|| EscrowError::ForeignKey(key_pair.public_key_hex()))?;
        Ok(Self::at_position(redeem_script, key_pair, position))
    }

    pub(crate) fn at_position(
        redeem_script: &'a RedeemScript,
        key_pair: &'a KeyPair,
        position: usize,
    ) -> Self {
        Self {
            redeem_script,
            key_pair,
            position,
        }
    }

    /// Sign input `input_index` of a hex transaction, returning the new hex
    ///
    /// The caller's string is never modified.
    pub fn sign(&self, tx_hex: &str, input_index: usize) -> Result<String, EscrowError> {
        let mut tx = decode_transaction(tx_hex)?;
        let state = self.sign_input(&mut tx, input_index)?;

        log::debug!(
            "Signed input {} of {}: {:?}",
            input_index,
            tx.compute_txid(),
            state
        );

        Ok(encode_transaction(&tx))
    }

    /// Sign one input in place
    ///
    /// An input carrying both signatures out of key order is rewritten in
    /// key order without adding a signature.
    pub fn sign_input(
        &self,
        tx: &mut Transaction,
        input_index: usize,
    ) -> Result<SignatureSlot, EscrowError> {
        let mut parsed = self.read_slots(tx, input_index)?;

        match SignatureSlot::from_parsed(&parsed, self.position) {
            SignatureSlot::BothSigned => return Err(EscrowError::AlreadyFullySigned(input_index)),
            SignatureSlot::HolderSigned => return Err(EscrowError::AlreadySigned(input_index)),
            SignatureSlot::Misordered => {
                log::debug!("Reordering signatures on input {}", input_index);
            }
            SignatureSlot::Empty | SignatureSlot::CounterpartySigned => {
                let sighash_type = EcdsaSighashType::All;
                let digest =
                    legacy_sighash(tx, input_index, self.redeem_script, sighash_type.to_u32())?;

                let mut signature = self.key_pair.sign_digest(digest);
                signature.push(sighash_type as u8);
                parsed.slots[self.position] = Some(signature);
            }
        }

        tx.input[input_index].script_sig = self.unlocking_script(&parsed.slots)?;
        parsed.in_key_order = true;
        Ok(SignatureSlot::from_parsed(&parsed, self.position))
    }

    /// Signature state of input `input_index` of a hex transaction
    pub fn status(&self, tx_hex: &str, input_index: usize) -> Result<SignatureSlot, EscrowError> {
        let tx = decode_transaction(tx_hex)?;
        self.input_status(&tx, input_index)
    }

    pub fn input_status(
        &self,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<SignatureSlot, EscrowError> {
        let parsed = self.read_slots(tx, input_index)?;
        Ok(SignatureSlot::from_parsed(&parsed, self.position))
    }

    /// Parse the existing unlocking script into per-key signature slots
    ///
    /// Every present signature must verify against a redeem script key.
    fn read_slots(
        &self,
        tx: &Transaction,
        input_index: usize,
    ) -> Result<ParsedInput, EscrowError> {
        let input = tx
            .input
            .get(input_index)
            .ok_or(EscrowError::InputIndexOutOfRange(input_index))?;

        if input.script_sig.is_empty() {
            return Ok(ParsedInput {
                slots: [None, None],
                in_key_order: true,
            });
        }

        let not_multisig = || {
            EscrowError::UnrecognizedSignature(format!(
                "input {} is not a 2-of-2 P2SH spend",
                input_index
            ))
        };

        let mut pushes = Vec::new();
        for instruction in input.script_sig.instructions() {
            match instruction {
                Ok(Instruction::PushBytes(bytes)) => pushes.push(bytes.as_bytes()),
                _ => return Err(not_multisig()),
            }
        }

        let (redeem, rest) = pushes.split_last().ok_or_else(not_multisig)?;
        if *redeem != self.redeem_script.as_bytes() {
            return Err(EscrowError::RedeemScriptMismatch(input_index));
        }

        // OP_0 consumed by the CHECKMULTISIG off-by-one, then the signatures
        let (dummy, signatures) = rest.split_first().ok_or_else(not_multisig)?;
        if !dummy.is_empty() || signatures.len() > 2 {
            return Err(not_multisig());
        }

        let mut slots: Slots = [None, None];
        let mut in_key_order = true;
        let mut previous = None;
        for signature in signatures.iter().filter(|s| !s.is_empty()) {
            let position = self.match_signature(tx, input_index, signature, &slots)?;
            if previous.map_or(false, |p| position < p) {
                in_key_order = false;
            }
            previous = Some(position);
            slots[position] = Some(signature.to_vec());
        }

        Ok(ParsedInput {
            slots,
            in_key_order,
        })
    }

    /// Find the unfilled key slot a signature verifies against
    fn match_signature(
        &self,
        tx: &Transaction,
        input_index: usize,
        signature: &[u8],
        slots: &Slots,
    ) -> Result<usize, EscrowError> {
        let unmatched = || {
            EscrowError::UnrecognizedSignature(format!(
                "signature on input {} matches no escrow key",
                input_index
            ))
        };

        let (sighash_type, der) = signature.split_last().ok_or_else(unmatched)?;
        let digest = legacy_sighash(tx, input_index, self.redeem_script, u32::from(*sighash_type))?;

        self.redeem_script
            .keys()
            .iter()
            .enumerate()
            .filter(|(position, _)| slots[*position].is_none())
            .find(|(_, key)| verify_der_signature(key, digest, der).unwrap_or(false))
            .map(|(position, _)| position)
            .ok_or_else(unmatched)
    }

    fn unlocking_script(&self, slots: &Slots) -> Result<ScriptBuf, EscrowError> {
        let mut builder = Builder::new().push_opcode(OP_PUSHBYTES_0);
        for slot in slots {
            builder = match slot {
                Some(signature) => builder.push_slice(push_bytes(signature)?),
                None => builder.push_opcode(OP_PUSHBYTES_0),
            };
        }

        Ok(builder
            .push_slice(push_bytes(self.redeem_script.as_bytes())?)
            .into_script())
    }
}

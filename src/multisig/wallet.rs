//! Two-party escrow wallet
//!
//! The holder owns one private key; the counterparty contributes only a
//! public key. Both are combined into a 2-of-2 redeem script whose P2SH
//! address receives escrowed funds. Everything derived from the keys is
//! computed once in [`EscrowWallet::new`].

use thiserror::Error;

use crate::crypto::{KeyError, KeyPair, Network};
use crate::multisig::config::EscrowConfig;
use crate::multisig::redeem_script::RedeemScript;
use crate::multisig::signer::{PartialSigner, SignatureSlot};

/// Redeem script slot of the counterparty key
pub const COUNTERPARTY_SLOT: usize = 0;
/// Redeem script slot of the holder key
pub const HOLDER_SLOT: usize = 1;

/// Errors related to escrow construction and signing
#[derive(Error, Debug)]
pub enum EscrowError {
    #[error("public key must be supplied")]
    MissingPublicKey,
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("Invalid private key encoding: {0}")]
    InvalidKeyEncoding(#[source] KeyError),
    #[error("Malformed transaction hex: {0}")]
    MalformedHex(String),
    #[error("No input at index: {0}")]
    InputIndexOutOfRange(usize),
    #[error("Input {0} is already fully signed")]
    AlreadyFullySigned(usize),
    #[error("Input {0} already carries this key's signature")]
    AlreadySigned(usize),
    #[error("Input {0} reveals a different redeem script")]
    RedeemScriptMismatch(usize),
    #[error("Unrecognized signature data: {0}")]
    UnrecognizedSignature(String),
    #[error("Key {0} is not part of the redeem script")]
    ForeignKey(String),
    #[error("Script push of {0} bytes is too large")]
    PushTooLarge(usize),
}

/// A 2-of-2 escrow wallet shared with one counterparty
#[derive(Debug, Clone)]
pub struct EscrowWallet {
    network: Network,
    key_pair: KeyPair,
    counterparty_key: Vec<u8>,
    redeem_script: RedeemScript,
    escrow_address: String,
}

impl EscrowWallet {
    /// Create an escrow wallet with the counterparty's hex public key
    ///
    /// # Errors
    /// `MissingPublicKey` if the key is empty, `InvalidPublicKey` if it is
    /// not hex, `InvalidKeyEncoding` if the configured WIF cannot be
    /// decoded for the configured network.
    pub fn new(
        counterparty_public_key_hex: &str,
        config: EscrowConfig,
    ) -> Result<Self, EscrowError> {
        let counterparty_key = parse_counterparty_key(counterparty_public_key_hex)?;
        let network = config.network;

        let key_pair = match config.private_key_wif.as_deref() {
            Some(wif) => {
                KeyPair::from_wif(wif, network).map_err(EscrowError::InvalidKeyEncoding)?
            }
            None => KeyPair::generate(network),
        };

        let redeem_script =
            RedeemScript::two_of_two(&counterparty_key, &key_pair.public_key_bytes())?;
        let escrow_address = redeem_script.address(network);

        log::info!("Escrow wallet ready on {}: {}", network, escrow_address);

        Ok(Self {
            network,
            key_pair,
            counterparty_key,
            redeem_script,
            escrow_address,
        })
    }

    /// Create a wallet on `network` with a freshly generated holder key
    pub fn generate(
        counterparty_public_key_hex: &str,
        network: Network,
    ) -> Result<Self, EscrowError> {
        Self::new(counterparty_public_key_hex, EscrowConfig::new(network))
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Holder private key in Wallet Import Format
    pub fn export_private_key(&self) -> String {
        self.key_pair.to_wif()
    }

    /// Holder's own single-key P2PKH address
    pub fn local_address(&self) -> String {
        self.key_pair.address()
    }

    /// P2SH address of the 2-of-2 escrow
    pub fn escrow_address(&self) -> &str {
        &self.escrow_address
    }

    pub fn redeem_script(&self) -> &RedeemScript {
        &self.redeem_script
    }

    pub fn redeem_script_hex(&self) -> String {
        self.redeem_script.to_hex()
    }

    /// Locking script funding transactions pay to, as hex
    pub fn script_pubkey_hex(&self) -> String {
        hex::encode(self.redeem_script.script_pubkey().as_bytes())
    }

    /// Holder public key to hand to the counterparty
    pub fn holder_public_key_hex(&self) -> String {
        self.key_pair.public_key_hex()
    }

    pub fn counterparty_public_key_hex(&self) -> String {
        hex::encode(&self.counterparty_key)
    }

    /// Add the holder's signature to input `input_index`
    ///
    /// Returns the semi-signed transaction when the input was unsigned and
    /// the fully signed one when the counterparty had already signed.
    pub fn sign(&self, tx_hex: &str, input_index: usize) -> Result<String, EscrowError> {
        self.signer().sign(tx_hex, input_index)
    }

    /// Signature state of input `input_index`, from the holder's view
    pub fn signature_status(
        &self,
        tx_hex: &str,
        input_index: usize,
    ) -> Result<SignatureSlot, EscrowError> {
        self.signer().status(tx_hex, input_index)
    }

    /// Whether both signatures are present on input `input_index`
    pub fn is_complete(&self, tx_hex: &str, input_index: usize) -> Result<bool, EscrowError> {
        Ok(self.signature_status(tx_hex, input_index)?.is_complete())
    }

    fn signer(&self) -> PartialSigner<'_> {
        PartialSigner::at_position(&self.redeem_script, &self.key_pair, HOLDER_SLOT)
    }
}

/// Decode the counterparty key; no curve-point validation happens here
fn parse_counterparty_key(public_key_hex: &str) -> Result<Vec<u8>, EscrowError> {
    if public_key_hex.is_empty() {
        return Err(EscrowError::MissingPublicKey);
    }
    hex::decode(public_key_hex)
        .map_err(|_| EscrowError::InvalidPublicKey(public_key_hex.to_string()))
}

//! Common types for wallet connectors
//!
//! Values exchanged with callers, plus the wire payloads shared by the
//! Unisat-style injected APIs (Unisat, Bitget, OKX).

use serde::{Deserialize, Serialize};

/// Payload of the `accountChanged` event
///
/// An absent address or public key is reported as an empty string, so a
/// revoked session arrives as `("", [], "")`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountChange {
    pub address: String,
    pub accounts: Vec<String>,
    pub public_key: String,
}

/// Wallet balance in satoshis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance {
    pub confirmed: u64,
    pub unconfirmed: u64,
    pub total: u64,
}

/// Inscription as listed by the wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inscription {
    pub inscription_id: String,
    pub inscription_number: String,
    pub address: String,
    pub output_value: String,
    pub content: String,
    pub content_length: String,
    pub content_type: String,
    pub preview: String,
    pub timestamp: i64,
    pub offset: u64,
    pub genesis_transaction: String,
    pub location: String,
}

/// One page of `getInscriptions`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InscriptionPage {
    pub total: u64,
    pub list: Vec<Inscription>,
}

/// Content for a new inscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InscriptionContent {
    /// Plain UTF-8 text
    Text(String),
    /// Base64-encoded JPEG
    Image(String),
}

impl InscriptionContent {
    pub fn content_type(&self) -> &'static str {
        match self {
            InscriptionContent::Text(_) => "text/plain;charset=utf-8",
            InscriptionContent::Image(_) => "image/jpeg",
        }
    }

    pub fn payload_type(&self) -> &'static str {
        match self {
            InscriptionContent::Text(_) => "PLAIN_TEXT",
            InscriptionContent::Image(_) => "BASE_64",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            InscriptionContent::Text(content) | InscriptionContent::Image(content) => content,
        }
    }
}

// =========================================================================
// Unisat-style wire payloads
// =========================================================================

/// Token returned by a vendor's `on(...)`, passed back to `removeListener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// `{ feeRate }` option accepted by `sendBitcoin` and `sendInscription`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeOptions {
    pub fee_rate: f64,
}

impl FeeOptions {
    pub fn from_rate(fee_rate: Option<f64>) -> Option<Self> {
        fee_rate.map(|fee_rate| Self { fee_rate })
    }
}

/// Result of `sendInscription`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendInscriptionResult {
    pub txid: String,
}

/// One entry of `toSignInputs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToSignInput {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sighash_types: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_tweak_signer: Option<bool>,
}

/// Options for `signPsbt`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignPsbtOptions {
    pub auto_finalized: bool,
    pub to_sign_inputs: Vec<ToSignInput>,
}

impl SignPsbtOptions {
    /// Sign one input with the raw (untweaked) key, without finalizing.
    pub fn single_input(index: usize, public_key: &str) -> Self {
        Self {
            auto_finalized: false,
            to_sign_inputs: vec![ToSignInput {
                index,
                address: None,
                public_key: Some(public_key.to_string()),
                sighash_types: None,
                disable_tweak_signer: Some(true),
            }],
        }
    }
}

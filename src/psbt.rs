//! PSBT text encodings
//!
//! Wallets take and return PSBTs as hex (Unisat, Bitget, OKX, Leather) or
//! base64 (Xverse). Parsing and serialization are left to `bitcoin::Psbt`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bitcoin::Psbt;

use crate::connectors::ConnectorError;

pub fn encode_hex(psbt: &Psbt) -> String {
    hex::encode(psbt.serialize())
}

pub fn decode_hex(encoded: &str) -> Result<Psbt, ConnectorError> {
    let bytes = hex::decode(encoded.trim())
        .map_err(|e| ConnectorError::Psbt(format!("invalid hex: {}", e)))?;
    Ok(Psbt::deserialize(&bytes)?)
}

pub fn encode_base64(psbt: &Psbt) -> String {
    STANDARD.encode(psbt.serialize())
}

pub fn decode_base64(encoded: &str) -> Result<Psbt, ConnectorError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ConnectorError::Psbt(format!("invalid base64: {}", e)))?;
    Ok(Psbt::deserialize(&bytes)?)
}

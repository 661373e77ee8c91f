//! Leather JSON-RPC surface
//!
//! Leather injects a single dispatcher, `window.btc.request(method, params)`,
//! answering with a JSON-RPC envelope.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::connectors::error::{ConnectorError, VendorError};
use crate::network::WalletNetwork;

/// `window.btc`
#[async_trait]
pub trait LeatherRpc: Send + Sync {
    /// `request(method, params)`, resolving with the raw response envelope
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, VendorError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// `{ jsonrpc, id, result }` or `{ jsonrpc, id, error }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    pub jsonrpc: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl<T> RpcResponse<T> {
    pub fn into_result(self, method: &str) -> Result<T, ConnectorError> {
        if let Some(error) = self.error {
            return Err(VendorError::with_code(error.code, error.message).into());
        }
        self.result
            .ok_or_else(|| ConnectorError::Parse(format!("{} response has no result", method)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressSymbol {
    #[serde(rename = "BTC")]
    Btc,
    #[serde(rename = "STX")]
    Stx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    P2wpkh,
    P2tr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResult {
    pub symbol: AddressSymbol,
    /// Absent on STX entries
    #[serde(rename = "type", default)]
    pub payment_type: Option<PaymentType>,
    pub address: String,
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub tweaked_public_key: String,
    #[serde(default)]
    pub derivation_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestAddressesResult {
    pub addresses: Vec<AddressResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignMessageParams {
    pub message: String,
    pub payment_type: PaymentType,
    pub network: WalletNetwork,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignMessageResult {
    pub signature: String,
    pub address: String,
    pub message: String,
}

/// `amount` travels as a decimal string of satoshis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTransferParams {
    pub address: String,
    pub amount: String,
    pub network: WalletNetwork,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTransferResult {
    pub txid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignPsbtParams {
    pub hex: String,
    pub sign_at_index: usize,
    pub network: WalletNetwork,
    pub broadcast: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignPsbtResult {
    pub hex: String,
}

/// Dispatch `method` and decode the `result` member of the envelope.
pub async fn call<P, T>(
    rpc: &dyn LeatherRpc,
    method: &str,
    params: Option<&P>,
) -> Result<T, ConnectorError>
where
    P: Serialize + Sync,
    T: DeserializeOwned,
{
    let params = params.map(serde_json::to_value).transpose()?;
    let raw = rpc.request(method, params).await?;
    let response: RpcResponse<T> = serde_json::from_value(raw)?;
    response.into_result(method)
}

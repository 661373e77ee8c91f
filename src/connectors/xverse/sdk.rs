//! Xverse (sats-connect) SDK surface
//!
//! sats-connect reports results through an `onFinish`/`onCancel` callback
//! pair instead of returning a promise. [`request`] turns one such call into
//! a future.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::connectors::error::{ConnectorError, VendorError};
use crate::network::WalletNetwork;

/// sats-connect `BitcoinNetworkType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum XverseNetwork {
    Mainnet,
    Testnet,
    Signet,
}

impl From<WalletNetwork> for XverseNetwork {
    fn from(network: WalletNetwork) -> Self {
        match network {
            WalletNetwork::Mainnet => XverseNetwork::Mainnet,
            WalletNetwork::Testnet => XverseNetwork::Testnet,
            WalletNetwork::Signet => XverseNetwork::Signet,
        }
    }
}

impl From<XverseNetwork> for WalletNetwork {
    fn from(network: XverseNetwork) -> Self {
        match network {
            XverseNetwork::Mainnet => WalletNetwork::Mainnet,
            XverseNetwork::Testnet => WalletNetwork::Testnet,
            XverseNetwork::Signet => WalletNetwork::Signet,
        }
    }
}

/// `{ network: { type } }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPayload {
    #[serde(rename = "type")]
    pub network_type: XverseNetwork,
}

impl From<WalletNetwork> for NetworkPayload {
    fn from(network: WalletNetwork) -> Self {
        Self { network_type: network.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressPurpose {
    Ordinals,
    Payment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAddressPayload {
    pub purposes: Vec<AddressPurpose>,
    pub message: String,
    pub network: NetworkPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XverseAddress {
    pub address: String,
    pub public_key: String,
    pub purpose: AddressPurpose,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAddressResponse {
    pub addresses: Vec<XverseAddress>,
}

impl GetAddressResponse {
    pub fn by_purpose(&self, purpose: AddressPurpose) -> Option<&XverseAddress> {
        self.addresses.iter().find(|address| address.purpose == purpose)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignMessagePayload {
    pub network: NetworkPayload,
    pub address: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub address: String,
    pub amount_sats: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBtcTransactionPayload {
    pub network: NetworkPayload,
    pub recipients: Vec<Recipient>,
    pub sender_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputToSign {
    pub address: String,
    pub signing_indexes: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTransactionPayload {
    pub network: NetworkPayload,
    pub message: String,
    pub psbt_base64: String,
    pub broadcast: bool,
    pub inputs_to_sign: Vec<InputToSign>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTransactionResponse {
    pub psbt_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInscriptionPayload {
    pub network: NetworkPayload,
    pub content: String,
    pub content_type: String,
    pub payload_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInscriptionResponse {
    pub tx_id: String,
}

/// `onFinish`/`onCancel` pair handed to one SDK call
///
/// At most one of the two ever takes effect.
pub struct Callbacks<T> {
    on_finish: Box<dyn FnOnce(T) + Send>,
    on_cancel: Box<dyn FnOnce() + Send>,
}

impl<T> Callbacks<T> {
    pub fn new<F, C>(on_finish: F, on_cancel: C) -> Self
    where
        F: FnOnce(T) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        Self {
            on_finish: Box::new(on_finish),
            on_cancel: Box::new(on_cancel),
        }
    }

    pub fn finish(self, value: T) {
        (self.on_finish)(value)
    }

    pub fn cancel(self) {
        (self.on_cancel)()
    }
}

impl<T> fmt::Debug for Callbacks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callbacks")
    }
}

/// sats-connect entry points used by the connector
pub trait XverseSdk: Send + Sync {
    fn get_address(&self, payload: GetAddressPayload, callbacks: Callbacks<GetAddressResponse>);

    fn sign_message(&self, payload: SignMessagePayload, callbacks: Callbacks<String>);

    /// Finishes with the txid
    fn send_btc_transaction(
        &self,
        payload: SendBtcTransactionPayload,
        callbacks: Callbacks<String>,
    );

    fn sign_transaction(
        &self,
        payload: SignTransactionPayload,
        callbacks: Callbacks<SignTransactionResponse>,
    );

    fn create_inscription(
        &self,
        payload: CreateInscriptionPayload,
        callbacks: Callbacks<CreateInscriptionResponse>,
    );
}

type Reply<T> = Arc<Mutex<Option<oneshot::Sender<Result<T, VendorError>>>>>;

fn reply<T>(slot: &Reply<T>, value: Result<T, VendorError>) {
    if let Some(sender) = slot.lock().take() {
        let _ = sender.send(value);
    }
}

/// Run one callback-style SDK call as a future.
///
/// `onFinish` resolves, `onCancel` fails with [`ConnectorError::UserRejected`]
/// carrying `cancel_message`. If the SDK drops both callbacks without calling
/// either, the future fails instead of hanging.
pub async fn request<T, F>(cancel_message: &str, call: F) -> Result<T, ConnectorError>
where
    T: Send + 'static,
    F: FnOnce(Callbacks<T>) + Send,
{
    let (sender, receiver) = oneshot::channel();
    let slot: Reply<T> = Arc::new(Mutex::new(Some(sender)));

    let finish = slot.clone();
    let message = cancel_message.to_string();
    call(Callbacks::new(
        move |value| reply(&finish, Ok(value)),
        move || reply(&slot, Err(VendorError::cancelled(message))),
    ));

    match receiver.await {
        Ok(result) => Ok(result?),
        Err(_) => Err(ConnectorError::Connection(
            "Xverse dropped the request without answering".to_string(),
        )),
    }
}

//! Xverse Wallet Connector
//!
//! Talks to Xverse through the callback-style sats-connect SDK. Xverse has no
//! account-change notification and no inscription transfer; it can create
//! inscriptions instead.

pub mod sdk;

pub use sdk::{
    AddressPurpose, Callbacks, CreateInscriptionPayload, CreateInscriptionResponse,
    GetAddressPayload, GetAddressResponse, InputToSign, NetworkPayload, Recipient,
    SendBtcTransactionPayload, SignMessagePayload, SignTransactionPayload,
    SignTransactionResponse, XverseAddress, XverseNetwork, XverseSdk,
};

use async_trait::async_trait;
use bitcoin::Psbt;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

use crate::connectors::{Connector, ConnectorError, InscriptionContent, Session};
use crate::network::WalletNetwork;
use crate::psbt;
use sdk::request;

const NAME: &str = "Xverse";

/// Xverse connector (`window.XverseProviders`)
pub struct XverseConnector {
    sdk: Option<Arc<dyn XverseSdk>>,
    session: Session,
    /// Funding address, used as `senderAddress` for transfers
    payment_address: RwLock<Option<String>>,
}

impl XverseConnector {
    pub fn new(sdk: Option<Arc<dyn XverseSdk>>, network: WalletNetwork) -> Self {
        Self {
            sdk,
            session: Session::new(network),
            payment_address: RwLock::new(None),
        }
    }

    pub fn payment_address(&self) -> Option<String> {
        self.payment_address.read().clone()
    }

    fn set_payment_address(&self, address: Option<String>) {
        *self.payment_address.write() = address;
    }

    fn sdk(&self) -> Result<Arc<dyn XverseSdk>, ConnectorError> {
        self.sdk
            .clone()
            .ok_or_else(|| ConnectorError::not_installed(NAME))
    }

    fn network_payload(&self) -> NetworkPayload {
        self.session.network().into()
    }

    /// Ordinals and payment addresses, both required for signing and sending
    fn addresses(&self) -> Result<(String, String), ConnectorError> {
        match (self.session.address(), self.payment_address()) {
            (Some(address), Some(payment)) => Ok((address, payment)),
            _ => Err(ConnectorError::not_connected()),
        }
    }
}

#[async_trait]
impl Connector for XverseConnector {
    fn id(&self) -> &'static str {
        "xverse"
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn homepage(&self) -> &'static str {
        "https://www.xverse.app/"
    }

    fn session(&self) -> &Session {
        &self.session
    }

    async fn is_ready(&self) -> bool {
        self.session.set_ready(self.sdk.is_some())
    }

    async fn connect(&self) -> Result<(), ConnectorError> {
        let sdk = self.sdk()?;
        self.disconnect();

        let payload = GetAddressPayload {
            purposes: vec![AddressPurpose::Ordinals, AddressPurpose::Payment],
            message: "Address for receiving Ordinals and payments".to_string(),
            network: self.network_payload(),
        };
        debug!("Xverse getAddress on {}", self.session.network());
        let response = request("User rejected connect", move |callbacks| {
            sdk.get_address(payload, callbacks)
        })
        .await?;

        let ordinals = response
            .by_purpose(AddressPurpose::Ordinals)
            .ok_or_else(|| ConnectorError::Parse("no ordinals address returned".to_string()))?;
        let payment = response
            .by_purpose(AddressPurpose::Payment)
            .ok_or_else(|| ConnectorError::Parse("no payment address returned".to_string()))?;

        let accounts = response.addresses.iter().map(|a| a.address.clone()).collect();
        self.session.establish(
            accounts,
            Some(ordinals.address.clone()),
            Some(ordinals.public_key.clone()),
        );
        self.set_payment_address(Some(payment.address.clone()));

        self.session
            .events()
            .account_changed
            .emit(&self.session.account_change());
        info!("Xverse connected as {}", ordinals.address);
        Ok(())
    }

    async fn switch_network(&self, network: WalletNetwork) -> Result<(), ConnectorError> {
        self.session.set_network(network);
        if !self.session.is_connected() {
            return Ok(());
        }
        // The SDK has no network switch; addresses are re-requested on the new network.
        self.connect().await
    }

    fn disconnect(&self) {
        self.session.clear();
        self.set_payment_address(None);
    }

    async fn sign_message(&self, message: &str) -> Result<String, ConnectorError> {
        let (address, _) = self.addresses()?;
        let sdk = self.sdk()?;
        let payload = SignMessagePayload {
            network: self.network_payload(),
            address,
            message: message.to_string(),
        };
        request("Sign Message canceled", move |callbacks| {
            sdk.sign_message(payload, callbacks)
        })
        .await
    }

    async fn send_to_address(
        &self,
        address: &str,
        amount_sats: u64,
    ) -> Result<String, ConnectorError> {
        let (_, payment) = self.addresses()?;
        let sdk = self.sdk()?;
        let payload = SendBtcTransactionPayload {
            network: self.network_payload(),
            recipients: vec![Recipient {
                address: address.to_string(),
                amount_sats,
            }],
            sender_address: payment,
        };
        debug!("Xverse sendBtcTransaction {} sats to {}", amount_sats, address);
        request("Send BTC Transaction canceled", move |callbacks| {
            sdk.send_btc_transaction(payload, callbacks)
        })
        .await
    }

    async fn sign_input(&self, input_index: usize, psbt: &Psbt) -> Result<Psbt, ConnectorError> {
        let address = self.session.address().ok_or_else(ConnectorError::not_connected)?;
        let sdk = self.sdk()?;
        let payload = SignTransactionPayload {
            network: self.network_payload(),
            message: "Sign Transaction".to_string(),
            psbt_base64: psbt::encode_base64(psbt),
            broadcast: false,
            inputs_to_sign: vec![InputToSign {
                address,
                signing_indexes: vec![input_index],
            }],
        };
        let response = request("Sign Transaction canceled", move |callbacks| {
            sdk.sign_transaction(payload, callbacks)
        })
        .await?;
        psbt::decode_base64(&response.psbt_base64)
    }

    async fn send_inscription(
        &self,
        _address: &str,
        _inscription_id: &str,
        _fee_rate: Option<f64>,
    ) -> Result<String, ConnectorError> {
        Err(ConnectorError::not_supported(NAME, "sendInscription"))
    }

    async fn inscribe(&self, content: InscriptionContent) -> Result<String, ConnectorError> {
        let sdk = self.sdk()?;
        let payload = CreateInscriptionPayload {
            network: self.network_payload(),
            content: content.content().to_string(),
            content_type: content.content_type().to_string(),
            payload_type: content.payload_type().to_string(),
        };
        let response = request("Create Inscription canceled", move |callbacks| {
            sdk.create_inscription(payload, callbacks)
        })
        .await?;
        Ok(response.tx_id)
    }
}

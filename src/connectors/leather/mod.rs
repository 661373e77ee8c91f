//! Leather Wallet Connector
//!
//! Leather is driven entirely through its JSON-RPC dispatcher. It has no
//! account-change event and no inscription support.

mod rpc;

pub use rpc::{
    AddressResult, AddressSymbol, LeatherRpc, PaymentType, RequestAddressesResult, RpcError,
    RpcResponse, SendTransferParams, SendTransferResult, SignMessageParams, SignMessageResult,
    SignPsbtParams, SignPsbtResult,
};

use async_trait::async_trait;
use bitcoin::Psbt;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::connectors::{Connector, ConnectorError, Session};
use crate::network::WalletNetwork;
use crate::psbt;

const NAME: &str = "Leather";

/// Leather connector (`window.btc`)
pub struct LeatherConnector {
    rpc: Option<Arc<dyn LeatherRpc>>,
    session: Session,
    derivation_path: RwLock<Option<String>>,
}

impl LeatherConnector {
    pub fn new(rpc: Option<Arc<dyn LeatherRpc>>, network: WalletNetwork) -> Self {
        Self {
            rpc,
            session: Session::new(network),
            derivation_path: RwLock::new(None),
        }
    }

    /// Derivation path of the connected payment address
    pub fn derivation_path(&self) -> Option<String> {
        self.derivation_path.read().clone()
    }

    fn set_derivation_path(&self, path: Option<String>) {
        *self.derivation_path.write() = path;
    }

    fn rpc(&self) -> Result<&Arc<dyn LeatherRpc>, ConnectorError> {
        self.rpc.as_ref().ok_or_else(|| ConnectorError::not_installed(NAME))
    }

    async fn load_addresses(&self) -> Result<(), ConnectorError> {
        let rpc = self.rpc()?;
        debug!("Leather getAddresses");
        let result: RequestAddressesResult =
            rpc::call::<Value, _>(rpc.as_ref(), "getAddresses", None).await?;

        let btc: Vec<AddressResult> = result
            .addresses
            .into_iter()
            .filter(|entry| entry.symbol == AddressSymbol::Btc)
            .collect();
        let payment = btc
            .iter()
            .find(|entry| entry.payment_type == Some(PaymentType::P2wpkh))
            .ok_or_else(|| ConnectorError::Parse("no p2wpkh address returned".to_string()))?;

        self.session.establish(
            btc.iter().map(|entry| entry.address.clone()).collect(),
            Some(payment.address.clone()),
            Some(payment.public_key.clone()),
        );
        self.set_derivation_path(Some(payment.derivation_path.clone()).filter(|p| !p.is_empty()));
        Ok(())
    }
}

#[async_trait]
impl Connector for LeatherConnector {
    fn id(&self) -> &'static str {
        "leather"
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn homepage(&self) -> &'static str {
        "https://leather.io/"
    }

    fn session(&self) -> &Session {
        &self.session
    }

    async fn is_ready(&self) -> bool {
        self.session.set_ready(self.rpc.is_some())
    }

    async fn connect(&self) -> Result<(), ConnectorError> {
        self.load_addresses().await?;
        info!("Leather connected as {:?}", self.session.address());
        Ok(())
    }

    async fn switch_network(&self, network: WalletNetwork) -> Result<(), ConnectorError> {
        self.session.set_network(network);
        if !self.session.is_connected() {
            return Ok(());
        }
        // Leather has no network switch call; it is passed with every request.
        self.load_addresses().await?;
        info!("Leather switched to {}", network);
        Ok(())
    }

    fn disconnect(&self) {
        self.session.clear();
        self.set_derivation_path(None);
        info!("Leather disconnected");
    }

    async fn sign_message(&self, message: &str) -> Result<String, ConnectorError> {
        let params = SignMessageParams {
            message: message.to_string(),
            payment_type: PaymentType::P2wpkh,
            network: self.session.network(),
        };
        let result: SignMessageResult =
            rpc::call(self.rpc()?.as_ref(), "signMessage", Some(&params)).await?;
        Ok(result.signature)
    }

    async fn send_to_address(
        &self,
        address: &str,
        amount_sats: u64,
    ) -> Result<String, ConnectorError> {
        let params = SendTransferParams {
            address: address.to_string(),
            amount: amount_sats.to_string(),
            network: self.session.network(),
        };
        debug!("Leather sendTransfer {} sats to {}", amount_sats, address);
        let result: SendTransferResult =
            rpc::call(self.rpc()?.as_ref(), "sendTransfer", Some(&params)).await?;
        Ok(result.txid)
    }

    async fn sign_input(&self, input_index: usize, psbt: &Psbt) -> Result<Psbt, ConnectorError> {
        self.get_public_key()?;
        let rpc = self.rpc()?;
        let params = SignPsbtParams {
            hex: psbt::encode_hex(psbt),
            sign_at_index: input_index,
            network: self.session.network(),
            broadcast: false,
        };
        let result: SignPsbtResult = rpc::call(rpc.as_ref(), "signPsbt", Some(&params)).await?;
        psbt::decode_hex(&result.hex)
    }

    async fn send_inscription(
        &self,
        _address: &str,
        _inscription_id: &str,
        _fee_rate: Option<f64>,
    ) -> Result<String, ConnectorError> {
        Err(ConnectorError::not_supported(NAME, "sendInscription"))
    }
}

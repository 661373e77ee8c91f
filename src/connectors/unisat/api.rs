//! Unisat injected API
//!
//! The shape of `window.unisat`. Bitget injects the same object under
//! `window.bitkeep.unisat`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::connectors::error::VendorError;
use crate::connectors::types::{
    Balance, FeeOptions, InscriptionPage, ListenerId, SendInscriptionResult, SignPsbtOptions,
};
use crate::network::VendorNetwork;

/// Handler for the vendor's `accountsChanged` event
pub type AccountsChangedHandler = Arc<dyn Fn(Vec<String>) + Send + Sync>;

#[async_trait]
pub trait UnisatApi: Send + Sync {
    async fn request_accounts(&self) -> Result<Vec<String>, VendorError>;

    async fn get_accounts(&self) -> Result<Vec<String>, VendorError>;

    async fn get_network(&self) -> Result<VendorNetwork, VendorError>;

    async fn switch_network(&self, network: VendorNetwork) -> Result<(), VendorError>;

    async fn get_public_key(&self) -> Result<String, VendorError>;

    async fn get_balance(&self) -> Result<Balance, VendorError>;

    async fn get_inscriptions(
        &self,
        cursor: u32,
        size: u32,
    ) -> Result<InscriptionPage, VendorError>;

    async fn sign_message(&self, message: &str) -> Result<String, VendorError>;

    /// `sendBitcoin`
    async fn send_bitcoin(
        &self,
        address: &str,
        amount_sats: u64,
        options: Option<FeeOptions>,
    ) -> Result<String, VendorError>;

    async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        options: Option<FeeOptions>,
    ) -> Result<SendInscriptionResult, VendorError>;

    /// Takes and returns hex-encoded PSBTs
    async fn sign_psbt(
        &self,
        psbt_hex: &str,
        options: &SignPsbtOptions,
    ) -> Result<String, VendorError>;

    /// `on("accountsChanged", handler)`
    fn on_accounts_changed(&self, handler: AccountsChangedHandler) -> ListenerId;

    /// `removeListener("accountsChanged", handler)`
    fn remove_listener(&self, id: ListenerId);
}

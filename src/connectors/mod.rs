//! Wallet Connectors for sats-wagmi
//!
//! This module provides a unified interface over injected Bitcoin wallets.
//! All connectors implement the `Connector` trait, providing a consistent API for:
//! - Connection management (connect, disconnect, network switching)
//! - Account state (address, accounts, public key)
//! - Signing and sending (messages, PSBT inputs, transfers, inscriptions)
//! - Account and network change notifications

pub mod bitget;
pub mod error;
pub mod events;
pub mod leather;
pub mod okx;
pub mod session;
pub mod types;
pub mod unisat;
pub mod xverse;

// Re-export commonly used items
pub use bitget::BitgetConnector;
pub use error::{ConnectorError, VendorError};
pub use events::{ConnectorEvents, EventHub, Subscription};
pub use leather::LeatherConnector;
pub use okx::OkxConnector;
pub use session::{Session, SessionState};
pub use types::*;
pub use unisat::UnisatConnector;
pub use xverse::XverseConnector;

use async_trait::async_trait;
use bitcoin::Psbt;

use crate::network::WalletNetwork;

/// Base trait for all wallet connectors
///
/// Concurrent `connect`/`switch_network` calls on the same connector are not
/// serialized; a vendor event arriving while `connect` is pending may
/// interleave with it and either write can win.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Unique connector id
    fn id(&self) -> &'static str;

    /// Display name
    fn name(&self) -> &'static str;

    /// Extension homepage, opened when the wallet is not installed
    fn homepage(&self) -> &'static str;

    /// Cached state and listener registries
    fn session(&self) -> &Session;

    // =========================================================================
    // Connection
    // =========================================================================

    /// Whether the vendor object is present. Never fails.
    async fn is_ready(&self) -> bool;

    /// Request account access and populate the session
    async fn connect(&self) -> Result<(), ConnectorError>;

    /// Update the local network and, when connected, align the wallet with it
    async fn switch_network(&self, network: WalletNetwork) -> Result<(), ConnectorError>;

    /// Forget the session locally and stop observing the vendor
    fn disconnect(&self);

    // =========================================================================
    // Signing and sending
    // =========================================================================

    async fn sign_message(&self, message: &str) -> Result<String, ConnectorError>;

    /// Send `amount_sats` to `address`, returning the txid
    async fn send_to_address(
        &self,
        address: &str,
        amount_sats: u64,
    ) -> Result<String, ConnectorError>;

    /// Sign input `input_index` with the connected key, without broadcasting
    async fn sign_input(&self, input_index: usize, psbt: &Psbt) -> Result<Psbt, ConnectorError>;

    /// Transfer an inscription, returning the txid
    async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        fee_rate: Option<f64>,
    ) -> Result<String, ConnectorError>;

    async fn get_balance(&self) -> Result<Balance, ConnectorError> {
        Err(ConnectorError::not_supported(self.name(), "getBalance"))
    }

    async fn get_inscriptions(
        &self,
        _cursor: u32,
        _size: u32,
    ) -> Result<InscriptionPage, ConnectorError> {
        Err(ConnectorError::not_supported(self.name(), "getInscriptions"))
    }

    /// Create a new inscription, returning the txid
    async fn inscribe(&self, _content: InscriptionContent) -> Result<String, ConnectorError> {
        Err(ConnectorError::not_supported(self.name(), "inscribe"))
    }

    // =========================================================================
    // Local state
    // =========================================================================

    fn get_account(&self) -> Option<String> {
        self.session().address()
    }

    fn get_accounts(&self) -> Vec<String> {
        self.session().accounts()
    }

    fn is_authorized(&self) -> bool {
        self.get_account().is_some()
    }

    fn network(&self) -> WalletNetwork {
        self.session().network()
    }

    fn get_public_key(&self) -> Result<String, ConnectorError> {
        self.session().public_key().ok_or_else(ConnectorError::not_connected)
    }

    // =========================================================================
    // Events
    // =========================================================================

    fn on_account_changed(
        &self,
        handler: Box<dyn Fn(&AccountChange) + Send + Sync>,
    ) -> Subscription {
        self.session().events().account_changed.on(move |change| handler(change))
    }

    fn on_network_changed(
        &self,
        handler: Box<dyn Fn(&WalletNetwork) + Send + Sync>,
    ) -> Subscription {
        self.session().events().network_changed.on(move |network| handler(network))
    }
}

impl std::fmt::Debug for dyn Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("id", &self.id())
            .field("state", &self.session().snapshot())
            .finish()
    }
}

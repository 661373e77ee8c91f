//! OKX injected API
//!
//! `window.okxwallet` carries one object per Bitcoin network rather than a
//! network parameter: `bitcoin` (the full API), `bitcoinTestnet` and
//! `bitcoinSignet` (connect, accounts and signing only).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::connectors::error::VendorError;
use crate::connectors::types::{
    Balance, FeeOptions, InscriptionPage, ListenerId, SendInscriptionResult, SignPsbtOptions,
};
use crate::network::{VendorNetwork, WalletNetwork};

/// Key of a Bitcoin namespace under `window.okxwallet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OkxNamespace {
    Bitcoin,
    BitcoinTestnet,
    BitcoinSignet,
}

impl OkxNamespace {
    pub fn for_network(network: WalletNetwork) -> Self {
        match network {
            WalletNetwork::Mainnet => OkxNamespace::Bitcoin,
            WalletNetwork::Testnet => OkxNamespace::BitcoinTestnet,
            WalletNetwork::Signet => OkxNamespace::BitcoinSignet,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            OkxNamespace::Bitcoin => "bitcoin",
            OkxNamespace::BitcoinTestnet => "bitcoinTestnet",
            OkxNamespace::BitcoinSignet => "bitcoinSignet",
        }
    }
}

impl fmt::Display for OkxNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Result of `connect()` and payload of the `accountChanged` event
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxAccount {
    pub address: String,
    pub public_key: String,
}

/// Handler for the vendor's `accountChanged` event
pub type AccountChangedHandler = Arc<dyn Fn(OkxAccount) + Send + Sync>;

/// `window.okxwallet`
pub trait OkxWallet: Send + Sync {
    /// `window.okxwallet[key]`, `None` when the namespace is not injected
    fn namespace(&self, key: OkxNamespace) -> Option<Arc<dyn OkxBitcoinApi>>;
}

/// One Bitcoin namespace of `window.okxwallet`
///
/// The testnet and signet namespaces only carry `connect`, `getAccounts`,
/// `signMessage` and `signPsbt`; the remaining methods default to reporting
/// that they are unavailable.
#[async_trait]
pub trait OkxBitcoinApi: Send + Sync {
    async fn connect(&self) -> Result<OkxAccount, VendorError>;

    async fn get_accounts(&self) -> Result<Vec<String>, VendorError>;

    async fn sign_message(&self, message: &str) -> Result<String, VendorError>;

    /// Takes and returns hex-encoded PSBTs
    async fn sign_psbt(
        &self,
        psbt_hex: &str,
        options: &SignPsbtOptions,
    ) -> Result<String, VendorError>;

    async fn get_network(&self) -> Result<VendorNetwork, VendorError> {
        Err(VendorError::unsupported("getNetwork"))
    }

    async fn switch_network(&self, _network: VendorNetwork) -> Result<(), VendorError> {
        Err(VendorError::unsupported("switchNetwork"))
    }

    async fn get_public_key(&self) -> Result<String, VendorError> {
        Err(VendorError::unsupported("getPublicKey"))
    }

    async fn get_balance(&self) -> Result<Balance, VendorError> {
        Err(VendorError::unsupported("getBalance"))
    }

    async fn get_inscriptions(
        &self,
        _cursor: u32,
        _size: u32,
    ) -> Result<InscriptionPage, VendorError> {
        Err(VendorError::unsupported("getInscriptions"))
    }

    /// `sendBitcoin`
    async fn send_bitcoin(
        &self,
        _address: &str,
        _amount_sats: u64,
        _options: Option<FeeOptions>,
    ) -> Result<String, VendorError> {
        Err(VendorError::unsupported("sendBitcoin"))
    }

    async fn send_inscription(
        &self,
        _address: &str,
        _inscription_id: &str,
        _options: Option<FeeOptions>,
    ) -> Result<SendInscriptionResult, VendorError> {
        Err(VendorError::unsupported("sendInscription"))
    }

    /// `on("accountChanged", handler)`; `None` when the namespace has no events
    fn on_account_changed(&self, _handler: AccountChangedHandler) -> Option<ListenerId> {
        None
    }

    /// `removeListener("accountChanged", handler)`
    fn remove_listener(&self, _id: ListenerId) {}
}

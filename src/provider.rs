//! Bitcoin provider
//!
//! Owns the connector set, the selected connector and the selected network.
//! Network switches fan out to every connector; one connector failing to
//! follow never blocks the others or rolls the provider back.

use futures_util::future::join_all;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

use crate::connectors::leather::LeatherRpc;
use crate::connectors::okx::OkxWallet;
use crate::connectors::unisat::UnisatApi;
use crate::connectors::xverse::XverseSdk;
use crate::connectors::{
    BitgetConnector, Connector, ConnectorError, EventHub, LeatherConnector, OkxConnector,
    Subscription, UnisatConnector, XverseConnector,
};
use crate::network::WalletNetwork;

// =============================================================================
// Configuration
// =============================================================================

/// Wallets the provider can instantiate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    Xverse,
    Unisat,
    Okx,
    Bitget,
    Leather,
}

impl ConnectorKind {
    pub const ALL: [ConnectorKind; 5] = [
        ConnectorKind::Xverse,
        ConnectorKind::Unisat,
        ConnectorKind::Okx,
        ConnectorKind::Bitget,
        ConnectorKind::Leather,
    ];

    /// Id of the connector this kind builds
    pub fn id(&self) -> &'static str {
        match self {
            ConnectorKind::Xverse => "xverse",
            ConnectorKind::Unisat => "unisat",
            ConnectorKind::Okx => "okx",
            ConnectorKind::Bitget => "bitget",
            ConnectorKind::Leather => "leather",
        }
    }
}

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Network the provider and its connectors start on
    pub initial_network: WalletNetwork,
    /// Connectors to instantiate, in display order
    pub connectors: Vec<ConnectorKind>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            initial_network: WalletNetwork::Mainnet,
            connectors: ConnectorKind::ALL.to_vec(),
        }
    }
}

impl ProviderConfig {
    pub fn new(initial_network: WalletNetwork) -> Self {
        Self {
            initial_network,
            ..Self::default()
        }
    }

    pub fn with_connectors(mut self, connectors: Vec<ConnectorKind>) -> Self {
        self.connectors = connectors;
        self
    }

    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConnectorError> {
        Ok(serde_json::from_str(json)?)
    }
}

// =============================================================================
// Environment
// =============================================================================

/// Opens a wallet's homepage so the user can install it
pub trait HomepageOpener: Send + Sync {
    fn open(&self, url: &str);
}

/// Opener used when the host supplies none: logs the URL
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOpener;

impl HomepageOpener for LogOpener {
    fn open(&self, url: &str) {
        info!("Wallet not installed, see {}", url);
    }
}

/// Vendor objects injected by the host, `None` for wallets that are absent
#[derive(Clone, Default)]
pub struct WalletEnvironment {
    pub unisat: Option<Arc<dyn UnisatApi>>,
    pub bitget: Option<Arc<dyn UnisatApi>>,
    pub okx: Option<Arc<dyn OkxWallet>>,
    pub xverse: Option<Arc<dyn XverseSdk>>,
    pub leather: Option<Arc<dyn LeatherRpc>>,
    pub opener: Option<Arc<dyn HomepageOpener>>,
}

impl WalletEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unisat(mut self, api: Arc<dyn UnisatApi>) -> Self {
        self.unisat = Some(api);
        self
    }

    pub fn with_bitget(mut self, api: Arc<dyn UnisatApi>) -> Self {
        self.bitget = Some(api);
        self
    }

    pub fn with_okx(mut self, wallet: Arc<dyn OkxWallet>) -> Self {
        self.okx = Some(wallet);
        self
    }

    pub fn with_xverse(mut self, sdk: Arc<dyn XverseSdk>) -> Self {
        self.xverse = Some(sdk);
        self
    }

    pub fn with_leather(mut self, rpc: Arc<dyn LeatherRpc>) -> Self {
        self.leather = Some(rpc);
        self
    }

    pub fn with_opener(mut self, opener: Arc<dyn HomepageOpener>) -> Self {
        self.opener = Some(opener);
        self
    }

    pub fn opener(&self) -> Arc<dyn HomepageOpener> {
        self.opener
            .clone()
            .unwrap_or_else(|| Arc::new(LogOpener) as Arc<dyn HomepageOpener>)
    }

    fn build(&self, kind: ConnectorKind, network: WalletNetwork) -> Arc<dyn Connector> {
        match kind {
            ConnectorKind::Xverse => Arc::new(XverseConnector::new(self.xverse.clone(), network)),
            ConnectorKind::Unisat => Arc::new(UnisatConnector::new(self.unisat.clone(), network)),
            ConnectorKind::Okx => Arc::new(OkxConnector::new(self.okx.clone(), network)),
            ConnectorKind::Bitget => Arc::new(BitgetConnector::new(self.bitget.clone(), network)),
            ConnectorKind::Leather => {
                Arc::new(LeatherConnector::new(self.leather.clone(), network))
            }
        }
    }
}

impl fmt::Debug for WalletEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletEnvironment")
            .field("unisat", &self.unisat.is_some())
            .field("bitget", &self.bitget.is_some())
            .field("okx", &self.okx.is_some())
            .field("xverse", &self.xverse.is_some())
            .field("leather", &self.leather.is_some())
            .finish()
    }
}

// =============================================================================
// Provider
// =============================================================================

struct ProviderInner {
    config: ProviderConfig,
    environment: WalletEnvironment,
    /// Prebuilt connectors, used instead of `config.connectors` when set
    supplied: Option<Vec<Arc<dyn Connector>>>,
    connectors: OnceLock<Vec<Arc<dyn Connector>>>,
    active: RwLock<Option<Arc<dyn Connector>>>,
    network: RwLock<WalletNetwork>,
    network_changed: EventHub<WalletNetwork>,
    connector_changed: EventHub<Option<Arc<dyn Connector>>>,
}

/// Process-wide wallet state. Cloning shares the same provider.
#[derive(Clone)]
pub struct BitcoinProvider {
    inner: Arc<ProviderInner>,
}

impl BitcoinProvider {
    pub fn new(config: ProviderConfig, environment: WalletEnvironment) -> Self {
        Self::build(config, environment, None)
    }

    /// Provider over prebuilt connectors instead of the configured kinds
    pub fn with_connectors(
        network: WalletNetwork,
        connectors: Vec<Arc<dyn Connector>>,
        environment: WalletEnvironment,
    ) -> Self {
        Self::build(ProviderConfig::new(network), environment, Some(connectors))
    }

    fn build(
        config: ProviderConfig,
        environment: WalletEnvironment,
        supplied: Option<Vec<Arc<dyn Connector>>>,
    ) -> Self {
        let network = config.initial_network;
        Self {
            inner: Arc::new(ProviderInner {
                config,
                environment,
                supplied,
                connectors: OnceLock::new(),
                active: RwLock::new(None),
                network: RwLock::new(network),
                network_changed: EventHub::new(),
                connector_changed: EventHub::new(),
            }),
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.inner.config
    }

    pub fn environment(&self) -> &WalletEnvironment {
        &self.inner.environment
    }

    /// All connectors, created on first access on the provider's current
    /// network.
    pub fn connectors(&self) -> &[Arc<dyn Connector>] {
        self.inner.connectors.get_or_init(|| {
            if let Some(supplied) = &self.inner.supplied {
                return supplied.clone();
            }
            let network = self.network();
            debug!("Creating connectors {:?} on {}", self.inner.config.connectors, network);
            self.inner
                .config
                .connectors
                .iter()
                .map(|kind| self.inner.environment.build(*kind, network))
                .collect()
        })
    }

    pub fn connector_by_id(&self, id: &str) -> Option<Arc<dyn Connector>> {
        self.connectors()
            .iter()
            .find(|connector| connector.id() == id)
            .cloned()
    }

    /// Currently selected connector
    pub fn connector(&self) -> Option<Arc<dyn Connector>> {
        self.inner.active.read().clone()
    }

    pub fn set_connector(&self, connector: Option<Arc<dyn Connector>>) {
        *self.inner.active.write() = connector.clone();
        debug!(
            "Selected connector: {}",
            connector.as_ref().map(|c| c.id()).unwrap_or("none")
        );
        self.inner.connector_changed.emit(&connector);
    }

    pub fn network(&self) -> WalletNetwork {
        *self.inner.network.read()
    }

    /// Switch every connector to `network`.
    ///
    /// The provider's network is updated first and stays updated whatever
    /// the connectors do. Connectors already on `network` are skipped, the
    /// others switch concurrently and failures are only logged.
    /// `network_changed` fires once, after all of them have settled.
    pub async fn switch_network(&self, network: WalletNetwork) {
        *self.inner.network.write() = network;

        let pending = self
            .connectors()
            .iter()
            .filter(|connector| connector.network() != network)
            .map(|connector| async move {
                (connector.id(), connector.switch_network(network).await)
            });

        for (id, result) in join_all(pending).await {
            if let Err(e) = result {
                warn!("Connector {} failed to switch to {}: {}", id, network, e);
            }
        }

        info!("Provider network switched to {}", network);
        self.inner.network_changed.emit(&network);
    }

    pub fn on_network_changed<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&WalletNetwork) + Send + Sync + 'static,
    {
        self.inner.network_changed.on(handler)
    }

    /// Fires with the new selection whenever `set_connector` is called
    pub fn on_connector_changed<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Option<Arc<dyn Connector>>) + Send + Sync + 'static,
    {
        self.inner.connector_changed.on(handler)
    }
}

impl Default for BitcoinProvider {
    fn default() -> Self {
        Self::new(ProviderConfig::default(), WalletEnvironment::default())
    }
}

impl fmt::Debug for BitcoinProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitcoinProvider")
            .field("network", &self.network())
            .field("connector", &self.connector().map(|c| c.id()))
            .field("environment", &self.inner.environment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_config() {
        let config = ProviderConfig::default();
        assert_eq!(config.initial_network, WalletNetwork::Mainnet);
        assert_eq!(config.connectors, ConnectorKind::ALL.to_vec());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{"initialNetwork":"signet","connectors":["okx","leather"]}"#;
        let config = ProviderConfig::from_json(json).unwrap();
        assert_eq!(config.initial_network, WalletNetwork::Signet);
        assert_eq!(config.connectors, vec![ConnectorKind::Okx, ConnectorKind::Leather]);

        let partial = ProviderConfig::from_json(r#"{"initialNetwork":"testnet"}"#).unwrap();
        assert_eq!(partial.connectors.len(), 5);

        assert!(matches!(
            ProviderConfig::from_json(r#"{"initialNetwork":"regtest"}"#),
            Err(ConnectorError::Parse(_))
        ));
    }

    #[test]
    fn test_connectors_follow_config() {
        let provider = BitcoinProvider::new(
            ProviderConfig::new(WalletNetwork::Testnet),
            WalletEnvironment::new(),
        );
        let ids: Vec<_> = provider.connectors().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["xverse", "unisat", "okx", "bitget", "leather"]);
        assert!(provider
            .connectors()
            .iter()
            .all(|c| c.network() == WalletNetwork::Testnet));
        assert!(provider.connector_by_id("okx").is_some());
        assert!(provider.connector_by_id("metamask").is_none());
    }

    #[tokio::test]
    async fn test_switch_network_without_connection() {
        let provider = BitcoinProvider::default();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let sub = provider.on_network_changed(move |network| {
            assert_eq!(*network, WalletNetwork::Signet);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        provider.switch_network(WalletNetwork::Signet).await;

        assert_eq!(provider.network(), WalletNetwork::Signet);
        assert!(provider
            .connectors()
            .iter()
            .all(|c| c.network() == WalletNetwork::Signet));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        sub.unsubscribe();
    }

    #[test]
    fn test_set_connector_notifies() {
        let provider = BitcoinProvider::default();
        let selected = Arc::new(RwLock::new(None::<&'static str>));
        let seen = selected.clone();
        let sub = provider.on_connector_changed(move |connector| {
            *seen.write() = connector.as_ref().map(|c| c.id());
        });

        provider.set_connector(provider.connector_by_id("unisat"));
        assert_eq!(*selected.read(), Some("unisat"));
        assert_eq!(provider.connector().map(|c| c.id()), Some("unisat"));

        provider.set_connector(None);
        assert_eq!(*selected.read(), None);
        sub.unsubscribe();
    }
}

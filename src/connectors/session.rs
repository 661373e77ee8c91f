//! Connector session state and vendor-change reconciliation

use parking_lot::RwLock;
use std::future::Future;
use tracing::{debug, warn};

use crate::connectors::error::ConnectorError;
use crate::connectors::events::ConnectorEvents;
use crate::connectors::types::AccountChange;
use crate::network::WalletNetwork;

/// Locally cached view of one wallet session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// Whether the vendor object was present at the last readiness check
    pub ready: bool,
    pub address: Option<String>,
    pub accounts: Vec<String>,
    pub public_key: Option<String>,
    pub network: WalletNetwork,
}

/// Mutable state owned by a connector, plus its listener registries
///
/// Reads never touch the vendor. `address` is always an element of
/// `accounts` when both are set.
#[derive(Debug)]
pub struct Session {
    state: RwLock<SessionState>,
    events: ConnectorEvents,
}

impl Session {
    pub fn new(network: WalletNetwork) -> Self {
        Self {
            state: RwLock::new(SessionState {
                ready: false,
                address: None,
                accounts: Vec::new(),
                public_key: None,
                network,
            }),
            events: ConnectorEvents::default(),
        }
    }

    pub fn events(&self) -> &ConnectorEvents {
        &self.events
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.state.read().ready
    }

    pub fn set_ready(&self, ready: bool) -> bool {
        self.state.write().ready = ready;
        ready
    }

    pub fn address(&self) -> Option<String> {
        self.state.read().address.clone()
    }

    pub fn accounts(&self) -> Vec<String> {
        self.state.read().accounts.clone()
    }

    pub fn public_key(&self) -> Option<String> {
        self.state.read().public_key.clone()
    }

    pub fn network(&self) -> WalletNetwork {
        self.state.read().network
    }

    pub fn is_connected(&self) -> bool {
        self.state.read().address.is_some()
    }

    pub fn set_network(&self, network: WalletNetwork) {
        self.state.write().network = network;
    }

    /// Store `network`, returning whether it differed from the cached value.
    pub fn update_network(&self, network: WalletNetwork) -> bool {
        let mut state = self.state.write();
        if state.network == network {
            return false;
        }
        state.network = network;
        true
    }

    /// Record the accounts granted by the vendor.
    ///
    /// Empty strings count as absent. An address missing from `accounts` is
    /// inserted at the front.
    pub fn establish(
        &self,
        mut accounts: Vec<String>,
        address: Option<String>,
        public_key: Option<String>,
    ) {
        accounts.retain(|account| !account.is_empty());
        let address = address
            .filter(|address| !address.is_empty())
            .or_else(|| accounts.first().cloned());
        if let Some(address) = &address {
            if !accounts.contains(address) {
                accounts.insert(0, address.clone());
            }
        }

        let mut state = self.state.write();
        state.accounts = accounts;
        state.address = address;
        state.public_key = public_key.filter(|key| !key.is_empty());
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        state.accounts.clear();
        state.address = None;
        state.public_key = None;
    }

    /// Current state in `accountChanged` payload form
    pub fn account_change(&self) -> AccountChange {
        let state = self.state.read();
        AccountChange {
            address: state.address.clone().unwrap_or_default(),
            accounts: state.accounts.clone(),
            public_key: state.public_key.clone().unwrap_or_default(),
        }
    }
}

/// Accounts reported by a vendor-originated change
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AccountUpdate {
    pub accounts: Vec<String>,
    pub address: Option<String>,
    pub public_key: Option<String>,
}

impl AccountUpdate {
    /// The first account becomes the active address.
    pub fn from_accounts(accounts: Vec<String>, public_key: Option<String>) -> Self {
        Self {
            address: accounts.first().cloned(),
            accounts,
            public_key,
        }
    }
}

/// Apply a vendor account change and re-check the vendor network.
///
/// Account and network reconciliation are independent: some wallets switch
/// the active account as a side effect of a network switch without emitting
/// a separate network event, so the network is re-read on every account
/// change and `network_changed` fires only when it differs. `on_network`
/// runs after the new network is stored and before listeners see it.
pub(crate) async fn reconcile_accounts<F, N>(
    session: &Session,
    wallet: &str,
    update: AccountUpdate,
    current_network: F,
    on_network: N,
) where
    F: Future<Output = Result<WalletNetwork, ConnectorError>>,
    N: FnOnce(WalletNetwork),
{
    session.establish(update.accounts, update.address, update.public_key);
    let change = session.account_change();
    debug!("{} accounts changed: {:?}", wallet, change.accounts);
    session.events().account_changed.emit(&change);

    match current_network.await {
        Ok(network) => {
            if session.update_network(network) {
                debug!("{} network changed to {}", wallet, network);
                on_network(network);
                session.events().network_changed.emit(&network);
            }
        }
        Err(e) => warn!("{} network check after account change failed: {}", wallet, e),
    }
}

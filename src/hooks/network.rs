//! Network mutation
//!
//! Switches the provider network. While a connector is selected, network
//! changes that originate in the wallet are forwarded into the same switch,
//! so the provider follows the wallet. The reverse direction is the
//! provider's own fan-out.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::connectors::{ConnectorError, Subscription};
use crate::hooks::{Mutation, MutationState};
use crate::network::WalletNetwork;
use crate::provider::BitcoinProvider;

struct NetworkInner {
    provider: BitcoinProvider,
    mutation: Mutation<WalletNetwork>,
    runtime: Option<Handle>,
    selection: Mutex<Option<Subscription>>,
    forward: Mutex<Option<Subscription>>,
}

impl NetworkInner {
    async fn switch(&self, network: WalletNetwork) -> Result<WalletNetwork, ConnectorError> {
        self.mutation
            .run(async {
                self.provider.switch_network(network).await;
                Ok::<_, ConnectorError>(network)
            })
            .await
    }

    /// Listen to the selected connector's vendor-originated network changes.
    fn rebind(self: &Arc<Self>) {
        let mut forward = self.forward.lock();
        if let Some(subscription) = forward.take() {
            subscription.unsubscribe();
        }

        let (Some(connector), Some(runtime)) = (self.provider.connector(), self.runtime.clone())
        else {
            return;
        };
        let weak = Arc::downgrade(self);
        *forward = Some(connector.on_network_changed(Box::new(move |network: &WalletNetwork| {
            forward_switch(&weak, &runtime, *network)
        })));
    }
}

/// The provider skips connectors already on `network`, so forwarding does
/// not loop back into another wallet event.
fn forward_switch(inner: &Weak<NetworkInner>, runtime: &Handle, network: WalletNetwork) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    if inner.provider.network() == network {
        return;
    }
    debug!("Wallet switched to {}, following", network);
    runtime.spawn(async move {
        let _ = inner.switch(network).await;
    });
}

/// Provider network switching
pub struct NetworkMutation {
    inner: Arc<NetworkInner>,
}

impl NetworkMutation {
    /// Forwarding of wallet-originated changes needs a Tokio runtime; outside
    /// one only explicit switches work.
    pub fn new(provider: &BitcoinProvider) -> Self {
        let runtime = Handle::try_current().ok();
        if runtime.is_none() {
            warn!("No Tokio runtime, wallet network changes will not be followed");
        }

        let inner = Arc::new(NetworkInner {
            provider: provider.clone(),
            mutation: Mutation::new("switch-bitcoin-network"),
            runtime,
            selection: Mutex::new(None),
            forward: Mutex::new(None),
        });

        let weak = Arc::downgrade(&inner);
        let selection = provider.on_connector_changed(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.rebind();
            }
        });
        *inner.selection.lock() = Some(selection);
        inner.rebind();

        Self { inner }
    }

    pub fn network(&self) -> WalletNetwork {
        self.inner.provider.network()
    }

    pub async fn switch_network(
        &self,
        network: WalletNetwork,
    ) -> Result<WalletNetwork, ConnectorError> {
        self.inner.switch(network).await
    }

    pub fn state(&self) -> MutationState<WalletNetwork> {
        self.inner.mutation.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState<WalletNetwork>> {
        self.inner.mutation.subscribe()
    }
}

impl Drop for NetworkMutation {
    fn drop(&mut self) {
        for lock in [&self.inner.selection, &self.inner.forward] {
            let subscription = lock.lock().take();
            if let Some(subscription) = subscription {
                subscription.unsubscribe();
            }
        }
    }
}

impl std::fmt::Debug for NetworkMutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkMutation")
            .field("network", &self.network())
            .field("mutation", &self.inner.mutation)
            .finish()
    }
}

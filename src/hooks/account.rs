//! Account query
//!
//! Mirrors `(address, addresses)` of the selected connector. The snapshot is
//! refetched whenever the connector reports an account or network change,
//! the provider switches network, or a different connector is selected.

use chrono::{DateTime, Utc};
use futures_util::Stream;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::debug;

use crate::connectors::{AccountChange, Subscription};
use crate::hooks::QueryStatus;
use crate::network::WalletNetwork;
use crate::provider::BitcoinProvider;

/// Account state of the selected connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub status: QueryStatus,
    /// Id of the connector the snapshot was read from
    pub connector: Option<&'static str>,
    pub address: Option<String>,
    pub addresses: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl AccountSnapshot {
    fn read(provider: &BitcoinProvider) -> Self {
        match provider.connector() {
            Some(connector) => Self {
                status: QueryStatus::Success,
                connector: Some(connector.id()),
                address: connector.get_account(),
                addresses: connector.get_accounts(),
                updated_at: Utc::now(),
            },
            None => Self {
                status: QueryStatus::Idle,
                connector: None,
                address: None,
                addresses: Vec::new(),
                updated_at: Utc::now(),
            },
        }
    }

    /// Same account data, ignoring when it was read
    pub fn same_account(&self, other: &Self) -> bool {
        self.connector == other.connector
            && self.address == other.address
            && self.addresses == other.addresses
    }
}

struct AccountInner {
    provider: BitcoinProvider,
    snapshot: watch::Sender<AccountSnapshot>,
    provider_subscriptions: Mutex<Vec<Subscription>>,
    connector_subscriptions: Mutex<Vec<Subscription>>,
}

impl AccountInner {
    fn refetch(&self) -> AccountSnapshot {
        let snapshot = AccountSnapshot::read(&self.provider);
        debug!("Account refetched: {:?} on {:?}", snapshot.address, snapshot.connector);
        self.snapshot.send_replace(snapshot.clone());
        snapshot
    }

    /// Move the connector subscriptions to the currently selected connector.
    fn rebind(self: &Arc<Self>) {
        let mut subscriptions = self.connector_subscriptions.lock();
        for subscription in subscriptions.drain(..) {
            subscription.unsubscribe();
        }

        if let Some(connector) = self.provider.connector() {
            let weak = Arc::downgrade(self);
            subscriptions.push(connector.on_account_changed(Box::new(move |_: &AccountChange| {
                refetch(&weak)
            })));
            let weak = Arc::downgrade(self);
            subscriptions.push(connector.on_network_changed(Box::new(move |_: &WalletNetwork| {
                refetch(&weak)
            })));
        }
    }

    fn teardown(&self) {
        for lock in [&self.provider_subscriptions, &self.connector_subscriptions] {
            let subscriptions: Vec<Subscription> = lock.lock().drain(..).collect();
            for subscription in subscriptions {
                subscription.unsubscribe();
            }
        }
    }
}

fn refetch(inner: &Weak<AccountInner>) {
    if let Some(inner) = inner.upgrade() {
        inner.refetch();
    }
}

/// Live view of the selected connector's accounts
///
/// Subscriptions are released when the query is dropped.
pub struct AccountQuery {
    inner: Arc<AccountInner>,
}

impl AccountQuery {
    pub fn new(provider: &BitcoinProvider) -> Self {
        let (snapshot, _) = watch::channel(AccountSnapshot::read(provider));
        let inner = Arc::new(AccountInner {
            provider: provider.clone(),
            snapshot,
            provider_subscriptions: Mutex::new(Vec::new()),
            connector_subscriptions: Mutex::new(Vec::new()),
        });

        let on_network = Arc::downgrade(&inner);
        let on_connector = Arc::downgrade(&inner);
        let subscriptions = vec![
            provider.on_network_changed(move |_| refetch(&on_network)),
            provider.on_connector_changed(move |_| {
                if let Some(inner) = on_connector.upgrade() {
                    inner.rebind();
                    inner.refetch();
                }
            }),
        ];
        *inner.provider_subscriptions.lock() = subscriptions;
        inner.rebind();

        Self { inner }
    }

    pub fn current(&self) -> AccountSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    pub fn address(&self) -> Option<String> {
        self.inner.snapshot.borrow().address.clone()
    }

    pub fn addresses(&self) -> Vec<String> {
        self.inner.snapshot.borrow().addresses.clone()
    }

    /// Re-read the selected connector's state now
    pub fn refetch(&self) -> AccountSnapshot {
        self.inner.refetch()
    }

    pub fn subscribe(&self) -> watch::Receiver<AccountSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// The current snapshot, then every refetch. Ends when the query is
    /// dropped.
    pub fn updates(&self) -> impl Stream<Item = AccountSnapshot> + Send + 'static {
        let mut receiver = self.inner.snapshot.subscribe();
        async_stream::stream! {
            let current = receiver.borrow_and_update().clone();
            yield current;
            while receiver.changed().await.is_ok() {
                let next = receiver.borrow_and_update().clone();
                yield next;
            }
        }
    }
}

impl Drop for AccountQuery {
    fn drop(&mut self) {
        self.inner.teardown();
    }
}

impl std::fmt::Debug for AccountQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountQuery")
            .field("snapshot", &*self.inner.snapshot.borrow())
            .finish()
    }
}

//! Event hub shared by connectors and the provider
//!
//! Handlers fire in registration order. `emit` works on a snapshot of the
//! handler list taken before the first handler runs, so a handler may
//! unsubscribe itself (or others) while the hub is emitting; the removal
//! applies from the next emission on.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::connectors::types::AccountChange;
use crate::network::WalletNetwork;

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Handlers<T> {
    next_id: u64,
    entries: Vec<(u64, Handler<T>)>,
}

/// Ordered handler registry for one event kind
pub struct EventHub<T> {
    handlers: Arc<Mutex<Handlers<T>>>,
}

impl<T: 'static> EventHub<T> {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(Handlers {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a handler. The returned [`Subscription`] removes exactly this
    /// handler.
    pub fn on<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut handlers = self.handlers.lock();
            let id = handlers.next_id;
            handlers.next_id += 1;
            handlers.entries.push((id, Arc::new(handler)));
            id
        };

        let registry = Arc::downgrade(&self.handlers);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Handler<T>> = self
            .handlers
            .lock()
            .entries
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in snapshot {
            handler(value);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for EventHub<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventHub<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("handlers", &self.handlers.lock().entries.len())
            .finish()
    }
}

/// Handle returned by [`EventHub::on`]
///
/// Dropping it leaves the handler registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
#[must_use = "dropping a Subscription keeps the handler registered forever"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription that removes nothing
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// The two event kinds every connector publishes
#[derive(Debug, Default)]
pub struct ConnectorEvents {
    pub account_changed: EventHub<AccountChange>,
    pub network_changed: EventHub<WalletNetwork>,
}

//! Reactive wrappers over the provider
//!
//! Each hook is bound to a [`BitcoinProvider`](crate::provider::BitcoinProvider)
//! and publishes its state through a `tokio::sync::watch` channel, so a UI
//! layer can re-render whenever the value changes:
//! - [`AccountQuery`]: active address and addresses of the selected connector
//! - [`ConnectMutation`]: connect a connector and select it
//! - [`DisconnectMutation`]: disconnect and deselect the active connector
//! - [`NetworkMutation`]: switch the provider network

pub mod account;
pub mod connect;
pub mod disconnect;
pub mod network;

pub use account::{AccountQuery, AccountSnapshot};
pub use connect::ConnectMutation;
pub use disconnect::DisconnectMutation;
pub use network::NetworkMutation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::sync::watch;
use tracing::debug;

use crate::connectors::ConnectorError;

/// State of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// Nothing to query (no connector selected)
    Idle,
    Success,
}

/// State of a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// Outcome of the latest mutation call
#[derive(Debug, Clone, PartialEq)]
pub struct MutationState<T> {
    pub status: MutationStatus,
    pub data: Option<T>,
    pub error: Option<ConnectorError>,
    /// When the latest call started
    pub submitted_at: Option<DateTime<Utc>>,
}

impl<T> MutationState<T> {
    pub fn idle() -> Self {
        Self {
            status: MutationStatus::Idle,
            data: None,
            error: None,
            submitted_at: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == MutationStatus::Idle
    }

    pub fn is_pending(&self) -> bool {
        self.status == MutationStatus::Pending
    }

    pub fn is_success(&self) -> bool {
        self.status == MutationStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == MutationStatus::Error
    }
}

impl<T> Default for MutationState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

/// Runs a fallible async action and records its state
pub struct Mutation<T> {
    key: &'static str,
    state: watch::Sender<MutationState<T>>,
}

impl<T: Clone> Mutation<T> {
    pub fn new(key: &'static str) -> Self {
        let (state, _) = watch::channel(MutationState::idle());
        Self { key, state }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn state(&self) -> MutationState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState<T>> {
        self.state.subscribe()
    }

    pub fn reset(&self) {
        self.state.send_replace(MutationState::idle());
    }

    pub async fn run<F>(&self, action: F) -> Result<T, ConnectorError>
    where
        F: Future<Output = Result<T, ConnectorError>>,
    {
        let submitted_at = Some(Utc::now());
        self.state.send_replace(MutationState {
            status: MutationStatus::Pending,
            data: None,
            error: None,
            submitted_at,
        });

        let result = action.await;
        let state = match &result {
            Ok(data) => MutationState {
                status: MutationStatus::Success,
                data: Some(data.clone()),
                error: None,
                submitted_at,
            },
            Err(e) => {
                debug!("{} failed: {}", self.key, e);
                MutationState {
                    status: MutationStatus::Error,
                    data: None,
                    error: Some(e.clone()),
                    submitted_at,
                }
            }
        };
        self.state.send_replace(state);
        result
    }
}

impl<T> std::fmt::Debug for Mutation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutation")
            .field("key", &self.key)
            .field("status", &self.state.borrow().status)
            .finish()
    }
}

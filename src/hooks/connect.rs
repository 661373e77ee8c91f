//! Connect mutation

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::connectors::{Connector, ConnectorError};
use crate::hooks::{Mutation, MutationState};
use crate::provider::BitcoinProvider;

/// Connects a connector by id and selects it in the provider.
///
/// A connector whose wallet is not installed is never asked to connect: its
/// homepage is opened instead and the call fails with `NotInstalled`.
#[derive(Debug)]
pub struct ConnectMutation {
    provider: BitcoinProvider,
    mutation: Mutation<String>,
}

impl ConnectMutation {
    pub fn new(provider: &BitcoinProvider) -> Self {
        Self {
            provider: provider.clone(),
            mutation: Mutation::new("connect"),
        }
    }

    /// Connectors available for selection
    pub fn connectors(&self) -> &[Arc<dyn Connector>] {
        self.provider.connectors()
    }

    /// Connect `connector_id`, resolving with its id
    pub async fn connect(&self, connector_id: &str) -> Result<String, ConnectorError> {
        self.mutation
            .run(async {
                let connector = self
                    .provider
                    .connector_by_id(connector_id)
                    .ok_or_else(|| ConnectorError::UnknownConnector(connector_id.to_string()))?;

                if !connector.is_ready().await {
                    warn!(
                        "{} is not installed, opening {}",
                        connector.name(),
                        connector.homepage()
                    );
                    self.provider.environment().opener().open(connector.homepage());
                    return Err(ConnectorError::not_installed(connector.name()));
                }

                connector.connect().await?;
                self.provider.set_connector(Some(connector.clone()));
                info!("Connected with {}", connector.id());
                Ok(connector.id().to_string())
            })
            .await
    }

    pub fn state(&self) -> MutationState<String> {
        self.mutation.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState<String>> {
        self.mutation.subscribe()
    }

    pub fn reset(&self) {
        self.mutation.reset()
    }
}

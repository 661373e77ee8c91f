//! Disconnect mutation

use tokio::sync::watch;
use tracing::info;

use crate::connectors::ConnectorError;
use crate::hooks::{Mutation, MutationState};
use crate::provider::BitcoinProvider;

/// Disconnects the active connector and clears the provider's selection
#[derive(Debug)]
pub struct DisconnectMutation {
    provider: BitcoinProvider,
    mutation: Mutation<()>,
}

impl DisconnectMutation {
    pub fn new(provider: &BitcoinProvider) -> Self {
        Self {
            provider: provider.clone(),
            mutation: Mutation::new("disconnect"),
        }
    }

    pub async fn disconnect(&self) -> Result<(), ConnectorError> {
        self.mutation
            .run(async {
                if let Some(connector) = self.provider.connector() {
                    connector.disconnect();
                    info!("Disconnected from {}", connector.id());
                }
                self.provider.set_connector(None);
                Ok::<_, ConnectorError>(())
            })
            .await
    }

    pub fn state(&self) -> MutationState<()> {
        self.mutation.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState<()>> {
        self.mutation.subscribe()
    }
}

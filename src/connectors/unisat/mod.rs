//! Unisat Wallet Connector
//!
//! Connector for wallets injecting the Unisat API. Unisat itself and Bitget
//! (which exposes a Unisat-compatible object) share this implementation and
//! differ only in their [`UnisatFlavor`].

mod api;

pub use api::{AccountsChangedHandler, UnisatApi};

use async_trait::async_trait;
use bitcoin::Psbt;
use futures_util::future::try_join;
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::connectors::session::{reconcile_accounts, AccountUpdate};
use crate::connectors::{
    Balance, Connector, ConnectorError, FeeOptions, InscriptionPage, ListenerId, Session,
    SignPsbtOptions,
};
use crate::network::WalletNetwork;
use crate::psbt;

/// Identity of a wallet speaking the Unisat API
pub trait UnisatFlavor: Send + Sync + 'static {
    const ID: &'static str;
    const NAME: &'static str;
    const HOMEPAGE: &'static str;
    /// Property path of the injected object, for diagnostics
    const GLOBAL: &'static str;
}

/// Unisat (`window.unisat`)
pub struct Unisat;

impl UnisatFlavor for Unisat {
    const ID: &'static str = "unisat";
    const NAME: &'static str = "Unisat";
    const HOMEPAGE: &'static str = "https://unisat.io/";
    const GLOBAL: &'static str = "unisat";
}

pub type UnisatConnector = UnisatCompatibleConnector<Unisat>;

/// Connector over any Unisat-shaped injected object
pub struct UnisatCompatibleConnector<W: UnisatFlavor> {
    api: Option<Arc<dyn UnisatApi>>,
    session: Arc<Session>,
    listener: Mutex<Option<ListenerId>>,
    _flavor: PhantomData<fn() -> W>,
}

impl<W: UnisatFlavor> UnisatCompatibleConnector<W> {
    /// `api` is `None` when the wallet did not inject its object.
    pub fn new(api: Option<Arc<dyn UnisatApi>>, network: WalletNetwork) -> Self {
        Self {
            api,
            session: Arc::new(Session::new(network)),
            listener: Mutex::new(None),
            _flavor: PhantomData,
        }
    }

    fn api(&self) -> Result<&Arc<dyn UnisatApi>, ConnectorError> {
        self.api.as_ref().ok_or_else(|| ConnectorError::not_installed(W::NAME))
    }

    /// Ask the wallet to switch only when it is on a different network.
    async fn align_network(
        api: &dyn UnisatApi,
        target: WalletNetwork,
    ) -> Result<(), ConnectorError> {
        let current = WalletNetwork::from(api.get_network().await?);
        if current != target {
            debug!("{} switching wallet network {} -> {}", W::NAME, current, target);
            api.switch_network(target.into()).await?;
        }
        Ok(())
    }

    async fn load_accounts(&self, api: &dyn UnisatApi) -> Result<(), ConnectorError> {
        let (accounts, public_key) = try_join(api.request_accounts(), api.get_public_key()).await?;
        if accounts.is_empty() {
            return Err(ConnectorError::Connection(format!("{} returned no accounts", W::NAME)));
        }
        self.session.establish(accounts, None, Some(public_key));
        Ok(())
    }

    fn watch_accounts(&self, api: &Arc<dyn UnisatApi>, runtime: Handle) {
        let mut listener = self.listener.lock();
        if listener.is_some() {
            return;
        }

        let session = Arc::downgrade(&self.session);
        let vendor: Weak<dyn UnisatApi> = Arc::downgrade(api);
        let id = api.on_accounts_changed(Arc::new(move |accounts: Vec<String>| {
            let (Some(session), Some(vendor)) = (session.upgrade(), vendor.upgrade()) else {
                return;
            };
            runtime.spawn(async move {
                on_accounts_changed::<W>(&session, vendor.as_ref(), accounts).await;
            });
        }));
        *listener = Some(id);
    }
}

async fn on_accounts_changed<W: UnisatFlavor>(
    session: &Session,
    api: &dyn UnisatApi,
    accounts: Vec<String>,
) {
    let public_key = if accounts.is_empty() {
        None
    } else {
        match api.get_public_key().await {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("{} public key refresh failed: {}", W::NAME, e);
                None
            }
        }
    };

    let update = AccountUpdate::from_accounts(accounts, public_key);
    let current_network = async {
        api.get_network()
            .await
            .map(WalletNetwork::from)
            .map_err(ConnectorError::from)
    };
    reconcile_accounts(session, W::NAME, update, current_network, |_| {}).await;
}

#[async_trait]
impl<W: UnisatFlavor> Connector for UnisatCompatibleConnector<W> {
    fn id(&self) -> &'static str {
        W::ID
    }

    fn name(&self) -> &'static str {
        W::NAME
    }

    fn homepage(&self) -> &'static str {
        W::HOMEPAGE
    }

    fn session(&self) -> &Session {
        &self.session
    }

    async fn is_ready(&self) -> bool {
        self.session.set_ready(self.api.is_some())
    }

    async fn connect(&self) -> Result<(), ConnectorError> {
        let api = self.api()?.clone();
        let runtime = Handle::try_current().map_err(|e| ConnectorError::State(e.to_string()))?;
        debug!("Connecting to {} via window.{}", W::NAME, W::GLOBAL);

        Self::align_network(api.as_ref(), self.session.network()).await?;
        self.load_accounts(api.as_ref()).await?;
        self.watch_accounts(&api, runtime);

        info!("{} connected as {:?}", W::NAME, self.session.address());
        Ok(())
    }

    async fn switch_network(&self, network: WalletNetwork) -> Result<(), ConnectorError> {
        self.session.set_network(network);
        if !self.session.is_connected() {
            return Ok(());
        }

        let api = self.api()?.clone();
        Self::align_network(api.as_ref(), network).await?;
        self.load_accounts(api.as_ref()).await?;

        info!("{} switched to {}", W::NAME, network);
        Ok(())
    }

    fn disconnect(&self) {
        self.session.clear();
        let listener = self.listener.lock().take();
        if let (Some(id), Some(api)) = (listener, self.api.as_ref()) {
            api.remove_listener(id);
        }
        info!("{} disconnected", W::NAME);
    }

    async fn sign_message(&self, message: &str) -> Result<String, ConnectorError> {
        Ok(self.api()?.sign_message(message).await?)
    }

    async fn send_to_address(
        &self,
        address: &str,
        amount_sats: u64,
    ) -> Result<String, ConnectorError> {
        debug!("{} sendBitcoin {} sats to {}", W::NAME, amount_sats, address);
        Ok(self.api()?.send_bitcoin(address, amount_sats, None).await?)
    }

    async fn sign_input(&self, input_index: usize, psbt: &Psbt) -> Result<Psbt, ConnectorError> {
        let api = self.api()?;
        let public_key = self.get_public_key()?;
        let options = SignPsbtOptions::single_input(input_index, &public_key);

        let signed = api.sign_psbt(&psbt::encode_hex(psbt), &options).await?;
        psbt::decode_hex(&signed)
    }

    async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        fee_rate: Option<f64>,
    ) -> Result<String, ConnectorError> {
        let result = self
            .api()?
            .send_inscription(address, inscription_id, FeeOptions::from_rate(fee_rate))
            .await?;
        Ok(result.txid)
    }

    async fn get_balance(&self) -> Result<Balance, ConnectorError> {
        Ok(self.api()?.get_balance().await?)
    }

    async fn get_inscriptions(
        &self,
        cursor: u32,
        size: u32,
    ) -> Result<InscriptionPage, ConnectorError> {
        Ok(self.api()?.get_inscriptions(cursor, size).await?)
    }
}

//! OKX Wallet Connector
//!
//! OKX exposes a separate namespace per network, so the connector keeps the
//! namespace key in step with its network: on every `switch_network` and on
//! every network change observed through a vendor event.

mod api;

pub use api::{AccountChangedHandler, OkxAccount, OkxBitcoinApi, OkxNamespace, OkxWallet};

use async_trait::async_trait;
use bitcoin::Psbt;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::connectors::session::{reconcile_accounts, AccountUpdate};
use crate::connectors::{
    Balance, Connector, ConnectorError, FeeOptions, InscriptionPage, ListenerId, Session,
    SignPsbtOptions, VendorError,
};
use crate::network::WalletNetwork;
use crate::psbt;

const NAME: &str = "OKX";

type Registration = (Arc<dyn OkxBitcoinApi>, ListenerId);

/// Methods missing from the testnet and signet namespaces are `NotSupported`.
fn vendor(err: VendorError) -> ConnectorError {
    err.for_wallet(NAME)
}

/// OKX connector (`window.okxwallet`)
pub struct OkxConnector {
    wallet: Option<Arc<dyn OkxWallet>>,
    session: Arc<Session>,
    namespace: Arc<Mutex<OkxNamespace>>,
    listener: Mutex<Option<Registration>>,
}

impl OkxConnector {
    pub fn new(wallet: Option<Arc<dyn OkxWallet>>, network: WalletNetwork) -> Self {
        Self {
            wallet,
            session: Arc::new(Session::new(network)),
            namespace: Arc::new(Mutex::new(OkxNamespace::for_network(network))),
            listener: Mutex::new(None),
        }
    }

    /// Namespace the next vendor call goes to
    pub fn namespace(&self) -> OkxNamespace {
        *self.namespace.lock()
    }

    fn select_namespace(&self, network: WalletNetwork) -> OkxNamespace {
        let key = OkxNamespace::for_network(network);
        *self.namespace.lock() = key;
        key
    }

    fn api(&self) -> Result<Arc<dyn OkxBitcoinApi>, ConnectorError> {
        let wallet = self
            .wallet
            .as_ref()
            .ok_or_else(|| ConnectorError::not_installed(NAME))?;
        let key = self.namespace();
        debug!("Using window.okxwallet.{}", key);
        wallet.namespace(key).ok_or_else(|| {
            ConnectorError::not_supported(NAME, &format!("window.okxwallet.{}", key))
        })
    }

    /// Only the mainnet namespace can report or change its network.
    async fn align_network(
        api: &dyn OkxBitcoinApi,
        key: OkxNamespace,
    ) -> Result<(), ConnectorError> {
        if key != OkxNamespace::Bitcoin {
            return Ok(());
        }
        let current = WalletNetwork::from(api.get_network().await.map_err(vendor)?);
        if current != WalletNetwork::Mainnet {
            debug!("OKX switching wallet network {} -> mainnet", current);
            api.switch_network(WalletNetwork::Mainnet.into())
                .await
                .map_err(vendor)?;
        }
        Ok(())
    }

    async fn load_accounts(&self, api: &dyn OkxBitcoinApi) -> Result<(), ConnectorError> {
        let account = api.connect().await.map_err(vendor)?;
        let accounts = api.get_accounts().await.map_err(vendor)?;
        if account.address.is_empty() && accounts.is_empty() {
            return Err(ConnectorError::Connection("OKX returned no accounts".to_string()));
        }
        self.session
            .establish(accounts, Some(account.address), Some(account.public_key));
        Ok(())
    }

    fn watch_accounts(&self, api: &Arc<dyn OkxBitcoinApi>, runtime: Handle) {
        let mut listener = self.listener.lock();
        if let Some((registered, id)) = listener.take() {
            if Arc::ptr_eq(&registered, api) {
                *listener = Some((registered, id));
                return;
            }
            registered.remove_listener(id);
        }

        let session = Arc::downgrade(&self.session);
        let namespace = Arc::downgrade(&self.namespace);
        let vendor: Weak<dyn OkxBitcoinApi> = Arc::downgrade(api);
        let handler: AccountChangedHandler = Arc::new(move |account: OkxAccount| {
            let (Some(session), Some(namespace), Some(vendor)) =
                (session.upgrade(), namespace.upgrade(), vendor.upgrade())
            else {
                return;
            };
            runtime.spawn(async move {
                on_account_changed(&session, &namespace, vendor.as_ref(), account).await;
            });
        });

        match api.on_account_changed(handler) {
            Some(id) => *listener = Some((api.clone(), id)),
            None => debug!("window.okxwallet.{} has no account events", self.namespace()),
        }
    }

    fn unwatch_accounts(&self) {
        let listener = self.listener.lock().take();
        if let Some((api, id)) = listener {
            api.remove_listener(id);
        }
    }
}

async fn on_account_changed(
    session: &Session,
    namespace: &Mutex<OkxNamespace>,
    api: &dyn OkxBitcoinApi,
    account: OkxAccount,
) {
    let accounts = if account.address.is_empty() {
        Vec::new()
    } else {
        match api.get_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("OKX account refresh failed: {}", e);
                vec![account.address.clone()]
            }
        }
    };

    let update = AccountUpdate {
        accounts,
        address: Some(account.address).filter(|a| !a.is_empty()),
        public_key: Some(account.public_key).filter(|k| !k.is_empty()),
    };
    let current_network = async {
        api.get_network()
            .await
            .map(WalletNetwork::from)
            .map_err(vendor)
    };
    reconcile_accounts(session, NAME, update, current_network, |network| {
        *namespace.lock() = OkxNamespace::for_network(network);
    })
    .await;
}

#[async_trait]
impl Connector for OkxConnector {
    fn id(&self) -> &'static str {
        "okx"
    }

    fn name(&self) -> &'static str {
        NAME
    }

    fn homepage(&self) -> &'static str {
        "https://okx.com/"
    }

    fn session(&self) -> &Session {
        &self.session
    }

    /// Installed means `window.okxwallet.bitcoin` exists, whatever the
    /// current network.
    async fn is_ready(&self) -> bool {
        let ready = self
            .wallet
            .as_ref()
            .is_some_and(|wallet| wallet.namespace(OkxNamespace::Bitcoin).is_some());
        self.session.set_ready(ready)
    }

    async fn connect(&self) -> Result<(), ConnectorError> {
        let key = self.select_namespace(self.session.network());
        let api = self.api()?;
        let runtime = Handle::try_current().map_err(|e| ConnectorError::State(e.to_string()))?;

        Self::align_network(api.as_ref(), key).await?;
        self.load_accounts(api.as_ref()).await?;
        self.watch_accounts(&api, runtime);

        info!("OKX connected as {:?} via {}", self.session.address(), key);
        Ok(())
    }

    async fn switch_network(&self, network: WalletNetwork) -> Result<(), ConnectorError> {
        self.session.set_network(network);
        let key = self.select_namespace(network);
        if !self.session.is_connected() {
            return Ok(());
        }

        let api = self.api()?;
        let runtime = Handle::try_current().map_err(|e| ConnectorError::State(e.to_string()))?;
        Self::align_network(api.as_ref(), key).await?;
        self.load_accounts(api.as_ref()).await?;
        self.watch_accounts(&api, runtime);

        info!("OKX switched to {} via {}", network, key);
        Ok(())
    }

    fn disconnect(&self) {
        self.session.clear();
        self.unwatch_accounts();
        info!("OKX disconnected");
    }

    async fn sign_message(&self, message: &str) -> Result<String, ConnectorError> {
        self.api()?.sign_message(message).await.map_err(vendor)
    }

    async fn send_to_address(
        &self,
        address: &str,
        amount_sats: u64,
    ) -> Result<String, ConnectorError> {
        debug!("OKX sendBitcoin {} sats to {}", amount_sats, address);
        self.api()?
            .send_bitcoin(address, amount_sats, None)
            .await
            .map_err(vendor)
    }

    async fn sign_input(&self, input_index: usize, psbt: &Psbt) -> Result<Psbt, ConnectorError> {
        let api = self.api()?;
        let public_key = self.get_public_key()?;
        let options = SignPsbtOptions::single_input(input_index, &public_key);

        let signed = api
            .sign_psbt(&psbt::encode_hex(psbt), &options)
            .await
            .map_err(vendor)?;
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
            .await
            .map_err(vendor)?;
        Ok(result.txid)
    }

    async fn get_balance(&self) -> Result<Balance, ConnectorError> {
        self.api()?.get_balance().await.map_err(vendor)
    }

    async fn get_inscriptions(
        &self,
        cursor: u32,
        size: u32,
    ) -> Result<InscriptionPage, ConnectorError> {
        self.api()?
            .get_inscriptions(cursor, size)
            .await
            .map_err(vendor)
    }
}

//! In-memory wallet fakes shared by the integration tests
//!
//! Each fake records the vendor calls it receives so tests can assert on
//! what a connector did (or did not) ask the wallet.

#![allow(dead_code)]

use async_trait::async_trait;
use bitcoin::absolute::LockTime;
use bitcoin::transaction::Version;
use bitcoin::{Amount, Psbt, ScriptBuf, Transaction, TxIn, TxOut};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sats_wagmi::connectors::leather::LeatherRpc;
use sats_wagmi::connectors::okx::{
    AccountChangedHandler, OkxAccount, OkxBitcoinApi, OkxNamespace, OkxWallet,
};
use sats_wagmi::connectors::unisat::{AccountsChangedHandler, UnisatApi};
use sats_wagmi::connectors::xverse::{
    AddressPurpose, Callbacks, CreateInscriptionPayload, CreateInscriptionResponse,
    GetAddressPayload, GetAddressResponse, SendBtcTransactionPayload, SignMessagePayload,
    SignTransactionPayload, SignTransactionResponse, XverseAddress, XverseNetwork, XverseSdk,
};
use sats_wagmi::connectors::{
    Balance, FeeOptions, InscriptionPage, ListenerId, SendInscriptionResult, SignPsbtOptions,
};
use sats_wagmi::provider::HomepageOpener;
use sats_wagmi::{Connector, ConnectorError, Session, VendorError, VendorNetwork, WalletNetwork};

// =============================================================================
// Helpers
// =============================================================================

/// Wait until `condition` holds, letting spawned vendor-event tasks run.
pub async fn wait_for<F: Fn() -> bool>(condition: F) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition not reached");
}

/// Poll a future to completion within a second
pub async fn within_second<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(1), future)
        .await
        .expect("timed out")
}

pub fn sample_psbt() -> Psbt {
    let tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn::default(), TxIn::default()],
        output: vec![TxOut {
            value: Amount::from_sat(10_000),
            script_pubkey: ScriptBuf::new(),
        }],
    };
    Psbt::from_unsigned_tx(tx).expect("unsigned tx")
}

/// Collects every value passed to a handler
#[derive(Clone, Default)]
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, value: T) {
        self.values.lock().push(value);
    }

    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }
}

/// Records the homepages the connect mutation opens
#[derive(Default)]
pub struct RecordingOpener {
    pub opened: Mutex<Vec<String>>,
}

impl HomepageOpener for RecordingOpener {
    fn open(&self, url: &str) {
        self.opened.lock().push(url.to_string());
    }
}

// =============================================================================
// Unisat / Bitget
// =============================================================================

pub struct FakeUnisat {
    pub accounts: Mutex<Vec<String>>,
    pub public_key: Mutex<String>,
    pub network: Mutex<VendorNetwork>,
    pub reject_requests: AtomicBool,
    pub last_sign_options: Mutex<Option<SignPsbtOptions>>,
    pub last_fee: Mutex<Option<FeeOptions>>,
    calls: Mutex<Vec<String>>,
    handlers: Mutex<Vec<(ListenerId, AccountsChangedHandler)>>,
    next_id: AtomicU64,
}

impl FakeUnisat {
    pub fn new(accounts: &[&str], public_key: &str) -> Arc<Self> {
        Arc::new(Self {
            accounts: Mutex::new(accounts.iter().map(|a| a.to_string()).collect()),
            public_key: Mutex::new(public_key.to_string()),
            network: Mutex::new(VendorNetwork::Livenet),
            reject_requests: AtomicBool::new(false),
            last_sign_options: Mutex::new(None),
            last_fee: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            handlers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        })
    }

    fn record(&self, method: &str) {
        self.calls.lock().push(method.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|call| *call == method).count()
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.lock().len()
    }

    pub fn set_network(&self, network: VendorNetwork) {
        *self.network.lock() = network;
    }

    /// Simulate the user switching or revoking accounts in the extension
    pub fn emit_accounts_changed(&self, accounts: &[&str]) {
        let accounts: Vec<String> = accounts.iter().map(|a| a.to_string()).collect();
        *self.accounts.lock() = accounts.clone();
        let handlers: Vec<AccountsChangedHandler> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(accounts.clone());
        }
    }
}

#[async_trait]
impl UnisatApi for FakeUnisat {
    async fn request_accounts(&self) -> Result<Vec<String>, VendorError> {
        self.record("requestAccounts");
        if self.reject_requests.load(Ordering::SeqCst) {
            return Err(VendorError::cancelled("User rejected the request."));
        }
        Ok(self.accounts.lock().clone())
    }

    async fn get_accounts(&self) -> Result<Vec<String>, VendorError> {
        self.record("getAccounts");
        Ok(self.accounts.lock().clone())
    }

    async fn get_network(&self) -> Result<VendorNetwork, VendorError> {
        self.record("getNetwork");
        Ok(*self.network.lock())
    }

    async fn switch_network(&self, network: VendorNetwork) -> Result<(), VendorError> {
        self.record("switchNetwork");
        *self.network.lock() = network;
        Ok(())
    }

    async fn get_public_key(&self) -> Result<String, VendorError> {
        self.record("getPublicKey");
        Ok(self.public_key.lock().clone())
    }

    async fn get_balance(&self) -> Result<Balance, VendorError> {
        self.record("getBalance");
        Ok(Balance {
            confirmed: 1_000,
            unconfirmed: 500,
            total: 1_500,
        })
    }

    async fn get_inscriptions(
        &self,
        _cursor: u32,
        _size: u32,
    ) -> Result<InscriptionPage, VendorError> {
        self.record("getInscriptions");
        Ok(InscriptionPage::default())
    }

    async fn sign_message(&self, message: &str) -> Result<String, VendorError> {
        self.record("signMessage");
        Ok(format!("sig({})", message))
    }

    async fn send_bitcoin(
        &self,
        address: &str,
        amount_sats: u64,
        options: Option<FeeOptions>,
    ) -> Result<String, VendorError> {
        self.record("sendBitcoin");
        *self.last_fee.lock() = options;
        Ok(format!("tx:{}:{}", address, amount_sats))
    }

    async fn send_inscription(
        &self,
        address: &str,
        inscription_id: &str,
        options: Option<FeeOptions>,
    ) -> Result<SendInscriptionResult, VendorError> {
        self.record("sendInscription");
        *self.last_fee.lock() = options;
        Ok(SendInscriptionResult {
            txid: format!("tx:{}:{}", address, inscription_id),
        })
    }

    async fn sign_psbt(
        &self,
        psbt_hex: &str,
        options: &SignPsbtOptions,
    ) -> Result<String, VendorError> {
        self.record("signPsbt");
        *self.last_sign_options.lock() = Some(options.clone());
        Ok(psbt_hex.to_string())
    }

    fn on_accounts_changed(&self, handler: AccountsChangedHandler) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.handlers.lock().push((id, handler));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.handlers.lock().retain(|(entry, _)| *entry != id);
    }
}

// =============================================================================
// OKX
// =============================================================================

/// One `window.okxwallet.<key>` object
pub struct FakeOkxNamespace {
    pub key: OkxNamespace,
    pub account: Mutex<OkxAccount>,
    pub network: Mutex<VendorNetwork>,
    calls: Mutex<Vec<String>>,
    handlers: Mutex<Vec<(ListenerId, AccountChangedHandler)>>,
    next_id: AtomicU64,
}

impl FakeOkxNamespace {
    fn new(key: OkxNamespace) -> Arc<Self> {
        Arc::new(Self {
            key,
            account: Mutex::new(OkxAccount {
                address: format!("{}-addr", key),
                public_key: format!("{}-pub", key),
            }),
            network: Mutex::new(VendorNetwork::Livenet),
            calls: Mutex::new(Vec::new()),
            handlers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        })
    }

    fn full(&self) -> bool {
        self.key == OkxNamespace::Bitcoin
    }

    fn record(&self, method: &str) {
        self.calls.lock().push(method.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.lock().len()
    }

    pub fn emit_account_changed(&self, account: OkxAccount) {
        *self.account.lock() = account.clone();
        let handlers: Vec<AccountChangedHandler> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(account.clone());
        }
    }
}

#[async_trait]
impl OkxBitcoinApi for FakeOkxNamespace {
    async fn connect(&self) -> Result<OkxAccount, VendorError> {
        self.record("connect");
        Ok(self.account.lock().clone())
    }

    async fn get_accounts(&self) -> Result<Vec<String>, VendorError> {
        self.record("getAccounts");
        let address = self.account.lock().address.clone();
        Ok(if address.is_empty() { vec![] } else { vec![address] })
    }

    async fn sign_message(&self, message: &str) -> Result<String, VendorError> {
        self.record("signMessage");
        Ok(format!("{}:sig({})", self.key, message))
    }

    async fn sign_psbt(
        &self,
        psbt_hex: &str,
        _options: &SignPsbtOptions,
    ) -> Result<String, VendorError> {
        self.record("signPsbt");
        Ok(psbt_hex.to_string())
    }

    async fn get_network(&self) -> Result<VendorNetwork, VendorError> {
        self.record("getNetwork");
        if !self.full() {
            return Err(VendorError::unsupported("getNetwork"));
        }
        Ok(*self.network.lock())
    }

    async fn switch_network(&self, network: VendorNetwork) -> Result<(), VendorError> {
        self.record("switchNetwork");
        if !self.full() {
            return Err(VendorError::unsupported("switchNetwork"));
        }
        *self.network.lock() = network;
        Ok(())
    }

    async fn send_bitcoin(
        &self,
        address: &str,
        amount_sats: u64,
        _options: Option<FeeOptions>,
    ) -> Result<String, VendorError> {
        self.record("sendBitcoin");
        if !self.full() {
            return Err(VendorError::unsupported("sendBitcoin"));
        }
        Ok(format!("tx:{}:{}", address, amount_sats))
    }

    fn on_account_changed(&self, handler: AccountChangedHandler) -> Option<ListenerId> {
        if !self.full() {
            return None;
        }
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.handlers.lock().push((id, handler));
        Some(id)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.handlers.lock().retain(|(entry, _)| *entry != id);
    }
}

/// `window.okxwallet`, recording which namespace every lookup asked for
pub struct FakeOkxWallet {
    namespaces: HashMap<OkxNamespace, Arc<FakeOkxNamespace>>,
    accessed: Mutex<Vec<OkxNamespace>>,
}

impl FakeOkxWallet {
    /// A wallet injecting all three namespaces
    pub fn new() -> Arc<Self> {
        Self::with_namespaces(&[
            OkxNamespace::Bitcoin,
            OkxNamespace::BitcoinTestnet,
            OkxNamespace::BitcoinSignet,
        ])
    }

    pub fn with_namespaces(keys: &[OkxNamespace]) -> Arc<Self> {
        Arc::new(Self {
            namespaces: keys.iter().map(|key| (*key, FakeOkxNamespace::new(*key))).collect(),
            accessed: Mutex::new(Vec::new()),
        })
    }

    pub fn get(&self, key: OkxNamespace) -> Arc<FakeOkxNamespace> {
        self.namespaces[&key].clone()
    }

    pub fn accessed(&self) -> Vec<OkxNamespace> {
        self.accessed.lock().clone()
    }

    pub fn clear_accessed(&self) {
        self.accessed.lock().clear();
    }
}

impl OkxWallet for FakeOkxWallet {
    fn namespace(&self, key: OkxNamespace) -> Option<Arc<dyn OkxBitcoinApi>> {
        self.accessed.lock().push(key);
        self.namespaces
            .get(&key)
            .map(|namespace| namespace.clone() as Arc<dyn OkxBitcoinApi>)
    }
}

// =============================================================================
// Xverse
// =============================================================================

/// How the fake answers the next SDK call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XverseReply {
    Finish,
    Cancel,
    Drop,
}

pub struct FakeXverse {
    pub reply: Mutex<XverseReply>,
    calls: Mutex<Vec<String>>,
    pub last_address_request: Mutex<Option<GetAddressPayload>>,
    pub last_send: Mutex<Option<SendBtcTransactionPayload>>,
    pub last_sign: Mutex<Option<SignTransactionPayload>>,
    pub last_inscription: Mutex<Option<CreateInscriptionPayload>>,
}

impl FakeXverse {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(XverseReply::Finish),
            calls: Mutex::new(Vec::new()),
            last_address_request: Mutex::new(None),
            last_send: Mutex::new(None),
            last_sign: Mutex::new(None),
            last_inscription: Mutex::new(None),
        })
    }

    pub fn set_reply(&self, reply: XverseReply) {
        *self.reply.lock() = reply;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn answer<T>(&self, method: &str, callbacks: Callbacks<T>, value: T) {
        self.calls.lock().push(method.to_string());
        match *self.reply.lock() {
            XverseReply::Finish => callbacks.finish(value),
            XverseReply::Cancel => callbacks.cancel(),
            XverseReply::Drop => drop(callbacks),
        }
    }
}

fn xverse_prefix(network: XverseNetwork) -> &'static str {
    match network {
        XverseNetwork::Mainnet => "bc1",
        XverseNetwork::Testnet => "tb1",
        XverseNetwork::Signet => "sb1",
    }
}

impl XverseSdk for FakeXverse {
    fn get_address(&self, payload: GetAddressPayload, callbacks: Callbacks<GetAddressResponse>) {
        let prefix = xverse_prefix(payload.network.network_type);
        let response = GetAddressResponse {
            addresses: vec![
                XverseAddress {
                    address: format!("{}p-ordinals", prefix),
                    public_key: "ord-pub".to_string(),
                    purpose: AddressPurpose::Ordinals,
                },
                XverseAddress {
                    address: format!("{}q-payment", prefix),
                    public_key: "pay-pub".to_string(),
                    purpose: AddressPurpose::Payment,
                },
            ],
        };
        *self.last_address_request.lock() = Some(payload);
        self.answer("getAddress", callbacks, response);
    }

    fn sign_message(&self, payload: SignMessagePayload, callbacks: Callbacks<String>) {
        let signature = format!("{}:sig({})", payload.address, payload.message);
        self.answer("signMessage", callbacks, signature);
    }

    fn send_btc_transaction(
        &self,
        payload: SendBtcTransactionPayload,
        callbacks: Callbacks<String>,
    ) {
        *self.last_send.lock() = Some(payload);
        self.answer("sendBtcTransaction", callbacks, "xverse-txid".to_string());
    }

    fn sign_transaction(
        &self,
        payload: SignTransactionPayload,
        callbacks: Callbacks<SignTransactionResponse>,
    ) {
        let response = SignTransactionResponse {
            psbt_base64: payload.psbt_base64.clone(),
            txid: None,
        };
        *self.last_sign.lock() = Some(payload);
        self.answer("signTransaction", callbacks, response);
    }

    fn create_inscription(
        &self,
        payload: CreateInscriptionPayload,
        callbacks: Callbacks<CreateInscriptionResponse>,
    ) {
        *self.last_inscription.lock() = Some(payload);
        let response = CreateInscriptionResponse {
            tx_id: "inscription-txid".to_string(),
        };
        self.answer("createInscription", callbacks, response);
    }
}

// =============================================================================
// Leather
// =============================================================================

pub struct FakeLeather {
    requests: Mutex<Vec<(String, Option<Value>)>>,
    pub reject: AtomicBool,
}

impl FakeLeather {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            reject: AtomicBool::new(false),
        })
    }

    pub fn requests(&self) -> Vec<(String, Option<Value>)> {
        self.requests.lock().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests().into_iter().map(|(method, _)| method).collect()
    }
}

#[async_trait]
impl LeatherRpc for FakeLeather {
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value, VendorError> {
        self.requests.lock().push((method.to_string(), params.clone()));

        if self.reject.load(Ordering::SeqCst) {
            return Ok(json!({
                "jsonrpc": "2.0",
                "id": "1",
                "error": { "code": 4001, "message": "User rejected request" }
            }));
        }

        let param = |name: &str| {
            params
                .as_ref()
                .and_then(|p| p.get(name))
                .cloned()
                .unwrap_or(Value::Null)
        };
        let result = match method {
            "getAddresses" => json!({ "addresses": [
                { "symbol": "BTC", "type": "p2wpkh", "address": "bc1q-leather",
                  "publicKey": "02leather", "tweakedPublicKey": "",
                  "derivationPath": "m/84'/0'/0'/0/0" },
                { "symbol": "BTC", "type": "p2tr", "address": "bc1p-leather",
                  "publicKey": "03leather", "tweakedPublicKey": "leather-tweaked",
                  "derivationPath": "m/86'/0'/0'/0/0" },
                { "symbol": "STX", "address": "SP-leather", "publicKey": "stx" }
            ]}),
            "signMessage" => json!({
                "signature": "leather-sig",
                "address": "bc1q-leather",
                "message": param("message"),
            }),
            "sendTransfer" => json!({ "txid": "leather-txid" }),
            "signPsbt" => json!({
                "hex": param("hex"),
            }),
            other => return Err(VendorError::new(format!("unknown method {}", other))),
        };
        Ok(json!({ "jsonrpc": "2.0", "id": "1", "result": result }))
    }
}

// =============================================================================
// Scripted connector
// =============================================================================

/// Connector with no vendor behind it, for provider and hook tests
pub struct MockConnector {
    id: &'static str,
    session: Session,
    pub fail_switch: bool,
    pub switches: Recorder<WalletNetwork>,
}

impl MockConnector {
    pub fn new(id: &'static str, network: WalletNetwork) -> Arc<Self> {
        Self::build(id, network, false)
    }

    /// A connector whose `switch_network` always fails
    pub fn rejecting(id: &'static str, network: WalletNetwork) -> Arc<Self> {
        Self::build(id, network, true)
    }

    fn build(id: &'static str, network: WalletNetwork, fail_switch: bool) -> Arc<Self> {
        Arc::new(Self {
            id,
            session: Session::new(network),
            fail_switch,
            switches: Recorder::new(),
        })
    }

    /// Simulate a vendor-originated network change
    pub fn emit_network(&self, network: WalletNetwork) {
        self.session.set_network(network);
        self.session.events().network_changed.emit(&network);
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn id(&self) -> &'static str {
        self.id
    }

    fn name(&self) -> &'static str {
        self.id
    }

    fn homepage(&self) -> &'static str {
        "https://example.invalid/"
    }

    fn session(&self) -> &Session {
        &self.session
    }

    async fn is_ready(&self) -> bool {
        self.session.set_ready(true)
    }

    async fn connect(&self) -> Result<(), ConnectorError> {
        self.session.establish(
            vec![format!("{}-addr", self.id)],
            None,
            Some(format!("{}-pub", self.id)),
        );
        self.session
            .events()
            .account_changed
            .emit(&self.session.account_change());
        Ok(())
    }

    async fn switch_network(&self, network: WalletNetwork) -> Result<(), ConnectorError> {
        self.switches.push(network);
        if self.fail_switch {
            return Err(ConnectorError::Connection(format!("{} refused to switch", self.id)));
        }
        self.session.set_network(network);
        Ok(())
    }

    fn disconnect(&self) {
        self.session.clear();
    }

    async fn sign_message(&self, message: &str) -> Result<String, ConnectorError> {
        Ok(format!("sig({})", message))
    }

    async fn send_to_address(
        &self,
        _address: &str,
        _amount_sats: u64,
    ) -> Result<String, ConnectorError> {
        Ok("mock-txid".to_string())
    }

    async fn sign_input(&self, _input_index: usize, psbt: &Psbt) -> Result<Psbt, ConnectorError> {
        Ok(psbt.clone())
    }

    async fn send_inscription(
        &self,
        _address: &str,
        _inscription_id: &str,
        _fee_rate: Option<f64>,
    ) -> Result<String, ConnectorError> {
        Err(ConnectorError::not_supported(self.id, "sendInscription"))
    }
}

//! sats-wagmi - Bitcoin browser-wallet connectors
//!
//! One connector contract over five injected wallet APIs (Unisat, Xverse,
//! OKX, Bitget, Leather), a provider that owns the connectors and the
//! selected network, and a small reactive layer ("hooks") on top.
//!
//! Vendor globals are never reached for directly: each connector is handed
//! its vendor object as a trait object through [`WalletEnvironment`].

pub mod connectors;
pub mod hooks;
pub mod logging;
pub mod network;
pub mod provider;
pub mod psbt;

pub use connectors::{
    AccountChange, Connector, ConnectorError, ConnectorEvents, EventHub, Session, Subscription,
    VendorError,
};
pub use network::{VendorNetwork, WalletNetwork};
pub use provider::{
    BitcoinProvider, ConnectorKind, HomepageOpener, ProviderConfig, WalletEnvironment,
};

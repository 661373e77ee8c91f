//! Bitget Wallet Connector
//!
//! Bitget injects a Unisat-compatible object at `window.bitkeep.unisat`, so
//! the connector is the Unisat implementation under Bitget's identity.

use crate::connectors::unisat::{UnisatCompatibleConnector, UnisatFlavor};

/// Bitget (`window.bitkeep.unisat`)
pub struct Bitget;

impl UnisatFlavor for Bitget {
    const ID: &'static str = "bitget";
    const NAME: &'static str = "Bitget";
    const HOMEPAGE: &'static str = "https://web3.bitget.com/";
    const GLOBAL: &'static str = "bitkeep.unisat";
}

pub type BitgetConnector = UnisatCompatibleConnector<Bitget>;

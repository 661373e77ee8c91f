//! Bitcoin network identity
//!
//! [`WalletNetwork`] is the only network type public code deals with. Vendor
//! vocabularies are translated at the adapter boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical network identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletNetwork {
    #[default]
    Mainnet,
    Testnet,
    Signet,
}

impl WalletNetwork {
    pub const ALL: [WalletNetwork; 3] = [
        WalletNetwork::Mainnet,
        WalletNetwork::Testnet,
        WalletNetwork::Signet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WalletNetwork::Mainnet => "mainnet",
            WalletNetwork::Testnet => "testnet",
            WalletNetwork::Signet => "signet",
        }
    }
}

impl fmt::Display for WalletNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WalletNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "livenet" => Ok(WalletNetwork::Mainnet),
            "testnet" => Ok(WalletNetwork::Testnet),
            "signet" => Ok(WalletNetwork::Signet),
            _ => Err(format!("Unknown network: {}", s)),
        }
    }
}

/// The `livenet`/`testnet`/`signet` vocabulary used by Unisat-style wallets
/// (Unisat, Bitget, OKX).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorNetwork {
    Livenet,
    Testnet,
    Signet,
}

impl VendorNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorNetwork::Livenet => "livenet",
            VendorNetwork::Testnet => "testnet",
            VendorNetwork::Signet => "signet",
        }
    }
}

impl fmt::Display for VendorNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<WalletNetwork> for VendorNetwork {
    fn from(network: WalletNetwork) -> Self {
        match network {
            WalletNetwork::Mainnet => VendorNetwork::Livenet,
            WalletNetwork::Testnet => VendorNetwork::Testnet,
            WalletNetwork::Signet => VendorNetwork::Signet,
        }
    }
}

impl From<VendorNetwork> for WalletNetwork {
    fn from(network: VendorNetwork) -> Self {
        match network {
            VendorNetwork::Livenet => WalletNetwork::Mainnet,
            VendorNetwork::Testnet => WalletNetwork::Testnet,
            VendorNetwork::Signet => WalletNetwork::Signet,
        }
    }
}

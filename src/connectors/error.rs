//! Connector Error Types
//!
//! Unified error handling for all wallet connectors.

use std::fmt;

/// Errors surfaced by connector, provider and hook operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectorError {
    /// The vendor's injected object is absent
    #[error("{wallet} is not installed")]
    NotInstalled { wallet: String },

    /// The user dismissed or rejected the vendor prompt
    #[error("User rejected: {0}")]
    UserRejected(String),

    /// The vendor has no equivalent for this operation
    #[error("{operation} is not supported by {wallet}")]
    NotSupported { wallet: String, operation: String },

    /// The operation needs a connected session
    #[error("Invalid state: {0}")]
    State(String),

    /// Any other vendor failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Vendor response did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// PSBT could not be encoded or decoded
    #[error("PSBT error: {0}")]
    Psbt(String),

    /// No connector with this id is registered with the provider
    #[error("Unknown connector: {0}")]
    UnknownConnector(String),
}

impl ConnectorError {
    pub fn not_installed(wallet: &str) -> Self {
        ConnectorError::NotInstalled { wallet: wallet.to_string() }
    }

    pub fn not_supported(wallet: &str, operation: &str) -> Self {
        ConnectorError::NotSupported {
            wallet: wallet.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn not_connected() -> Self {
        ConnectorError::State("wallet is not connected".to_string())
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ConnectorError::UserRejected(_))
    }
}

/// Provider code injected wallets use for "user rejected the request"
pub const USER_REJECTED_CODE: i64 = 4001;

/// Provider code for "the requested method is not supported"
pub const UNSUPPORTED_METHOD_CODE: i64 = 4200;

/// Error reported by a vendor object
///
/// Injected wallets reject with `{ code, message }`; callback SDKs only
/// report a cancellation, which is modelled as [`VendorError::cancelled`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorError {
    pub code: Option<i64>,
    pub message: String,
    /// Vendor method name when the error reports a missing method
    pub method: Option<String>,
}

impl VendorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { code: None, message: message.into(), method: None }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self { code: Some(code), message: message.into(), method: None }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::with_code(USER_REJECTED_CODE, message)
    }

    /// Reported by vendor methods that a namespace or SDK version lacks
    pub fn unsupported(method: &str) -> Self {
        Self {
            code: Some(UNSUPPORTED_METHOD_CODE),
            message: format!("{} is not available", method),
            method: Some(method.to_string()),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE)
    }

    pub fn is_unsupported(&self) -> bool {
        self.code == Some(UNSUPPORTED_METHOD_CODE)
    }

    /// Classify for `wallet`, turning a missing method into
    /// [`ConnectorError::NotSupported`].
    pub fn for_wallet(self, wallet: &str) -> ConnectorError {
        if self.is_unsupported() {
            let operation = self.method.as_deref().unwrap_or(&self.message);
            return ConnectorError::not_supported(wallet, operation);
        }
        self.into()
    }
}

impl fmt::Display for VendorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for VendorError {}

impl From<VendorError> for ConnectorError {
    fn from(err: VendorError) -> Self {
        if err.is_user_rejection() {
            ConnectorError::UserRejected(err.message)
        } else {
            ConnectorError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::Parse(err.to_string())
    }
}

impl From<bitcoin::psbt::Error> for ConnectorError {
    fn from(err: bitcoin::psbt::Error) -> Self {
        ConnectorError::Psbt(err.to_string())
    }
}

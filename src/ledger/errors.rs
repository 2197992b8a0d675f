//! Error types for ledger session operations

use thiserror::Error;

/// Errors surfaced by a [`LedgerSession`](super::LedgerSession)
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    /// Transport-level failure (connectivity, timeout, TLS)
    #[error("network error: {0}")]
    Network(String),

    /// The account does not exist in the validated ledger
    #[error("account {0} not found in the validated ledger")]
    AccountNotFound(String),

    /// The node answered with an application-level error code
    #[error("node returned '{code}': {message}")]
    Api { code: String, message: String },

    /// The node's response did not match the expected shape
    #[error("malformed node response: {0}")]
    Protocol(String),
}

impl LedgerError {
    pub(crate) fn protocol(detail: impl Into<String>) -> Self {
        Self::Protocol(detail.into())
    }

    /// True for transport failures where it is unknown whether the request
    /// reached the node
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

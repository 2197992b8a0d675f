//! Error taxonomy for the payment workflow
//!
//! Everything that can stop a payment before it reaches the network is a
//! [`PaymentError`]; everything after submission is a
//! [`SettlementOutcome`](crate::types::SettlementOutcome) inside the
//! report. The split matters for retry safety: a pre-submission failure
//! provably made no network mutation.

use crate::amount::{Amount, AmountError};
use crate::builder::BuildError;
use crate::config::ConfigError;
use crate::ledger::LedgerError;
use crate::wallet::WalletError;
use thiserror::Error;

/// Failures that terminate the workflow without a report
#[derive(Error, Debug)]
pub enum PaymentError {
    /// The confirmed balance cannot cover amount plus fee
    #[error("insufficient balance: available {available} XRP, required {required} XRP")]
    InsufficientBalance {
        available: Amount,
        required: Amount,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Credential(#[from] WalletError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl PaymentError {
    /// Whether re-running the workflow as-is can be expected to behave
    /// sanely
    ///
    /// All variants occur before any network mutation, so retrying never
    /// risks a double payment; `true` here additionally means the failure
    /// is plausibly transient. Insufficient balance, bad credentials, and
    /// bad configuration need caller action first.
    pub fn is_safe_to_retry(&self) -> bool {
        match self {
            Self::Ledger(err) => err.is_network(),
            Self::InsufficientBalance { .. } => false,
            Self::Config(_) | Self::Amount(_) | Self::Build(_) | Self::Credential(_) => false,
        }
    }

    /// Error category for diagnostics
    pub fn category(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "balance",
            Self::Config(_) => "config",
            Self::Amount(_) => "amount",
            Self::Build(_) => "build",
            Self::Credential(_) => "credential",
            Self::Ledger(_) => "ledger",
        }
    }
}

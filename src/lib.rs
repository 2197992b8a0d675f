//! xrp-courier - single-payment lifecycle for the XRP Ledger
//!
//! Submits one value-transfer transaction, waits for it to settle in a
//! validated ledger, and reports the outcome with before/after balances
//! and the actual cost.

pub mod amount;
pub mod balance;
pub mod builder;
pub mod config;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod signer;
pub mod submission;
pub mod test_utils;
pub mod types;
pub mod wallet;
pub mod workflow;

// Re-export commonly used types
pub use amount::Amount;
pub use errors::PaymentError;
pub use types::{Address, PaymentReport, SettlementOutcome, TxHash};
pub use wallet::Wallet;
pub use workflow::PaymentWorkflow;

//! Ledger session seam
//!
//! [`LedgerSession`] is the injected boundary between the payment lifecycle
//! and a ledger node. The workflow, oracle, and submission coordinator only
//! ever see this trait; [`json_rpc::HttpLedgerSession`] is the production
//! implementation, and the test double lives in `test_utils`.

mod errors;
pub mod json_rpc;

pub use errors::LedgerError;
pub use json_rpc::HttpLedgerSession;

use crate::amount::Amount;
use crate::types::{Address, ResultCode, SignedPayment, TxHash};
use async_trait::async_trait;

/// Validated-ledger state of an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// Confirmed balance in drops
    pub balance: Amount,
    /// Next expected transaction sequence number
    pub sequence: u32,
}

/// Acceptance of a submitted blob into the node's candidate pool.
/// Provisional only; settlement is observed separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAck {
    pub engine_result: ResultCode,
    pub message: Option<String>,
}

/// Where a submitted transaction currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// The node does not know the transaction
    NotFound,
    /// Known to the node but not yet in a validated ledger
    Pending,
    /// Included in a validated ledger; irreversible
    Validated {
        result: ResultCode,
        ledger_index: u32,
    },
}

/// Connection to a ledger node
///
/// Implementations must be safe to share across tasks; every method is a
/// single request with no session-side retry.
#[async_trait]
pub trait LedgerSession: Send + Sync {
    /// Account state from the most recently validated ledger, never from
    /// speculative open-ledger state
    async fn account_info(&self, address: &Address) -> Result<AccountInfo, LedgerError>;

    /// Index of the node's current in-progress ledger
    async fn current_ledger_index(&self) -> Result<u32, LedgerError>;

    /// Fee currently required to enter the open ledger, in drops
    async fn open_ledger_fee(&self) -> Result<Amount, LedgerError>;

    /// Hand the signed blob to the node's candidate pool
    async fn submit(&self, signed: &SignedPayment) -> Result<SubmitAck, LedgerError>;

    /// Look up a transaction by content hash
    async fn transaction_status(&self, hash: &TxHash) -> Result<TransactionStatus, LedgerError>;

    /// Release the connection. Idempotent.
    async fn close(&self) -> Result<(), LedgerError>;
}

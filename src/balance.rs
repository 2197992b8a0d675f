//! Confirmed balance reads

use crate::amount::Amount;
use crate::ledger::{LedgerError, LedgerSession};
use crate::types::Address;
use std::sync::Arc;
use tracing::debug;

/// Read-only view of confirmed account balances
///
/// Always answers from the most recently validated ledger, never from
/// speculative open-ledger state: a balance used to gate a payment must
/// not include effects that can still be rolled back.
pub struct BalanceOracle {
    session: Arc<dyn LedgerSession>,
}

impl BalanceOracle {
    pub fn new(session: Arc<dyn LedgerSession>) -> Self {
        Self { session }
    }

    /// Confirmed balance in drops
    ///
    /// [`LedgerError::AccountNotFound`] if the account does not exist on
    /// the network, [`LedgerError::Network`] on connectivity failure.
    pub async fn balance(&self, address: &Address) -> Result<Amount, LedgerError> {
        let info = self.session.account_info(address).await?;
        debug!(account = %address, balance = %info.balance, "Fetched confirmed balance");
        Ok(info.balance)
    }
}

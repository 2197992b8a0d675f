//! Transaction submission and settlement tracking
//!
//! Submits a signed blob and waits until the network gives a definitive
//! answer. The wait is clocked by the ledger index, not wall time: the
//! loop ends when the transaction appears in a validated ledger or when
//! the current ledger index passes the transaction's validity window.
//! Acceptance into the candidate pool is provisional and never reported
//! as settlement.

use crate::ledger::{LedgerSession, TransactionStatus};
use crate::types::{SettlementOutcome, SignedPayment};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Default delay between settlement polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Submits signed payments and classifies their terminal outcome
pub struct SubmissionCoordinator {
    session: Arc<dyn LedgerSession>,
    poll_interval: Duration,
}

impl SubmissionCoordinator {
    pub fn new(session: Arc<dyn LedgerSession>, poll_interval: Duration) -> Self {
        Self {
            session,
            poll_interval,
        }
    }

    /// Submit and wait for a terminal outcome
    ///
    /// Infallible by construction: every failure mode maps onto a
    /// [`SettlementOutcome`] variant, so the caller always learns whether
    /// a retry is safe. A transport failure at any point yields
    /// `NetworkError` — acceptance of the original is then unknown and a
    /// blind retry could pay twice.
    ///
    /// The future is cancel-safe; dropping it abandons the wait without
    /// touching the session's lifetime.
    pub async fn submit_and_confirm(
        &self,
        signed: &SignedPayment,
        last_ledger_sequence: u32,
    ) -> SettlementOutcome {
        match self.session.submit(signed).await {
            Ok(ack) => {
                info!(
                    hash = %signed.hash,
                    engine_result = %ack.engine_result,
                    "Submitted; provisional engine result"
                );
            }
            Err(err) => {
                warn!(hash = %signed.hash, error = %err, "Submission failed");
                return SettlementOutcome::NetworkError {
                    detail: err.to_string(),
                };
            }
        }

        loop {
            match self.session.transaction_status(&signed.hash).await {
                Ok(TransactionStatus::Validated {
                    result,
                    ledger_index,
                }) => {
                    return SettlementOutcome::Confirmed {
                        result,
                        ledger_index,
                    };
                }
                Ok(status) => {
                    debug!(hash = %signed.hash, ?status, "Not yet validated");
                }
                Err(err) => {
                    return SettlementOutcome::NetworkError {
                        detail: err.to_string(),
                    };
                }
            }

            match self.session.current_ledger_index().await {
                Ok(current) if current > last_ledger_sequence => {
                    // The window has closed. One final status check so a
                    // transaction validated at the expiry boundary is
                    // reported as confirmed, not expired.
                    return match self.session.transaction_status(&signed.hash).await {
                        Ok(TransactionStatus::Validated {
                            result,
                            ledger_index,
                        }) => SettlementOutcome::Confirmed {
                            result,
                            ledger_index,
                        },
                        Ok(_) => SettlementOutcome::Expired {
                            last_ledger_sequence,
                        },
                        Err(err) => SettlementOutcome::NetworkError {
                            detail: err.to_string(),
                        },
                    };
                }
                Ok(current) => {
                    debug!(
                        current_ledger = current,
                        last_valid = last_ledger_sequence,
                        "Waiting for settlement"
                    );
                }
                Err(err) => {
                    return SettlementOutcome::NetworkError {
                        detail: err.to_string(),
                    };
                }
            }

            sleep(self.poll_interval).await;
        }
    }
}

//! Payment workflow
//!
//! Drives one payment through its whole lifecycle:
//! Idle → BalanceChecked → Built → Signed → Submitted → Reported, with an
//! early Aborted exit before any network mutation when the balance guard
//! fails. Every collaborator is injected; nothing here reaches for
//! process-wide state, so multiple workflow instances can run side by
//! side (each with its own sequence acquisition — per-account
//! serialization of sequences is the one thing concurrent callers must
//! add).

use crate::amount::{Amount, AmountError};
use crate::balance::BalanceOracle;
use crate::builder::TransactionBuilder;
use crate::errors::PaymentError;
use crate::events::{WorkflowEmitter, WorkflowEvent};
use crate::ledger::LedgerSession;
use crate::signer::Signer;
use crate::submission::SubmissionCoordinator;
use crate::types::{Address, PaymentReport};
use crate::wallet::Wallet;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Lifecycle states; terminal on Reported or an early abort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkflowState {
    Idle,
    BalanceChecked,
    Built,
    Signed,
    Submitted,
    Reported,
}

/// Orchestrates one payment end to end
pub struct PaymentWorkflow {
    session: Arc<dyn LedgerSession>,
    wallet: Wallet,
    builder: TransactionBuilder,
    oracle: BalanceOracle,
    coordinator: SubmissionCoordinator,
    events: WorkflowEmitter,
}

impl PaymentWorkflow {
    pub fn new(
        session: Arc<dyn LedgerSession>,
        wallet: Wallet,
        builder: TransactionBuilder,
        poll_interval: Duration,
    ) -> Self {
        Self {
            oracle: BalanceOracle::new(Arc::clone(&session)),
            coordinator: SubmissionCoordinator::new(Arc::clone(&session), poll_interval),
            session,
            wallet,
            builder,
            events: WorkflowEmitter::new(),
        }
    }

    /// Replace the event emitter (to attach an external sink)
    pub fn with_events(mut self, events: WorkflowEmitter) -> Self {
        self.events = events;
        self
    }

    /// The injected session, for lifecycle management by the owner
    pub fn session(&self) -> &Arc<dyn LedgerSession> {
        &self.session
    }

    fn advance(&self, state: &mut WorkflowState, next: WorkflowState) {
        debug!(
            payment_id = %self.events.payment_id(),
            from = ?state,
            to = ?next,
            "Workflow transition"
        );
        *state = next;
    }

    /// Run the payment to its terminal state
    ///
    /// Returns a report once the transaction has been submitted, whatever
    /// the settlement outcome; returns an error for everything that stops
    /// the payment before submission (no network mutation has happened in
    /// that case). Does not release the session — see
    /// [`run_and_release`].
    pub async fn run(
        &self,
        destination: &Address,
        amount: Amount,
    ) -> Result<PaymentReport, PaymentError> {
        let mut state = WorkflowState::Idle;
        let source = self.wallet.address().clone();

        let balance_before = self.oracle.balance(&source).await?;
        self.advance(&mut state, WorkflowState::BalanceChecked);
        self.events.emit(WorkflowEvent::BalanceChecked {
            balance: balance_before,
        });

        let fee = self.session.open_ledger_fee().await?;
        let required = amount
            .checked_add(fee)
            .ok_or_else(|| AmountError::Overflow("amount + fee".to_string()))?;
        if balance_before < required {
            self.events.emit(WorkflowEvent::Aborted {
                reason: format!(
                    "insufficient balance: available {} XRP, required {} XRP",
                    balance_before, required
                ),
            });
            return Err(PaymentError::InsufficientBalance {
                available: balance_before,
                required,
            });
        }

        let sequence = self.session.account_info(&source).await?.sequence;
        let current_ledger_index = self.session.current_ledger_index().await?;
        let unsigned = self.builder.build(
            source.clone(),
            destination.clone(),
            amount,
            sequence,
            fee,
            current_ledger_index,
        )?;
        self.advance(&mut state, WorkflowState::Built);
        self.events.emit(WorkflowEvent::Built {
            sequence,
            fee,
            last_ledger_sequence: unsigned.last_ledger_sequence,
        });

        let signed = Signer::new(&self.wallet).sign(&unsigned)?;
        self.advance(&mut state, WorkflowState::Signed);
        self.events.emit(WorkflowEvent::Signed {
            hash: signed.hash.clone(),
        });

        self.events.emit(WorkflowEvent::Submitted {
            hash: signed.hash.clone(),
            last_ledger_sequence: unsigned.last_ledger_sequence,
        });
        let outcome = self
            .coordinator
            .submit_and_confirm(&signed, unsigned.last_ledger_sequence)
            .await;
        self.advance(&mut state, WorkflowState::Submitted);

        // Best-effort regardless of outcome: even a failed-but-applied
        // transaction consumes fee and sequence.
        let balance_after = match self.oracle.balance(&source).await {
            Ok(balance) => Some(balance),
            Err(err) => {
                warn!(
                    payment_id = %self.events.payment_id(),
                    error = %err,
                    "Post-submission balance read failed"
                );
                None
            }
        };
        let actual_cost = balance_after.and_then(|after| balance_before.checked_sub(after));

        let report = PaymentReport {
            explorer_url: signed.hash.explorer_url(),
            tx_hash: signed.hash,
            balance_before,
            balance_after,
            outcome: outcome.clone(),
            actual_cost,
            completed_at: Utc::now(),
        };
        self.advance(&mut state, WorkflowState::Reported);
        self.events.emit(WorkflowEvent::Reported { outcome });

        Ok(report)
    }
}

/// Run the workflow and release the session on every exit path
///
/// The session is closed whether the run produced a report, aborted
/// early, or failed on a network error; close failures are logged, never
/// allowed to mask the payment result.
pub async fn run_and_release(
    workflow: &PaymentWorkflow,
    destination: &Address,
    amount: Amount,
) -> Result<PaymentReport, PaymentError> {
    let result = workflow.run(destination, amount).await;
    if let Err(err) = workflow.session().close().await {
        warn!(error = %err, "Session release failed");
    }
    result
}

//! Structured workflow events
//!
//! The workflow emits a typed event at every state transition instead of
//! narrating to the console. Events carry the payment's correlation id and
//! are mirrored as tracing records with structured fields; an optional
//! channel hands them to an external observability consumer.

use crate::amount::Amount;
use crate::types::{SettlementOutcome, TxHash};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// One transition of the payment workflow
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkflowEvent {
    BalanceChecked {
        balance: Amount,
    },
    Built {
        sequence: u32,
        fee: Amount,
        last_ledger_sequence: u32,
    },
    Signed {
        hash: TxHash,
    },
    Submitted {
        hash: TxHash,
        last_ledger_sequence: u32,
    },
    Reported {
        outcome: SettlementOutcome,
    },
    Aborted {
        reason: String,
    },
}

/// Event plus its correlation context
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub payment_id: String,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: WorkflowEvent,
}

/// Channel end handed to an external event consumer
pub type EventSender = mpsc::UnboundedSender<EventRecord>;

/// Emits workflow events under one correlation id
#[derive(Debug, Clone)]
pub struct WorkflowEmitter {
    payment_id: String,
    sink: Option<EventSender>,
}

impl WorkflowEmitter {
    pub fn new() -> Self {
        Self {
            payment_id: Uuid::new_v4().to_string(),
            sink: None,
        }
    }

    /// Attach an external consumer
    pub fn with_sink(mut self, sink: EventSender) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn payment_id(&self) -> &str {
        &self.payment_id
    }

    /// Record one transition
    ///
    /// A closed sink is ignored: observability must never fail a payment.
    pub fn emit(&self, event: WorkflowEvent) {
        match &event {
            WorkflowEvent::BalanceChecked { balance } => {
                info!(
                    payment_id = %self.payment_id,
                    balance = %balance,
                    "Balance checked"
                );
            }
            WorkflowEvent::Built {
                sequence,
                fee,
                last_ledger_sequence,
            } => {
                info!(
                    payment_id = %self.payment_id,
                    sequence = %sequence,
                    fee = %fee,
                    last_ledger_sequence = %last_ledger_sequence,
                    "Transaction built"
                );
            }
            WorkflowEvent::Signed { hash } => {
                info!(
                    payment_id = %self.payment_id,
                    hash = %hash,
                    "Transaction signed"
                );
            }
            WorkflowEvent::Submitted {
                hash,
                last_ledger_sequence,
            } => {
                info!(
                    payment_id = %self.payment_id,
                    hash = %hash,
                    last_ledger_sequence = %last_ledger_sequence,
                    "Transaction submitted"
                );
            }
            WorkflowEvent::Reported { outcome } => {
                info!(
                    payment_id = %self.payment_id,
                    outcome = %outcome,
                    "Payment reported"
                );
            }
            WorkflowEvent::Aborted { reason } => {
                warn!(
                    payment_id = %self.payment_id,
                    reason = %reason,
                    "Payment aborted"
                );
            }
        }

        if let Some(sink) = &self.sink {
            let _ = sink.send(EventRecord {
                payment_id: self.payment_id.clone(),
                at: Utc::now(),
                event,
            });
        }
    }
}

impl Default for WorkflowEmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_reach_sink_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let emitter = WorkflowEmitter::new().with_sink(tx);

        emitter.emit(WorkflowEvent::BalanceChecked {
            balance: Amount::from_drops(10_000_000),
        });
        emitter.emit(WorkflowEvent::Aborted {
            reason: "insufficient balance".to_string(),
        });

        let first = rx.recv().await.unwrap();
        assert_eq!(first.payment_id, emitter.payment_id());
        assert!(matches!(first.event, WorkflowEvent::BalanceChecked { .. }));

        let second = rx.recv().await.unwrap();
        assert!(matches!(second.event, WorkflowEvent::Aborted { .. }));
    }

    #[test]
    fn test_closed_sink_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let emitter = WorkflowEmitter::new().with_sink(tx);
        // Must not panic or error
        emitter.emit(WorkflowEvent::Aborted {
            reason: "test".to_string(),
        });
    }

    #[test]
    fn test_event_serialization_shape() {
        let record = EventRecord {
            payment_id: "p-1".to_string(),
            at: Utc::now(),
            event: WorkflowEvent::Signed {
                hash: TxHash::from_bytes([1u8; 32]),
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["event"], "signed");
        assert_eq!(json["payment_id"], "p-1");
        assert!(json["hash"].is_string());
    }
}

//! End-to-end payment lifecycle scenarios against the mock ledger session

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use xrp_courier::amount::Amount;
use xrp_courier::builder::TransactionBuilder;
use xrp_courier::errors::PaymentError;
use xrp_courier::events::{WorkflowEmitter, WorkflowEvent};
use xrp_courier::ledger::{LedgerError, LedgerSession, TransactionStatus};
use xrp_courier::test_utils::MockLedgerSession;
use xrp_courier::types::{Address, ResultCode, SettlementOutcome};
use xrp_courier::wallet::Wallet;
use xrp_courier::workflow::{run_and_release, PaymentWorkflow};

const DROPS_PER_XRP: u64 = 1_000_000;
const FEE_DROPS: u64 = 120;

fn xrp(value: u64) -> Amount {
    Amount::from_drops(value * DROPS_PER_XRP)
}

fn destination() -> Address {
    Wallet::from_entropy([2u8; 16]).address().clone()
}

fn workflow(mock: &Arc<MockLedgerSession>) -> PaymentWorkflow {
    PaymentWorkflow::new(
        Arc::clone(mock) as Arc<dyn LedgerSession>,
        Wallet::from_entropy([1u8; 16]),
        TransactionBuilder::new(100).unwrap(),
        Duration::from_millis(1),
    )
}

/// Sufficient balance proceeds through build, sign, and submit
#[tokio::test]
async fn scenario_sufficient_balance_settles() {
    let mock = Arc::new(MockLedgerSession::new());
    mock.queue_account_info(xrp(10), 42);
    mock.set_fee(Amount::from_drops(FEE_DROPS));
    mock.set_ledger(1000, 0);
    mock.queue_status(TransactionStatus::Validated {
        result: ResultCode::new("tesSUCCESS"),
        ledger_index: 1050,
    });

    let report = workflow(&mock)
        .run(&destination(), xrp(5))
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(mock.submit_calls(), 1);
    assert_eq!(report.balance_before, xrp(10));
}

/// Exactly-amount balance cannot cover the fee; nothing reaches the
/// network and no post-submission balance read happens
#[tokio::test]
async fn scenario_insufficient_balance_aborts() {
    let mock = Arc::new(MockLedgerSession::new());
    mock.queue_account_info(xrp(5), 42);
    mock.set_fee(Amount::from_drops(FEE_DROPS));

    let err = workflow(&mock)
        .run(&destination(), xrp(5))
        .await
        .unwrap_err();

    match err {
        PaymentError::InsufficientBalance {
            available,
            required,
        } => {
            assert_eq!(available, xrp(5));
            assert_eq!(required, Amount::from_drops(5 * DROPS_PER_XRP + FEE_DROPS));
        }
        other => panic!("expected InsufficientBalance, got {:?}", other),
    }
    assert_eq!(mock.submit_calls(), 0);
    assert_eq!(mock.status_calls(), 0);
    // Only the initial balance check; no balance_after read
    assert_eq!(mock.account_info_calls(), 1);
}

/// A transaction that never appears expires once the ledger index passes
/// its window; the balance is unchanged
#[tokio::test]
async fn scenario_expiry_without_acceptance() {
    let mock = Arc::new(MockLedgerSession::new());
    mock.queue_account_info(xrp(10), 42);
    mock.set_fee(Amount::from_drops(FEE_DROPS));
    // Build sees ledger 1000, later polls watch it pass 1100
    mock.set_ledger(1000, 50);

    let report = workflow(&mock)
        .run(&destination(), xrp(5))
        .await
        .unwrap();

    assert_eq!(
        report.outcome,
        SettlementOutcome::Expired {
            last_ledger_sequence: 1100,
        }
    );
    assert!(report.outcome.is_safe_to_retry());
    // balance_after still fetched; nothing was charged
    assert_eq!(report.balance_after, Some(xrp(10)));
    assert_eq!(report.actual_cost, Some(Amount::ZERO));
}

/// Settled success: actual cost is exactly amount plus fee
#[tokio::test]
async fn scenario_confirmed_success_costs_amount_plus_fee() {
    let mock = Arc::new(MockLedgerSession::new());
    let after = Amount::from_drops(10 * DROPS_PER_XRP - 5 * DROPS_PER_XRP - FEE_DROPS);
    mock.queue_account_info(xrp(10), 42); // balance check
    mock.queue_account_info(xrp(10), 42); // sequence fetch
    mock.queue_account_info(after, 43); // post-submission read
    mock.set_fee(Amount::from_drops(FEE_DROPS));
    mock.set_ledger(1000, 0);
    mock.queue_status(TransactionStatus::Validated {
        result: ResultCode::new("tesSUCCESS"),
        ledger_index: 1050,
    });

    let report = workflow(&mock)
        .run(&destination(), xrp(5))
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.balance_after, Some(after));
    assert_eq!(
        report.actual_cost,
        Some(Amount::from_drops(5 * DROPS_PER_XRP + FEE_DROPS))
    );
    assert!(report.explorer_url.ends_with(report.tx_hash.as_str()));
}

/// Connection lost mid-wait: distinguished from expiry, and the session
/// is still released
#[tokio::test]
async fn scenario_connection_drop_mid_wait() {
    let mock = Arc::new(MockLedgerSession::new());
    mock.queue_account_info(xrp(10), 42);
    mock.set_fee(Amount::from_drops(FEE_DROPS));
    mock.set_ledger(1000, 1);
    mock.queue_status(TransactionStatus::Pending);
    mock.queue_status_error(LedgerError::Network("connection reset by peer".to_string()));

    let wf = workflow(&mock);
    let report = run_and_release(&wf, &destination(), xrp(5))
        .await
        .unwrap();

    assert!(matches!(
        report.outcome,
        SettlementOutcome::NetworkError { .. }
    ));
    assert!(!report.outcome.is_safe_to_retry());
    assert!(mock.closed());
}

/// The session is released even when the workflow aborts before
/// submission
#[tokio::test]
async fn session_released_on_abort() {
    let mock = Arc::new(MockLedgerSession::new());
    mock.queue_account_info(xrp(1), 42);
    mock.set_fee(Amount::from_drops(FEE_DROPS));

    let wf = workflow(&mock);
    let result = run_and_release(&wf, &destination(), xrp(5)).await;

    assert!(matches!(
        result,
        Err(PaymentError::InsufficientBalance { .. })
    ));
    assert!(mock.closed());
    assert_eq!(mock.close_calls(), 1);
}

/// The session is released when the very first network read fails
#[tokio::test]
async fn session_released_on_network_failure() {
    let mock = Arc::new(MockLedgerSession::new());
    mock.queue_account_info_error(LedgerError::Network("dns failure".to_string()));

    let wf = workflow(&mock);
    let result = run_and_release(&wf, &destination(), xrp(5)).await;

    match result {
        Err(err @ PaymentError::Ledger(_)) => assert!(err.is_safe_to_retry()),
        other => panic!("expected ledger error, got {:?}", other.map(|r| r.outcome)),
    }
    assert!(mock.closed());
}

/// Events fire at every transition, in lifecycle order
#[tokio::test]
async fn events_trace_the_full_lifecycle() {
    let mock = Arc::new(MockLedgerSession::new());
    mock.queue_account_info(xrp(10), 42);
    mock.set_fee(Amount::from_drops(FEE_DROPS));
    mock.set_ledger(1000, 0);
    mock.queue_status(TransactionStatus::Validated {
        result: ResultCode::new("tesSUCCESS"),
        ledger_index: 1050,
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let wf = workflow(&mock).with_events(WorkflowEmitter::new().with_sink(tx));
    wf.run(&destination(), xrp(5)).await.unwrap();

    let mut events = Vec::new();
    while let Ok(record) = rx.try_recv() {
        events.push(record.event);
    }

    assert_eq!(events.len(), 5);
    assert!(matches!(events[0], WorkflowEvent::BalanceChecked { .. }));
    assert!(matches!(
        events[1],
        WorkflowEvent::Built {
            sequence: 42,
            last_ledger_sequence: 1100,
            ..
        }
    ));
    assert!(matches!(events[2], WorkflowEvent::Signed { .. }));
    assert!(matches!(events[3], WorkflowEvent::Submitted { .. }));
    assert!(matches!(events[4], WorkflowEvent::Reported { .. }));
}

/// An aborted payment emits BalanceChecked then Aborted and nothing else
#[tokio::test]
async fn events_on_abort() {
    let mock = Arc::new(MockLedgerSession::new());
    mock.queue_account_info(xrp(1), 42);
    mock.set_fee(Amount::from_drops(FEE_DROPS));

    let (tx, mut rx) = mpsc::unbounded_channel();
    let wf = workflow(&mock).with_events(WorkflowEmitter::new().with_sink(tx));
    let _ = wf.run(&destination(), xrp(5)).await;

    let mut events = Vec::new();
    while let Ok(record) = rx.try_recv() {
        events.push(record.event);
    }

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], WorkflowEvent::BalanceChecked { .. }));
    assert!(matches!(events[1], WorkflowEvent::Aborted { .. }));
}

/// A settled-but-rejected transaction still yields a report, with the
/// observed cost (fee handling differs per network rules, so the report
/// simply reflects the balances)
#[tokio::test]
async fn scenario_application_failure_still_reports() {
    let mock = Arc::new(MockLedgerSession::new());
    let after = Amount::from_drops(10 * DROPS_PER_XRP - FEE_DROPS);
    mock.queue_account_info(xrp(10), 42);
    mock.queue_account_info(xrp(10), 42);
    mock.queue_account_info(after, 43);
    mock.set_fee(Amount::from_drops(FEE_DROPS));
    mock.set_ledger(1000, 0);
    mock.queue_status(TransactionStatus::Validated {
        result: ResultCode::new("tecUNFUNDED_PAYMENT"),
        ledger_index: 1042,
    });

    let report = workflow(&mock)
        .run(&destination(), xrp(5))
        .await
        .unwrap();

    assert!(!report.is_success());
    assert!(matches!(
        report.outcome,
        SettlementOutcome::Confirmed { .. }
    ));
    // Fee was charged even though the payment's effect was rejected
    assert_eq!(report.actual_cost, Some(Amount::from_drops(FEE_DROPS)));
}

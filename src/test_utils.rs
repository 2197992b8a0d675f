//! Test Utilities Module
//!
//! Provides a scriptable [`MockLedgerSession`] for deterministic testing
//! of the payment lifecycle without a node. Responses are queued ahead of
//! time; every trait method counts its calls so tests can assert which
//! network interactions did (and did not) happen.
//!
//! Only compiled for tests or under the `test_utils` feature.

#![cfg(any(test, feature = "test_utils"))]

use crate::amount::Amount;
use crate::ledger::{AccountInfo, LedgerError, LedgerSession, SubmitAck, TransactionStatus};
use crate::types::{Address, ResultCode, SignedPayment, TxHash};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scriptable ledger session double
///
/// Queued `account_info` / `transaction_status` responses are consumed in
/// order; the last queued entry is sticky so a short script can serve a
/// long poll loop. `current_ledger_index` starts at a configured index and
/// advances by a fixed step per call, which is how tests make ledger time
/// pass.
pub struct MockLedgerSession {
    account_infos: Mutex<VecDeque<Result<AccountInfo, LedgerError>>>,
    statuses: Mutex<VecDeque<Result<TransactionStatus, LedgerError>>>,
    fee: Mutex<Result<Amount, LedgerError>>,
    submit_result: Mutex<Result<SubmitAck, LedgerError>>,
    ledger_index: Mutex<u32>,
    ledger_step: Mutex<u32>,

    account_info_calls: AtomicUsize,
    status_calls: AtomicUsize,
    fee_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    ledger_calls: AtomicUsize,
    close_calls: AtomicUsize,
}

impl MockLedgerSession {
    /// Defaults: 12-drop fee, provisional tesSUCCESS on submit, ledger
    /// index 1000 that never advances, no scripted account state.
    pub fn new() -> Self {
        Self {
            account_infos: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            fee: Mutex::new(Ok(Amount::from_drops(12))),
            submit_result: Mutex::new(Ok(SubmitAck {
                engine_result: ResultCode::new("tesSUCCESS"),
                message: None,
            })),
            ledger_index: Mutex::new(1000),
            ledger_step: Mutex::new(0),
            account_info_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            fee_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            ledger_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
        }
    }

    pub fn queue_account_info(&self, balance: Amount, sequence: u32) {
        self.account_infos
            .lock()
            .unwrap()
            .push_back(Ok(AccountInfo { balance, sequence }));
    }

    pub fn queue_account_info_error(&self, err: LedgerError) {
        self.account_infos.lock().unwrap().push_back(Err(err));
    }

    pub fn queue_status(&self, status: TransactionStatus) {
        self.statuses.lock().unwrap().push_back(Ok(status));
    }

    pub fn queue_status_error(&self, err: LedgerError) {
        self.statuses.lock().unwrap().push_back(Err(err));
    }

    pub fn set_fee(&self, fee: Amount) {
        *self.fee.lock().unwrap() = Ok(fee);
    }

    pub fn set_fee_error(&self, err: LedgerError) {
        *self.fee.lock().unwrap() = Err(err);
    }

    pub fn set_submit_error(&self, err: LedgerError) {
        *self.submit_result.lock().unwrap() = Err(err);
    }

    pub fn set_provisional_result(&self, code: &str) {
        *self.submit_result.lock().unwrap() = Ok(SubmitAck {
            engine_result: ResultCode::new(code),
            message: None,
        });
    }

    /// Ledger index starts at `start` and advances by `step` per query
    pub fn set_ledger(&self, start: u32, step: u32) {
        *self.ledger_index.lock().unwrap() = start;
        *self.ledger_step.lock().unwrap() = step;
    }

    pub fn account_info_calls(&self) -> usize {
        self.account_info_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> bool {
        self.close_calls() > 0
    }

    fn next_from(
        queue: &Mutex<VecDeque<Result<AccountInfo, LedgerError>>>,
    ) -> Result<AccountInfo, LedgerError> {
        let mut queue = queue.lock().unwrap();
        match queue.len() {
            0 => Err(LedgerError::Protocol(
                "mock: unscripted account_info call".to_string(),
            )),
            1 => queue.front().cloned().unwrap(),
            _ => queue.pop_front().unwrap(),
        }
    }
}

impl Default for MockLedgerSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerSession for MockLedgerSession {
    async fn account_info(&self, _address: &Address) -> Result<AccountInfo, LedgerError> {
        self.account_info_calls.fetch_add(1, Ordering::SeqCst);
        Self::next_from(&self.account_infos)
    }

    async fn current_ledger_index(&self) -> Result<u32, LedgerError> {
        self.ledger_calls.fetch_add(1, Ordering::SeqCst);
        let mut index = self.ledger_index.lock().unwrap();
        let current = *index;
        *index = index.saturating_add(*self.ledger_step.lock().unwrap());
        Ok(current)
    }

    async fn open_ledger_fee(&self) -> Result<Amount, LedgerError> {
        self.fee_calls.fetch_add(1, Ordering::SeqCst);
        self.fee.lock().unwrap().clone()
    }

    async fn submit(&self, _signed: &SignedPayment) -> Result<SubmitAck, LedgerError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submit_result.lock().unwrap().clone()
    }

    async fn transaction_status(&self, _hash: &TxHash) -> Result<TransactionStatus, LedgerError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut queue = self.statuses.lock().unwrap();
        match queue.len() {
            0 => Ok(TransactionStatus::NotFound),
            1 => queue.front().cloned().unwrap(),
            _ => queue.pop_front().unwrap(),
        }
    }

    async fn close(&self) -> Result<(), LedgerError> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sticky_last_response() {
        let mock = MockLedgerSession::new();
        mock.queue_account_info(Amount::from_drops(10), 1);
        mock.queue_account_info(Amount::from_drops(20), 2);

        let address = crate::wallet::Wallet::from_entropy([1u8; 16])
            .address()
            .clone();
        assert_eq!(
            mock.account_info(&address).await.unwrap().balance.drops(),
            10
        );
        // Last entry repeats
        for _ in 0..3 {
            assert_eq!(
                mock.account_info(&address).await.unwrap().balance.drops(),
                20
            );
        }
        assert_eq!(mock.account_info_calls(), 4);
    }

    #[tokio::test]
    async fn test_ledger_advances_by_step() {
        let mock = MockLedgerSession::new();
        mock.set_ledger(1000, 50);
        assert_eq!(mock.current_ledger_index().await.unwrap(), 1000);
        assert_eq!(mock.current_ledger_index().await.unwrap(), 1050);
        assert_eq!(mock.current_ledger_index().await.unwrap(), 1100);
    }

    #[tokio::test]
    async fn test_unscripted_account_info_fails() {
        let mock = MockLedgerSession::new();
        let address = crate::wallet::Wallet::from_entropy([1u8; 16])
            .address()
            .clone();
        assert!(mock.account_info(&address).await.is_err());
    }
}

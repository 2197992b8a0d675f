//! Unsigned payment assembly
//!
//! Pure: sequence, fee, and the current ledger index are supplied by the
//! caller, so the builder never touches the session and every validation
//! rule is testable without a node.

use crate::amount::Amount;
use crate::types::{Address, UnsignedPayment};
use thiserror::Error;

/// Default expiry buffer in ledgers (order of minutes of confirmation
/// latency). Too small risks spurious expiry; too large keeps the
/// account's sequence number pinned by a pending transaction.
pub const DEFAULT_EXPIRY_BUFFER: u32 = 100;

/// Errors from assembling an unsigned payment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Payments must move a positive number of drops
    #[error("invalid amount: payment amount must be greater than zero")]
    InvalidAmount,

    /// The expiry buffer must leave at least one ledger of validity
    #[error("invalid expiry buffer: must be at least 1 ledger")]
    InvalidExpiryBuffer,

    /// current ledger index + buffer exceeds the ledger index range
    #[error("ledger index overflow: current {current} + buffer {buffer}")]
    LedgerRangeOverflow { current: u32, buffer: u32 },
}

/// Assembles unsigned payments with a fixed expiry policy
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    expiry_buffer: u32,
}

impl TransactionBuilder {
    /// A zero buffer would build transactions that are expired on arrival,
    /// so it is rejected here rather than at submission time.
    pub fn new(expiry_buffer: u32) -> Result<Self, BuildError> {
        if expiry_buffer == 0 {
            return Err(BuildError::InvalidExpiryBuffer);
        }
        Ok(Self { expiry_buffer })
    }

    pub fn expiry_buffer(&self) -> u32 {
        self.expiry_buffer
    }

    /// Assemble an unsigned payment
    ///
    /// last_ledger_sequence = current_ledger_index + expiry_buffer, so the
    /// transaction stays eligible for exactly `expiry_buffer` ledgers.
    pub fn build(
        &self,
        source: Address,
        destination: Address,
        amount: Amount,
        sequence: u32,
        fee: Amount,
        current_ledger_index: u32,
    ) -> Result<UnsignedPayment, BuildError> {
        if amount.is_zero() {
            return Err(BuildError::InvalidAmount);
        }

        let last_ledger_sequence = current_ledger_index
            .checked_add(self.expiry_buffer)
            .ok_or(BuildError::LedgerRangeOverflow {
                current: current_ledger_index,
                buffer: self.expiry_buffer,
            })?;

        Ok(UnsignedPayment {
            source,
            destination,
            amount,
            sequence,
            fee,
            last_ledger_sequence,
        })
    }
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self {
            expiry_buffer: DEFAULT_EXPIRY_BUFFER,
        }
    }
}

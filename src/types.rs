//! Core data model for the payment lifecycle

use crate::amount::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Block-explorer URL prefix for settled transactions (testnet)
pub const EXPLORER_TX_URL: &str = "https://blockexplorer.one/xrp/testnet/tx/";

/// Classic address payload type prefix
const ADDRESS_TYPE_PREFIX: u8 = 0x00;

/// Account ID length (RIPEMD-160 output)
const ACCOUNT_ID_LEN: usize = 20;

/// Append a 4-byte double-SHA256 checksum and encode with the Ripple alphabet
pub(crate) fn base58check_encode(payload: &[u8]) -> String {
    let checksum = Sha256::digest(Sha256::digest(payload));
    let mut bytes = payload.to_vec();
    bytes.extend_from_slice(&checksum[..4]);
    bs58::encode(bytes)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_string()
}

/// Decode a Ripple-alphabet base58check string, returning the payload
/// without its checksum. `None` on any structural defect.
pub(crate) fn base58check_decode(s: &str) -> Option<Vec<u8>> {
    let bytes = bs58::decode(s)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .ok()?;
    if bytes.len() < 5 {
        return None;
    }
    let (payload, checksum) = bytes.split_at(bytes.len() - 4);
    let expected = Sha256::digest(Sha256::digest(payload));
    if checksum != &expected[..4] {
        return None;
    }
    Some(payload.to_vec())
}

/// Error from parsing a classic address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid ledger address '{0}'")]
pub struct AddressParseError(pub String);

/// A classic ledger account address ("r...")
///
/// Holds only strings that decode under the Ripple base58 alphabet to a
/// 20-byte account ID with a valid checksum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Encode a raw 20-byte account ID as a classic address
    pub(crate) fn from_account_id(account_id: &[u8; ACCOUNT_ID_LEN]) -> Self {
        let mut payload = Vec::with_capacity(1 + ACCOUNT_ID_LEN);
        payload.push(ADDRESS_TYPE_PREFIX);
        payload.extend_from_slice(account_id);
        Self(base58check_encode(&payload))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let payload = base58check_decode(s).ok_or_else(|| AddressParseError(s.to_string()))?;
        if payload.len() != 1 + ACCOUNT_ID_LEN || payload[0] != ADDRESS_TYPE_PREFIX {
            return Err(AddressParseError(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> String {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content-derived transaction identifier (uppercase hex, 32 bytes)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(hex::encode_upper(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Explorer lookup URL for this transaction
    pub fn explorer_url(&self) -> String {
        format!("{}{}", EXPLORER_TX_URL, self.0)
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Application-level result code reported by the network for a settled
/// transaction (e.g. "tesSUCCESS", "tecUNFUNDED_PAYMENT")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCode(String);

impl ResultCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// tes-class codes mean the transaction's effect was applied
    pub fn is_success(&self) -> bool {
        self.0.starts_with("tes")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An assembled, not-yet-signed payment transaction
///
/// Never mutated after signing; the signer consumes it by reference and
/// produces an independent [`SignedPayment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsignedPayment {
    pub source: Address,
    pub destination: Address,
    pub amount: Amount,
    pub sequence: u32,
    pub fee: Amount,
    /// Last ledger index at which this transaction remains eligible
    pub last_ledger_sequence: u32,
}

/// A signed, network-ready transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedPayment {
    /// Hex-encoded signed payload
    pub blob: String,
    /// Content hash; matches what the network reports once settled
    pub hash: TxHash,
}

/// Terminal classification of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettlementOutcome {
    /// Appeared in a validated ledger; the result code says whether its
    /// effect was applied
    Confirmed {
        result: ResultCode,
        ledger_index: u32,
    },
    /// The ledger index passed the transaction's validity window without
    /// the transaction appearing
    Expired { last_ledger_sequence: u32 },
    /// The connection was lost before settlement could be observed; it is
    /// unknown whether the transaction was accepted
    NetworkError { detail: String },
}

impl SettlementOutcome {
    /// Settled with its effect applied
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Confirmed { result, .. } if result.is_success())
    }

    /// Whether resubmitting with a fresh sequence and expiry window is
    /// safe. Only expiry qualifies: the original can no longer settle.
    /// After a network error the original may have been accepted, so a
    /// blind retry risks paying twice.
    pub fn is_safe_to_retry(&self) -> bool {
        matches!(self, Self::Expired { .. })
    }
}

impl fmt::Display for SettlementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed {
                result,
                ledger_index,
            } => write!(f, "confirmed in ledger {} ({})", ledger_index, result),
            Self::Expired {
                last_ledger_sequence,
            } => write!(f, "expired after ledger {}", last_ledger_sequence),
            Self::NetworkError { detail } => write!(f, "network error: {}", detail),
        }
    }
}

/// Terminal artifact of one workflow invocation
#[derive(Debug, Clone, Serialize)]
pub struct PaymentReport {
    pub tx_hash: TxHash,
    pub balance_before: Amount,
    /// Best-effort post-submission balance; `None` only when that read
    /// itself failed
    pub balance_after: Option<Amount>,
    pub outcome: SettlementOutcome,
    /// balance_before − balance_after, when both are known
    pub actual_cost: Option<Amount>,
    pub explorer_url: String,
    pub completed_at: DateTime<Utc>,
}

impl PaymentReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

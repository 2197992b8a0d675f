//! XRP amounts in drops
//!
//! The ledger's base currency is indivisible below one drop
//! (1 XRP = 1,000,000 drops). All arithmetic happens on integer drops;
//! decimal XRP strings only exist at the configuration and display edges.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Drops per XRP
pub const DROPS_PER_XRP: u64 = 1_000_000;

/// Maximum fractional digits representable in drops
const XRP_DECIMALS: usize = 6;

/// Errors from parsing or converting amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Not a non-negative decimal number
    #[error("invalid amount '{0}': expected a non-negative decimal XRP value")]
    Invalid(String),

    /// More fractional digits than a drop can represent
    #[error("amount '{0}' has sub-drop precision (more than {XRP_DECIMALS} decimal places)")]
    PrecisionLoss(String),

    /// Value exceeds the representable drop range
    #[error("amount '{0}' overflows the drop range")]
    Overflow(String),
}

/// A non-negative XRP amount stored as integer drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Construct directly from drops
    pub const fn from_drops(drops: u64) -> Self {
        Self(drops)
    }

    /// Parse a decimal XRP string ("5", "5.5", "0.00012")
    ///
    /// Rejects negatives, non-numeric input, and anything with more than
    /// six fractional digits (sub-drop precision cannot round-trip).
    pub fn from_xrp_str(s: &str) -> Result<Self, AmountError> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.starts_with('+') {
            return Err(AmountError::Invalid(s.to_string()));
        }

        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (trimmed, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountError::Invalid(s.to_string()));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AmountError::Invalid(s.to_string()));
        }
        if frac_part.len() > XRP_DECIMALS {
            // Trailing zeros beyond six places lose nothing
            let (kept, excess) = frac_part.split_at(XRP_DECIMALS);
            if excess.chars().any(|c| c != '0') {
                return Err(AmountError::PrecisionLoss(s.to_string()));
            }
            return Self::from_parts(int_part, kept, s);
        }

        Self::from_parts(int_part, frac_part, s)
    }

    fn from_parts(int_part: &str, frac_part: &str, original: &str) -> Result<Self, AmountError> {
        let whole: u64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| AmountError::Overflow(original.to_string()))?
        };

        let mut frac: u64 = 0;
        if !frac_part.is_empty() {
            frac = frac_part
                .parse()
                .map_err(|_| AmountError::Invalid(original.to_string()))?;
            frac *= 10u64.pow((XRP_DECIMALS - frac_part.len()) as u32);
        }

        whole
            .checked_mul(DROPS_PER_XRP)
            .and_then(|d| d.checked_add(frac))
            .map(Amount)
            .ok_or_else(|| AmountError::Overflow(original.to_string()))
    }

    /// Parse a drops string as reported by the node (e.g. account balances)
    pub fn from_drops_str(s: &str) -> Result<Self, AmountError> {
        s.trim()
            .parse::<u64>()
            .map(Amount)
            .map_err(|_| AmountError::Invalid(s.to_string()))
    }

    pub const fn drops(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Approximate XRP value, for logging only
    pub fn as_xrp(&self) -> f64 {
        self.0 as f64 / DROPS_PER_XRP as f64
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / DROPS_PER_XRP;
        let frac = self.0 % DROPS_PER_XRP;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let digits = format!("{:06}", frac);
            write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_xrp_str(s)
    }
}

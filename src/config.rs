//! Configuration module
//!
//! Configuration comes from a TOML file with environment-variable
//! overrides (loaded through dotenvy so a local .env works). The wallet
//! seed is deliberately excluded from the file format: it is only ever
//! read from the environment.

use crate::amount::Amount;
use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the wallet's family seed
pub const ENV_WALLET_SEED: &str = "WALLET_SEED";
/// Environment override for the destination address
pub const ENV_DESTINATION: &str = "DESTINATION_ADDRESS";
/// Environment override for the XRP amount to send
pub const ENV_AMOUNT: &str = "AMOUNT_TO_SEND";
/// Environment override for the node endpoint
pub const ENV_ENDPOINT: &str = "XRPL_SERVER";

/// Startup configuration failures; fatal before any network call
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {detail}")]
    Parse { path: String, detail: String },

    #[error("{0} is required (set it in the environment or .env)")]
    MissingValue(&'static str),

    #[error("invalid {field}: {detail}")]
    InvalidValue {
        field: &'static str,
        detail: String,
    },
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ledger node connection
    #[serde(default)]
    pub network: NetworkConfig,

    /// Payment intent
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Submission and confirmation-wait tuning
    #[serde(default)]
    pub submission: SubmissionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint of the ledger node
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Destination classic address
    #[serde(default)]
    pub destination: String,

    /// Amount to send, in decimal XRP
    #[serde(default)]
    pub amount_xrp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Validity window in ledgers beyond the current index
    #[serde(default = "default_expiry_buffer")]
    pub expiry_buffer: u32,

    /// Delay between settlement polls in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

// Default value functions
fn default_endpoint() -> String {
    "https://s.altnet.rippletest.net:51234/".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_expiry_buffer() -> u32 {
    crate::builder::DEFAULT_EXPIRY_BUFFER
}
fn default_poll_interval() -> u64 {
    1000
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            destination: String::new(),
            amount_xrp: String::new(),
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            expiry_buffer: default_expiry_buffer(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            payment: PaymentConfig::default(),
            submission: SubmissionConfig::default(),
        }
    }
}

/// Validated payment intent extracted from the configuration
#[derive(Debug, Clone)]
pub struct PaymentPlan {
    pub destination: Address,
    pub amount: Amount,
}

impl Config {
    /// Parse a TOML config file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_string(),
            detail: err.to_string(),
        })
    }

    /// Load configuration: file if present, defaults otherwise, then
    /// environment overrides on top
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = if std::path::Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment variables win over file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var(ENV_ENDPOINT) {
            if !endpoint.is_empty() {
                self.network.endpoint = endpoint;
            }
        }
        if let Ok(destination) = std::env::var(ENV_DESTINATION) {
            if !destination.is_empty() {
                self.payment.destination = destination;
            }
        }
        if let Ok(amount) = std::env::var(ENV_AMOUNT) {
            if !amount.is_empty() {
                self.payment.amount_xrp = amount;
            }
        }
    }

    /// Validate the payment intent
    ///
    /// Presence and well-formedness are checked here, before any network
    /// interaction; a payment must never fail on input that was knowably
    /// bad at startup.
    pub fn payment_plan(&self) -> Result<PaymentPlan, ConfigError> {
        if self.payment.destination.is_empty() {
            return Err(ConfigError::MissingValue(ENV_DESTINATION));
        }
        if self.payment.amount_xrp.is_empty() {
            return Err(ConfigError::MissingValue(ENV_AMOUNT));
        }

        let destination =
            self.payment
                .destination
                .parse()
                .map_err(|err| ConfigError::InvalidValue {
                    field: "destination",
                    detail: format!("{}", err),
                })?;
        let amount = Amount::from_xrp_str(&self.payment.amount_xrp).map_err(|err| {
            ConfigError::InvalidValue {
                field: "amount",
                detail: err.to_string(),
            }
        })?;

        Ok(PaymentPlan {
            destination,
            amount,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.submission.poll_interval_ms)
    }
}

/// Read the wallet seed from the environment
///
/// Seeds never appear in config files or logs.
pub fn wallet_seed() -> Result<String, ConfigError> {
    match std::env::var(ENV_WALLET_SEED) {
        Ok(seed) if !seed.trim().is_empty() => Ok(seed),
        _ => Err(ConfigError::MissingValue(ENV_WALLET_SEED)),
    }
}

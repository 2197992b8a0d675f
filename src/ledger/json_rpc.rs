//! JSON-RPC ledger session over HTTP
//!
//! Speaks the node's public JSON-RPC API: `server_info`, `account_info`,
//! `ledger_current`, `fee`, `submit`, and `tx`. Every method is one POST
//! with no client-side retry; transient failure policy belongs to the
//! caller, which must distinguish "not delivered" from "not settled".

use super::errors::LedgerError;
use super::{AccountInfo, LedgerSession, SubmitAck, TransactionStatus};
use crate::amount::Amount;
use crate::types::{Address, ResultCode, SignedPayment, TxHash};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Node error code for an unknown account
const ERR_ACCOUNT_NOT_FOUND: &str = "actNotFound";

/// Node error code for an unknown transaction hash
const ERR_TXN_NOT_FOUND: &str = "txnNotFound";

/// HTTP JSON-RPC implementation of [`LedgerSession`]
pub struct HttpLedgerSession {
    client: reqwest::Client,
    endpoint: String,
    total_requests: AtomicU64,
    closed: AtomicBool,
}

impl HttpLedgerSession {
    /// Build a client and verify the node is reachable (`server_info`)
    pub async fn connect(endpoint: &str, timeout: Duration) -> Result<Self, LedgerError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let session = Self {
            client,
            endpoint: endpoint.to_string(),
            total_requests: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        };

        let info = session.call("server_info", json!({})).await?;
        let build = info
            .pointer("/info/build_version")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        debug!(endpoint = %endpoint, build_version = %build, "Connected to ledger node");

        Ok(session)
    }

    /// Number of requests issued over this session's lifetime
    pub fn request_count(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        let body = json!({ "method": method, "params": [params] });
        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let envelope: Value = response.json().await?;

        let result = envelope
            .get("result")
            .ok_or_else(|| LedgerError::protocol(format!("{}: missing result object", method)))?;

        if result.get("status").and_then(Value::as_str) == Some("error") {
            let code = result
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let message = result
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(LedgerError::Api { code, message });
        }

        Ok(result.clone())
    }
}

#[async_trait]
impl LedgerSession for HttpLedgerSession {
    async fn account_info(&self, address: &Address) -> Result<AccountInfo, LedgerError> {
        let result = self
            .call(
                "account_info",
                json!({
                    "account": address.as_str(),
                    "ledger_index": "validated",
                    "strict": true,
                }),
            )
            .await
            .map_err(|err| match err {
                LedgerError::Api { ref code, .. } if code == ERR_ACCOUNT_NOT_FOUND => {
                    LedgerError::AccountNotFound(address.to_string())
                }
                other => other,
            })?;

        let balance = result
            .pointer("/account_data/Balance")
            .and_then(Value::as_str)
            .ok_or_else(|| LedgerError::protocol("account_info: missing Balance"))?;
        let balance = Amount::from_drops_str(balance)
            .map_err(|e| LedgerError::protocol(format!("account_info: {}", e)))?;

        let sequence = result
            .pointer("/account_data/Sequence")
            .and_then(Value::as_u64)
            .ok_or_else(|| LedgerError::protocol("account_info: missing Sequence"))?;

        Ok(AccountInfo {
            balance,
            sequence: sequence as u32,
        })
    }

    async fn current_ledger_index(&self) -> Result<u32, LedgerError> {
        let result = self.call("ledger_current", json!({})).await?;
        result
            .get("ledger_current_index")
            .and_then(Value::as_u64)
            .map(|index| index as u32)
            .ok_or_else(|| LedgerError::protocol("ledger_current: missing ledger_current_index"))
    }

    async fn open_ledger_fee(&self) -> Result<Amount, LedgerError> {
        let result = self.call("fee", json!({})).await?;
        let fee = result
            .pointer("/drops/open_ledger_fee")
            .and_then(Value::as_str)
            .ok_or_else(|| LedgerError::protocol("fee: missing drops.open_ledger_fee"))?;
        Amount::from_drops_str(fee).map_err(|e| LedgerError::protocol(format!("fee: {}", e)))
    }

    async fn submit(&self, signed: &SignedPayment) -> Result<SubmitAck, LedgerError> {
        let result = self
            .call("submit", json!({ "tx_blob": signed.blob }))
            .await?;

        let engine_result = result
            .get("engine_result")
            .and_then(Value::as_str)
            .ok_or_else(|| LedgerError::protocol("submit: missing engine_result"))?;
        let message = result
            .get("engine_result_message")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(SubmitAck {
            engine_result: ResultCode::new(engine_result),
            message,
        })
    }

    async fn transaction_status(&self, hash: &TxHash) -> Result<TransactionStatus, LedgerError> {
        let result = match self
            .call("tx", json!({ "transaction": hash.as_str(), "binary": false }))
            .await
        {
            Ok(result) => result,
            Err(LedgerError::Api { ref code, .. }) if code == ERR_TXN_NOT_FOUND => {
                return Ok(TransactionStatus::NotFound);
            }
            Err(other) => return Err(other),
        };

        let validated = result
            .get("validated")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !validated {
            return Ok(TransactionStatus::Pending);
        }

        let code = result
            .pointer("/meta/TransactionResult")
            .and_then(Value::as_str)
            .ok_or_else(|| LedgerError::protocol("tx: validated without meta.TransactionResult"))?;
        let ledger_index = result
            .get("ledger_index")
            .and_then(Value::as_u64)
            .ok_or_else(|| LedgerError::protocol("tx: validated without ledger_index"))?;

        Ok(TransactionStatus::Validated {
            result: ResultCode::new(code),
            ledger_index: ledger_index as u32,
        })
    }

    async fn close(&self) -> Result<(), LedgerError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            warn!(endpoint = %self.endpoint, "Ledger session closed twice");
            return Ok(());
        }
        // HTTP keep-alive pool is torn down on drop; the flag makes the
        // release observable and double-close idempotent.
        debug!(
            endpoint = %self.endpoint,
            requests = self.request_count(),
            "Ledger session closed"
        );
        Ok(())
    }
}

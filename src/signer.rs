//! Payment signing
//!
//! Produces the network-ready blob and its content hash from an unsigned
//! payment and a wallet. Signing is deterministic: the payload is a
//! canonical JSON document with a fixed field order, signed with ed25519,
//! and hashed with SHA-512-half under a transaction namespace prefix.

use crate::types::{SignedPayment, TxHash, UnsignedPayment};
use crate::wallet::{Wallet, WalletError};
use serde::Serialize;
use sha2::{Digest, Sha512};

/// Namespace prefix for transaction content hashes
const TX_HASH_PREFIX: &[u8] = b"TXN\0";

/// Canonical signing payload; field order is fixed by this declaration
#[derive(Serialize)]
struct SigningPayload<'a> {
    #[serde(rename = "TransactionType")]
    transaction_type: &'static str,
    #[serde(rename = "Account")]
    account: &'a str,
    #[serde(rename = "Destination")]
    destination: &'a str,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Fee")]
    fee: String,
    #[serde(rename = "Sequence")]
    sequence: u32,
    #[serde(rename = "LastLedgerSequence")]
    last_ledger_sequence: u32,
    #[serde(rename = "SigningPubKey")]
    signing_pub_key: &'a str,
    #[serde(rename = "TxnSignature", skip_serializing_if = "Option::is_none")]
    txn_signature: Option<String>,
}

/// Signs unsigned payments on behalf of one wallet
pub struct Signer<'a> {
    wallet: &'a Wallet,
}

impl<'a> Signer<'a> {
    pub fn new(wallet: &'a Wallet) -> Self {
        Self { wallet }
    }

    /// Produce the signed blob and content hash
    ///
    /// Fails with [`WalletError::AccountMismatch`] when the transaction's
    /// source account is not the wallet's derived address. No network
    /// interaction.
    pub fn sign(&self, tx: &UnsignedPayment) -> Result<SignedPayment, WalletError> {
        if &tx.source != self.wallet.address() {
            return Err(WalletError::AccountMismatch {
                wallet: self.wallet.address().to_string(),
                requested: tx.source.to_string(),
            });
        }

        let public_key = self.wallet.public_key_hex();
        let mut payload = SigningPayload {
            transaction_type: "Payment",
            account: tx.source.as_str(),
            destination: tx.destination.as_str(),
            amount: tx.amount.drops().to_string(),
            fee: tx.fee.drops().to_string(),
            sequence: tx.sequence,
            last_ledger_sequence: tx.last_ledger_sequence,
            signing_pub_key: &public_key,
            txn_signature: None,
        };

        let signing_bytes =
            serde_json::to_vec(&payload).expect("signing payload serialization is infallible");
        let signature = self.wallet.sign_bytes(&signing_bytes);
        payload.txn_signature = Some(hex::encode_upper(signature.to_bytes()));

        let signed_bytes =
            serde_json::to_vec(&payload).expect("signing payload serialization is infallible");

        Ok(SignedPayment {
            hash: content_hash(&signed_bytes),
            blob: hex::encode_upper(&signed_bytes),
        })
    }
}

/// SHA-512-half over the namespaced signed bytes
fn content_hash(signed_bytes: &[u8]) -> TxHash {
    let mut hasher = Sha512::new();
    hasher.update(TX_HASH_PREFIX);
    hasher.update(signed_bytes);
    let digest = hasher.finalize();

    let mut half = [0u8; 32];
    half.copy_from_slice(&digest[..32]);
    TxHash::from_bytes(half)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;

    fn sample_payment(wallet: &Wallet) -> UnsignedPayment {
        UnsignedPayment {
            source: wallet.address().clone(),
            destination: Wallet::from_entropy([2u8; 16]).address().clone(),
            amount: Amount::from_drops(5_000_000),
            sequence: 42,
            fee: Amount::from_drops(12),
            last_ledger_sequence: 1100,
        }
    }

    #[test]
    fn test_signing_is_deterministic() {
        let wallet = Wallet::from_entropy([1u8; 16]);
        let tx = sample_payment(&wallet);

        let first = Signer::new(&wallet).sign(&tx).unwrap();
        let second = Signer::new(&wallet).sign(&tx).unwrap();
        assert_eq!(first.hash, second.hash);
        assert_eq!(first.blob, second.blob);
    }

    #[test]
    fn test_hash_depends_on_content() {
        let wallet = Wallet::from_entropy([1u8; 16]);
        let tx = sample_payment(&wallet);
        let mut other = tx.clone();
        other.sequence += 1;

        let signer = Signer::new(&wallet);
        assert_ne!(
            signer.sign(&tx).unwrap().hash,
            signer.sign(&other).unwrap().hash
        );
    }

    #[test]
    fn test_blob_embeds_signature_and_key() {
        let wallet = Wallet::from_entropy([1u8; 16]);
        let signed = Signer::new(&wallet).sign(&sample_payment(&wallet)).unwrap();

        let bytes = hex::decode(&signed.blob).unwrap();
        let decoded: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded["TransactionType"], "Payment");
        assert_eq!(decoded["SigningPubKey"], wallet.public_key_hex().as_str());
        assert_eq!(
            decoded["TxnSignature"].as_str().map(str::len),
            Some(128),
        );
        assert_eq!(decoded["Amount"], "5000000");
    }

    #[test]
    fn test_mismatched_source_rejected() {
        let wallet = Wallet::from_entropy([1u8; 16]);
        let other = Wallet::from_entropy([2u8; 16]);
        let mut tx = sample_payment(&wallet);
        tx.source = other.address().clone();

        assert!(matches!(
            Signer::new(&wallet).sign(&tx),
            Err(WalletError::AccountMismatch { .. })
        ));
    }
}

//! Wallet management module
//!
//! Derives the signing key and classic address from a family seed. The
//! seed string is consumed once at construction and never stored, logged,
//! or serialized.

use crate::types::{base58check_decode, base58check_encode, Address};
use ed25519_dalek::{Signature, Signer as _, SigningKey, VerifyingKey};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

/// Family seed payload type prefix ('s' under the Ripple alphabet)
const SEED_TYPE_PREFIX: u8 = 0x21;

/// Family seed entropy length
const SEED_ENTROPY_LEN: usize = 16;

/// Key type marker prepended to the public key in account-ID hashing
const ED25519_KEY_PREFIX: u8 = 0xED;

/// Errors from credential handling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The seed is not a well-formed family seed
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// The wallet cannot sign for the requested account
    #[error("credential mismatch: wallet address {wallet} cannot sign for account {requested}")]
    AccountMismatch { wallet: String, requested: String },
}

/// Signing credential derived from a family seed
///
/// Holds the ed25519 keypair and the classic address it controls.
pub struct Wallet {
    signing_key: SigningKey,
    address: Address,
}

impl Wallet {
    /// Decode a family seed string and derive the keypair and address
    ///
    /// A valid seed is base58check under the Ripple alphabet with a 0x21
    /// type prefix and 16 bytes of entropy. Anything else is
    /// [`WalletError::InvalidSeed`].
    pub fn from_seed(seed: &str) -> Result<Self, WalletError> {
        let payload = base58check_decode(seed.trim())
            .ok_or_else(|| WalletError::InvalidSeed("checksum or encoding failure".to_string()))?;

        if payload.len() != 1 + SEED_ENTROPY_LEN {
            return Err(WalletError::InvalidSeed(format!(
                "expected {} payload bytes, got {}",
                1 + SEED_ENTROPY_LEN,
                payload.len()
            )));
        }
        if payload[0] != SEED_TYPE_PREFIX {
            return Err(WalletError::InvalidSeed(format!(
                "unexpected type prefix 0x{:02x}",
                payload[0]
            )));
        }

        let mut entropy = [0u8; SEED_ENTROPY_LEN];
        entropy.copy_from_slice(&payload[1..]);
        if entropy.iter().all(|&b| b == 0) {
            return Err(WalletError::InvalidSeed("all-zero entropy rejected".to_string()));
        }

        Ok(Self::from_entropy(entropy))
    }

    /// Derive a wallet directly from raw seed entropy
    ///
    /// Used by tests and provisioning tooling; `from_seed` is the normal
    /// path for operator-supplied credentials.
    pub fn from_entropy(entropy: [u8; SEED_ENTROPY_LEN]) -> Self {
        let digest = Sha512::digest(entropy);
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&digest[..32]);

        let signing_key = SigningKey::from_bytes(&secret);
        let address = derive_address(&signing_key.verifying_key());

        Self {
            signing_key,
            address,
        }
    }

    /// The classic address this wallet signs for
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Public key with the ed25519 marker, uppercase hex
    pub fn public_key_hex(&self) -> String {
        let mut bytes = Vec::with_capacity(33);
        bytes.push(ED25519_KEY_PREFIX);
        bytes.extend_from_slice(self.signing_key.verifying_key().as_bytes());
        hex::encode_upper(bytes)
    }

    /// Sign arbitrary bytes; deterministic under ed25519
    pub(crate) fn sign_bytes(&self, message: &[u8]) -> Signature {
        self.signing_key.sign(message)
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of Debug output
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// account ID = RIPEMD-160(SHA-256(marker || public key))
fn derive_address(verifying_key: &VerifyingKey) -> Address {
    let mut keyed = Vec::with_capacity(33);
    keyed.push(ED25519_KEY_PREFIX);
    keyed.extend_from_slice(verifying_key.as_bytes());

    let sha = Sha256::digest(&keyed);
    let account_id: [u8; 20] = Ripemd160::digest(sha).into();
    Address::from_account_id(&account_id)
}

/// Encode raw entropy as a family seed string
///
/// Inverse of the decoding in [`Wallet::from_seed`]; used to provision
/// test credentials.
pub fn encode_seed(entropy: [u8; SEED_ENTROPY_LEN]) -> String {
    let mut payload = Vec::with_capacity(1 + SEED_ENTROPY_LEN);
    payload.push(SEED_TYPE_PREFIX);
    payload.extend_from_slice(&entropy);
    base58check_encode(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_round_trip() {
        let entropy = [0x5Au8; 16];
        let seed = encode_seed(entropy);
        assert!(seed.starts_with('s'));

        let from_seed = Wallet::from_seed(&seed).unwrap();
        let from_entropy = Wallet::from_entropy(entropy);
        assert_eq!(from_seed.address(), from_entropy.address());
        assert_eq!(from_seed.public_key_hex(), from_entropy.public_key_hex());
    }

    #[test]
    fn test_invalid_seeds_rejected() {
        for bad in [
            "",
            "not a seed",
            "sssssssssssssssssssssssssssss",
            "0OIl",
        ] {
            assert!(
                matches!(Wallet::from_seed(bad), Err(WalletError::InvalidSeed(_))),
                "expected InvalidSeed for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_wrong_prefix_rejected() {
        // Structurally valid base58check, but an address-type prefix
        let mut payload = vec![0x00u8];
        payload.extend_from_slice(&[1u8; 16]);
        let not_a_seed = crate::types::base58check_encode(&payload);
        assert!(matches!(
            Wallet::from_seed(&not_a_seed),
            Err(WalletError::InvalidSeed(_))
        ));
    }

    #[test]
    fn test_all_zero_entropy_rejected() {
        let seed = encode_seed([0u8; 16]);
        assert!(matches!(
            Wallet::from_seed(&seed),
            Err(WalletError::InvalidSeed(_))
        ));
    }

    #[test]
    fn test_derived_address_parses() {
        let wallet = Wallet::from_entropy([9u8; 16]);
        let address: Address = wallet.address().as_str().parse().unwrap();
        assert_eq!(&address, wallet.address());
        assert!(wallet.address().as_str().starts_with('r'));
    }

    #[test]
    fn test_distinct_entropy_distinct_addresses() {
        let a = Wallet::from_entropy([1u8; 16]);
        let b = Wallet::from_entropy([2u8; 16]);
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_public_key_format() {
        let wallet = Wallet::from_entropy([3u8; 16]);
        let hex = wallet.public_key_hex();
        assert_eq!(hex.len(), 66);
        assert!(hex.starts_with("ED"));
    }

    #[test]
    fn test_debug_hides_key_material() {
        let wallet = Wallet::from_entropy([4u8; 16]);
        let rendered = format!("{:?}", wallet);
        assert!(rendered.contains("address"));
        assert!(!rendered.contains("signing_key"));
    }
}

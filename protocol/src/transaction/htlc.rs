//! # Hash Time-Locked Contracts
//!
//! A lock escrows funds behind a secret hash and an expiration. The
//! recipient claims by revealing the secret; the sender refunds after the
//! lock expires. Both reference the lock by its transaction id.
//!
//! The lock secret is derived from a seed string:
//!
//! ```text
//! unlock_secret = hex(SHA-256(seed))[0..32]      (32 ASCII characters)
//! secret_hash   = SHA-256(unlock_secret)
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::{sha256_array, sha256_hex};

/// Length of an unlock secret in characters (and bytes).
pub const UNLOCK_SECRET_LENGTH: usize = 32;

/// Reasons a claim does not match its lock.
///
/// The two mismatch variants are kept apart so an operator can tell a stale
/// lock id from a wrong secret.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HtlcError {
    #[error("claim references lock {claimed} but the lock is {actual}")]
    LockReferenceMismatch { claimed: String, actual: String },

    #[error("unlock secret does not hash to the lock's secret hash")]
    SecretMismatch,

    #[error("no unlock secret configured for the claim")]
    MissingUnlockSecret,

    #[error("unlock secret must be 32 characters, got {0}")]
    InvalidUnlockSecret(usize),
}

/// How a lock expiration is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationKind {
    /// Seconds since the network epoch.
    EpochTimestamp,
    /// Absolute block height.
    BlockHeight,
}

impl ExpirationKind {
    /// Wire value: 1 for timestamps, 2 for heights.
    pub fn wire_value(&self) -> u8 {
        match self {
            Self::EpochTimestamp => 1,
            Self::BlockHeight => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockExpiration {
    #[serde(rename = "type")]
    pub kind: ExpirationKind,
    pub value: u64,
}

impl LockExpiration {
    /// Turns a relative timestamp into an absolute one.
    ///
    /// A timestamp expiration whose value is smaller than the current network
    /// time is treated as relative and gets the network time added. Height
    /// expirations and timestamps already in the future are left alone.
    ///
    /// ```
    /// use quill_protocol::transaction::htlc::{ExpirationKind, LockExpiration};
    ///
    /// let relative = LockExpiration { kind: ExpirationKind::EpochTimestamp, value: 416 };
    /// assert_eq!(relative.normalized(1_000_000).value, 1_000_416);
    /// ```
    pub fn normalized(self, network_time: u64) -> Self {
        match self.kind {
            ExpirationKind::EpochTimestamp if self.value < network_time => Self {
                value: self.value.saturating_add(network_time),
                ..self
            },
            _ => self,
        }
    }
}

/// The 32-character unlock secret derived from `seed`.
pub fn unlock_secret_for(seed: &str) -> String {
    let mut digest = sha256_hex(seed.as_bytes());
    digest.truncate(UNLOCK_SECRET_LENGTH);
    digest
}

/// SHA-256 of an unlock secret, hex encoded.
pub fn secret_hash(unlock_secret: &str) -> String {
    sha256_hex(unlock_secret.as_bytes())
}

/// Secret hash of the lock derived from `seed`.
pub fn secret_hash_for(seed: &str) -> String {
    secret_hash(&unlock_secret_for(seed))
}

/// Raw secret hash of the lock derived from `seed`, as embedded in the asset.
pub fn secret_hash_bytes_for(seed: &str) -> [u8; 32] {
    sha256_array(unlock_secret_for(seed).as_bytes())
}

pub fn validate_unlock_secret(unlock_secret: &str) -> Result<(), HtlcError> {
    if unlock_secret.len() != UNLOCK_SECRET_LENGTH {
        return Err(HtlcError::InvalidUnlockSecret(unlock_secret.len()));
    }
    Ok(())
}

/// Checks a claim against the lock it is meant to open.
///
/// The lock reference is checked first: a claim pointing at the wrong lock
/// is a reference problem even if the secret happens to be wrong too.
pub fn check_claim(
    claimed_lock_id: &str,
    unlock_secret: Option<&str>,
    lock_id: &str,
    lock_secret_hash: &str,
) -> Result<(), HtlcError> {
    if !claimed_lock_id.eq_ignore_ascii_case(lock_id) {
        return Err(HtlcError::LockReferenceMismatch {
            claimed: claimed_lock_id.to_string(),
            actual: lock_id.to_string(),
        });
    }
    let secret = unlock_secret.ok_or(HtlcError::MissingUnlockSecret)?;
    let expected = hex::decode(lock_secret_hash).map_err(|_| HtlcError::SecretMismatch)?;
    if sha256_array(secret.as_bytes()).as_slice() != expected.as_slice() {
        return Err(HtlcError::SecretMismatch);
    }
    Ok(())
}

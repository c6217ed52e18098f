//! The boundary between the composer and the ledger.
//!
//! [`LedgerClient`] covers the read side: the few facts a batch needs before
//! it can be built. [`DispatchClient`] covers the write side: submitting a
//! finished batch. Both are async traits so the HTTP implementation and the
//! in-memory test double are interchangeable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::crypto::PublicKey;
use crate::transaction::SignedTransaction;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("ledger returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// What the ledger knows about an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountState {
    pub nonce: u64,
    /// Public key of the delegate the account currently votes for.
    pub vote: Option<String>,
    pub second_public_key: Option<PublicKey>,
    pub public_key: Option<PublicKey>,
}

/// The ledger's answer to a batch submission.
///
/// `errors` is passed through untouched so the operator sees exactly what
/// the node said.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    pub accepted: Vec<String>,
    pub errors: Option<Value>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_none()
    }
}

/// Read access to ledger state.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Account state by address or public key. `None` for unknown (cold)
    /// accounts.
    async fn get_account(&self, identity: &str) -> Result<Option<AccountState>, ClientError>;

    /// Current network time, in seconds since the network epoch.
    async fn get_network_time(&self) -> Result<u64, ClientError>;

    /// Id of the most recent lock transaction sent by `sender_public_key`.
    async fn find_last_lock_transaction(
        &self,
        sender_public_key: &PublicKey,
    ) -> Result<Option<String>, ClientError>;

    /// Current chain height.
    async fn get_height(&self) -> Result<u64, ClientError>;
}

/// Write access: submit a batch of signed transactions.
#[async_trait]
pub trait DispatchClient: Send + Sync {
    async fn submit(&self, batch: &[SignedTransaction]) -> Result<DispatchReport, ClientError>;
}

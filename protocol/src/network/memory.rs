//! An in-memory ledger for tests and cold runs.
//!
//! Implements both boundary traits against plain maps. Submitted batches
//! are recorded so tests can inspect what would have been sent. Any read
//! can be made to fail to exercise the degraded paths.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::crypto::PublicKey;
use crate::transaction::SignedTransaction;

use super::client::{AccountState, ClientError, DispatchClient, DispatchReport, LedgerClient};

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<String, AccountState>,
    locks: HashMap<String, String>,
    network_time: u64,
    height: u64,
    offline: bool,
    submitted: Vec<Vec<SignedTransaction>>,
}

/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedger {
    pub fn new(height: u64) -> Self {
        let ledger = Self::default();
        ledger.state.write().height = height;
        ledger
    }

    /// Registers an account under any identity string (address or key).
    pub fn with_account(self, identity: impl Into<String>, account: AccountState) -> Self {
        self.state.write().accounts.insert(identity.into(), account);
        self
    }

    pub fn with_network_time(self, time: u64) -> Self {
        self.state.write().network_time = time;
        self
    }

    /// Records `lock_id` as the latest lock sent by `sender`.
    pub fn with_lock(self, sender: &PublicKey, lock_id: impl Into<String>) -> Self {
        self.state.write().locks.insert(sender.to_hex(), lock_id.into());
        self
    }

    /// Makes every read fail with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.state.write().offline = offline;
    }

    pub fn set_height(&self, height: u64) {
        self.state.write().height = height;
    }

    /// Every batch submitted so far, oldest first.
    pub fn submitted(&self) -> Vec<Vec<SignedTransaction>> {
        self.state.read().submitted.clone()
    }

    fn check_online(&self) -> Result<(), ClientError> {
        if self.state.read().offline {
            return Err(ClientError::Transport("ledger is offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn get_account(&self, identity: &str) -> Result<Option<AccountState>, ClientError> {
        self.check_online()?;
        Ok(self.state.read().accounts.get(identity).cloned())
    }

    async fn get_network_time(&self) -> Result<u64, ClientError> {
        self.check_online()?;
        Ok(self.state.read().network_time)
    }

    async fn find_last_lock_transaction(
        &self,
        sender_public_key: &PublicKey,
    ) -> Result<Option<String>, ClientError> {
        self.check_online()?;
        Ok(self.state.read().locks.get(&sender_public_key.to_hex()).cloned())
    }

    async fn get_height(&self) -> Result<u64, ClientError> {
        self.check_online()?;
        Ok(self.state.read().height)
    }
}

#[async_trait]
impl DispatchClient for InMemoryLedger {
    async fn submit(&self, batch: &[SignedTransaction]) -> Result<DispatchReport, ClientError> {
        self.check_online()?;
        let accepted = batch.iter().map(|tx| tx.id().to_hex()).collect();
        self.state.write().submitted.push(batch.to_vec());
        Ok(DispatchReport {
            accepted,
            errors: None,
        })
    }
}

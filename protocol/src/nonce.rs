//! # Nonce Allocation
//!
//! Every transaction carries a per-sender sequence number. The ledger accepts
//! a transaction only if its nonce is exactly one more than the sender's
//! current nonce, so a batch of N transactions from one sender must carry N
//! consecutive values.
//!
//! The allocator remembers the last nonce it handed out per sender for the
//! life of the process. The starting point for a sender is picked once, on
//! first use:
//!
//! 1. an explicit operator override, else
//! 2. the nonce the ledger reported for the account, else
//! 3. zero.
//!
//! It is never re-synchronized with the ledger afterwards. If another client
//! spends from the same account, restart the composer to pick up the new
//! nonce.

use std::collections::HashMap;
use tracing::debug;

/// Where a sender's sequence may start, in priority order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonceSeed {
    /// Operator-supplied starting nonce.
    pub override_start: Option<u64>,
    /// The nonce the ledger reported for the account.
    pub observed: Option<u64>,
}

impl NonceSeed {
    pub fn new(override_start: Option<u64>, observed: Option<u64>) -> Self {
        Self {
            override_start,
            observed,
        }
    }

    /// The value the sequence starts from.
    pub fn start(&self) -> u64 {
        self.override_start.or(self.observed).unwrap_or(0)
    }
}

/// Per-sender nonce cache.
#[derive(Debug, Default)]
pub struct NonceAllocator {
    last: HashMap<String, u64>,
}

impl NonceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next nonce for `sender_public_key`.
    ///
    /// The seed is only consulted on the first call for a sender; later
    /// calls ignore it and continue the cached sequence.
    ///
    /// ```
    /// use quill_protocol::nonce::{NonceAllocator, NonceSeed};
    ///
    /// let mut nonces = NonceAllocator::new();
    /// let seed = NonceSeed::new(Some(5), Some(100));
    /// assert_eq!(nonces.next_nonce("02ab", seed), 6);
    /// assert_eq!(nonces.next_nonce("02ab", seed), 7);
    /// ```
    pub fn next_nonce(&mut self, sender_public_key: &str, seed: NonceSeed) -> u64 {
        let next = match self.last.get(sender_public_key) {
            Some(last) => last.saturating_add(1),
            None => seed.start().saturating_add(1),
        };
        self.last.insert(sender_public_key.to_string(), next);
        debug!(sender = %sender_public_key, nonce = next, "allocated nonce");
        next
    }

    /// The last nonce handed out for a sender, if any.
    pub fn last(&self, sender_public_key: &str) -> Option<u64> {
        self.last.get(sender_public_key).copied()
    }

    /// Whether a sequence is cached for the sender.
    pub fn is_tracked(&self, sender_public_key: &str) -> bool {
        self.last.contains_key(sender_public_key)
    }

    /// Forgets every cached sequence.
    pub fn reset(&mut self) {
        self.last.clear();
    }
}

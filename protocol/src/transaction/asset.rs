//! Typed transaction payloads.
//!
//! [`Asset`] is a tagged union with one variant per [`TransactionKind`].
//! A draft holds exactly one asset, and the asset decides the draft's kind,
//! so a transfer can never carry vote data and vice versa.

use serde_json::{json, Value};
use thiserror::Error;

use crate::config::{
    DELEGATE_REGISTRATION_FEE, DELEGATE_RESIGNATION_FEE, ENTITY_REGISTER_FEE, ENTITY_RESIGN_FEE,
    ENTITY_UPDATE_FEE, HTLC_CLAIM_FEE, HTLC_LOCK_FEE, HTLC_REFUND_FEE, IPFS_FEE,
    MAX_MULTI_PAYMENTS, MAX_USERNAME_LENGTH, MIN_MULTI_PAYMENTS, MULTI_PAYMENT_FEE,
    MULTI_SIGNATURE_FEE, SECOND_SIGNATURE_FEE, TRANSFER_FEE, VOTE_FEE,
};
use crate::crypto::PublicKey;
use crate::identity::{Address, MultiSignatureAsset, MultiSignatureError};

use super::entity::{EntityAction, EntityAsset};
use super::htlc::{self, HtlcError, LockExpiration};
use super::types::{Payment, TransactionKind, Vote};

/// Structural problems with an asset, independent of ledger state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("invalid delegate username '{0}': 1-20 characters of a-z 0-9 ! @ $ & _ .")]
    InvalidUsername(String),

    #[error("a vote asset needs at least one vote")]
    EmptyVotes,

    #[error("multi-payment needs between 2 and 128 payments, got {0}")]
    PaymentCount(usize),

    #[error("multi-payment amounts overflow a u64")]
    AmountOverflow,

    #[error("ipfs hash must not be empty")]
    EmptyIpfsHash,

    #[error(transparent)]
    MultiSignature(#[from] MultiSignatureError),

    #[error(transparent)]
    Htlc(#[from] HtlcError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    Transfer {
        recipient: Address,
        amount: u64,
        /// Block height after which the transfer is void. Zero never expires.
        expiration: u32,
    },
    SecondSignature {
        public_key: PublicKey,
    },
    DelegateRegistration {
        username: String,
    },
    Vote {
        votes: Vec<Vote>,
    },
    MultiSignature(MultiSignatureAsset),
    Ipfs {
        hash: String,
    },
    MultiPayment {
        payments: Vec<Payment>,
    },
    DelegateResignation,
    HtlcLock {
        recipient: Address,
        amount: u64,
        secret_hash: [u8; 32],
        expiration: LockExpiration,
    },
    HtlcClaim {
        lock_transaction_id: String,
        unlock_secret: String,
    },
    HtlcRefund {
        lock_transaction_id: String,
    },
    Entity(EntityAsset),
}

impl Asset {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Transfer { .. } => TransactionKind::Transfer,
            Self::SecondSignature { .. } => TransactionKind::SecondSignature,
            Self::DelegateRegistration { .. } => TransactionKind::DelegateRegistration,
            Self::Vote { .. } => TransactionKind::Vote,
            Self::MultiSignature(_) => TransactionKind::MultiSignature,
            Self::Ipfs { .. } => TransactionKind::Ipfs,
            Self::MultiPayment { .. } => TransactionKind::MultiPayment,
            Self::DelegateResignation => TransactionKind::DelegateResignation,
            Self::HtlcLock { .. } => TransactionKind::HtlcLock,
            Self::HtlcClaim { .. } => TransactionKind::HtlcClaim,
            Self::HtlcRefund { .. } => TransactionKind::HtlcRefund,
            Self::Entity(_) => TransactionKind::Entity,
        }
    }

    /// The static fee the ledger expects for this payload.
    pub fn static_fee(&self) -> u64 {
        match self {
            Self::Transfer { .. } => TRANSFER_FEE,
            Self::SecondSignature { .. } => SECOND_SIGNATURE_FEE,
            Self::DelegateRegistration { .. } => DELEGATE_REGISTRATION_FEE,
            Self::Vote { .. } => VOTE_FEE,
            Self::MultiSignature(asset) => {
                MULTI_SIGNATURE_FEE.saturating_mul(asset.participants() as u64 + 1)
            }
            Self::Ipfs { .. } => IPFS_FEE,
            Self::MultiPayment { .. } => MULTI_PAYMENT_FEE,
            Self::DelegateResignation => DELEGATE_RESIGNATION_FEE,
            Self::HtlcLock { .. } => HTLC_LOCK_FEE,
            Self::HtlcClaim { .. } => HTLC_CLAIM_FEE,
            Self::HtlcRefund { .. } => HTLC_REFUND_FEE,
            Self::Entity(entity) => match entity.action {
                EntityAction::Register => ENTITY_REGISTER_FEE,
                EntityAction::Update => ENTITY_UPDATE_FEE,
                EntityAction::Resign => ENTITY_RESIGN_FEE,
            },
        }
    }

    /// Amount moved from the sender, excluding the fee.
    pub fn amount(&self) -> Result<u64, AssetError> {
        match self {
            Self::Transfer { amount, .. } | Self::HtlcLock { amount, .. } => Ok(*amount),
            Self::MultiPayment { payments } => payments
                .iter()
                .try_fold(0u64, |total, p| total.checked_add(p.amount))
                .ok_or(AssetError::AmountOverflow),
            _ => Ok(0),
        }
    }

    pub fn recipient(&self) -> Option<&Address> {
        match self {
            Self::Transfer { recipient, .. } | Self::HtlcLock { recipient, .. } => Some(recipient),
            _ => None,
        }
    }

    /// Structural checks that do not need ledger state.
    pub fn validate(&self) -> Result<(), AssetError> {
        match self {
            Self::DelegateRegistration { username } => validate_username(username),
            Self::Vote { votes } if votes.is_empty() => Err(AssetError::EmptyVotes),
            Self::MultiSignature(asset) => Ok(asset.validate()?),
            Self::Ipfs { hash } if hash.is_empty() => Err(AssetError::EmptyIpfsHash),
            Self::MultiPayment { payments }
                if !(MIN_MULTI_PAYMENTS..=MAX_MULTI_PAYMENTS).contains(&payments.len()) =>
            {
                Err(AssetError::PaymentCount(payments.len()))
            }
            Self::MultiPayment { .. } => self.amount().map(|_| ()),
            Self::HtlcClaim { unlock_secret, .. } => Ok(htlc::validate_unlock_secret(unlock_secret)?),
            _ => Ok(()),
        }
    }

    /// The `asset` object of the ledger JSON, if the kind carries one.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::Transfer { .. } | Self::DelegateResignation => None,
            Self::SecondSignature { public_key } => {
                Some(json!({ "signature": { "publicKey": public_key.to_hex() } }))
            }
            Self::DelegateRegistration { username } => {
                Some(json!({ "delegate": { "username": username } }))
            }
            Self::Vote { votes } => {
                let votes: Vec<String> = votes.iter().map(Vote::to_string).collect();
                Some(json!({ "votes": votes }))
            }
            Self::MultiSignature(asset) => Some(json!({ "multiSignature": asset })),
            Self::Ipfs { hash } => Some(json!({ "ipfs": hash })),
            Self::MultiPayment { payments } => Some(json!({ "payments": payments })),
            Self::HtlcLock {
                secret_hash,
                expiration,
                ..
            } => Some(json!({
                "lock": {
                    "secretHash": hex::encode(secret_hash),
                    "expiration": {
                        "type": expiration.kind.wire_value(),
                        "value": expiration.value,
                    },
                }
            })),
            Self::HtlcClaim {
                lock_transaction_id,
                unlock_secret,
            } => Some(json!({
                "claim": {
                    "lockTransactionId": lock_transaction_id,
                    "unlockSecret": unlock_secret,
                }
            })),
            Self::HtlcRefund {
                lock_transaction_id,
            } => Some(json!({ "refund": { "lockTransactionId": lock_transaction_id } })),
            Self::Entity(entity) => Some(json!({
                "type": entity.entity_type.wire_value(),
                "subType": entity.sub_type.wire_value(),
                "action": entity.action.wire_value(),
                "registrationId": entity.registration_id,
                "data": entity.data,
            })),
        }
    }
}

/// Delegate usernames: 1 to 20 characters of `[a-z0-9!@$&_.]`.
pub fn validate_username(username: &str) -> Result<(), AssetError> {
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || "!@$&_.".contains(c);
    if username.is_empty() || username.len() > MAX_USERNAME_LENGTH || !username.chars().all(allowed)
    {
        return Err(AssetError::InvalidUsername(username.to_string()));
    }
    Ok(())
}

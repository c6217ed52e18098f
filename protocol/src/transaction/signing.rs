//! The signing orchestrator.
//!
//! Three signature slots, three coverage rules:
//!
//! | Slot               | Covers                                      |
//! |--------------------|---------------------------------------------|
//! | co-signature       | payload without any signature               |
//! | primary signature  | payload plus co-signatures                  |
//! | second signature   | payload plus co-signatures plus primary     |
//!
//! Co-signatures therefore go first, the primary next and the second last.
//! The individual operations enforce that order; [`apply_signatures`] runs a
//! whole [`SigningPlan`] in it.
//!
//! Each signature uses the scheme of the key pair that produces it, so the
//! sender and its co-signers are free to use different schemes.

use thiserror::Error;
use tracing::debug;

use crate::crypto::{KeyError, KeyPair};

use super::codec::{self, SerializeOptions};
use super::draft::{DraftError, DraftState, IndexedSignature, TransactionDraft};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SigningError {
    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("signature order violated: {0}")]
    OutOfOrder(&'static str),

    #[error("participant {0} has already co-signed")]
    DuplicateIndex(u8),

    #[error("signed transaction failed verification: {0}")]
    VerificationFailed(String),
}

/// Who signs a draft, and in which role.
#[derive(Debug)]
pub enum SigningPlan {
    /// An ordinary sender: primary signature plus an optional second one.
    Single {
        sender: KeyPair,
        second: Option<KeyPair>,
    },
    /// A threshold sender: only the listed participants co-sign.
    Threshold { signers: Vec<(u8, KeyPair)> },
    /// A threshold registration: every participant co-signs with its list
    /// index, then the registering sender signs.
    Registration {
        participants: Vec<KeyPair>,
        sender: KeyPair,
        second: Option<KeyPair>,
    },
}

fn ensure_asset(draft: &TransactionDraft) -> Result<(), SigningError> {
    if draft.state() == DraftState::Empty {
        return Err(DraftError::MissingAsset.into());
    }
    Ok(())
}

/// Applies the primary signature.
///
/// Overwrites a previous primary signature, but refuses once a second
/// signature exists since it would no longer cover the new primary.
pub fn sign(draft: &mut TransactionDraft, keys: &KeyPair) -> Result<(), SigningError> {
    ensure_asset(draft)?;
    if draft.second_signature.is_some() {
        return Err(SigningError::OutOfOrder("primary signature after second signature"));
    }
    let digest = codec::hash(draft, SerializeOptions::for_signature())?;
    draft.signature = Some(keys.sign_digest(&digest)?);
    debug!(kind = %draft.kind(), nonce = draft.nonce(), scheme = %keys.scheme(), "primary signature applied");
    Ok(())
}

/// Applies the second-factor signature. Requires a primary signature.
pub fn second_sign(draft: &mut TransactionDraft, keys: &KeyPair) -> Result<(), SigningError> {
    ensure_asset(draft)?;
    if draft.signature.is_none() {
        return Err(SigningError::OutOfOrder("second signature before primary signature"));
    }
    let digest = codec::hash(draft, SerializeOptions::for_second_signature())?;
    draft.second_signature = Some(keys.sign_digest(&digest)?);
    debug!(kind = %draft.kind(), nonce = draft.nonce(), "second signature applied");
    Ok(())
}

/// Adds a co-signature for participant `index`.
///
/// Must happen before the primary signature. Co-signatures stay sorted by
/// index and each index may sign once.
pub fn multi_sign(
    draft: &mut TransactionDraft,
    keys: &KeyPair,
    index: u8,
) -> Result<(), SigningError> {
    ensure_asset(draft)?;
    if draft.signature.is_some() || draft.second_signature.is_some() {
        return Err(SigningError::OutOfOrder("co-signature after primary signature"));
    }
    if draft.signatures.iter().any(|s| s.index == index) {
        return Err(SigningError::DuplicateIndex(index));
    }
    let digest = codec::hash(draft, SerializeOptions::for_multi_signature())?;
    let signature = keys.sign_digest(&digest)?;
    let position = draft.signatures.partition_point(|s| s.index < index);
    draft
        .signatures
        .insert(position, IndexedSignature { index, signature });
    debug!(kind = %draft.kind(), nonce = draft.nonce(), index, "co-signature applied");
    Ok(())
}

/// Runs a signing plan against a draft in the required order.
pub fn apply_signatures(draft: &mut TransactionDraft, plan: &SigningPlan) -> Result<(), SigningError> {
    match plan {
        SigningPlan::Single { sender, second } => {
            sign(draft, sender)?;
            if let Some(second) = second {
                second_sign(draft, second)?;
            }
        }
        SigningPlan::Threshold { signers } => {
            for (index, keys) in signers {
                multi_sign(draft, keys, *index)?;
            }
        }
        SigningPlan::Registration {
            participants,
            sender,
            second,
        } => {
            for (index, keys) in participants.iter().enumerate() {
                let index = u8::try_from(index)
                    .map_err(|_| SigningError::OutOfOrder("participant index exceeds 255"))?;
                multi_sign(draft, keys, index)?;
            }
            sign(draft, sender)?;
            if let Some(second) = second {
                second_sign(draft, second)?;
            }
        }
    }
    Ok(())
}

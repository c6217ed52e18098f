//! Post-signing verification.
//!
//! Every transaction is checked before it is allowed into a batch:
//!
//! - single and second-signed transactions must verify completely;
//! - threshold registrations must carry a valid co-signature from every
//!   participant, plus a valid primary (and second) signature;
//! - threshold spends may legitimately carry fewer than `min` co-signatures
//!   while they wait for more signers, so a failure there is reported as
//!   [`VerificationOutcome::PendingThreshold`] instead of an error.

use tracing::warn;

use crate::crypto::PublicKey;
use crate::identity::MultiSignatureAsset;

use super::asset::Asset;
use super::codec::{self, SerializeOptions};
use super::draft::TransactionDraft;
use super::signing::SigningError;
use super::types::TransactionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Verified,
    /// A threshold spend that does not (yet) meet its threshold.
    PendingThreshold,
}

/// Checks the primary signature against the draft's sender key.
pub fn verify_signature(draft: &TransactionDraft) -> bool {
    let Some(signature) = draft.signature() else {
        return false;
    };
    let Ok(digest) = codec::hash(draft, SerializeOptions::for_signature()) else {
        return false;
    };
    draft.sender_public_key().verify_digest(&digest, signature)
}

/// Checks the second signature against the registered second key.
pub fn verify_second_signature(draft: &TransactionDraft, second_public_key: &PublicKey) -> bool {
    let Some(signature) = draft.second_signature() else {
        return false;
    };
    let Ok(digest) = codec::hash(draft, SerializeOptions::for_second_signature()) else {
        return false;
    };
    second_public_key.verify_digest(&digest, signature)
}

/// Counts co-signatures against an m-of-n asset.
///
/// Succeeds once `min` distinct participants have produced valid
/// co-signatures. A repeated or out-of-range participant index fails the
/// whole check. Stops early once the threshold can no longer be reached.
pub fn verify_multi_signatures(draft: &TransactionDraft, asset: &MultiSignatureAsset) -> bool {
    let signatures = draft.signatures();
    if signatures.is_empty() || asset.min == 0 {
        return false;
    }
    let Ok(digest) = codec::hash(draft, SerializeOptions::for_multi_signature()) else {
        return false;
    };

    let min = usize::from(asset.min);
    let mut seen = vec![false; asset.public_keys.len()];
    let mut valid = 0usize;

    for (i, entry) in signatures.iter().enumerate() {
        let index = usize::from(entry.index);
        let Some(key) = asset.public_keys.get(index) else {
            return false;
        };
        if seen[index] {
            return false;
        }
        seen[index] = true;

        if key.verify_digest(&digest, &entry.signature) {
            valid += 1;
        }
        if valid >= min {
            return true;
        }
        let invalid = i + 1 - valid;
        if signatures.len() - invalid < min {
            return false;
        }
    }
    false
}

/// A registration needs a valid co-signature from every participant.
pub fn verify_registration(draft: &TransactionDraft) -> bool {
    let Some(Asset::MultiSignature(asset)) = draft.asset() else {
        return false;
    };
    let everyone = MultiSignatureAsset {
        min: asset.public_keys.len() as u8,
        public_keys: asset.public_keys.clone(),
    };
    draft.signatures().len() == everyone.public_keys.len()
        && verify_multi_signatures(draft, &everyone)
}

/// The post-signing gate.
///
/// `second_public_key` is the key the second signature is checked against;
/// `threshold` is the asset of a threshold sender, if the draft spends from
/// one.
pub fn enforce_verifiable(
    draft: &TransactionDraft,
    second_public_key: Option<&PublicKey>,
    threshold: Option<&MultiSignatureAsset>,
) -> Result<VerificationOutcome, SigningError> {
    let second_ok = || match (draft.second_signature(), second_public_key) {
        (None, _) => true,
        (Some(_), Some(key)) => verify_second_signature(draft, key),
        (Some(_), None) => false,
    };

    if draft.kind() == TransactionKind::MultiSignature {
        if !verify_registration(draft) {
            return Err(SigningError::VerificationFailed(
                "registration is missing participant co-signatures".into(),
            ));
        }
        if !verify_signature(draft) || !second_ok() {
            return Err(SigningError::VerificationFailed(
                "registration sender signature does not verify".into(),
            ));
        }
        return Ok(VerificationOutcome::Verified);
    }

    if draft.signature().is_none() {
        if let Some(asset) = threshold {
            if verify_multi_signatures(draft, asset) {
                return Ok(VerificationOutcome::Verified);
            }
            warn!(
                kind = %draft.kind(),
                nonce = draft.nonce(),
                cosigners = draft.signatures().len(),
                min = asset.min,
                "threshold transaction does not verify yet"
            );
            return Ok(VerificationOutcome::PendingThreshold);
        }
        return Err(SigningError::VerificationFailed("transaction has no primary signature".into()));
    }

    if !verify_signature(draft) {
        return Err(SigningError::VerificationFailed(
            "primary signature does not verify".into(),
        ));
    }
    if !second_ok() {
        return Err(SigningError::VerificationFailed(
            "second signature does not verify".into(),
        ));
    }
    Ok(VerificationOutcome::Verified)
}

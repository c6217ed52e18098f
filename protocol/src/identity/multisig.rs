//! # Threshold Identities
//!
//! An m-of-n identity is described by an ordered participant list and a
//! threshold `min`. Its public key is a deterministic function of both:
//!
//! ```text
//! seed      = hex2(min) ":" key_1 "," key_2 "," ... "," key_n
//! min_key   = ECDSA public key of seed
//! identity  = min_key + P(key_1) + ... + P(key_n)      (curve point sum)
//! ```
//!
//! `P(k)` is the curve point behind a participant key; x-only (Schnorr) keys
//! are lifted to their even-y point. Because the seed spells out the exact
//! participant order and the threshold, reordering participants or changing
//! `min` yields an unrelated identity.
//!
//! Derivation is pure: the same asset always produces the same public key
//! and address.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{
    Network, MAX_MULTI_SIGNATURE_PARTICIPANTS, MIN_MULTI_SIGNATURE_PARTICIPANTS,
};
use crate::crypto::{KeyError, KeyPair, PublicKey, SignatureScheme};

use super::address::Address;

/// Reasons a multi-signature asset is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultiSignatureError {
    #[error("threshold {min} is out of range for {participants} participants")]
    InvalidThreshold { min: u8, participants: usize },

    #[error("expected between 2 and 16 participants, got {0}")]
    InvalidParticipantCount(usize),

    #[error("participant key {0} appears more than once")]
    DuplicateParticipant(String),

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Participant keys plus the number of co-signatures the identity requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSignatureAsset {
    pub min: u8,
    pub public_keys: Vec<PublicKey>,
}

impl MultiSignatureAsset {
    pub fn new(min: u8, public_keys: Vec<PublicKey>) -> Result<Self, MultiSignatureError> {
        let asset = Self { min, public_keys };
        asset.validate()?;
        Ok(asset)
    }

    /// Builds the asset from participant secrets, each derived under `scheme`.
    pub fn from_secrets<S: AsRef<str>>(
        min: u8,
        secrets: &[S],
        scheme: SignatureScheme,
    ) -> Result<Self, MultiSignatureError> {
        let public_keys = secrets
            .iter()
            .map(|s| KeyPair::from_secret(s.as_ref(), scheme).map(|k| k.public_key().clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(min, public_keys)
    }

    /// Checks `1 <= min <= n`, `2 <= n <= 16` and that no key repeats.
    pub fn validate(&self) -> Result<(), MultiSignatureError> {
        let n = self.public_keys.len();
        if !(MIN_MULTI_SIGNATURE_PARTICIPANTS..=MAX_MULTI_SIGNATURE_PARTICIPANTS).contains(&n) {
            return Err(MultiSignatureError::InvalidParticipantCount(n));
        }
        if self.min == 0 || usize::from(self.min) > n {
            return Err(MultiSignatureError::InvalidThreshold {
                min: self.min,
                participants: n,
            });
        }
        for (i, key) in self.public_keys.iter().enumerate() {
            if self.public_keys[..i].contains(key) {
                return Err(MultiSignatureError::DuplicateParticipant(key.to_hex()));
            }
        }
        Ok(())
    }

    pub fn participants(&self) -> usize {
        self.public_keys.len()
    }

    fn min_key_seed(&self) -> String {
        let keys: Vec<String> = self.public_keys.iter().map(PublicKey::to_hex).collect();
        format!("{:02x}:{}", self.min, keys.join(","))
    }
}

/// The derived public key and address of a threshold identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSignatureIdentity {
    pub public_key: PublicKey,
    pub address: Address,
}

/// Derives the identity public key and address of an m-of-n asset.
pub fn derive_multi_signature_identity(
    asset: &MultiSignatureAsset,
    network: Network,
) -> Result<MultiSignatureIdentity, MultiSignatureError> {
    asset.validate()?;

    let min_key = KeyPair::from_secret(&asset.min_key_seed(), SignatureScheme::Ecdsa)?;
    let mut sum = min_key.public_key().to_point()?;
    for key in &asset.public_keys {
        sum += key.to_point()?;
    }

    let public_key = PublicKey::from_point(sum)?;
    let address = Address::from_public_key(&public_key, network);
    Ok(MultiSignatureIdentity {
        public_key,
        address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MULTI_SIGNATURE_PARTICIPANTS;

    fn asset(min: u8, scheme: SignatureScheme) -> MultiSignatureAsset {
        MultiSignatureAsset::from_secrets(min, DEFAULT_MULTI_SIGNATURE_PARTICIPANTS, scheme)
            .unwrap()
    }

    #[test]
    fn test_identity_is_deterministic() {
        let a = derive_multi_signature_identity(&asset(2, SignatureScheme::Schnorr), Network::Testnet)
            .unwrap();
        let b = derive_multi_signature_identity(&asset(2, SignatureScheme::Schnorr), Network::Testnet)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.public_key.scheme(), SignatureScheme::Ecdsa);
    }

    #[test]
    fn test_order_changes_identity() {
        let forward = asset(2, SignatureScheme::Ecdsa);
        let mut reversed = forward.clone();
        reversed.public_keys.reverse();
        let a = derive_multi_signature_identity(&forward, Network::Testnet).unwrap();
        let b = derive_multi_signature_identity(&reversed, Network::Testnet).unwrap();
        assert_ne!(a.public_key, b.public_key);
    }

    #[test]
    fn test_threshold_changes_identity() {
        let a = derive_multi_signature_identity(&asset(2, SignatureScheme::Ecdsa), Network::Testnet)
            .unwrap();
        let b = derive_multi_signature_identity(&asset(3, SignatureScheme::Ecdsa), Network::Testnet)
            .unwrap();
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn test_identity_differs_from_participants() {
        let asset = asset(2, SignatureScheme::Ecdsa);
        let identity = derive_multi_signature_identity(&asset, Network::Testnet).unwrap();
        assert!(!asset.public_keys.contains(&identity.public_key));
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        let keys = asset(2, SignatureScheme::Ecdsa).public_keys;
        assert!(matches!(
            MultiSignatureAsset::new(0, keys.clone()),
            Err(MultiSignatureError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            MultiSignatureAsset::new(4, keys),
            Err(MultiSignatureError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_rejects_single_participant() {
        let result = MultiSignatureAsset::from_secrets(1, &["only"], SignatureScheme::Ecdsa);
        assert_eq!(result, Err(MultiSignatureError::InvalidParticipantCount(1)));
    }

    #[test]
    fn test_rejects_duplicates() {
        let result = MultiSignatureAsset::from_secrets(1, &["a", "b", "a"], SignatureScheme::Ecdsa);
        assert!(matches!(
            result,
            Err(MultiSignatureError::DuplicateParticipant(_))
        ));
    }

    #[test]
    fn test_serializes_keys_as_hex() {
        let asset = asset(2, SignatureScheme::Schnorr);
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["min"], 2);
        assert_eq!(json["publicKeys"][0].as_str().unwrap().len(), 64);
    }
}

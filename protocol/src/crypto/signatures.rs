//! # Digital Signatures
//!
//! The 64-byte compact signature shared by both schemes, plus the small
//! helpers the signing and verification paths use.
//!
//! ECDSA signatures are stored as `r || s` (low-S normalized by k256) and
//! Schnorr signatures in their BIP-340 form. Both are exactly 64 bytes, so a
//! single type carries either. The scheme that verifies a signature is the
//! scheme of the public key it is checked against.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::hash::sha256_array;
use super::keys::{KeyError, KeyPair, PublicKey};

/// Length of every signature on the ledger.
pub const SIGNATURE_LENGTH: usize = 64;

/// A 64-byte compact signature, serialized as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Signature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl Signature {
    /// Wraps raw signature bytes. Anything but 64 bytes is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; SIGNATURE_LENGTH] = bytes.try_into().map_err(|_| {
            KeyError::InvalidSignature(format!("expected 64 bytes, got {}", bytes.len()))
        })?;
        Ok(Self { bytes })
    }

    /// Parses a hex-encoded signature.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| KeyError::InvalidSignature(format!("hex decode failed: {e}")))?;
        Self::from_slice(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl TryFrom<String> for Signature {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Signature> for String {
    fn from(value: Signature) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", &self.to_hex()[..16])
    }
}

/// Sign arbitrary bytes: SHA-256 the message, then sign the digest.
///
/// # Example
///
/// ```
/// use quill_protocol::crypto::{KeyPair, SignatureScheme, sign, verify};
///
/// let keys = KeyPair::from_secret("alice", SignatureScheme::Ecdsa).unwrap();
/// let signature = sign(&keys, b"send 1 to bob").unwrap();
/// assert!(verify(keys.public_key(), b"send 1 to bob", &signature));
/// ```
pub fn sign(keys: &KeyPair, message: &[u8]) -> Result<Signature, KeyError> {
    keys.sign_digest(&sha256_array(message))
}

/// Verify a signature over arbitrary bytes. `false` on any failure.
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify_digest(&sha256_array(message), signature)
}

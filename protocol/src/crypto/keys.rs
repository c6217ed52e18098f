//! # Key Management
//!
//! secp256k1 key pairs for Quill identities, under either of the two
//! signature schemes the ledger accepts.
//!
//! A key pair is derived from a *secret*: any UTF-8 string. The private key
//! is `SHA-256(secret)` and the public key depends on the scheme:
//!
//! | Scheme    | Public key encoding              | Hex length |
//! |-----------|----------------------------------|------------|
//! | `Ecdsa`   | 33-byte compressed SEC1 point    | 66         |
//! | `Schnorr` | 32-byte BIP-340 x-only key       | 64         |
//!
//! So the same secret yields different public key material per scheme, and
//! a public key always tells you which scheme verifies it.
//!
//! ## Security considerations
//!
//! - There is no salt and no derivation path. Any string is a valid seed,
//!   including the empty string and strings that look malformed. Derivation
//!   never rejects a secret for being "weird"; it just derives a key.
//! - Private key bytes are never logged or printed in `Debug` output.

use k256::ecdsa;
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::schnorr;
use k256::{AffinePoint, ProjectivePoint};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::hash::sha256_array;
use super::signatures::Signature;

/// Errors that can occur during key operations.
///
/// Intentionally vague about *why* something failed: error messages are
/// not a good place to leak details about key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key bytes: not a valid secp256k1 scalar")]
    InvalidSecretKey,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("key combination produced the point at infinity")]
    DegenerateKey,

    #[error("signing failed")]
    SigningFailed,
}

// ---------------------------------------------------------------------------
// SignatureScheme
// ---------------------------------------------------------------------------

/// The two mutually exclusive digital-signature algorithms of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureScheme {
    /// secp256k1 ECDSA (RFC 6979 deterministic nonces, low-S).
    Ecdsa,
    /// secp256k1 Schnorr as specified by BIP-340.
    Schnorr,
}

impl SignatureScheme {
    /// Picks the scheme for a run.
    ///
    /// Schnorr is the default once AIP-11 is active. Before that, or when the
    /// operator forces it, every signature is ECDSA.
    pub fn select(aip11: bool, force_ecdsa: bool) -> Self {
        if force_ecdsa || !aip11 {
            Self::Ecdsa
        } else {
            Self::Schnorr
        }
    }

    /// Length in bytes of a public key under this scheme.
    pub fn public_key_length(&self) -> usize {
        match self {
            Self::Ecdsa => 33,
            Self::Schnorr => 32,
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ecdsa => write!(f, "secp256k1-ecdsa"),
            Self::Schnorr => write!(f, "secp256k1-schnorr"),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyPair
// ---------------------------------------------------------------------------

#[derive(Clone)]
enum SigningKey {
    Ecdsa(ecdsa::SigningKey),
    Schnorr(schnorr::SigningKey),
}

/// A scheme-tagged secp256k1 key pair.
///
/// Held only for the duration of a signing operation. `KeyPair` does not
/// implement `Serialize` on purpose: exporting a private key should be a
/// deliberate call to [`private_key_bytes`](Self::private_key_bytes).
///
/// # Examples
///
/// ```
/// use quill_protocol::crypto::{KeyPair, SignatureScheme, sha256_array};
///
/// let keys = KeyPair::from_secret("this is a top secret passphrase", SignatureScheme::Schnorr).unwrap();
/// let digest = sha256_array(b"payload");
/// let signature = keys.sign_digest(&digest).unwrap();
/// assert!(keys.public_key().verify_digest(&digest, &signature));
/// ```
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Derives the key pair for `secret` under `scheme`.
    ///
    /// Any string is accepted, including the empty string. The only failure
    /// is a SHA-256 output that is not a valid scalar, which happens with
    /// negligible probability.
    pub fn from_secret(secret: &str, scheme: SignatureScheme) -> Result<Self, KeyError> {
        Self::from_private_key(&sha256_array(secret.as_bytes()), scheme)
    }

    /// Builds a key pair from raw 32-byte private key material.
    pub fn from_private_key(bytes: &[u8; 32], scheme: SignatureScheme) -> Result<Self, KeyError> {
        match scheme {
            SignatureScheme::Ecdsa => {
                let key =
                    ecdsa::SigningKey::from_slice(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
                let public_key = PublicKey {
                    scheme,
                    bytes: key
                        .verifying_key()
                        .as_affine()
                        .to_encoded_point(true)
                        .as_bytes()
                        .to_vec(),
                };
                Ok(Self {
                    signing_key: SigningKey::Ecdsa(key),
                    public_key,
                })
            }
            SignatureScheme::Schnorr => {
                let key =
                    schnorr::SigningKey::from_bytes(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
                let public_key = PublicKey {
                    scheme,
                    bytes: key.verifying_key().to_bytes().to_vec(),
                };
                Ok(Self {
                    signing_key: SigningKey::Schnorr(key),
                    public_key,
                })
            }
        }
    }

    /// The scheme this key pair signs with.
    pub fn scheme(&self) -> SignatureScheme {
        self.public_key.scheme
    }

    /// The public half of the key pair.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Exports the raw private key bytes. Handle with care.
    pub fn private_key_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        match &self.signing_key {
            SigningKey::Ecdsa(key) => out.copy_from_slice(&key.to_bytes()),
            SigningKey::Schnorr(key) => out.copy_from_slice(&key.to_bytes()),
        }
        out
    }

    /// Signs a 32-byte digest.
    ///
    /// ECDSA signatures are deterministic (RFC 6979). Schnorr signatures use
    /// all-zero auxiliary randomness, which BIP-340 permits and which keeps
    /// them deterministic too.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature, KeyError> {
        match &self.signing_key {
            SigningKey::Ecdsa(key) => {
                let signature: ecdsa::Signature =
                    key.sign_prehash(digest).map_err(|_| KeyError::SigningFailed)?;
                Signature::from_slice(&signature.to_bytes())
            }
            SigningKey::Schnorr(key) => {
                let signature: schnorr::Signature =
                    key.sign_prehash(digest).map_err(|_| KeyError::SigningFailed)?;
                Signature::from_slice(&signature.to_bytes())
            }
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({}, pub={})", self.scheme(), self.public_key.to_hex())
    }
}

// ---------------------------------------------------------------------------
// PublicKey
// ---------------------------------------------------------------------------

/// A scheme-tagged public key, serialized as lowercase hex.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey {
    scheme: SignatureScheme,
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Parses raw key bytes. The length selects the scheme and the bytes must
    /// encode a point on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        match bytes.len() {
            33 => {
                ecdsa::VerifyingKey::from_sec1_bytes(bytes)
                    .map_err(|_| KeyError::InvalidPublicKey("not a valid SEC1 point".into()))?;
                Ok(Self {
                    scheme: SignatureScheme::Ecdsa,
                    bytes: bytes.to_vec(),
                })
            }
            32 => {
                schnorr::VerifyingKey::from_bytes(bytes)
                    .map_err(|_| KeyError::InvalidPublicKey("not a valid x-only key".into()))?;
                Ok(Self {
                    scheme: SignatureScheme::Schnorr,
                    bytes: bytes.to_vec(),
                })
            }
            other => Err(KeyError::InvalidPublicKey(format!(
                "expected 32 or 33 bytes, got {other}"
            ))),
        }
    }

    /// Parses a hex-encoded public key.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| KeyError::InvalidPublicKey(format!("hex decode failed: {e}")))?;
        Self::from_bytes(&bytes)
    }

    /// The scheme that verifies signatures for this key.
    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    /// Raw key bytes (32 or 33 bytes).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Verifies a signature over a 32-byte digest using this key's scheme.
    ///
    /// Returns `false` on any failure, including a signature produced under
    /// the other scheme.
    pub fn verify_digest(&self, digest: &[u8; 32], signature: &Signature) -> bool {
        match self.scheme {
            SignatureScheme::Ecdsa => {
                let Ok(key) = ecdsa::VerifyingKey::from_sec1_bytes(&self.bytes) else {
                    return false;
                };
                let Ok(sig) = ecdsa::Signature::from_slice(signature.as_bytes()) else {
                    return false;
                };
                key.verify_prehash(digest, &sig).is_ok()
            }
            SignatureScheme::Schnorr => {
                let Ok(key) = schnorr::VerifyingKey::from_bytes(&self.bytes) else {
                    return false;
                };
                let Ok(sig) = schnorr::Signature::try_from(&signature.as_bytes()[..]) else {
                    return false;
                };
                key.verify_prehash(digest, &sig).is_ok()
            }
        }
    }

    /// The curve point behind this key. x-only keys are lifted to the point
    /// with an even y coordinate, as BIP-340 prescribes.
    pub(crate) fn to_point(&self) -> Result<ProjectivePoint, KeyError> {
        let sec1 = match self.scheme {
            SignatureScheme::Ecdsa => self.bytes.clone(),
            SignatureScheme::Schnorr => {
                let mut lifted = Vec::with_capacity(33);
                lifted.push(0x02);
                lifted.extend_from_slice(&self.bytes);
                lifted
            }
        };
        let key = k256::PublicKey::from_sec1_bytes(&sec1)
            .map_err(|_| KeyError::InvalidPublicKey("not a valid SEC1 point".into()))?;
        Ok(key.to_projective())
    }

    /// Wraps a curve point as a compressed (ECDSA-form) public key.
    pub(crate) fn from_point(point: ProjectivePoint) -> Result<Self, KeyError> {
        let affine = AffinePoint::from(point);
        let key = k256::PublicKey::from_affine(affine).map_err(|_| KeyError::DegenerateKey)?;
        Ok(Self {
            scheme: SignatureScheme::Ecdsa,
            bytes: key.to_encoded_point(true).as_bytes().to_vec(),
        })
    }
}

impl TryFrom<String> for PublicKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<PublicKey> for String {
    fn from(value: PublicKey) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}, {})", self.scheme, &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this is a top secret passphrase";

    #[test]
    fn derivation_is_deterministic() {
        let a = KeyPair::from_secret(SECRET, SignatureScheme::Ecdsa).unwrap();
        let b = KeyPair::from_secret(SECRET, SignatureScheme::Ecdsa).unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.private_key_bytes(), b.private_key_bytes());
    }

    #[test]
    fn private_key_is_sha256_of_secret() {
        let keys = KeyPair::from_secret(SECRET, SignatureScheme::Ecdsa).unwrap();
        assert_eq!(keys.private_key_bytes(), sha256_array(SECRET.as_bytes()));
    }

    #[test]
    fn known_ecdsa_public_key() {
        // Well-known test vector of the ledger's reference tooling.
        let keys = KeyPair::from_secret(SECRET, SignatureScheme::Ecdsa).unwrap();
        assert_eq!(
            keys.public_key().to_hex(),
            "034151a3ec46b5670a682b0a63394f863587d1bc97483b1b6c70eb58e7f0aed192"
        );
    }

    #[test]
    fn schemes_yield_different_public_keys() {
        let ecdsa = KeyPair::from_secret(SECRET, SignatureScheme::Ecdsa).unwrap();
        let schnorr = KeyPair::from_secret(SECRET, SignatureScheme::Schnorr).unwrap();
        assert_ne!(ecdsa.public_key(), schnorr.public_key());
        assert_eq!(ecdsa.public_key().as_bytes().len(), 33);
        assert_eq!(schnorr.public_key().as_bytes().len(), 32);
        // The x coordinate is shared; only the encoding differs.
        assert_eq!(&ecdsa.public_key().as_bytes()[1..], schnorr.public_key().as_bytes());
    }

    #[test]
    fn odd_secrets_still_derive() {
        for secret in ["", " ", "\u{0}", "🔑🔑🔑"] {
            assert!(KeyPair::from_secret(secret, SignatureScheme::Ecdsa).is_ok());
            assert!(KeyPair::from_secret(secret, SignatureScheme::Schnorr).is_ok());
        }
    }

    #[test]
    fn sign_and_verify_under_both_schemes() {
        let digest = sha256_array(b"payload");
        for scheme in [SignatureScheme::Ecdsa, SignatureScheme::Schnorr] {
            let keys = KeyPair::from_secret(SECRET, scheme).unwrap();
            let sig = keys.sign_digest(&digest).unwrap();
            assert!(keys.public_key().verify_digest(&digest, &sig));
            assert!(!keys.public_key().verify_digest(&sha256_array(b"other"), &sig));
        }
    }

    #[test]
    fn signatures_are_deterministic() {
        let digest = sha256_array(b"payload");
        for scheme in [SignatureScheme::Ecdsa, SignatureScheme::Schnorr] {
            let keys = KeyPair::from_secret(SECRET, scheme).unwrap();
            assert_eq!(
                keys.sign_digest(&digest).unwrap(),
                keys.sign_digest(&digest).unwrap()
            );
        }
    }

    #[test]
    fn cross_scheme_signature_does_not_verify() {
        let digest = sha256_array(b"payload");
        let ecdsa = KeyPair::from_secret(SECRET, SignatureScheme::Ecdsa).unwrap();
        let schnorr = KeyPair::from_secret(SECRET, SignatureScheme::Schnorr).unwrap();
        let sig = ecdsa.sign_digest(&digest).unwrap();
        assert!(!schnorr.public_key().verify_digest(&digest, &sig));
    }

    #[test]
    fn public_key_hex_roundtrip_keeps_scheme() {
        for scheme in [SignatureScheme::Ecdsa, SignatureScheme::Schnorr] {
            let keys = KeyPair::from_secret(SECRET, scheme).unwrap();
            let parsed = PublicKey::from_hex(&keys.public_key().to_hex()).unwrap();
            assert_eq!(parsed.scheme(), scheme);
            assert_eq!(&parsed, keys.public_key());
        }
    }

    #[test]
    fn public_key_rejects_bad_lengths_and_points() {
        assert!(PublicKey::from_bytes(&[0u8; 20]).is_err());
        assert!(PublicKey::from_bytes(&[0u8; 33]).is_err());
        assert!(PublicKey::from_hex("zz").is_err());
    }

    #[test]
    fn schnorr_point_lift_matches_ecdsa_point_x() {
        let ecdsa = KeyPair::from_secret(SECRET, SignatureScheme::Ecdsa).unwrap();
        let schnorr = KeyPair::from_secret(SECRET, SignatureScheme::Schnorr).unwrap();
        let lifted = PublicKey::from_point(schnorr.public_key().to_point().unwrap()).unwrap();
        assert_eq!(&lifted.as_bytes()[1..], &ecdsa.public_key().as_bytes()[1..]);
    }

    #[test]
    fn scheme_selection_follows_milestone() {
        assert_eq!(SignatureScheme::select(true, false), SignatureScheme::Schnorr);
        assert_eq!(SignatureScheme::select(true, true), SignatureScheme::Ecdsa);
        assert_eq!(SignatureScheme::select(false, false), SignatureScheme::Ecdsa);
    }

    #[test]
    fn debug_does_not_leak_private_key() {
        let keys = KeyPair::from_secret(SECRET, SignatureScheme::Ecdsa).unwrap();
        let debug = format!("{keys:?}");
        assert!(debug.starts_with("KeyPair("));
        assert!(!debug.contains(&hex::encode(keys.private_key_bytes())));
    }
}

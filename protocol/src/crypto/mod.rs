//! # Cryptographic Primitives for Quill
//!
//! Everything that touches key material flows through here:
//!
//! - **secp256k1 ECDSA** and **BIP-340 Schnorr** for signatures, both via `k256`.
//! - **SHA-256** for key derivation, ids and signing hashes.
//! - **RIPEMD-160** for address key hashes.
//!
//! Everything here is a thin, type-safe wrapper around audited RustCrypto
//! implementations. There is no bespoke curve arithmetic beyond adding points
//! for threshold identities.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{ripemd160, sha256, sha256_array, sha256_hex};
pub use keys::{KeyError, KeyPair, PublicKey, SignatureScheme};
pub use signatures::{sign, verify, Signature, SIGNATURE_LENGTH};

//! # Identity Module
//!
//! Every participant on the ledger is identified by a secp256k1 public key,
//! from which a Base58Check address is derived. The identity stack is layered:
//!
//! 1. **Key pair**: raw secp256k1 material, see [`crate::crypto::keys`].
//! 2. **Address**: `version || RIPEMD-160(public_key)` in Base58Check. This is
//!    what users see, share, and paste into recipient fields.
//! 3. **Threshold identity**: an m-of-n identity whose public key is a
//!    commitment to the participant list and threshold.
//!
//! All derivations are pure functions of their inputs. The scheme is always
//! an explicit argument, so a sender and its co-signers may use different
//! schemes within one run.

pub mod address;
pub mod multisig;

pub use address::{Address, AddressError};
pub use multisig::{
    derive_multi_signature_identity, MultiSignatureAsset, MultiSignatureError,
    MultiSignatureIdentity,
};

use crate::config::Network;
use crate::crypto::{KeyError, KeyPair, PublicKey, SignatureScheme};

/// Derives the key pair of `secret` under `scheme`.
pub fn derive_key_pair(secret: &str, scheme: SignatureScheme) -> Result<KeyPair, KeyError> {
    KeyPair::from_secret(secret, scheme)
}

/// Derives the address of `public_key` on `network`.
pub fn derive_address(public_key: &PublicKey, network: Network) -> Address {
    Address::from_public_key(public_key, network)
}

//! # Hashing Utilities
//!
//! The two digests the ledger speaks:
//!
//! - **SHA-256** for key derivation, transaction ids, signing hashes and the
//!   HTLC secret hash.
//! - **RIPEMD-160** for the 20-byte key hash inside an address.
//!
//! Both are thin wrappers around the RustCrypto implementations. Nothing
//! clever happens here, and nothing clever should.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use quill_protocol::crypto::sha256;
///
/// let hash = sha256(b"quill");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> Vec<u8> {
    sha256_array(data).to_vec()
}

/// SHA-256 into a fixed-size array, for call sites that want `[u8; 32]`.
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hex-encoded SHA-256 digest (64 lowercase characters).
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_array(data))
}

/// Compute the RIPEMD-160 hash of the input data.
///
/// Used on raw public key bytes when deriving addresses. Note that this is
/// *not* the Bitcoin `HASH160` construction: there is no SHA-256 pass first.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 20];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn sha256_vec_and_array_agree() {
        assert_eq!(sha256(b"quill").as_slice(), &sha256_array(b"quill"));
    }

    #[test]
    fn ripemd160_known_vector() {
        assert_eq!(
            hex::encode(ripemd160(b"abc")),
            "8eb208f7e05d987a9b044a8e98c6b087f15a0bfc"
        );
    }

    #[test]
    fn empty_input_is_hashable() {
        assert_eq!(sha256_array(b"").len(), 32);
        assert_eq!(ripemd160(b"").len(), 20);
    }
}

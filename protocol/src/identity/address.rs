//! # Ledger Addresses
//!
//! An address is the human-facing handle of an identity. It is derived from
//! a public key and the network's version byte:
//!
//! ```text
//! public_key (32 or 33 bytes)
//!     -> RIPEMD-160(public_key) -> 20 bytes
//!     -> Base58Check(version || hash) -> AJWRd23HNEhPLkK1ymMnwnDBX2a7QBZqff
//! ```
//!
//! Base58Check carries a 4-byte double-SHA-256 checksum, so a mistyped
//! address fails to parse instead of silently pointing somewhere else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::Network;
use crate::crypto::{ripemd160, PublicKey};

/// Errors that can occur while parsing an address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("base58check decode failed: {0}")]
    Decode(String),

    #[error("invalid address payload length: expected 21 bytes, got {0}")]
    InvalidLength(usize),

    #[error("address belongs to another network (version byte 0x{got:02x}, expected 0x{expected:02x})")]
    WrongNetwork { expected: u8, got: u8 },
}

/// A version-tagged RIPEMD-160 key hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    version: u8,
    hash: [u8; 20],
}

impl Address {
    /// Derives the address of `public_key` on `network`.
    ///
    /// ```
    /// use quill_protocol::config::Network;
    /// use quill_protocol::crypto::{KeyPair, SignatureScheme};
    /// use quill_protocol::identity::Address;
    ///
    /// let keys = KeyPair::from_secret("alice", SignatureScheme::Ecdsa).unwrap();
    /// let address = Address::from_public_key(keys.public_key(), Network::Devnet);
    /// assert!(address.to_string().starts_with('D'));
    /// ```
    pub fn from_public_key(public_key: &PublicKey, network: Network) -> Self {
        Self::from_public_key_with_version(public_key, network.address_version())
    }

    pub fn from_public_key_with_version(public_key: &PublicKey, version: u8) -> Self {
        Self {
            version,
            hash: ripemd160(public_key.as_bytes()),
        }
    }

    /// Parses a Base58Check address and checks it belongs to `network`.
    pub fn parse_for(s: &str, network: Network) -> Result<Self, AddressError> {
        let address: Self = s.parse()?;
        let expected = network.address_version();
        if address.version != expected {
            return Err(AddressError::WrongNetwork {
                expected,
                got: address.version,
            });
        }
        Ok(address)
    }

    /// Cheap validity check: checksum and network byte.
    pub fn is_valid(s: &str, network: Network) -> bool {
        Self::parse_for(s, network).is_ok()
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn hash(&self) -> &[u8; 20] {
        &self.hash
    }

    /// The 21-byte `version || hash` payload, as embedded in transaction assets.
    pub fn to_bytes(&self) -> [u8; 21] {
        let mut out = [0u8; 21];
        out[0] = self.version;
        out[1..].copy_from_slice(&self.hash);
        out
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let payload = bs58::decode(s.trim())
            .with_check(None)
            .into_vec()
            .map_err(|e| AddressError::Decode(e.to_string()))?;
        if payload.len() != 21 {
            return Err(AddressError::InvalidLength(payload.len()));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..]);
        Ok(Self {
            version: payload[0],
            hash,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.to_bytes()).with_check().into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyPair, SignatureScheme};

    fn keys() -> KeyPair {
        KeyPair::from_secret("this is a top secret passphrase", SignatureScheme::Ecdsa).unwrap()
    }

    #[test]
    fn test_known_devnet_address() {
        let address = Address::from_public_key(keys().public_key(), Network::Devnet);
        assert_eq!(address.to_string(), "D61mfSggzbvQgTUe6JhYKH2doHaqJ3Dyib");
    }

    #[test]
    fn test_roundtrip_through_string() {
        let address = Address::from_public_key(keys().public_key(), Network::Mainnet);
        let parsed: Address = address.to_string().parse().unwrap();
        assert_eq!(parsed, address);
        assert_eq!(parsed.version(), 0x17);
    }

    #[test]
    fn test_rejects_other_network() {
        let address = Address::from_public_key(keys().public_key(), Network::Devnet);
        let err = Address::parse_for(&address.to_string(), Network::Mainnet).unwrap_err();
        assert!(matches!(err, AddressError::WrongNetwork { .. }));
        assert!(Address::is_valid(&address.to_string(), Network::Devnet));
    }

    #[test]
    fn test_rejects_corrupted_checksum() {
        let mut s = Address::from_public_key(keys().public_key(), Network::Devnet).to_string();
        let last = s.pop().unwrap();
        s.push(if last == '1' { '2' } else { '1' });
        assert!(s.parse::<Address>().is_err());
    }

    #[test]
    fn test_scheme_changes_address() {
        let schnorr =
            KeyPair::from_secret("this is a top secret passphrase", SignatureScheme::Schnorr)
                .unwrap();
        assert_ne!(
            Address::from_public_key(keys().public_key(), Network::Devnet),
            Address::from_public_key(schnorr.public_key(), Network::Devnet)
        );
    }
}

//! # Protocol Configuration & Constants
//!
//! Every magic number Quill relies on lives here: network identifiers,
//! milestone heights, static fees and payload limits. If you find yourself
//! hardcoding one of these somewhere else, move it here instead.
//!
//! The values mirror the public parameters of the target ledger. Changing a
//! fee or a limit here does not change what the ledger accepts, it only
//! changes what we build, so keep them in sync with the node you talk to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Networks
// ---------------------------------------------------------------------------

/// The networks Quill knows how to build transactions for.
///
/// Each network has its own address version byte (which is also the network
/// byte in the transaction header) and its own activation height for the
/// extended transaction types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// The real deal. Mistakes here cost real money.
    Mainnet,
    /// Public development network.
    Devnet,
    /// Local test network. Everything is activated almost immediately.
    #[default]
    Testnet,
}

impl Network {
    /// Version byte prepended to the RIPEMD-160 key hash in Base58Check
    /// addresses. Doubles as the network byte in the transaction header.
    pub fn address_version(&self) -> u8 {
        match self {
            Self::Mainnet => 0x17,
            Self::Devnet => 0x1e,
            Self::Testnet => 0x17,
        }
    }

    /// Height at which the AIP-11 milestone activates: nonces, Schnorr
    /// signatures and the extended transaction types.
    pub fn aip11_height(&self) -> u64 {
        match self {
            Self::Mainnet => 11_273_000,
            Self::Devnet => 2_950_000,
            Self::Testnet => 2,
        }
    }

    /// Resolves the active milestone at the given chain height.
    pub fn milestone_at(&self, height: u64) -> Milestone {
        Milestone {
            height,
            aip11: height >= self.aip11_height(),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Devnet => write!(f, "devnet"),
            Self::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "devnet" => Ok(Self::Devnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(format!("unknown network '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

/// The protocol stage active at a particular height.
///
/// Only one flag matters to the composer today. It decides which transaction
/// kinds may be built, which transaction version is emitted and which
/// signature scheme is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    /// Height this milestone was resolved for.
    pub height: u64,
    /// Whether the extended transaction types (AIP-11) are enabled.
    pub aip11: bool,
}

impl Milestone {
    /// Transaction format version emitted under this milestone.
    pub fn transaction_version(&self) -> u8 {
        if self.aip11 {
            2
        } else {
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction Header
// ---------------------------------------------------------------------------

/// First byte of every serialized transaction.
pub const TRANSACTION_HEADER: u8 = 0xff;

/// Type group of the core transaction types.
pub const CORE_TYPE_GROUP: u32 = 1;

/// Type group of the entity registry ("magistrate") transaction types.
pub const MAGISTRATE_TYPE_GROUP: u32 = 2;

/// Wire type of the entity transaction inside the magistrate group.
pub const ENTITY_WIRE_TYPE: u16 = 6;

/// Marker byte that precedes the co-signature block in serialized bytes.
pub const MULTI_SIGNATURE_MARKER: u8 = 0xff;

// ---------------------------------------------------------------------------
// Static Fees (arktoshi, 10^-8 of the native token)
// ---------------------------------------------------------------------------

pub const TRANSFER_FEE: u64 = 10_000_000;
pub const SECOND_SIGNATURE_FEE: u64 = 500_000_000;
pub const DELEGATE_REGISTRATION_FEE: u64 = 2_500_000_000;
pub const VOTE_FEE: u64 = 100_000_000;

/// Multiplied by `participants + 1` for a multi-signature registration.
pub const MULTI_SIGNATURE_FEE: u64 = 500_000_000;

pub const IPFS_FEE: u64 = 500_000_000;
pub const MULTI_PAYMENT_FEE: u64 = 10_000_000;
pub const DELEGATE_RESIGNATION_FEE: u64 = 2_500_000_000;
pub const HTLC_LOCK_FEE: u64 = 10_000_000;
pub const HTLC_CLAIM_FEE: u64 = 0;
pub const HTLC_REFUND_FEE: u64 = 0;
pub const ENTITY_REGISTER_FEE: u64 = 5_000_000_000;
pub const ENTITY_UPDATE_FEE: u64 = 500_000_000;
pub const ENTITY_RESIGN_FEE: u64 = 500_000_000;

// ---------------------------------------------------------------------------
// Payload Limits
// ---------------------------------------------------------------------------

/// Maximum vendor field length in bytes.
pub const MAX_VENDOR_FIELD_BYTES: usize = 255;

/// Maximum delegate username length.
pub const MAX_USERNAME_LENGTH: usize = 20;

/// Smallest and largest payment lists a multi-payment may carry.
pub const MIN_MULTI_PAYMENTS: usize = 2;
pub const MAX_MULTI_PAYMENTS: usize = 128;

/// Bounds for synthesized multi-payment lists (inclusive).
pub const SYNTHETIC_PAYMENTS_MIN: usize = 64;
pub const SYNTHETIC_PAYMENTS_MAX: usize = 128;

/// Participant bounds for a multi-signature registration.
pub const MIN_MULTI_SIGNATURE_PARTICIPANTS: usize = 2;
pub const MAX_MULTI_SIGNATURE_PARTICIPANTS: usize = 16;

/// Number of hex characters of the sender key used in default delegate names.
pub const DELEGATE_NAME_KEY_PREFIX: usize = 10;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default ledger API endpoint.
pub const DEFAULT_PEER: &str = "http://localhost:4003";

/// Second secret used when the sender already has a second key registered
/// but no second secret is configured.
pub const DEFAULT_SECOND_SECRET: &str = "second passphrase";

/// Seed of the default HTLC lock secret.
pub const DEFAULT_HTLC_SECRET: &str = "htlc secret";

/// Default HTLC lock expiration: roughly one forging round, in seconds.
pub const DEFAULT_HTLC_EXPIRATION_SECONDS: u64 = 52 * 8;

/// Default IPFS content hash attached to IPFS transactions.
pub const DEFAULT_IPFS_HASH: &str = "QmYSK2JyM3RyDyB52caZCTKFR3HKniEcMnNJYdk8DQ6KKB";

/// Pre-funded wallets of the local test network. Used as the fallback sender,
/// the fallback recipient and the synthetic multi-payment recipients.
pub const TEST_WALLET_SECRETS: &[&str] =
    &["clay harbor enemy utility margin pretty hub comic piece aerobic umbrella acquire"];

/// Default participant secrets of the configured threshold identity.
pub const DEFAULT_MULTI_SIGNATURE_PARTICIPANTS: &[&str] = &[
    "multisig participant 1",
    "multisig participant 2",
    "multisig participant 3",
];

/// Default threshold of the configured threshold identity.
pub const DEFAULT_MULTI_SIGNATURE_MIN: u8 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testnet_activates_aip11_early() {
        assert!(!Network::Testnet.milestone_at(1).aip11);
        assert!(Network::Testnet.milestone_at(2).aip11);
    }

    #[test]
    fn mainnet_is_legacy_before_activation() {
        let milestone = Network::Mainnet.milestone_at(1_000_000);
        assert!(!milestone.aip11);
        assert_eq!(milestone.transaction_version(), 1);
    }

    #[test]
    fn network_parses_case_insensitively() {
        assert_eq!("DevNet".parse::<Network>().unwrap(), Network::Devnet);
        assert!("moonnet".parse::<Network>().is_err());
    }

    #[test]
    fn synthetic_payment_bounds_fit_the_ledger_limit() {
        assert!(SYNTHETIC_PAYMENTS_MIN >= MIN_MULTI_PAYMENTS);
        assert!(SYNTHETIC_PAYMENTS_MAX <= MAX_MULTI_PAYMENTS);
    }
}

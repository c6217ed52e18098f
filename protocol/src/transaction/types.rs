//! Core type definitions for Quill transactions.
//!
//! These types form the vocabulary of every draft the composer builds. They
//! are intentionally small and `Copy`-friendly where possible.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{CORE_TYPE_GROUP, ENTITY_WIRE_TYPE, MAGISTRATE_TYPE_GROUP};
use crate::identity::Address;

// ---------------------------------------------------------------------------
// TransactionKind
// ---------------------------------------------------------------------------

/// The operation a transaction represents.
///
/// Kinds are addressed by their command-line index (0 to 11). The entity
/// kind lives in a separate type group on the wire but is addressed as
/// index 11 here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    Transfer,
    SecondSignature,
    DelegateRegistration,
    Vote,
    MultiSignature,
    Ipfs,
    MultiPayment,
    DelegateResignation,
    HtlcLock,
    HtlcClaim,
    HtlcRefund,
    Entity,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 12] = [
        Self::Transfer,
        Self::SecondSignature,
        Self::DelegateRegistration,
        Self::Vote,
        Self::MultiSignature,
        Self::Ipfs,
        Self::MultiPayment,
        Self::DelegateResignation,
        Self::HtlcLock,
        Self::HtlcClaim,
        Self::HtlcRefund,
        Self::Entity,
    ];

    /// Looks up a kind by its command-line index.
    pub fn from_index(index: u16) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    pub fn index(&self) -> u16 {
        *self as u16
    }

    /// Whether the kind only exists once the AIP-11 milestone is active.
    pub fn requires_aip11(&self) -> bool {
        !matches!(
            self,
            Self::Transfer | Self::SecondSignature | Self::DelegateRegistration | Self::Vote
        )
    }

    /// Kinds that get a random vendor field placeholder when none is set.
    pub fn is_memo_eligible(&self) -> bool {
        matches!(self, Self::Transfer | Self::MultiPayment | Self::HtlcLock)
    }

    /// Type group on the wire.
    pub fn type_group(&self) -> u32 {
        match self {
            Self::Entity => MAGISTRATE_TYPE_GROUP,
            _ => CORE_TYPE_GROUP,
        }
    }

    /// Type number within its group on the wire.
    pub fn wire_type(&self) -> u16 {
        match self {
            Self::Entity => ENTITY_WIRE_TYPE,
            other => other.index(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer => "transfer",
            Self::SecondSignature => "second-signature",
            Self::DelegateRegistration => "delegate-registration",
            Self::Vote => "vote",
            Self::MultiSignature => "multi-signature",
            Self::Ipfs => "ipfs",
            Self::MultiPayment => "multi-payment",
            Self::DelegateResignation => "delegate-resignation",
            Self::HtlcLock => "htlc-lock",
            Self::HtlcClaim => "htlc-claim",
            Self::HtlcRefund => "htlc-refund",
            Self::Entity => "entity",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Accepts either the numeric index or the kebab-case name.
impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<u16>() {
            return Self::from_index(index).ok_or_else(|| format!("unknown transaction type {index}"));
        }
        Self::ALL
            .iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown transaction type '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Vote
// ---------------------------------------------------------------------------

/// A single vote or unvote for a delegate public key.
///
/// Serialized the way the ledger API spells it: `+<key>` or `-<key>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Vote {
    Cast(String),
    Revoke(String),
}

impl Vote {
    pub fn target(&self) -> &str {
        match self {
            Self::Cast(t) | Self::Revoke(t) => t,
        }
    }

    pub fn is_cast(&self) -> bool {
        matches!(self, Self::Cast(_))
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cast(t) => write!(f, "+{t}"),
            Self::Revoke(t) => write!(f, "-{t}"),
        }
    }
}

impl FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match (s.get(..1), s.get(1..)) {
            (Some("+"), Some(t)) if !t.is_empty() => Ok(Self::Cast(t.to_string())),
            (Some("-"), Some(t)) if !t.is_empty() => Ok(Self::Revoke(t.to_string())),
            _ => Err(format!("vote '{s}' must look like +<key> or -<key>")),
        }
    }
}

impl TryFrom<String> for Vote {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Vote> for String {
    fn from(value: Vote) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

/// One leg of a multi-payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub recipient_id: Address,
    #[serde(with = "amount_string")]
    pub amount: u64,
}

/// Amounts travel as decimal strings in the ledger's JSON.
pub(crate) mod amount_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// TransactionId
// ---------------------------------------------------------------------------

/// SHA-256 of a transaction's complete serialized bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId([u8; 32]);

impl TransactionId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransactionId({})", self.to_hex())
    }
}

//! The mutable transaction under construction.
//!
//! A [`TransactionDraft`] moves through a fixed lifecycle:
//!
//! ```text
//! Empty --set_asset--> AssetPopulated --sign/multi_sign--> Signed --finalize--> SignedTransaction
//! ```
//!
//! Header fields (kind, version, network, nonce, sender key) are fixed at
//! construction. Payload fields may change until the first signature lands;
//! after that the draft only accepts more signatures, so nothing a signature
//! covers can move underneath it.

use thiserror::Error;

use crate::config::{Milestone, Network, MAX_VENDOR_FIELD_BYTES};
use crate::crypto::{PublicKey, Signature};

use super::asset::{Asset, AssetError};
use super::codec::{self, SerializeOptions};
use super::types::{TransactionId, TransactionKind};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("transaction type {0} is not supported at the current milestone")]
    UnsupportedKind(TransactionKind),

    #[error("a {draft} draft cannot carry a {asset} asset")]
    AssetKindMismatch {
        draft: TransactionKind,
        asset: TransactionKind,
    },

    #[error("vendor field is {0} bytes, the limit is 255")]
    VendorFieldTooLong(usize),

    #[error("{0} transactions do not carry a vendor field")]
    VendorFieldNotAllowed(TransactionKind),

    #[error("draft is already signed; payload fields are frozen")]
    AlreadySigned,

    #[error("draft has no asset yet")]
    MissingAsset,

    #[error("draft has no signatures")]
    Unsigned,

    #[error("asset field is {0} bytes, the encoding limit is 65535")]
    FieldTooLong(usize),

    #[error(transparent)]
    InvalidAsset(#[from] AssetError),
}

/// Where a draft is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    Empty,
    AssetPopulated,
    Signed,
}

/// A co-signature tagged with the signer's index in the participant list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedSignature {
    pub index: u8,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    kind: TransactionKind,
    version: u8,
    network: Network,
    nonce: u64,
    sender_public_key: PublicKey,
    fee: Option<u64>,
    asset: Option<Asset>,
    vendor_field: Option<String>,
    pub(crate) signature: Option<Signature>,
    pub(crate) second_signature: Option<Signature>,
    pub(crate) signatures: Vec<IndexedSignature>,
}

impl TransactionDraft {
    /// Opens a draft for `kind`, refusing kinds the milestone has not enabled.
    pub fn new(
        kind: TransactionKind,
        milestone: Milestone,
        network: Network,
        nonce: u64,
        sender_public_key: PublicKey,
    ) -> Result<Self, DraftError> {
        if kind.requires_aip11() && !milestone.aip11 {
            return Err(DraftError::UnsupportedKind(kind));
        }
        Ok(Self {
            kind,
            version: milestone.transaction_version(),
            network,
            nonce,
            sender_public_key,
            fee: None,
            asset: None,
            vendor_field: None,
            signature: None,
            second_signature: None,
            signatures: Vec::new(),
        })
    }

    pub fn state(&self) -> DraftState {
        if self.is_signed() {
            DraftState::Signed
        } else if self.asset.is_some() {
            DraftState::AssetPopulated
        } else {
            DraftState::Empty
        }
    }

    fn is_signed(&self) -> bool {
        self.signature.is_some() || self.second_signature.is_some() || !self.signatures.is_empty()
    }

    fn ensure_unsigned(&self) -> Result<(), DraftError> {
        if self.is_signed() {
            return Err(DraftError::AlreadySigned);
        }
        Ok(())
    }

    /// Attaches the payload. The asset must match the draft's kind and pass
    /// its structural checks. Replaces any previous asset.
    pub fn set_asset(&mut self, asset: Asset) -> Result<(), DraftError> {
        self.ensure_unsigned()?;
        if asset.kind() != self.kind {
            return Err(DraftError::AssetKindMismatch {
                draft: self.kind,
                asset: asset.kind(),
            });
        }
        asset.validate()?;
        self.asset = Some(asset);
        Ok(())
    }

    /// Overrides the static fee.
    pub fn set_fee(&mut self, fee: u64) -> Result<(), DraftError> {
        self.ensure_unsigned()?;
        self.fee = Some(fee);
        Ok(())
    }

    pub fn set_vendor_field(&mut self, value: impl Into<String>) -> Result<(), DraftError> {
        self.ensure_unsigned()?;
        if !self.kind.is_memo_eligible() {
            return Err(DraftError::VendorFieldNotAllowed(self.kind));
        }
        let value = value.into();
        if value.len() > MAX_VENDOR_FIELD_BYTES {
            return Err(DraftError::VendorFieldTooLong(value.len()));
        }
        self.vendor_field = Some(value);
        Ok(())
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn sender_public_key(&self) -> &PublicKey {
        &self.sender_public_key
    }

    /// Effective fee: the override if one was set, else the asset's static fee.
    pub fn fee(&self) -> u64 {
        self.fee
            .or_else(|| self.asset.as_ref().map(Asset::static_fee))
            .unwrap_or(0)
    }

    pub fn asset(&self) -> Option<&Asset> {
        self.asset.as_ref()
    }

    pub fn vendor_field(&self) -> Option<&str> {
        self.vendor_field.as_deref()
    }

    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn second_signature(&self) -> Option<&Signature> {
        self.second_signature.as_ref()
    }

    /// Co-signatures, ordered by participant index.
    pub fn signatures(&self) -> &[IndexedSignature] {
        &self.signatures
    }

    /// Serializes the draft, honouring the exclusion options.
    pub fn to_bytes(&self, options: SerializeOptions) -> Result<Vec<u8>, DraftError> {
        codec::serialize(self, options)
    }

    /// Freezes the draft into its submittable form.
    pub fn finalize(self) -> Result<SignedTransaction, DraftError> {
        if self.asset.is_some() && !self.is_signed() {
            return Err(DraftError::Unsigned);
        }
        self.freeze()
    }

    /// Freezes a threshold spend that has not reached its threshold. It may
    /// carry no co-signature at all; the rest are collected out of process.
    pub fn finalize_pending(self) -> Result<SignedTransaction, DraftError> {
        self.freeze()
    }

    fn freeze(self) -> Result<SignedTransaction, DraftError> {
        if self.asset.is_none() {
            return Err(DraftError::MissingAsset);
        }
        let bytes = codec::serialize(&self, SerializeOptions::full())?;
        let id = codec::transaction_id(&bytes);
        Ok(SignedTransaction {
            id,
            bytes,
            transaction: self,
        })
    }
}

/// A finalized transaction: id, canonical bytes, and the draft it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    id: TransactionId,
    bytes: Vec<u8>,
    transaction: TransactionDraft,
}

impl SignedTransaction {
    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn transaction(&self) -> &TransactionDraft {
        &self.transaction
    }

    pub fn kind(&self) -> TransactionKind {
        self.transaction.kind
    }

    /// The ledger API's JSON rendering.
    pub fn to_json(&self) -> serde_json::Value {
        codec::to_json(&self.transaction, &self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KeyPair, SignatureScheme};

    fn keys() -> KeyPair {
        KeyPair::from_secret("sender", SignatureScheme::Ecdsa).unwrap()
    }

    fn aip11() -> Milestone {
        Network::Testnet.milestone_at(100)
    }

    fn ipfs_draft() -> TransactionDraft {
        TransactionDraft::new(
            TransactionKind::Ipfs,
            aip11(),
            Network::Testnet,
            1,
            keys().public_key().clone(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_kind_disabled_by_milestone() {
        let legacy = Network::Mainnet.milestone_at(1);
        let result = TransactionDraft::new(
            TransactionKind::HtlcLock,
            legacy,
            Network::Mainnet,
            1,
            keys().public_key().clone(),
        );
        assert_eq!(result, Err(DraftError::UnsupportedKind(TransactionKind::HtlcLock)));
    }

    #[test]
    fn test_state_progression() {
        let mut draft = ipfs_draft();
        assert_eq!(draft.state(), DraftState::Empty);
        draft.set_asset(Asset::Ipfs { hash: "Qm".into() }).unwrap();
        assert_eq!(draft.state(), DraftState::AssetPopulated);
        draft.signature = Some(Signature::from_slice(&[1u8; 64]).unwrap());
        assert_eq!(draft.state(), DraftState::Signed);
    }

    #[test]
    fn test_asset_must_match_kind() {
        let mut draft = ipfs_draft();
        let err = draft.set_asset(Asset::DelegateResignation).unwrap_err();
        assert!(matches!(err, DraftError::AssetKindMismatch { .. }));
    }

    #[test]
    fn test_fee_defaults_to_static_fee() {
        let mut draft = ipfs_draft();
        draft.set_asset(Asset::Ipfs { hash: "Qm".into() }).unwrap();
        assert_eq!(draft.fee(), crate::config::IPFS_FEE);
        draft.set_fee(7).unwrap();
        assert_eq!(draft.fee(), 7);
    }

    #[test]
    fn test_vendor_field_rules() {
        let mut ipfs = ipfs_draft();
        assert_eq!(
            ipfs.set_vendor_field("memo"),
            Err(DraftError::VendorFieldNotAllowed(TransactionKind::Ipfs))
        );

        let mut transfer = TransactionDraft::new(
            TransactionKind::Transfer,
            aip11(),
            Network::Testnet,
            1,
            keys().public_key().clone(),
        )
        .unwrap();
        assert!(transfer.set_vendor_field("x".repeat(255)).is_ok());
        assert_eq!(
            transfer.set_vendor_field("x".repeat(256)),
            Err(DraftError::VendorFieldTooLong(256))
        );
    }

    #[test]
    fn test_payload_frozen_after_signing() {
        let mut draft = ipfs_draft();
        draft.set_asset(Asset::Ipfs { hash: "Qm".into() }).unwrap();
        draft.signature = Some(Signature::from_slice(&[1u8; 64]).unwrap());
        assert_eq!(draft.set_fee(1), Err(DraftError::AlreadySigned));
        assert_eq!(
            draft.set_asset(Asset::Ipfs { hash: "Qm2".into() }),
            Err(DraftError::AlreadySigned)
        );
    }

    #[test]
    fn test_finalize_requires_asset_and_signature() {
        assert_eq!(ipfs_draft().finalize().unwrap_err(), DraftError::MissingAsset);
        let mut draft = ipfs_draft();
        draft.set_asset(Asset::Ipfs { hash: "Qm".into() }).unwrap();
        assert_eq!(draft.clone().finalize().unwrap_err(), DraftError::Unsigned);
    }

    #[test]
    fn test_pending_finalize_accepts_no_signatures() {
        assert_eq!(
            ipfs_draft().finalize_pending().unwrap_err(),
            DraftError::MissingAsset
        );
        let mut draft = ipfs_draft();
        draft.set_asset(Asset::Ipfs { hash: "Qm".into() }).unwrap();
        let pending = draft.finalize_pending().unwrap();
        assert!(pending.transaction().signatures().is_empty());
        assert!(pending.transaction().signature().is_none());
    }

    #[test]
    fn test_legacy_milestone_emits_version_one() {
        let draft = TransactionDraft::new(
            TransactionKind::Transfer,
            Network::Mainnet.milestone_at(1),
            Network::Mainnet,
            1,
            keys().public_key().clone(),
        )
        .unwrap();
        assert_eq!(draft.version(), 1);
    }
}

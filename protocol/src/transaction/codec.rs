//! Canonical byte and JSON encodings of a transaction.
//!
//! # Byte layout
//!
//! All integers are little-endian.
//!
//! ```text
//! 0xff | version u8 | network u8 | type_group u32 | type u16 | nonce u64
//!      | key_len u8 | sender_key | fee u64 | vendor_len u8 | vendor
//!      | asset
//!      | [signature 64] [second_signature 64] [0xff (index u8 | signature 64)*]
//! ```
//!
//! Signing hashes are SHA-256 over the same layout with some signatures left
//! out, chosen through [`SerializeOptions`]. The transaction id is SHA-256 of
//! the complete bytes.
//!
//! Asset strings are written as `len u16 | utf8`. Keys as `len u8 | bytes`.

use serde_json::{json, Map, Value};

use crate::config::{MULTI_SIGNATURE_MARKER, TRANSACTION_HEADER};
use crate::crypto::{sha256_array, PublicKey};

use super::asset::Asset;
use super::draft::{DraftError, TransactionDraft};
use super::types::TransactionId;

/// Which signatures to leave out of the serialized bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    pub exclude_signature: bool,
    pub exclude_second_signature: bool,
    pub exclude_multi_signatures: bool,
}

impl SerializeOptions {
    /// Everything included: the bytes the id is computed over.
    pub fn full() -> Self {
        Self::default()
    }

    /// What the primary signature covers.
    pub fn for_signature() -> Self {
        Self {
            exclude_signature: true,
            exclude_second_signature: true,
            exclude_multi_signatures: false,
        }
    }

    /// What the second signature covers.
    pub fn for_second_signature() -> Self {
        Self {
            exclude_second_signature: true,
            ..Self::default()
        }
    }

    /// What each co-signature covers.
    pub fn for_multi_signature() -> Self {
        Self {
            exclude_signature: true,
            exclude_second_signature: true,
            exclude_multi_signatures: true,
        }
    }
}

pub fn serialize(draft: &TransactionDraft, options: SerializeOptions) -> Result<Vec<u8>, DraftError> {
    let asset = draft.asset().ok_or(DraftError::MissingAsset)?;
    let mut buf = Vec::with_capacity(256);

    buf.push(TRANSACTION_HEADER);
    buf.push(draft.version());
    buf.push(draft.network().address_version());
    buf.extend_from_slice(&draft.kind().type_group().to_le_bytes());
    buf.extend_from_slice(&draft.kind().wire_type().to_le_bytes());
    buf.extend_from_slice(&draft.nonce().to_le_bytes());
    put_key(&mut buf, draft.sender_public_key());
    buf.extend_from_slice(&draft.fee().to_le_bytes());

    let vendor = draft.vendor_field().unwrap_or_default().as_bytes();
    buf.push(vendor.len() as u8);
    buf.extend_from_slice(vendor);

    put_asset(&mut buf, asset)?;

    if !options.exclude_signature {
        if let Some(sig) = draft.signature() {
            buf.extend_from_slice(sig.as_bytes());
        }
    }
    if !options.exclude_second_signature {
        if let Some(sig) = draft.second_signature() {
            buf.extend_from_slice(sig.as_bytes());
        }
    }
    if !options.exclude_multi_signatures && !draft.signatures().is_empty() {
        buf.push(MULTI_SIGNATURE_MARKER);
        for entry in draft.signatures() {
            buf.push(entry.index);
            buf.extend_from_slice(entry.signature.as_bytes());
        }
    }

    Ok(buf)
}

/// SHA-256 of the draft under the given exclusions.
pub fn hash(draft: &TransactionDraft, options: SerializeOptions) -> Result<[u8; 32], DraftError> {
    Ok(sha256_array(&serialize(draft, options)?))
}

pub fn transaction_id(bytes: &[u8]) -> TransactionId {
    TransactionId::from_bytes(sha256_array(bytes))
}

fn put_key(buf: &mut Vec<u8>, key: &PublicKey) {
    buf.push(key.as_bytes().len() as u8);
    buf.extend_from_slice(key.as_bytes());
}

fn put_str(buf: &mut Vec<u8>, value: &str) -> Result<(), DraftError> {
    let bytes = value.as_bytes();
    let len = u16::try_from(bytes.len()).map_err(|_| DraftError::FieldTooLong(bytes.len()))?;
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

fn put_opt_str(buf: &mut Vec<u8>, value: Option<&str>) -> Result<(), DraftError> {
    put_str(buf, value.unwrap_or_default())
}

fn put_asset(buf: &mut Vec<u8>, asset: &Asset) -> Result<(), DraftError> {
    match asset {
        Asset::Transfer {
            recipient,
            amount,
            expiration,
        } => {
            buf.extend_from_slice(&amount.to_le_bytes());
            buf.extend_from_slice(&expiration.to_le_bytes());
            buf.extend_from_slice(&recipient.to_bytes());
        }
        Asset::SecondSignature { public_key } => put_key(buf, public_key),
        Asset::DelegateRegistration { username } => put_str(buf, username)?,
        Asset::Vote { votes } => {
            buf.push(votes.len() as u8);
            for vote in votes {
                buf.push(u8::from(vote.is_cast()));
                put_str(buf, vote.target())?;
            }
        }
        Asset::MultiSignature(multi) => {
            buf.push(multi.min);
            buf.push(multi.public_keys.len() as u8);
            for key in &multi.public_keys {
                put_key(buf, key);
            }
        }
        Asset::Ipfs { hash } => put_str(buf, hash)?,
        Asset::MultiPayment { payments } => {
            buf.extend_from_slice(&(payments.len() as u16).to_le_bytes());
            for payment in payments {
                buf.extend_from_slice(&payment.amount.to_le_bytes());
                buf.extend_from_slice(&payment.recipient_id.to_bytes());
            }
        }
        Asset::DelegateResignation => {}
        Asset::HtlcLock {
            recipient,
            amount,
            secret_hash,
            expiration,
        } => {
            buf.extend_from_slice(&amount.to_le_bytes());
            buf.extend_from_slice(secret_hash);
            buf.push(expiration.kind.wire_value());
            buf.extend_from_slice(&expiration.value.to_le_bytes());
            buf.extend_from_slice(&recipient.to_bytes());
        }
        Asset::HtlcClaim {
            lock_transaction_id,
            unlock_secret,
        } => {
            put_str(buf, lock_transaction_id)?;
            put_str(buf, unlock_secret)?;
        }
        Asset::HtlcRefund {
            lock_transaction_id,
        } => put_str(buf, lock_transaction_id)?,
        Asset::Entity(entity) => {
            buf.push(entity.entity_type.wire_value());
            buf.push(entity.sub_type.wire_value());
            buf.push(entity.action.wire_value());
            put_opt_str(buf, entity.registration_id.as_deref())?;
            put_opt_str(buf, entity.data.name.as_deref())?;
            put_opt_str(buf, entity.data.ipfs_data.as_deref())?;
        }
    }
    Ok(())
}

/// JSON in the shape the ledger's transaction endpoint accepts.
///
/// Monetary values and the nonce are decimal strings. Co-signatures are
/// rendered as `hex(index) || hex(signature)`.
pub fn to_json(draft: &TransactionDraft, id: &TransactionId) -> Value {
    let mut out = Map::new();
    out.insert("version".into(), json!(draft.version()));
    out.insert("network".into(), json!(draft.network().address_version()));
    out.insert("typeGroup".into(), json!(draft.kind().type_group()));
    out.insert("type".into(), json!(draft.kind().wire_type()));
    out.insert("nonce".into(), json!(draft.nonce().to_string()));
    out.insert(
        "senderPublicKey".into(),
        json!(draft.sender_public_key().to_hex()),
    );
    out.insert("fee".into(), json!(draft.fee().to_string()));

    if let Some(asset) = draft.asset() {
        // Attached assets passed `validate`, so the total fits.
        if let Ok(amount) = asset.amount() {
            out.insert("amount".into(), json!(amount.to_string()));
        }
        if let Some(recipient) = asset.recipient() {
            out.insert("recipientId".into(), json!(recipient.to_string()));
        }
        if let Asset::Transfer { expiration, .. } = asset {
            out.insert("expiration".into(), json!(expiration));
        }
        if let Some(asset_json) = asset.to_json() {
            out.insert("asset".into(), asset_json);
        }
    }
    if let Some(vendor) = draft.vendor_field() {
        out.insert("vendorField".into(), json!(vendor));
    }
    if let Some(sig) = draft.signature() {
        out.insert("signature".into(), json!(sig.to_hex()));
    }
    if let Some(sig) = draft.second_signature() {
        out.insert("secondSignature".into(), json!(sig.to_hex()));
    }
    if !draft.signatures().is_empty() {
        let sigs: Vec<String> = draft
            .signatures()
            .iter()
            .map(|s| format!("{:02x}{}", s.index, s.signature.to_hex()))
            .collect();
        out.insert("signatures".into(), json!(sigs));
    }
    out.insert("id".into(), json!(id.to_hex()));
    Value::Object(out)
}

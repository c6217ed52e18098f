//! # Transaction Module
//!
//! Construction, signing and verification of ledger transactions. Every
//! command the composer runs ends up here as one or more
//! [`TransactionDraft`]s.
//!
//! ## Architecture
//!
//! ```text
//! types.rs       : TransactionKind, Vote, Payment, TransactionId
//! asset.rs       : the Asset tagged union with per-kind validation and fees
//! htlc.rs        : hashed-timelock secrets, expirations and claim checks
//! entity.rs      : entity registry assets from free-text prompt arguments
//! resolver.rs    : settings + gathered ledger facts → Asset
//! draft.rs       : TransactionDraft lifecycle and SignedTransaction
//! codec.rs       : canonical byte layout, signing hashes, JSON rendering
//! signing.rs     : primary, second and co-signature orchestration
//! verification.rs: self-verification of signed drafts
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Open**: [`TransactionDraft::new`] fixes kind, nonce and sender.
//! 2. **Resolve**: [`resolver::resolve_asset`] builds the payload.
//! 3. **Sign**: [`apply_signatures`] runs a [`SigningPlan`] in the order the
//!    signature coverage rules require.
//! 4. **Verify**: [`enforce_verifiable`] refuses anything that does not
//!    verify, except threshold transactions still waiting for co-signers.
//! 5. **Finalize**: [`TransactionDraft::finalize`] yields the id and bytes.

pub mod asset;
pub mod codec;
pub mod draft;
pub mod entity;
pub mod htlc;
pub mod resolver;
pub mod signing;
pub mod types;
pub mod verification;

pub use asset::{Asset, AssetError};
pub use codec::SerializeOptions;
pub use draft::{DraftError, DraftState, IndexedSignature, SignedTransaction, TransactionDraft};
pub use entity::{EntityAction, EntityAsset, EntityError, EntitySubType, EntityType};
pub use htlc::{ExpirationKind, HtlcError, LockExpiration};
pub use resolver::{resolve_asset, resolve_vendor_field, ResolveContext, ResolveError};
pub use signing::{apply_signatures, multi_sign, second_sign, sign, SigningError, SigningPlan};
pub use types::{Payment, TransactionId, TransactionKind, Vote};
pub use verification::{enforce_verifiable, verify_multi_signatures, VerificationOutcome};

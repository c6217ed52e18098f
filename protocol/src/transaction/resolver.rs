//! Asset resolvers: turn settings plus pre-gathered ledger facts into a
//! typed [`Asset`].
//!
//! Resolution never touches the network. Everything it needs from the
//! ledger (account vote, network time, last lock id) is collected up front
//! and handed in through [`ResolveContext`]. The only other input is the
//! random number generator, which callers seed in tests.

use rand::Rng;
use thiserror::Error;

use crate::config::{
    Network, DEFAULT_SECOND_SECRET, DELEGATE_NAME_KEY_PREFIX, MAX_MULTI_PAYMENTS,
    SYNTHETIC_PAYMENTS_MAX, SYNTHETIC_PAYMENTS_MIN,
};
use crate::crypto::{KeyError, KeyPair, PublicKey, SignatureScheme};
use crate::identity::{Address, MultiSignatureError};
use crate::settings::Settings;

use super::asset::{Asset, AssetError};
use super::entity::{EntityAsset, EntityError};
use super::htlc;
use super::types::{Payment, TransactionKind, Vote};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no lock transaction found for the sender and none configured")]
    MissingLockTransaction,

    #[error("invalid entity: {0}")]
    InvalidEntity(#[from] EntityError),

    #[error("no test wallets configured to receive payments")]
    NoTestWallets,

    #[error(transparent)]
    InvalidAsset(#[from] AssetError),

    #[error(transparent)]
    MultiSignature(#[from] MultiSignatureError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Everything a resolver may read.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub settings: &'a Settings,
    pub network: Network,
    /// Scheme for keys derived during resolution.
    pub scheme: SignatureScheme,
    /// Key of the signing sender (never the threshold identity).
    pub sender_public_key: &'a PublicKey,
    /// Delegate the sender currently votes for, per the ledger.
    pub sender_vote: Option<&'a str>,
    pub recipient: &'a Address,
    pub network_time: u64,
    /// Most recent lock sent by the effective sender, per the ledger.
    pub last_lock_id: Option<&'a str>,
    pub test_wallets: &'a [Address],
    /// Extra prompt arguments, used by entity transactions.
    pub entity_args: &'a [String],
}

/// Builds the asset for one unit of `kind`.
pub fn resolve_asset<R: Rng + ?Sized>(
    kind: TransactionKind,
    ctx: &ResolveContext<'_>,
    rng: &mut R,
) -> Result<Asset, ResolveError> {
    let settings = ctx.settings;
    let asset = match kind {
        TransactionKind::Transfer => Asset::Transfer {
            recipient: *ctx.recipient,
            amount: settings.amount,
            expiration: settings.expiration.unwrap_or(0),
        },
        TransactionKind::SecondSignature => {
            let secret = settings
                .second_secret
                .as_deref()
                .unwrap_or(DEFAULT_SECOND_SECRET);
            Asset::SecondSignature {
                public_key: KeyPair::from_secret(secret, ctx.scheme)?.public_key().clone(),
            }
        }
        TransactionKind::DelegateRegistration => Asset::DelegateRegistration {
            username: settings
                .delegate_name
                .clone()
                .unwrap_or_else(|| default_delegate_name(ctx.sender_public_key)),
        },
        TransactionKind::Vote => Asset::Vote {
            votes: vec![resolve_vote(ctx)],
        },
        TransactionKind::MultiSignature => {
            Asset::MultiSignature(settings.multi_signature.asset(ctx.scheme)?)
        }
        TransactionKind::Ipfs => Asset::Ipfs {
            hash: settings.ipfs.clone(),
        },
        TransactionKind::MultiPayment => Asset::MultiPayment {
            payments: resolve_payments(settings, ctx.test_wallets, rng)?,
        },
        TransactionKind::DelegateResignation => Asset::DelegateResignation,
        TransactionKind::HtlcLock => Asset::HtlcLock {
            recipient: *ctx.recipient,
            amount: settings.amount,
            secret_hash: htlc::secret_hash_bytes_for(&settings.htlc.lock.secret),
            expiration: settings.htlc.lock.expiration.normalized(ctx.network_time),
        },
        TransactionKind::HtlcClaim => Asset::HtlcClaim {
            lock_transaction_id: lock_reference(
                settings.htlc.claim.lock_transaction_id.as_deref(),
                ctx,
            )?,
            unlock_secret: settings
                .htlc
                .claim
                .unlock_secret
                .clone()
                .unwrap_or_else(|| htlc::unlock_secret_for(&settings.htlc.lock.secret)),
        },
        TransactionKind::HtlcRefund => Asset::HtlcRefund {
            lock_transaction_id: lock_reference(
                settings.htlc.refund.lock_transaction_id.as_deref(),
                ctx,
            )?,
        },
        TransactionKind::Entity => Asset::Entity(EntityAsset::from_args(ctx.entity_args)?),
    };
    Ok(asset)
}

/// `delegate.` followed by the first ten hex characters of the sender key.
pub fn default_delegate_name(sender_public_key: &PublicKey) -> String {
    let hex = sender_public_key.to_hex();
    format!("delegate.{}", &hex[..DELEGATE_NAME_KEY_PREFIX])
}

/// Explicit vote, else explicit unvote, else undo the current vote, else
/// vote for ourselves.
fn resolve_vote(ctx: &ResolveContext<'_>) -> Vote {
    let settings = ctx.settings;
    if let Some(target) = &settings.vote {
        Vote::Cast(target.clone())
    } else if let Some(target) = &settings.unvote {
        Vote::Revoke(target.clone())
    } else if let Some(current) = ctx.sender_vote {
        Vote::Revoke(current.to_string())
    } else {
        Vote::Cast(ctx.sender_public_key.to_hex())
    }
}

fn resolve_payments<R: Rng + ?Sized>(
    settings: &Settings,
    test_wallets: &[Address],
    rng: &mut R,
) -> Result<Vec<Payment>, ResolveError> {
    if !settings.multi_payments.is_empty() {
        if settings.multi_payments.len() > MAX_MULTI_PAYMENTS {
            return Err(AssetError::PaymentCount(settings.multi_payments.len()).into());
        }
        return Ok(settings.multi_payments.clone());
    }
    if test_wallets.is_empty() {
        return Err(ResolveError::NoTestWallets);
    }
    let count = rng.gen_range(SYNTHETIC_PAYMENTS_MIN..=SYNTHETIC_PAYMENTS_MAX);
    Ok((0..count)
        .map(|i| Payment {
            recipient_id: test_wallets[i % test_wallets.len()],
            amount: 1,
        })
        .collect())
}

fn lock_reference(configured: Option<&str>, ctx: &ResolveContext<'_>) -> Result<String, ResolveError> {
    configured
        .or(ctx.last_lock_id)
        .map(str::to_string)
        .ok_or(ResolveError::MissingLockTransaction)
}

/// The configured vendor field when `kind` cannot carry one.
pub fn ignored_vendor_field(kind: TransactionKind, settings: &Settings) -> Option<&str> {
    if kind.is_memo_eligible() {
        return None;
    }
    settings.vendor_field.value.as_deref()
}

/// The vendor field for one unit of `kind`, if any.
///
/// Only memo-eligible kinds get one: the configured value, else a random
/// placeholder when randomization is on.
pub fn resolve_vendor_field<R: Rng + ?Sized>(
    kind: TransactionKind,
    settings: &Settings,
    rng: &mut R,
) -> Option<String> {
    if !kind.is_memo_eligible() {
        return None;
    }
    match &settings.vendor_field.value {
        Some(value) => Some(value.clone()),
        None if settings.vendor_field.random => Some(rng.gen::<f64>().to_string()),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::htlc::{ExpirationKind, LockExpiration};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        settings: Settings,
        sender: PublicKey,
        recipient: Address,
        wallets: Vec<Address>,
        args: Vec<String>,
    }

    impl Fixture {
        fn new() -> Self {
            let sender = KeyPair::from_secret("sender", SignatureScheme::Ecdsa)
                .unwrap()
                .public_key()
                .clone();
            let recipient_keys = KeyPair::from_secret("recipient", SignatureScheme::Ecdsa).unwrap();
            let recipient = Address::from_public_key(recipient_keys.public_key(), Network::Testnet);
            Self {
                settings: Settings::default(),
                sender,
                recipient,
                wallets: vec![recipient],
                args: Vec::new(),
            }
        }

        fn ctx(&self) -> ResolveContext<'_> {
            ResolveContext {
                settings: &self.settings,
                network: Network::Testnet,
                scheme: SignatureScheme::Ecdsa,
                sender_public_key: &self.sender,
                sender_vote: None,
                recipient: &self.recipient,
                network_time: 1_000_000,
                last_lock_id: None,
                test_wallets: &self.wallets,
                entity_args: &self.args,
            }
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_transfer_defaults() {
        let f = Fixture::new();
        let asset = resolve_asset(TransactionKind::Transfer, &f.ctx(), &mut rng()).unwrap();
        assert_eq!(
            asset,
            Asset::Transfer {
                recipient: f.recipient,
                amount: 1,
                expiration: 0
            }
        );
    }

    #[test]
    fn test_default_delegate_name() {
        let f = Fixture::new();
        let asset =
            resolve_asset(TransactionKind::DelegateRegistration, &f.ctx(), &mut rng()).unwrap();
        let expected = format!("delegate.{}", &f.sender.to_hex()[..10]);
        assert_eq!(asset, Asset::DelegateRegistration { username: expected });
    }

    #[test]
    fn test_second_signature_uses_default_secret() {
        let f = Fixture::new();
        let asset = resolve_asset(TransactionKind::SecondSignature, &f.ctx(), &mut rng()).unwrap();
        let expected = KeyPair::from_secret("second passphrase", SignatureScheme::Ecdsa).unwrap();
        assert_eq!(
            asset,
            Asset::SecondSignature {
                public_key: expected.public_key().clone()
            }
        );
    }

    #[test]
    fn test_vote_priority() {
        let mut f = Fixture::new();
        let self_vote = resolve_vote(&f.ctx());
        assert_eq!(self_vote, Vote::Cast(f.sender.to_hex()));

        let mut ctx = f.ctx();
        ctx.sender_vote = Some("02current");
        assert_eq!(resolve_vote(&ctx), Vote::Revoke("02current".into()));

        f.settings.unvote = Some("02old".into());
        assert_eq!(resolve_vote(&f.ctx()), Vote::Revoke("02old".into()));

        f.settings.vote = Some("02new".into());
        assert_eq!(resolve_vote(&f.ctx()), Vote::Cast("02new".into()));
    }

    #[test]
    fn test_synthetic_payments_round_robin() {
        let mut f = Fixture::new();
        let other = Address::from_public_key(&f.sender, Network::Testnet);
        f.wallets.push(other);
        let asset = resolve_asset(TransactionKind::MultiPayment, &f.ctx(), &mut rng()).unwrap();
        let Asset::MultiPayment { payments } = asset else {
            panic!("expected a multi-payment");
        };
        assert!((64..=128).contains(&payments.len()));
        assert!(payments.iter().all(|p| p.amount == 1));
        assert_eq!(payments[0].recipient_id, f.recipient);
        assert_eq!(payments[1].recipient_id, other);
        assert_eq!(payments[2].recipient_id, f.recipient);
    }

    #[test]
    fn test_explicit_payments_over_the_cap_are_rejected() {
        let mut f = Fixture::new();
        let payment = Payment {
            recipient_id: f.recipient,
            amount: 3,
        };
        f.settings.multi_payments = vec![payment.clone(); 200];
        assert_eq!(
            resolve_asset(TransactionKind::MultiPayment, &f.ctx(), &mut rng()),
            Err(ResolveError::InvalidAsset(AssetError::PaymentCount(200)))
        );

        f.settings.multi_payments = vec![payment; 128];
        let asset = resolve_asset(TransactionKind::MultiPayment, &f.ctx(), &mut rng()).unwrap();
        let Asset::MultiPayment { payments } = asset else {
            panic!("expected a multi-payment");
        };
        assert_eq!(payments.len(), 128);
    }

    #[test]
    fn test_htlc_lock_relative_expiration() {
        let f = Fixture::new();
        let asset = resolve_asset(TransactionKind::HtlcLock, &f.ctx(), &mut rng()).unwrap();
        let Asset::HtlcLock { expiration, secret_hash, .. } = asset else {
            panic!("expected a lock");
        };
        assert_eq!(
            expiration,
            LockExpiration {
                kind: ExpirationKind::EpochTimestamp,
                value: 1_000_416
            }
        );
        assert_eq!(secret_hash, htlc::secret_hash_bytes_for("htlc secret"));
    }

    #[test]
    fn test_claim_without_any_lock() {
        let f = Fixture::new();
        assert_eq!(
            resolve_asset(TransactionKind::HtlcClaim, &f.ctx(), &mut rng()),
            Err(ResolveError::MissingLockTransaction)
        );
        assert_eq!(
            resolve_asset(TransactionKind::HtlcRefund, &f.ctx(), &mut rng()),
            Err(ResolveError::MissingLockTransaction)
        );
    }

    #[test]
    fn test_claim_prefers_configured_lock() {
        let mut f = Fixture::new();
        f.settings.htlc.claim.lock_transaction_id = Some("configured".into());
        let mut ctx = f.ctx();
        ctx.last_lock_id = Some("from-ledger");
        let asset = resolve_asset(TransactionKind::HtlcClaim, &ctx, &mut rng()).unwrap();
        let Asset::HtlcClaim { lock_transaction_id, unlock_secret } = asset else {
            panic!("expected a claim");
        };
        assert_eq!(lock_transaction_id, "configured");
        assert_eq!(unlock_secret, htlc::unlock_secret_for("htlc secret"));

        let refund = resolve_asset(TransactionKind::HtlcRefund, &ctx, &mut rng()).unwrap();
        assert_eq!(
            refund,
            Asset::HtlcRefund {
                lock_transaction_id: "from-ledger".into()
            }
        );
    }

    #[test]
    fn test_entity_from_prompt_args() {
        let mut f = Fixture::new();
        f.args = vec!["developer".into(), "register".into(), "quill".into()];
        let asset = resolve_asset(TransactionKind::Entity, &f.ctx(), &mut rng()).unwrap();
        assert_eq!(asset.kind(), TransactionKind::Entity);

        f.args = vec!["guild".into()];
        assert!(matches!(
            resolve_asset(TransactionKind::Entity, &f.ctx(), &mut rng()),
            Err(ResolveError::InvalidEntity(_))
        ));
    }

    #[test]
    fn test_vendor_field_only_for_memo_kinds() {
        let mut settings = Settings::default();
        assert!(resolve_vendor_field(TransactionKind::Transfer, &settings, &mut rng()).is_some());
        assert!(resolve_vendor_field(TransactionKind::Vote, &settings, &mut rng()).is_none());

        settings.vendor_field.random = false;
        assert!(resolve_vendor_field(TransactionKind::HtlcLock, &settings, &mut rng()).is_none());

        settings.vendor_field.value = Some("memo".into());
        assert_eq!(
            resolve_vendor_field(TransactionKind::MultiPayment, &settings, &mut rng()).as_deref(),
            Some("memo")
        );
        assert!(resolve_vendor_field(TransactionKind::Ipfs, &settings, &mut rng()).is_none());
    }

    #[test]
    fn test_ignored_vendor_field_is_reported() {
        let mut settings = Settings::default();
        assert_eq!(ignored_vendor_field(TransactionKind::Vote, &settings), None);

        settings.vendor_field.value = Some("memo".into());
        assert_eq!(ignored_vendor_field(TransactionKind::Vote, &settings), Some("memo"));
        assert_eq!(ignored_vendor_field(TransactionKind::Entity, &settings), Some("memo"));
        assert_eq!(ignored_vendor_field(TransactionKind::Transfer, &settings), None);
    }
}

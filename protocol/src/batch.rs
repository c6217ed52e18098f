//! # Batch Pipeline
//!
//! One prompt command becomes one batch. A batch runs in four phases:
//!
//! ```text
//! plan_batch     : parse the request, pick the milestone and signature scheme
//! gather_context : every ledger read the batch needs, done up front
//! build_batch    : pure: allocate nonce, resolve, sign, verify, finalize
//! dispatch_batch : one submission for the whole batch
//! ```
//!
//! Only the gather and dispatch phases touch the ledger. Building is a pure
//! function of the [`BatchContext`], the settings, the nonce allocator and
//! the random number generator, so it is tested without any network double.
//!
//! A unit that fails to build aborts the whole batch. Nothing from an
//! aborted batch is ever dispatched.

use rand::seq::SliceRandom;
use rand::Rng;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Milestone, Network, DEFAULT_SECOND_SECRET};
use crate::crypto::{KeyError, KeyPair, PublicKey, SignatureScheme};
use crate::identity::{
    derive_multi_signature_identity, Address, MultiSignatureAsset, MultiSignatureError,
    MultiSignatureIdentity,
};
use crate::network::{AccountState, ClientError, DispatchClient, DispatchReport, LedgerClient};
use crate::nonce::{NonceAllocator, NonceSeed};
use crate::settings::Settings;
use crate::transaction::resolver::{
    ignored_vendor_field, resolve_asset, resolve_vendor_field, ResolveContext,
};
use crate::transaction::{
    apply_signatures, enforce_verifiable, DraftError, ResolveError, SignedTransaction,
    SigningError, SigningPlan, TransactionDraft, TransactionKind, VerificationOutcome,
};

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("empty command")]
    EmptyCommand,

    #[error("unsupported transaction kind: {0}")]
    UnsupportedKind(String),

    #[error("invalid quantity '{0}'")]
    InvalidQuantity(String),

    #[error("cannot determine the chain height: {0}")]
    Height(#[source] ClientError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    MultiSignature(#[from] MultiSignatureError),

    #[error(transparent)]
    Key(#[from] KeyError),
}

// ---------------------------------------------------------------------------
// Request & Plan
// ---------------------------------------------------------------------------

/// A parsed prompt line: `kind [quantity] [args…]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub kind: TransactionKind,
    pub quantity: usize,
    /// Everything after the quantity. Only entity transactions read it.
    pub args: Vec<String>,
}

impl BatchRequest {
    pub fn new(kind: TransactionKind, quantity: usize) -> Self {
        Self {
            kind,
            quantity,
            args: Vec::new(),
        }
    }
}

impl FromStr for BatchRequest {
    type Err = ComposeError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let kind_token = tokens.next().ok_or(ComposeError::EmptyCommand)?;
        let kind = kind_token
            .parse::<TransactionKind>()
            .map_err(|_| ComposeError::UnsupportedKind(kind_token.to_string()))?;
        let quantity = match tokens.next() {
            None => 1,
            Some(token) => match token.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ComposeError::InvalidQuantity(token.to_string())),
            },
        };
        Ok(Self {
            kind,
            quantity,
            args: tokens.map(str::to_string).collect(),
        })
    }
}

/// A request checked against the active milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub request: BatchRequest,
    pub milestone: Milestone,
    pub scheme: SignatureScheme,
}

/// Resolves the milestone at `height` and refuses kinds it has not enabled.
pub fn plan_batch(
    request: BatchRequest,
    network: Network,
    height: u64,
    force_ecdsa: bool,
) -> Result<BatchPlan, ComposeError> {
    let milestone = network.milestone_at(height);
    if request.kind.requires_aip11() && !milestone.aip11 {
        return Err(ComposeError::UnsupportedKind(request.kind.to_string()));
    }
    Ok(BatchPlan {
        scheme: SignatureScheme::select(milestone.aip11, force_ecdsa),
        request,
        milestone,
    })
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// The threshold identity a batch spends from, with its co-signers.
#[derive(Debug, Clone)]
pub struct ThresholdSender {
    pub asset: MultiSignatureAsset,
    pub identity: MultiSignatureIdentity,
    pub signers: Vec<(u8, KeyPair)>,
}

/// Everything a batch needs to know, resolved before the first unit.
#[derive(Debug, Clone)]
pub struct BatchContext {
    pub plan: BatchPlan,
    pub network: Network,
    /// The signing sender, as opposed to the threshold identity.
    pub sender: KeyPair,
    pub recipient: Address,
    pub threshold: Option<ThresholdSender>,
    /// The signing sender's account. `None` for cold wallets.
    pub sender_account: Option<AccountState>,
    pub nonce_seed: NonceSeed,
    pub network_time: u64,
    pub last_lock_id: Option<String>,
    pub test_wallets: Vec<Address>,
}

impl BatchContext {
    pub fn kind(&self) -> TransactionKind {
        self.plan.request.kind
    }

    /// The public key transactions are sent from: the threshold identity
    /// when spending from one, else the signer.
    pub fn effective_sender(&self) -> &PublicKey {
        match &self.threshold {
            Some(threshold) => &threshold.identity.public_key,
            None => self.sender.public_key(),
        }
    }

    /// The second-factor key: the configured second secret, else the default
    /// second secret when the account already registered a second key.
    pub fn second_keys(&self, settings: &Settings) -> Result<Option<KeyPair>, KeyError> {
        let registered = self
            .sender_account
            .as_ref()
            .is_some_and(|account| account.second_public_key.is_some());
        let secret = match (&settings.second_secret, registered) {
            (Some(secret), _) => secret.as_str(),
            (None, true) => DEFAULT_SECOND_SECRET,
            (None, false) => return Ok(None),
        };
        KeyPair::from_secret(secret, self.plan.scheme).map(Some)
    }

    /// Who signs each unit of this batch.
    pub fn signing_plan(&self, settings: &Settings) -> Result<SigningPlan, ComposeError> {
        if let Some(threshold) = &self.threshold {
            return Ok(SigningPlan::Threshold {
                signers: threshold.signers.clone(),
            });
        }
        let second = self.second_keys(settings)?;
        if self.kind() == TransactionKind::MultiSignature {
            let participants = settings
                .multi_signature
                .participants
                .iter()
                .map(|secret| KeyPair::from_secret(secret, self.plan.scheme))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(SigningPlan::Registration {
                participants,
                sender: self.sender.clone(),
                second,
            });
        }
        Ok(SigningPlan::Single {
            sender: self.sender.clone(),
            second,
        })
    }
}

/// The configured threshold identity and its co-signers under `scheme`.
pub fn threshold_sender(
    settings: &Settings,
    scheme: SignatureScheme,
    network: Network,
) -> Result<ThresholdSender, ComposeError> {
    let asset = settings.multi_signature.asset(scheme)?;
    let identity = derive_multi_signature_identity(&asset, network)?;
    let signers = settings
        .multi_signature
        .signers
        .iter()
        .map(|signer| Ok((signer.index, KeyPair::from_secret(&signer.secret, scheme)?)))
        .collect::<Result<Vec<_>, KeyError>>()?;
    Ok(ThresholdSender {
        asset,
        identity,
        signers,
    })
}

async fn lookup_account<L>(ledger: &L, identity: &str) -> Option<AccountState>
where
    L: LedgerClient + ?Sized,
{
    match ledger.get_account(identity).await {
        Ok(account) => account,
        Err(e) => {
            warn!(%identity, error = %e, "account lookup failed, treating as a cold wallet");
            None
        }
    }
}

/// Runs every ledger read the batch needs.
///
/// Only the height lookup is fatal: without it the milestone, and with it
/// the scheme and the set of buildable kinds, is unknown. Every other
/// failed read degrades to its cold-wallet default.
pub async fn gather_context<L, R>(
    ledger: &L,
    settings: &Settings,
    request: BatchRequest,
    rng: &mut R,
) -> Result<BatchContext, ComposeError>
where
    L: LedgerClient + ?Sized,
    R: Rng + ?Sized,
{
    let height = match settings.height {
        Some(height) => height,
        None => ledger.get_height().await.map_err(ComposeError::Height)?,
    };
    let network = settings.network;
    let plan = plan_batch(request, network, height, settings.ecdsa)?;
    let scheme = plan.scheme;
    let kind = plan.request.kind;

    let wallets = settings
        .test_wallets
        .iter()
        .map(|secret| KeyPair::from_secret(secret, scheme))
        .collect::<Result<Vec<_>, _>>()?;
    let test_wallets: Vec<Address> = wallets
        .iter()
        .map(|keys| Address::from_public_key(keys.public_key(), network))
        .collect();

    let sender = match &settings.secret {
        Some(secret) => KeyPair::from_secret(secret, scheme)?,
        None => wallets
            .choose(rng)
            .cloned()
            .ok_or(ResolveError::NoTestWallets)?,
    };
    let recipient = match settings.recipient {
        Some(recipient) => recipient,
        None => *test_wallets
            .choose(rng)
            .ok_or(ResolveError::NoTestWallets)?,
    };

    let sender_address = Address::from_public_key(sender.public_key(), network);
    let sender_account = lookup_account(ledger, &sender_address.to_string()).await;

    let threshold = if settings.multi_signature.enabled && kind != TransactionKind::MultiSignature {
        Some(threshold_sender(settings, scheme, network)?)
    } else {
        None
    };
    let observed = match &threshold {
        Some(threshold) => lookup_account(ledger, &threshold.identity.address.to_string())
            .await
            .map(|account| account.nonce),
        None => sender_account.as_ref().map(|account| account.nonce),
    };

    let network_time = if kind == TransactionKind::HtlcLock {
        ledger.get_network_time().await.unwrap_or_else(|e| {
            warn!(error = %e, "network time lookup failed, using 0");
            0
        })
    } else {
        0
    };

    let lock_configured = match kind {
        TransactionKind::HtlcClaim => settings.htlc.claim.lock_transaction_id.is_some(),
        TransactionKind::HtlcRefund => settings.htlc.refund.lock_transaction_id.is_some(),
        _ => true,
    };
    let last_lock_id = if lock_configured {
        None
    } else {
        ledger
            .find_last_lock_transaction(sender.public_key())
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "lock transaction lookup failed");
                None
            })
    };

    debug!(
        %kind,
        height,
        scheme = %scheme,
        sender = %sender_address,
        threshold = threshold.is_some(),
        "gathered batch context"
    );

    Ok(BatchContext {
        plan,
        network,
        sender,
        recipient,
        threshold,
        sender_account,
        nonce_seed: NonceSeed::new(settings.start_nonce, observed),
        network_time,
        last_lock_id,
        test_wallets,
    })
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Builds every unit of the batch, in order.
///
/// Each unit takes the next nonce of the effective sender, so a batch of N
/// carries N consecutive nonces. Any failure discards the whole batch.
pub fn build_batch<R: Rng + ?Sized>(
    ctx: &BatchContext,
    settings: &Settings,
    nonces: &mut NonceAllocator,
    rng: &mut R,
) -> Result<Vec<SignedTransaction>, ComposeError> {
    let kind = ctx.kind();
    let sender_key = ctx.effective_sender().clone();
    let nonce_key = sender_key.to_hex();
    let plan = ctx.signing_plan(settings)?;
    let second_public_key = match &plan {
        SigningPlan::Single { second, .. } | SigningPlan::Registration { second, .. } => {
            second.as_ref().map(|keys| keys.public_key().clone())
        }
        SigningPlan::Threshold { .. } => None,
    };
    let threshold_asset = ctx.threshold.as_ref().map(|threshold| &threshold.asset);

    let resolve_ctx = ResolveContext {
        settings,
        network: ctx.network,
        scheme: ctx.plan.scheme,
        sender_public_key: ctx.sender.public_key(),
        sender_vote: ctx
            .sender_account
            .as_ref()
            .and_then(|account| account.vote.as_deref()),
        recipient: &ctx.recipient,
        network_time: ctx.network_time,
        last_lock_id: ctx.last_lock_id.as_deref(),
        test_wallets: &ctx.test_wallets,
        entity_args: &ctx.plan.request.args,
    };

    if let Some(memo) = ignored_vendor_field(kind, settings) {
        warn!(%kind, vendor_field = memo, "kind carries no vendor field, ignoring the configured one");
    }

    let mut batch = Vec::with_capacity(ctx.plan.request.quantity);
    for unit in 0..ctx.plan.request.quantity {
        let nonce = nonces.next_nonce(&nonce_key, ctx.nonce_seed);
        let asset = resolve_asset(kind, &resolve_ctx, rng)?;

        let mut draft = TransactionDraft::new(
            kind,
            ctx.plan.milestone,
            ctx.network,
            nonce,
            sender_key.clone(),
        )?;
        draft.set_asset(asset)?;
        if let Some(fee) = settings.fee {
            draft.set_fee(fee)?;
        }
        if let Some(memo) = resolve_vendor_field(kind, settings, rng) {
            draft.set_vendor_field(memo)?;
        }

        apply_signatures(&mut draft, &plan)?;
        let signed = match enforce_verifiable(&draft, second_public_key.as_ref(), threshold_asset)? {
            VerificationOutcome::Verified => draft.finalize()?,
            VerificationOutcome::PendingThreshold => draft.finalize_pending()?,
        };
        debug!(unit, nonce, id = %signed.id().to_hex(), "built transaction");
        batch.push(signed);
    }

    info!(%kind, count = batch.len(), "batch built");
    Ok(batch)
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// What happened to a built batch.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Cold run, or nothing to send.
    Skipped,
    /// The ledger answered. Its errors, if any, are in the report verbatim.
    Sent(DispatchReport),
    /// The submission itself failed. Not retried.
    Failed(String),
}

/// Submits the whole batch in one call, unless this is a cold run.
pub async fn dispatch_batch<D>(
    client: &D,
    settings: &Settings,
    batch: &[SignedTransaction],
) -> DispatchOutcome
where
    D: DispatchClient + ?Sized,
{
    if batch.is_empty() || settings.coldrun {
        debug!(count = batch.len(), coldrun = settings.coldrun, "not dispatching");
        return DispatchOutcome::Skipped;
    }
    match client.submit(batch).await {
        Ok(report) => {
            match &report.errors {
                None => info!(count = batch.len(), accepted = report.accepted.len(), "batch sent"),
                Some(errors) => warn!(count = batch.len(), %errors, "ledger reported errors"),
            }
            DispatchOutcome::Sent(report)
        }
        Err(e) => {
            warn!(count = batch.len(), error = %e, "dispatch failed");
            DispatchOutcome::Failed(e.to_string())
        }
    }
}

/// A finished command.
#[derive(Debug, Clone)]
pub struct ComposedBatch {
    pub kind: TransactionKind,
    /// The threshold identity spent from, if any.
    pub threshold: Option<MultiSignatureIdentity>,
    /// The identity a registration batch creates.
    pub registered: Option<MultiSignatureIdentity>,
    pub transactions: Vec<SignedTransaction>,
    pub outcome: DispatchOutcome,
}

/// Plans, gathers, builds and dispatches one command.
pub async fn compose_batch<C, R>(
    client: &C,
    settings: &Settings,
    request: BatchRequest,
    nonces: &mut NonceAllocator,
    rng: &mut R,
) -> Result<ComposedBatch, ComposeError>
where
    C: LedgerClient + DispatchClient + ?Sized,
    R: Rng + ?Sized,
{
    let ctx = gather_context(client, settings, request, rng).await?;
    let transactions = build_batch(&ctx, settings, nonces, rng)?;
    let registered = if ctx.kind() == TransactionKind::MultiSignature {
        let asset = settings.multi_signature.asset(ctx.plan.scheme)?;
        Some(derive_multi_signature_identity(&asset, ctx.network)?)
    } else {
        None
    };
    let outcome = dispatch_batch(client, settings, &transactions).await;
    Ok(ComposedBatch {
        kind: ctx.kind(),
        threshold: ctx.threshold.map(|threshold| threshold.identity),
        registered,
        transactions,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{verification, Asset};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn context(kind: TransactionKind, quantity: usize, settings: &Settings) -> BatchContext {
        let plan = plan_batch(BatchRequest::new(kind, quantity), Network::Testnet, 10, false).unwrap();
        let sender = KeyPair::from_secret("sender", plan.scheme).unwrap();
        let recipient_keys = KeyPair::from_secret("recipient", plan.scheme).unwrap();
        let recipient = Address::from_public_key(recipient_keys.public_key(), Network::Testnet);
        let threshold = (settings.multi_signature.enabled && kind != TransactionKind::MultiSignature)
            .then(|| threshold_sender(settings, plan.scheme, Network::Testnet).unwrap());
        BatchContext {
            plan,
            network: Network::Testnet,
            sender,
            recipient,
            threshold,
            sender_account: None,
            nonce_seed: NonceSeed::new(settings.start_nonce, None),
            network_time: 1_000_000,
            last_lock_id: None,
            test_wallets: vec![recipient],
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_parse_request() {
        let request: BatchRequest = "0 3".parse().unwrap();
        assert_eq!(request, BatchRequest::new(TransactionKind::Transfer, 3));

        let entity: BatchRequest = "entity 1 developer register quill".parse().unwrap();
        assert_eq!(entity.kind, TransactionKind::Entity);
        assert_eq!(entity.args, vec!["developer", "register", "quill"]);

        assert_eq!("htlc-lock".parse::<BatchRequest>().unwrap().quantity, 1);
    }

    #[test]
    fn test_parse_request_errors() {
        assert!(matches!("   ".parse::<BatchRequest>(), Err(ComposeError::EmptyCommand)));
        assert!(matches!(
            "12".parse::<BatchRequest>(),
            Err(ComposeError::UnsupportedKind(token)) if token == "12"
        ));
        assert!(matches!(
            "0 zero".parse::<BatchRequest>(),
            Err(ComposeError::InvalidQuantity(_))
        ));
        assert!(matches!("0 0".parse::<BatchRequest>(), Err(ComposeError::InvalidQuantity(_))));
    }

    #[test]
    fn test_plan_refuses_kinds_before_milestone() {
        let request = BatchRequest::new(TransactionKind::MultiPayment, 1);
        assert!(matches!(
            plan_batch(request.clone(), Network::Mainnet, 1, false),
            Err(ComposeError::UnsupportedKind(_))
        ));
        let plan = plan_batch(request, Network::Testnet, 10, false).unwrap();
        assert_eq!(plan.scheme, SignatureScheme::Schnorr);
        assert_eq!(
            plan_batch(BatchRequest::new(TransactionKind::Transfer, 1), Network::Testnet, 10, true)
                .unwrap()
                .scheme,
            SignatureScheme::Ecdsa
        );
    }

    #[test]
    fn test_transfers_take_consecutive_nonces() {
        let settings = Settings {
            start_nonce: Some(5),
            ..Settings::default()
        };
        let ctx = context(TransactionKind::Transfer, 3, &settings);
        let mut nonces = NonceAllocator::new();
        let batch = build_batch(&ctx, &settings, &mut nonces, &mut rng()).unwrap();

        let got: Vec<u64> = batch.iter().map(|tx| tx.transaction().nonce()).collect();
        assert_eq!(got, vec![6, 7, 8]);
        for tx in &batch {
            assert!(verification::verify_signature(tx.transaction()));
            assert!(tx.transaction().vendor_field().is_some());
        }

        // The next command continues the cached sequence.
        let more = build_batch(&ctx, &settings, &mut nonces, &mut rng()).unwrap();
        assert_eq!(more[0].transaction().nonce(), 9);
    }

    #[test]
    fn test_second_signature_when_account_has_second_key() {
        let settings = Settings::default();
        let mut ctx = context(TransactionKind::Transfer, 1, &settings);
        let second = KeyPair::from_secret(DEFAULT_SECOND_SECRET, ctx.plan.scheme).unwrap();
        ctx.sender_account = Some(AccountState {
            second_public_key: Some(second.public_key().clone()),
            ..AccountState::default()
        });
        let batch = build_batch(&ctx, &settings, &mut NonceAllocator::new(), &mut rng()).unwrap();
        let tx = batch[0].transaction();
        assert!(tx.second_signature().is_some());
        assert!(verification::verify_second_signature(tx, second.public_key()));
    }

    #[test]
    fn test_threshold_sender_co_signs_only() {
        let mut settings = Settings::default();
        settings.multi_signature.enabled = true;
        let ctx = context(TransactionKind::Transfer, 1, &settings);
        let batch = build_batch(&ctx, &settings, &mut NonceAllocator::new(), &mut rng()).unwrap();
        let tx = batch[0].transaction();
        let threshold = ctx.threshold.as_ref().unwrap();

        assert_eq!(tx.sender_public_key(), &threshold.identity.public_key);
        assert!(tx.signature().is_none());
        assert_eq!(tx.signatures().len(), 3);
        assert!(verification::verify_multi_signatures(tx, &threshold.asset));
    }

    #[test]
    fn test_pending_threshold_is_tolerated() {
        let mut settings = Settings::default();
        settings.multi_signature.enabled = true;
        settings.multi_signature.signers.truncate(1);
        let ctx = context(TransactionKind::Transfer, 1, &settings);
        let batch = build_batch(&ctx, &settings, &mut NonceAllocator::new(), &mut rng()).unwrap();
        assert_eq!(batch[0].transaction().signatures().len(), 1);
    }

    #[test]
    fn test_threshold_without_signers_ships_unsigned() {
        let mut settings = Settings::default();
        settings.multi_signature.enabled = true;
        settings.multi_signature.signers.clear();
        let ctx = context(TransactionKind::Transfer, 2, &settings);
        let batch = build_batch(&ctx, &settings, &mut NonceAllocator::new(), &mut rng()).unwrap();

        assert_eq!(batch.len(), 2);
        let threshold = ctx.threshold.as_ref().unwrap();
        for tx in &batch {
            let draft = tx.transaction();
            assert_eq!(draft.sender_public_key(), &threshold.identity.public_key);
            assert!(draft.signature().is_none());
            assert!(draft.signatures().is_empty());
        }
    }

    #[test]
    fn test_registration_collects_every_participant() {
        let mut settings = Settings::default();
        settings.multi_signature.enabled = true;
        let ctx = context(TransactionKind::MultiSignature, 1, &settings);
        assert!(ctx.threshold.is_none());

        let batch = build_batch(&ctx, &settings, &mut NonceAllocator::new(), &mut rng()).unwrap();
        let tx = batch[0].transaction();
        assert_eq!(tx.sender_public_key(), ctx.sender.public_key());
        assert_eq!(tx.signatures().len(), 3);
        assert!(tx.signature().is_some());
        assert!(matches!(tx.asset(), Some(Asset::MultiSignature(_))));
    }

    #[test]
    fn test_failing_unit_discards_batch() {
        let settings = Settings::default();
        let ctx = context(TransactionKind::HtlcClaim, 2, &settings);
        let result = build_batch(&ctx, &settings, &mut NonceAllocator::new(), &mut rng());
        assert!(matches!(
            result,
            Err(ComposeError::Resolve(ResolveError::MissingLockTransaction))
        ));
    }

    #[test]
    fn test_fee_override_applies_to_every_unit() {
        let settings = Settings {
            fee: Some(123),
            ..Settings::default()
        };
        let ctx = context(TransactionKind::Vote, 2, &settings);
        let batch = build_batch(&ctx, &settings, &mut NonceAllocator::new(), &mut rng()).unwrap();
        assert!(batch.iter().all(|tx| tx.transaction().fee() == 123));
        assert!(batch.iter().all(|tx| tx.transaction().vendor_field().is_none()));
    }
}

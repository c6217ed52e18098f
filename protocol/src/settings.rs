//! Composer settings with TOML file support.
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! working testnet setup against a local node. Command-line flags are
//! layered on top by the composer binary.
//!
//! ```toml
//! network = "devnet"
//! peer = "http://127.0.0.1:4003"
//! secret = "my sender secret"
//!
//! [multi_signature]
//! enabled = true
//! min = 2
//! signers = [{ index = 0, secret = "multisig participant 1" }]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::config::{
    Network, DEFAULT_HTLC_EXPIRATION_SECONDS, DEFAULT_HTLC_SECRET, DEFAULT_IPFS_HASH,
    DEFAULT_MULTI_SIGNATURE_MIN, DEFAULT_MULTI_SIGNATURE_PARTICIPANTS, DEFAULT_PEER,
    MAX_VENDOR_FIELD_BYTES, TEST_WALLET_SECRETS,
};
use crate::crypto::SignatureScheme;
use crate::identity::{Address, MultiSignatureAsset, MultiSignatureError};
use crate::transaction::htlc::{ExpirationKind, LockExpiration};
use crate::transaction::types::Payment;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),

    #[error("invalid multi-signature settings: {0}")]
    MultiSignature(#[from] MultiSignatureError),
}

/// Vendor field ("memo") behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorFieldSettings {
    /// Fixed memo for memo-eligible kinds.
    pub value: Option<String>,
    /// Attach a random placeholder when no value is set.
    pub random: bool,
}

impl Default for VendorFieldSettings {
    fn default() -> Self {
        Self {
            value: None,
            random: true,
        }
    }
}

/// A co-signer of the configured threshold identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoSigner {
    pub index: u8,
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiSignatureSettings {
    /// Spend from the threshold identity instead of the sender.
    pub enabled: bool,
    /// Participant secrets, in identity order.
    pub participants: Vec<String>,
    pub min: u8,
    /// Participants that co-sign threshold spends.
    pub signers: Vec<CoSigner>,
}

impl Default for MultiSignatureSettings {
    fn default() -> Self {
        let participants: Vec<String> = DEFAULT_MULTI_SIGNATURE_PARTICIPANTS
            .iter()
            .map(|s| s.to_string())
            .collect();
        let signers = participants
            .iter()
            .enumerate()
            .map(|(index, secret)| CoSigner {
                index: index as u8,
                secret: secret.clone(),
            })
            .collect();
        Self {
            enabled: false,
            participants,
            min: DEFAULT_MULTI_SIGNATURE_MIN,
            signers,
        }
    }
}

impl MultiSignatureSettings {
    /// The threshold asset described by these settings.
    pub fn asset(&self, scheme: SignatureScheme) -> Result<MultiSignatureAsset, MultiSignatureError> {
        MultiSignatureAsset::from_secrets(self.min, &self.participants, scheme)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtlcLockSettings {
    /// Seed of the lock's unlock secret.
    pub secret: String,
    pub expiration: LockExpiration,
}

impl Default for HtlcLockSettings {
    fn default() -> Self {
        Self {
            secret: DEFAULT_HTLC_SECRET.to_string(),
            expiration: LockExpiration {
                kind: ExpirationKind::EpochTimestamp,
                value: DEFAULT_HTLC_EXPIRATION_SECONDS,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtlcClaimSettings {
    /// Defaults to the sender's most recent lock.
    pub lock_transaction_id: Option<String>,
    /// Defaults to the unlock secret of the lock seed.
    pub unlock_secret: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtlcRefundSettings {
    pub lock_transaction_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtlcSettings {
    pub lock: HtlcLockSettings,
    pub claim: HtlcClaimSettings,
    pub refund: HtlcRefundSettings,
}

/// Everything the composer can be told about a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub network: Network,
    /// Base URL of the ledger API.
    pub peer: String,
    /// Print every built transaction.
    pub verbose: bool,
    /// Sign with ECDSA even where Schnorr is available.
    pub ecdsa: bool,
    /// Sender secret. Defaults to a random test wallet.
    pub secret: Option<String>,
    /// Build and sign, but never submit.
    pub coldrun: bool,
    /// Defaults to a random test wallet.
    pub recipient: Option<Address>,
    pub start_nonce: Option<u64>,
    /// Transfer expiration height. Unset means no expiration.
    pub expiration: Option<u32>,
    /// Amount for transfers and locks, in the smallest unit.
    pub amount: u64,
    /// Overrides the static fee.
    pub fee: Option<u64>,
    pub vendor_field: VendorFieldSettings,
    pub second_secret: Option<String>,
    pub delegate_name: Option<String>,
    pub vote: Option<String>,
    pub unvote: Option<String>,
    pub multi_signature: MultiSignatureSettings,
    pub ipfs: String,
    /// Explicit multi-payment list. Empty means synthesize one.
    pub multi_payments: Vec<Payment>,
    pub htlc: HtlcSettings,
    /// Funded wallets used as fallback senders and recipients.
    pub test_wallets: Vec<String>,
    /// Pins the milestone height instead of asking the ledger.
    pub height: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: Network::default(),
            peer: DEFAULT_PEER.to_string(),
            verbose: true,
            ecdsa: false,
            secret: None,
            coldrun: false,
            recipient: None,
            start_nonce: None,
            expiration: None,
            amount: 1,
            fee: None,
            vendor_field: VendorFieldSettings::default(),
            second_secret: None,
            delegate_name: None,
            vote: None,
            unvote: None,
            multi_signature: MultiSignatureSettings::default(),
            ipfs: DEFAULT_IPFS_HASH.to_string(),
            multi_payments: Vec::new(),
            htlc: HtlcSettings::default(),
            test_wallets: TEST_WALLET_SECRETS.iter().map(|s| s.to_string()).collect(),
            height: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from a TOML string and validate them.
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that do not need the ledger.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.peer.trim().is_empty() {
            return Err(SettingsError::Invalid("peer must not be empty".into()));
        }
        if self.test_wallets.is_empty() {
            return Err(SettingsError::Invalid(
                "at least one test wallet secret is required".into(),
            ));
        }
        if let Some(value) = &self.vendor_field.value {
            if value.len() > MAX_VENDOR_FIELD_BYTES {
                return Err(SettingsError::Invalid(format!(
                    "vendor_field.value is {} bytes, the limit is {MAX_VENDOR_FIELD_BYTES}",
                    value.len()
                )));
            }
        }
        let version = self.network.address_version();
        let addresses = self
            .recipient
            .iter()
            .chain(self.multi_payments.iter().map(|p| &p.recipient_id));
        for address in addresses {
            if address.version() != version {
                return Err(SettingsError::Invalid(format!(
                    "address {address} does not belong to {}",
                    self.network
                )));
            }
        }

        let multi = &self.multi_signature;
        if multi.enabled || !multi.participants.is_empty() {
            multi.asset(SignatureScheme::Ecdsa)?;
        }
        for signer in &multi.signers {
            if usize::from(signer.index) >= multi.participants.len() {
                return Err(SettingsError::Invalid(format!(
                    "co-signer index {} is out of range for {} participants",
                    signer.index,
                    multi.participants.len()
                )));
            }
        }
        Ok(())
    }

    /// Serialize the settings to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.network, Network::Testnet);
        assert_eq!(settings.peer, "http://localhost:4003");
        assert!(settings.verbose);
        assert!(settings.vendor_field.random);
        assert_eq!(settings.amount, 1);
        assert_eq!(settings.multi_signature.min, 2);
        assert_eq!(settings.multi_signature.participants.len(), 3);
        assert_eq!(settings.htlc.lock.expiration.value, 416);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            network = "devnet"
            coldrun = true
            start_nonce = 5

            [vendor_field]
            value = "hello"

            [htlc.lock.expiration]
            type = "block_height"
            value = 1000
        "#;
        let settings = Settings::from_toml_str(toml).unwrap();
        assert_eq!(settings.network, Network::Devnet);
        assert!(settings.coldrun);
        assert_eq!(settings.start_nonce, Some(5));
        assert_eq!(settings.vendor_field.value.as_deref(), Some("hello"));
        assert!(settings.vendor_field.random);
        assert_eq!(settings.htlc.lock.expiration.kind, ExpirationKind::BlockHeight);
        assert_eq!(settings.htlc.lock.secret, "htlc secret");
    }

    #[test]
    fn rejects_out_of_range_co_signer() {
        let toml = r#"
            [multi_signature]
            signers = [{ index = 7, secret = "x" }]
        "#;
        assert!(matches!(
            Settings::from_toml_str(toml),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_invalid_threshold() {
        let toml = r#"
            [multi_signature]
            min = 4
            signers = []
        "#;
        assert!(matches!(
            Settings::from_toml_str(toml),
            Err(SettingsError::MultiSignature(_))
        ));
    }

    #[test]
    fn rejects_recipient_of_other_network() {
        // A mainnet-version address while running on devnet.
        let toml = r#"
            network = "devnet"
            recipient = "ANBkoGqWeTSiaEVgVzSKZd3jS7UWzv9PSo"
        "#;
        assert!(matches!(
            Settings::from_toml_str(toml),
            Err(SettingsError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Settings::from_toml_str("network = 12"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"coldrun = true\n").unwrap();
        let settings = Settings::from_toml_file(file.path()).unwrap();
        assert!(settings.coldrun);
        assert!(Settings::from_toml_file("/definitely/not/here.toml").is_err());
    }

    #[test]
    fn default_settings_round_trip_through_toml() {
        let settings = Settings::default();
        let text = settings.to_toml_string().unwrap();
        assert_eq!(Settings::from_toml_str(&text).unwrap(), settings);
    }
}

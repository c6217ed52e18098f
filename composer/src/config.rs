//! Settings loading: the TOML file first, command-line flags on top.

use anyhow::{Context, Result};

use quill_protocol::settings::Settings;

use crate::cli::GlobalArgs;

/// Loads the settings file named by `--config` (or the defaults), applies
/// the flag overrides and validates the result.
pub fn load_settings(args: &GlobalArgs) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_toml_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    apply_overrides(&mut settings, args);
    settings.validate().context("invalid settings after applying flags")?;
    Ok(settings)
}

/// Flags win over file values. Boolean flags can only switch a behaviour
/// on.
pub fn apply_overrides(settings: &mut Settings, args: &GlobalArgs) {
    if let Some(peer) = &args.peer {
        settings.peer = peer.clone();
    }
    if let Some(network) = args.network {
        settings.network = network;
    }
    if let Some(secret) = &args.secret {
        settings.secret = Some(secret.clone());
    }
    if let Some(start_nonce) = args.start_nonce {
        settings.start_nonce = Some(start_nonce);
    }
    settings.coldrun |= args.coldrun;
    settings.ecdsa |= args.ecdsa;
}

// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Quill Composer
//!
//! Entry point for the `quill` binary. Parses CLI arguments, initializes
//! logging, loads settings and runs the requested subcommand:
//!
//! - `run`     : the interactive prompt (also the default)
//! - `derive`  : public keys and addresses of a secret
//! - `multisig`: the configured threshold identity
//! - `version` : build version information

mod cli;
mod config;
mod logging;
mod session;

use anyhow::{Context, Result};
use clap::Parser;

use quill_protocol::crypto::SignatureScheme;
use quill_protocol::identity::{derive_address, derive_key_pair, derive_multi_signature_identity};
use quill_protocol::network::HttpLedgerClient;
use quill_protocol::settings::Settings;

use cli::{Commands, QuillCli};
use session::Session;

const SCHEMES: [SignatureScheme; 2] = [SignatureScheme::Ecdsa, SignatureScheme::Schnorr];

#[tokio::main]
async fn main() -> Result<()> {
    let cli = QuillCli::parse();
    logging::init_logging(logging::DEFAULT_FILTER, cli.global.log_format);

    let command = cli.command.unwrap_or(Commands::Run);
    if let Commands::Version = command {
        print_version();
        return Ok(());
    }

    let settings = config::load_settings(&cli.global)?;
    match command {
        Commands::Run => run_session(settings).await,
        Commands::Derive { secret } => derive(&settings, &secret),
        Commands::Multisig => multisig(&settings),
        Commands::Version => Ok(()),
    }
}

async fn run_session(settings: Settings) -> Result<()> {
    tracing::info!(
        network = %settings.network,
        peer = %settings.peer,
        coldrun = settings.coldrun,
        multi_signature = settings.multi_signature.enabled,
        "starting quill"
    );
    let client = HttpLedgerClient::new(settings.peer.clone())
        .with_context(|| format!("failed to create a client for {}", settings.peer))?;
    Session::new(client, settings).run().await
}

fn derive(settings: &Settings, secret: &str) -> Result<()> {
    for scheme in SCHEMES {
        let keys = derive_key_pair(secret, scheme)
            .with_context(|| format!("cannot derive a {scheme} key pair"))?;
        println!("{scheme}");
        println!("  Public key : {}", keys.public_key());
        println!("  Address    : {}", derive_address(keys.public_key(), settings.network));
    }
    Ok(())
}

fn multisig(settings: &Settings) -> Result<()> {
    let multi = &settings.multi_signature;
    println!("{}-of-{} on {}", multi.min, multi.participants.len(), settings.network);
    for scheme in SCHEMES {
        let asset = multi.asset(scheme).context("invalid multi-signature settings")?;
        let identity = derive_multi_signature_identity(&asset, settings.network)?;
        println!("{scheme}");
        for (index, key) in asset.public_keys.iter().enumerate() {
            println!("  Participant {index:<2}: {key}");
        }
        println!("  Public key    : {}", identity.public_key);
        println!("  Address       : {}", identity.address);
    }
    Ok(())
}

fn print_version() {
    println!("quill {}", env!("CARGO_PKG_VERSION"));
    println!("rustc {}", option_env!("RUSTC_VERSION").unwrap_or("unknown"));
}

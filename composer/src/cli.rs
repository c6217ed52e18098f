//! # CLI Interface
//!
//! Command-line structure of `quill`, via `clap` derive. Without a
//! subcommand the prompt loop starts, exactly as with `quill run`.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use quill_protocol::config::Network;

use crate::logging::LogFormat;

/// Quill transaction composer.
///
/// Reads `kind [quantity] [args…]` lines at the `Ѧ ` prompt and turns each
/// into a signed batch of ledger transactions.
#[derive(Parser, Debug)]
#[command(name = "quill", about = "Quill transaction composer", version, propagate_version = true)]
pub struct QuillCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags shared by every subcommand. Each one overrides the settings file.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Settings file (TOML). Built-in defaults apply when omitted.
    #[arg(long, short = 'c', env = "QUILL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the ledger API.
    #[arg(long, env = "QUILL_PEER", global = true)]
    pub peer: Option<String>,

    /// mainnet, devnet or testnet.
    #[arg(long, env = "QUILL_NETWORK", global = true)]
    pub network: Option<Network>,

    /// Sender secret. A random test wallet is used when omitted.
    ///
    /// Visible in the process list; prefer the settings file or the
    /// environment variable.
    #[arg(long, env = "QUILL_SECRET", global = true, hide_env_values = true)]
    pub secret: Option<String>,

    /// Build and sign, but never submit.
    #[arg(long, env = "QUILL_COLDRUN", global = true)]
    pub coldrun: bool,

    /// Sign with ECDSA even where Schnorr is available.
    #[arg(long, env = "QUILL_ECDSA", global = true)]
    pub ecdsa: bool,

    /// Nonce the first transaction of a fresh sender follows.
    #[arg(long, env = "QUILL_START_NONCE", global = true)]
    pub start_nonce: Option<u64>,

    #[arg(long, env = "QUILL_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive prompt (the default).
    Run,
    /// Print the public keys and addresses of a secret under both schemes.
    Derive {
        secret: String,
    },
    /// Print the configured threshold identity.
    Multisig,
    /// Print version information and exit.
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        QuillCli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_run() {
        let cli = QuillCli::try_parse_from(["quill", "--coldrun", "--start-nonce", "5"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.global.coldrun);
        assert_eq!(cli.global.start_nonce, Some(5));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = QuillCli::try_parse_from(["quill", "derive", "abc", "--network", "devnet"]).unwrap();
        assert_eq!(cli.global.network, Some(Network::Devnet));
        assert!(matches!(cli.command, Some(Commands::Derive { secret }) if secret == "abc"));
    }
}

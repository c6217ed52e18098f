//! # Prompt Session
//!
//! The interactive loop: print `Ѧ `, read a command, compose the batch,
//! report. A failed command only prints its error; the loop always comes
//! back to the prompt. Ctrl-C or end of input ends the session.
//!
//! The session owns the one piece of state that outlives a command: the
//! nonce allocator.

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use quill_protocol::batch::{compose_batch, BatchRequest, ComposeError, ComposedBatch, DispatchOutcome};
use quill_protocol::identity::MultiSignatureIdentity;
use quill_protocol::network::{DispatchClient, LedgerClient};
use quill_protocol::nonce::NonceAllocator;
use quill_protocol::settings::Settings;

pub const PROMPT: &str = "Ѧ ";

pub struct Session<C> {
    client: C,
    settings: Settings,
    nonces: NonceAllocator,
    rng: StdRng,
}

impl<C> Session<C>
where
    C: LedgerClient + DispatchClient,
{
    pub fn new(client: C, settings: Settings) -> Self {
        Self::with_rng(client, settings, StdRng::from_entropy())
    }

    pub fn with_rng(client: C, settings: Settings, rng: StdRng) -> Self {
        Self {
            client,
            settings,
            nonces: NonceAllocator::new(),
            rng,
        }
    }

    /// Runs one prompt line. Blank lines do nothing.
    pub async fn execute(&mut self, line: &str) -> Result<Option<ComposedBatch>, ComposeError> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        let request: BatchRequest = line.parse()?;
        let batch = compose_batch(
            &self.client,
            &self.settings,
            request,
            &mut self.nonces,
            &mut self.rng,
        )
        .await?;
        Ok(Some(batch))
    }

    /// The prompt loop. Returns on Ctrl-C or end of input.
    pub async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print_prompt()?;
            let line = tokio::select! {
                line = lines.next_line() => line.context("failed to read from stdin")?,
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
                    }
                    println!();
                    break;
                }
            };
            let Some(line) = line else {
                break;
            };
            match self.execute(&line).await {
                Ok(Some(batch)) => {
                    for output in render_batch(&batch, self.settings.verbose) {
                        println!("{output}");
                    }
                }
                Ok(None) => {}
                Err(e) => println!("{e}"),
            }
        }
        tracing::info!("session ended");
        Ok(())
    }
}

fn print_prompt() -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{PROMPT}")?;
    stdout.flush()?;
    Ok(())
}

fn identity_json(identity: &MultiSignatureIdentity) -> serde_json::Value {
    json!({
        "publicKey": identity.public_key.to_hex(),
        "address": identity.address.to_string(),
    })
}

/// What the operator sees for a finished batch, one entry per block of
/// output.
pub fn render_batch(batch: &ComposedBatch, verbose: bool) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(identity) = &batch.threshold {
        out.push(format!("MultiSignature: {:#}", identity_json(identity)));
    }
    if let Some(identity) = &batch.registered {
        out.push(format!("Created MultiSignature address: {}", identity.address));
    }
    if verbose {
        for tx in &batch.transactions {
            out.push(format!("Transaction: {:#}", tx.to_json()));
        }
    }
    match &batch.outcome {
        DispatchOutcome::Skipped => {}
        DispatchOutcome::Sent(report) => match &report.errors {
            None => out.push(format!(
                "Ѧ SENT {} transaction(s) [TYPE: {}] Ѧ",
                batch.transactions.len(),
                batch.kind.index()
            )),
            Some(errors) => out.push(format!("{errors:#}")),
        },
        DispatchOutcome::Failed(message) => out.push(message.clone()),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_protocol::network::InMemoryLedger;
    use quill_protocol::transaction::TransactionKind;

    fn session(settings: Settings) -> (Session<InMemoryLedger>, InMemoryLedger) {
        let ledger = InMemoryLedger::new(100);
        let session = Session::with_rng(ledger.clone(), settings, StdRng::seed_from_u64(1));
        (session, ledger)
    }

    #[tokio::test]
    async fn sends_one_batch_per_command() {
        let settings = Settings {
            start_nonce: Some(5),
            ..Settings::default()
        };
        let (mut session, ledger) = session(settings);

        let batch = session.execute("0 3").await.unwrap().unwrap();
        assert_eq!(batch.transactions.len(), 3);
        assert_eq!(ledger.submitted().len(), 1);
        assert_eq!(ledger.submitted()[0].len(), 3);

        let rendered = render_batch(&batch, false);
        assert_eq!(rendered, vec!["Ѧ SENT 3 transaction(s) [TYPE: 0] Ѧ".to_string()]);
    }

    #[tokio::test]
    async fn nonces_continue_across_commands() {
        let settings = Settings {
            secret: Some("sender".into()),
            start_nonce: Some(5),
            coldrun: true,
            ..Settings::default()
        };
        let (mut session, ledger) = session(settings);

        session.execute("transfer 2").await.unwrap();
        let batch = session.execute("transfer").await.unwrap().unwrap();
        assert_eq!(batch.transactions[0].transaction().nonce(), 8);
        assert!(ledger.submitted().is_empty());
        assert_eq!(batch.outcome, DispatchOutcome::Skipped);
    }

    #[tokio::test]
    async fn bad_commands_leave_the_session_usable() {
        let (mut session, ledger) = session(Settings::default());
        assert!(matches!(
            session.execute("99").await,
            Err(ComposeError::UnsupportedKind(_))
        ));
        assert!(session.execute("").await.unwrap().is_none());
        assert!(ledger.submitted().is_empty());

        let batch = session.execute("3").await.unwrap().unwrap();
        assert_eq!(batch.kind, TransactionKind::Vote);
    }

    #[tokio::test]
    async fn renders_threshold_identity_and_payloads() {
        let mut settings = Settings {
            coldrun: true,
            ..Settings::default()
        };
        settings.multi_signature.enabled = true;
        let (mut session, _) = session(settings);

        let batch = session.execute("0").await.unwrap().unwrap();
        let rendered = render_batch(&batch, true);
        assert!(rendered[0].starts_with("MultiSignature: {"));
        assert!(rendered[1].starts_with("Transaction: {"));
        assert_eq!(rendered.len(), 2);
    }
}

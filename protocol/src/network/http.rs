//! HTTP implementation of the ledger boundary, against the node's public
//! REST API:
//!
//! | Call                           | Endpoint                                              |
//! |--------------------------------|-------------------------------------------------------|
//! | `get_account`                  | `GET  /api/wallets/{id}`                              |
//! | `get_network_time`             | `GET  /api/node/status`                               |
//! | `find_last_lock_transaction`   | `GET  /api/transactions?type=8&senderPublicKey={key}` |
//! | `get_height`                   | `GET  /api/blockchain`                                |
//! | `submit`                       | `POST /api/transactions`                              |
//!
//! There is no retry logic. A failed call surfaces as a [`ClientError`] and
//! the caller decides whether to degrade or abort.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::crypto::PublicKey;
use crate::transaction::SignedTransaction;

use super::client::{AccountState, ClientError, DispatchClient, DispatchReport, LedgerClient};

/// Thin `reqwest` wrapper bound to one peer.
#[derive(Clone)]
pub struct HttpLedgerClient {
    http: reqwest::Client,
    peer: String,
}

impl HttpLedgerClient {
    /// Create a client for the peer at `peer` (e.g. `http://127.0.0.1:4003`).
    pub fn new(peer: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            peer: peer.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.peer, path)
    }

    /// GET a JSON document. `Ok(None)` on 404.
    async fn get_json(&self, path: &str) -> Result<Option<Value>, ClientError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map(Some)
            .map_err(|e| ClientError::Decode(format!("invalid JSON response: {e}")))
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn get_account(&self, identity: &str) -> Result<Option<AccountState>, ClientError> {
        match self.get_json(&format!("/api/wallets/{identity}")).await? {
            Some(body) => parse_account(&body).map(Some),
            None => Ok(None),
        }
    }

    async fn get_network_time(&self) -> Result<u64, ClientError> {
        let body = self
            .get_json("/api/node/status")
            .await?
            .ok_or_else(|| ClientError::Decode("node status not found".into()))?;
        parse_network_time(&body)
    }

    async fn find_last_lock_transaction(
        &self,
        sender_public_key: &PublicKey,
    ) -> Result<Option<String>, ClientError> {
        let path = format!("/api/transactions?type=8&senderPublicKey={sender_public_key}");
        match self.get_json(&path).await? {
            Some(body) => Ok(parse_last_lock(&body)),
            None => Ok(None),
        }
    }

    async fn get_height(&self) -> Result<u64, ClientError> {
        let body = self
            .get_json("/api/blockchain")
            .await?
            .ok_or_else(|| ClientError::Decode("blockchain status not found".into()))?;
        parse_height(&body)
    }
}

#[async_trait]
impl DispatchClient for HttpLedgerClient {
    async fn submit(&self, batch: &[SignedTransaction]) -> Result<DispatchReport, ClientError> {
        let transactions: Vec<Value> = batch.iter().map(SignedTransaction::to_json).collect();
        let url = self.url("/api/transactions");
        debug!(%url, count = transactions.len(), "POST");

        let response = self
            .http
            .post(&url)
            .json(&json!({ "transactions": transactions }))
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Ok(parse_dispatch(status.is_success(), body))
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Numbers arrive as JSON numbers or decimal strings depending on the field.
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn as_public_key(value: Option<&Value>) -> Option<PublicKey> {
    value
        .and_then(Value::as_str)
        .and_then(|s| PublicKey::from_hex(s).ok())
}

pub(crate) fn parse_account(body: &Value) -> Result<AccountState, ClientError> {
    let data = body
        .get("data")
        .ok_or_else(|| ClientError::Decode("wallet response has no data".into()))?;
    let attributes = data.get("attributes");
    let nonce = data.get("nonce").and_then(as_u64).unwrap_or(0);
    let vote = data
        .get("vote")
        .or_else(|| attributes.and_then(|a| a.get("vote")))
        .and_then(Value::as_str)
        .map(str::to_string);
    let second_public_key = as_public_key(
        data.get("secondPublicKey")
            .or_else(|| attributes.and_then(|a| a.get("secondPublicKey"))),
    );
    Ok(AccountState {
        nonce,
        vote,
        second_public_key,
        public_key: as_public_key(data.get("publicKey")),
    })
}

pub(crate) fn parse_network_time(body: &Value) -> Result<u64, ClientError> {
    body.pointer("/data/timestamp")
        .and_then(as_u64)
        .ok_or_else(|| ClientError::Decode("node status has no timestamp".into()))
}

pub(crate) fn parse_height(body: &Value) -> Result<u64, ClientError> {
    body.pointer("/data/block/height")
        .and_then(as_u64)
        .ok_or_else(|| ClientError::Decode("blockchain status has no height".into()))
}

pub(crate) fn parse_last_lock(body: &Value) -> Option<String> {
    body.pointer("/data/0/id")
        .and_then(Value::as_str)
        .map(str::to_string)
}

pub(crate) fn parse_dispatch(success: bool, body: Value) -> DispatchReport {
    let accepted = body
        .pointer("/data/accept")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let has_errors = body.get("errors").is_some_and(|e| !e.is_null());
    let errors = (has_errors || !success).then_some(body);
    DispatchReport { accepted, errors }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_with_string_nonce() {
        let body = json!({
            "data": {
                "address": "ANBkoGqWeTSiaEVgVzSKZd3jS7UWzv9PSo",
                "publicKey": "03287bfebba4c7881a0509717e71b34b63f31e40021c321f89ae04f84be6d6ac37",
                "nonce": "12",
                "attributes": { "vote": "02aa" }
            }
        });
        let account = parse_account(&body).unwrap();
        assert_eq!(account.nonce, 12);
        assert_eq!(account.vote.as_deref(), Some("02aa"));
        assert!(account.public_key.is_some());
        assert!(account.second_public_key.is_none());
    }

    #[test]
    fn test_parse_account_without_data() {
        assert!(parse_account(&json!({})).is_err());
    }

    #[test]
    fn test_parse_status_documents() {
        assert_eq!(
            parse_network_time(&json!({ "data": { "timestamp": 1_000_000 } })).unwrap(),
            1_000_000
        );
        assert_eq!(
            parse_height(&json!({ "data": { "block": { "height": "77" } } })).unwrap(),
            77
        );
        assert!(parse_height(&json!({ "data": {} })).is_err());
    }

    #[test]
    fn test_parse_last_lock() {
        let body = json!({ "data": [{ "id": "abc" }, { "id": "older" }] });
        assert_eq!(parse_last_lock(&body).as_deref(), Some("abc"));
        assert_eq!(parse_last_lock(&json!({ "data": [] })), None);
    }

    #[test]
    fn test_parse_dispatch_keeps_errors_verbatim() {
        let body = json!({
            "data": { "accept": ["a"], "invalid": ["b"] },
            "errors": { "b": [{ "type": "ERR_LOW_FEE" }] }
        });
        let report = parse_dispatch(true, body.clone());
        assert_eq!(report.accepted, vec!["a".to_string()]);
        assert_eq!(report.errors, Some(body));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_parse_dispatch_failure_status() {
        let report = parse_dispatch(false, Value::String("bad gateway".into()));
        assert_eq!(report.errors, Some(Value::String("bad gateway".into())));
        assert!(parse_dispatch(true, json!({ "data": { "accept": [] } })).is_clean());
    }

    #[test]
    fn test_peer_trailing_slash_is_trimmed() {
        let client = HttpLedgerClient::new("http://localhost:4003/").unwrap();
        assert_eq!(client.url("/api/blockchain"), "http://localhost:4003/api/blockchain");
    }
}

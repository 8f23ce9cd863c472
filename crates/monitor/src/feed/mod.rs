use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use mempool_relay_domain::{RawTransaction, RelayConfig, Transaction, TransactionSnapshot};
use metrics::{counter, gauge};
use reqwest::Client;
use tracing::{debug, warn};

use crate::client::{build_http_client, ClientError};

mod types;

pub use types::{FeedInput, FeedOutput, FeedTransaction};

/// One-shot source of relay candidates.
#[async_trait]
pub trait TransactionFeed: Send + Sync {
    async fn fetch_unconfirmed_candidates(
        &self,
        limit: u32,
    ) -> Result<TransactionSnapshot, ClientError>;
}

/// Explorer listing endpoint queried with `limit` and `includeHex=true`.
#[derive(Clone)]
pub struct HttpFeedClient {
    http: Client,
    url: String,
}

impl HttpFeedClient {
    pub fn new(config: &RelayConfig) -> Result<Self, ClientError> {
        let http = build_http_client(config.http_timeout())?;
        Ok(Self::with_endpoint(http, config.feed_url()))
    }

    pub fn with_endpoint(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl TransactionFeed for HttpFeedClient {
    async fn fetch_unconfirmed_candidates(
        &self,
        limit: u32,
    ) -> Result<TransactionSnapshot, ClientError> {
        debug!(url = %self.url, limit, "fetching transaction feed");
        let limit = limit.to_string();
        let response = self
            .http
            .get(&self.url)
            .query(&[("limit", limit.as_str()), ("includeHex", "true")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let records: Vec<FeedTransaction> = serde_json::from_slice(&body)?;

        let snapshot: TransactionSnapshot =
            records.into_iter().filter_map(convert_record).collect();
        gauge!("relay_feed_transactions").set(snapshot.len() as f64);
        Ok(snapshot)
    }
}

/// Records that cannot be rebroadcast (no hash or no raw payload) are dropped.
fn convert_record(record: FeedTransaction) -> Option<Transaction> {
    let hash = record.hash.unwrap_or_default();
    let raw = match record.hex.as_deref().map(str::trim) {
        Some(hex) if !hex.is_empty() => RawTransaction::from(hex),
        _ => {
            warn!(hash = %hash, "skipping feed record without hex payload");
            counter!("relay_feed_records_skipped_total", "reason" => "missing_hex").increment(1);
            return None;
        }
    };

    if hash.is_empty() {
        warn!("skipping feed record without hash");
        counter!("relay_feed_records_skipped_total", "reason" => "missing_hash").increment(1);
        return None;
    }

    let received = record.received.as_deref().and_then(parse_received);

    Some(Transaction {
        hash,
        raw,
        fees: record.fees.unwrap_or_default(),
        confirmations: record.confirmations.unwrap_or_default(),
        received,
    })
}

/// Accepts RFC 3339 and the space-separated `YYYY-MM-DD HH:MM:SS[.f]` form
/// (read as UTC). Anything else is logged and left unset.
fn parse_received(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    debug!(received = raw, "unrecognised received timestamp");
    None
}

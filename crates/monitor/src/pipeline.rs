//! Relay engine: rebroadcasts the zero-confirmation part of a snapshot.

use mempool_relay_domain::{Transaction, TransactionSnapshot};
use metrics::{counter, histogram};
use tracing::{info, warn};

use crate::client::ClientError;
use crate::rpc::{NodeRpc, RelayId};

/// Result of submitting one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Accepted { relay_id: RelayId },
    Rejected { reason: ClientError },
}

impl RelayOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Per-cycle counters. Nothing else survives a relay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    pub accepted: usize,
    pub rejected: usize,
}

impl RelaySummary {
    pub fn attempted(&self) -> usize {
        self.accepted + self.rejected
    }

    fn record(&mut self, outcome: &RelayOutcome) {
        if outcome.is_accepted() {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
    }
}

/// Submits one transaction. Any failure, node-reported or transport, becomes
/// a `Rejected` outcome instead of an error.
pub async fn relay_transaction<R>(rpc: &R, tx: &Transaction) -> RelayOutcome
where
    R: NodeRpc + ?Sized,
{
    info!(
        hash = %tx.hash,
        fees = tx.fees,
        received = ?tx.received,
        "relaying unconfirmed transaction"
    );

    match rpc.send_raw_transaction(&tx.raw).await {
        Ok(relay_id) => {
            info!(hash = %tx.hash, relay_id = %relay_id, "transaction relayed to network");
            counter!("relay_submissions_total", "result" => "accepted").increment(1);
            RelayOutcome::Accepted { relay_id }
        }
        Err(reason) => {
            warn!(hash = %tx.hash, error = %reason, "transaction relay rejected");
            counter!("relay_submissions_total", "result" => "rejected").increment(1);
            RelayOutcome::Rejected { reason }
        }
    }
}

/// Walks the snapshot in order and submits every transaction with zero
/// confirmations, one at a time. A rejection never stops the pass.
pub async fn relay_unconfirmed<R>(rpc: &R, snapshot: &TransactionSnapshot) -> RelaySummary
where
    R: NodeRpc + ?Sized,
{
    let mut summary = RelaySummary::default();

    for tx in snapshot.unconfirmed() {
        let outcome = relay_transaction(rpc, tx).await;
        summary.record(&outcome);
    }

    histogram!("relay_cycle_candidates").record(summary.attempted() as f64);
    info!(
        snapshot = snapshot.len(),
        attempted = summary.attempted(),
        accepted = summary.accepted,
        rejected = summary.rejected,
        "relay pass finished"
    );

    summary
}

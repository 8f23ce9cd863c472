//! In-memory node used by the relay and monitor tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use mempool_relay_domain::{ChainHeight, RawTransaction, Transaction, TransactionSnapshot};

use crate::client::ClientError;
use crate::rpc::{NodeRpc, RelayId};

/// Serves heights from a fixed script and records every submitted payload.
/// Once the script runs dry, height fetches fail like an unreachable node.
#[derive(Default)]
pub(crate) struct FakeNode {
    heights: Mutex<VecDeque<u64>>,
    relay_ids: HashMap<String, String>,
    rejected: HashSet<String>,
    unreachable: HashSet<String>,
    submitted: Mutex<Vec<String>>,
    height_calls: AtomicUsize,
}

impl FakeNode {
    pub(crate) fn with_heights(heights: impl IntoIterator<Item = u64>) -> Self {
        Self {
            heights: Mutex::new(heights.into_iter().collect()),
            ..Self::default()
        }
    }

    pub(crate) fn accepting(mut self, raw: &str, relay_id: &str) -> Self {
        self.relay_ids.insert(raw.to_string(), relay_id.to_string());
        self
    }

    pub(crate) fn rejecting(mut self, raw: &str) -> Self {
        self.rejected.insert(raw.to_string());
        self
    }

    /// Submissions of `raw` fail as if the connection dropped mid-call.
    pub(crate) fn dropping(mut self, raw: &str) -> Self {
        self.unreachable.insert(raw.to_string());
        self
    }

    pub(crate) fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn height_calls(&self) -> usize {
        self.height_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeRpc for FakeNode {
    async fn block_height(&self) -> Result<ChainHeight, ClientError> {
        self.height_calls.fetch_add(1, Ordering::SeqCst);
        self.heights
            .lock()
            .unwrap()
            .pop_front()
            .map(ChainHeight::new)
            .ok_or_else(|| ClientError::Transport("connection refused".to_string()))
    }

    async fn send_raw_transaction(&self, raw: &RawTransaction) -> Result<RelayId, ClientError> {
        let raw = raw.as_str().to_string();
        self.submitted.lock().unwrap().push(raw.clone());

        if self.unreachable.contains(&raw) {
            return Err(ClientError::Transport("connection reset by peer".to_string()));
        }
        if self.rejected.contains(&raw) {
            return Err(ClientError::Rpc {
                code: -26,
                message: "txn-mempool-conflict".to_string(),
            });
        }

        Ok(self
            .relay_ids
            .get(&raw)
            .cloned()
            .unwrap_or_else(|| format!("relayed-{raw}")))
    }
}

pub(crate) fn tx(hash: &str, confirmations: u64, hex: &str) -> Transaction {
    Transaction {
        hash: hash.to_string(),
        raw: RawTransaction::from(hex),
        fees: 10_000,
        confirmations,
        received: None,
    }
}

pub(crate) fn snapshot(transactions: Vec<Transaction>) -> TransactionSnapshot {
    TransactionSnapshot::new(transactions)
}

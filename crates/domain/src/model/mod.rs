//! Data structures shared by the feed client, the chain monitor and the relay
//! engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Height of the most recent block as reported by the node. Only equality is
/// meaningful; a lower value after a reorg still counts as a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainHeight(u64);

impl ChainHeight {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Hex-encoded serialized transaction exactly as the feed returned it. The
/// payload is opaque here; the node decides whether it is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTransaction(String);

impl RawTransaction {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RawTransaction {
    fn from(value: &str) -> Self {
        Self::new(value.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub hash: String,
    pub raw: RawTransaction,
    /// Fee in the chain's smallest unit.
    pub fees: i64,
    pub confirmations: u64,
    pub received: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_unconfirmed(&self) -> bool {
        self.confirmations == 0
    }
}

/// Ordered batch of transactions fetched once at startup. There are no
/// mutating methods: every relay cycle sees the same records in the same
/// order for the life of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionSnapshot {
    transactions: Vec<Transaction>,
}

impl TransactionSnapshot {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter()
    }

    /// Transactions with exactly zero confirmations, in snapshot order.
    pub fn unconfirmed(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(|tx| tx.is_unconfirmed())
    }
}

impl FromIterator<Transaction> for TransactionSnapshot {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(hash: &str, confirmations: u64) -> Transaction {
        Transaction {
            hash: hash.to_string(),
            raw: RawTransaction::from("00"),
            fees: 0,
            confirmations,
            received: None,
        }
    }

    #[test]
    fn unconfirmed_keeps_snapshot_order() {
        let snapshot: TransactionSnapshot =
            vec![tx("a", 0), tx("b", 3), tx("c", 0), tx("d", 1)].into_iter().collect();

        let hashes: Vec<_> = snapshot.unconfirmed().map(|tx| tx.hash.as_str()).collect();
        assert_eq!(hashes, ["a", "c"]);
        assert_eq!(snapshot.len(), 4);
    }

    #[test]
    fn chain_height_serializes_as_plain_number() {
        let height: ChainHeight = serde_json::from_str("2650001").unwrap();
        assert_eq!(height, ChainHeight::new(2_650_001));
        assert_eq!(height.to_string(), "2650001");
    }
}

//! Mempool relay: fetches unconfirmed transactions from an explorer feed once,
//! then rebroadcasts them to a local full node every time the node reports a
//! new block height.

pub mod client;
pub mod feed;
pub mod pipeline;
pub mod rpc;
pub mod worker;

#[cfg(test)]
mod testing;

pub use client::ClientError;
pub use feed::{HttpFeedClient, TransactionFeed};
pub use pipeline::{relay_transaction, relay_unconfirmed, RelayOutcome, RelaySummary};
pub use rpc::{HttpNodeClient, NodeRpc};
pub use worker::{
    fetch_height, has_new_block, run_relayer, ChainMonitor, MonitorError, MonitorState,
};

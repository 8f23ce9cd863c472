use std::time::Duration;

use metrics::{counter, gauge};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info};

use mempool_relay_domain::{
    config::ConfigError, services::telemetry::TelemetryError, ChainHeight, RelayConfig,
    TransactionSnapshot,
};

use crate::{
    client::ClientError,
    feed::TransactionFeed,
    pipeline::{relay_unconfirmed, RelaySummary},
    rpc::NodeRpc,
};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("http client error: {0}")]
    Client(#[source] ClientError),
    #[error("transaction feed fetch failed: {0}")]
    Feed(#[source] ClientError),
    #[error("node unavailable: {0}")]
    NodeUnavailable(#[source] ClientError),
    #[error("malformed height response: {0}")]
    MalformedResponse(#[source] ClientError),
}

impl MonitorError {
    fn from_height_fetch(err: ClientError) -> Self {
        match err {
            ClientError::Transport(_) | ClientError::HttpStatus { .. } => {
                Self::NodeUnavailable(err)
            }
            ClientError::Decode(_) | ClientError::Rpc { .. } => Self::MalformedResponse(err),
        }
    }
}

/// Any height difference counts, including a lower height after a reorg.
pub fn has_new_block(previous: ChainHeight, current: ChainHeight) -> bool {
    previous != current
}

/// Reads the current height. There is no retry: the caller treats every
/// failure as fatal.
pub async fn fetch_height<R>(rpc: &R) -> Result<ChainHeight, MonitorError>
where
    R: NodeRpc + ?Sized,
{
    let height = rpc
        .block_height()
        .await
        .map_err(MonitorError::from_height_fetch)?;
    gauge!("monitor_chain_height").set(height.get() as f64);
    Ok(height)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Relaying,
}

impl MonitorState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Relaying => "relaying",
        }
    }
}

/// Owns the last observed height and triggers one relay pass per height
/// change.
pub struct ChainMonitor<R> {
    rpc: R,
    poll_interval: Duration,
    last_height: ChainHeight,
    state: MonitorState,
}

impl<R> ChainMonitor<R>
where
    R: NodeRpc,
{
    /// Fetches the baseline height the first tick is compared against.
    pub async fn start(rpc: R, poll_interval: Duration) -> Result<Self, MonitorError> {
        let last_height = fetch_height(&rpc).await?;
        info!(height = %last_height, "chain monitor started");

        Ok(Self {
            rpc,
            poll_interval,
            last_height,
            state: MonitorState::Idle,
        })
    }

    pub fn last_height(&self) -> ChainHeight {
        self.last_height
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// One poll. Returns the relay summary when a new block was seen and
    /// `None` when the height is unchanged.
    pub async fn tick(
        &mut self,
        snapshot: &TransactionSnapshot,
    ) -> Result<Option<RelaySummary>, MonitorError> {
        let current = fetch_height(&self.rpc).await?;
        if !has_new_block(self.last_height, current) {
            debug!(height = %current, "no new block");
            return Ok(None);
        }

        info!(
            previous = %self.last_height,
            current = %current,
            transactions = snapshot.len(),
            "new block detected"
        );
        counter!("monitor_new_blocks_total").increment(1);

        self.enter(MonitorState::Relaying);
        let summary = relay_unconfirmed(&self.rpc, snapshot).await;
        self.last_height = current;
        self.enter(MonitorState::Idle);

        Ok(Some(summary))
    }

    /// Switches state, logging and counting the transition. Returns the state
    /// that was left.
    fn enter(&mut self, next: MonitorState) -> MonitorState {
        let previous = std::mem::replace(&mut self.state, next);
        if previous != next {
            info!(
                from = previous.as_str(),
                to = next.as_str(),
                height = %self.last_height,
                "monitor state transition"
            );
            counter!("monitor_state_transitions_total", "to" => next.as_str()).increment(1);
        }
        previous
    }

    /// Polls until a height fetch fails. The snapshot is never refreshed, so
    /// every height change replays the same batch.
    pub async fn run(mut self, snapshot: &TransactionSnapshot) -> Result<(), MonitorError> {
        loop {
            if self.tick(snapshot).await?.is_none() {
                sleep(self.poll_interval).await;
            }
        }
    }
}

/// Fetches the snapshot once, then hands control to the chain monitor for
/// the rest of the process lifetime.
pub async fn run_relayer<F, R>(config: &RelayConfig, feed: &F, rpc: R) -> Result<(), MonitorError>
where
    F: TransactionFeed + ?Sized,
    R: NodeRpc,
{
    let snapshot = feed
        .fetch_unconfirmed_candidates(config.fetch_limit())
        .await
        .map_err(MonitorError::Feed)?;
    info!(
        transactions = snapshot.len(),
        unconfirmed = snapshot.unconfirmed().count(),
        "transaction snapshot fetched"
    );

    let monitor = ChainMonitor::start(rpc, config.poll_interval()).await?;
    monitor.run(&snapshot).await
}

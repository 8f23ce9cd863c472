//! Relay binary that rebroadcasts unconfirmed feed transactions on every new
//! block seen by the local node.

use std::io;

use mempool_relay_domain::services::telemetry::{init_telemetry, TelemetryConfig};
use mempool_relay_domain::RelayConfig;
use mempool_relay_monitor::{run_relayer, HttpFeedClient, HttpNodeClient, MonitorError};
use tracing::info;

#[tokio::main]
async fn main() -> io::Result<()> {
    if let Err(err) = bootstrap().await {
        eprintln!("[relay] bootstrap failed: {err}");
        return Err(io::Error::other(err.to_string()));
    }

    Ok(())
}

async fn bootstrap() -> Result<(), MonitorError> {
    let config = RelayConfig::load_from_env()?;
    let telemetry_config = TelemetryConfig::from_env("RELAY");
    init_telemetry(&telemetry_config)?;
    info!(
        node = %config.node_url(),
        feed = config.feed_url(),
        poll_interval_ms = config.poll_interval().as_millis() as u64,
        fetch_limit = config.fetch_limit(),
        "starting mempool relay"
    );

    let feed = HttpFeedClient::new(&config).map_err(MonitorError::Client)?;
    let node = HttpNodeClient::new(&config).map_err(MonitorError::Client)?;
    run_relayer(&config, &feed, node).await
}

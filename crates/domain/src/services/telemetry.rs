use std::{env, net::SocketAddr, sync::Arc};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::hydrate_env_file;

static SUBSCRIBER_INSTALLED: OnceCell<()> = OnceCell::new();
static METRICS_HANDLE: OnceCell<Option<Arc<PrometheusHandle>>> = OnceCell::new();

/// Observability options for the relay binary.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    log_filter: String,
    metrics_address: Option<String>,
}

impl TelemetryConfig {
    /// Loads telemetry knobs from optional environment variables prefixed with
    /// `<PREFIX>_`, e.g. `RELAY_LOG_FILTER`. Missing entries fall back to
    /// defaults so the binary boots without extra configuration.
    pub fn from_env(prefix: &str) -> Self {
        let _ = hydrate_env_file();
        let upper = prefix.trim().to_ascii_uppercase();
        let log_key = format!("{}_LOG_FILTER", upper);
        let metrics_key = format!("{}_METRICS_ADDRESS", upper);

        let log_filter = env::var(log_key).unwrap_or_else(|_| "info".to_string());
        let metrics_address = env::var(metrics_key).ok().and_then(|value| {
            if value.trim().is_empty() {
                None
            } else {
                Some(value)
            }
        });

        Self {
            log_filter,
            metrics_address,
        }
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    pub fn metrics_address(&self) -> Option<&str> {
        self.metrics_address.as_deref()
    }
}

/// Guard returned after telemetry initialization.
#[derive(Clone)]
pub struct TelemetryGuard {
    metrics: Option<Arc<PrometheusHandle>>,
}

impl TelemetryGuard {
    /// Renders the in-process metrics snapshot. `None` when metrics are served
    /// by the HTTP listener instead.
    pub fn render_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(|handle| handle.render())
    }
}

/// Wires up tracing + the metrics recorder once per process. When a metrics
/// address is configured the exporter listener is spawned on the current
/// tokio runtime.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    install_tracing(config)?;
    let metrics = install_metrics(config)?;

    Ok(TelemetryGuard { metrics })
}

fn install_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    if SUBSCRIBER_INSTALLED.get().is_some() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_new(config.log_filter())
        .map_err(|err| TelemetryError::InvalidLogFilter(err.to_string()))?;

    if SUBSCRIBER_INSTALLED.set(()).is_ok() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
            .map_err(|err| TelemetryError::Tracing(err.to_string()))?;
    }

    Ok(())
}

fn install_metrics(
    config: &TelemetryConfig,
) -> Result<Option<Arc<PrometheusHandle>>, TelemetryError> {
    METRICS_HANDLE
        .get_or_try_init(|| match config.metrics_address() {
            Some(addr) => {
                let socket: SocketAddr =
                    addr.trim()
                        .parse()
                        .map_err(|err: std::net::AddrParseError| {
                            TelemetryError::InvalidMetricsAddress(
                                addr.to_string(),
                                err.to_string(),
                            )
                        })?;
                PrometheusBuilder::new()
                    .with_http_listener(socket)
                    .install()
                    .map_err(|err| TelemetryError::Metrics(err.to_string()))?;
                Ok(None)
            }
            None => PrometheusBuilder::new()
                .install_recorder()
                .map(|handle| Some(Arc::new(handle)))
                .map_err(|err| TelemetryError::Metrics(err.to_string())),
        })
        .cloned()
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    InvalidLogFilter(String),
    #[error("failed to install tracing subscriber: {0}")]
    Tracing(String),
    #[error("invalid metrics address `{0}`: {1}")]
    InvalidMetricsAddress(String, String),
    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
}

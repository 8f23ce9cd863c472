//! Environment-driven configuration for the relay binary.

use std::{env, fmt, str::FromStr, time::Duration};

use thiserror::Error;

pub const DEFAULT_NODE_HOST: &str = "127.0.0.1";
pub const DEFAULT_NODE_PORT: u16 = 9332;
pub const DEFAULT_FEED_URL: &str = "https://api.blockcypher.com/v1/ltc/main/txs";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const DEFAULT_FETCH_LIMIT: u32 = 1000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Static startup configuration handed to both the chain monitor and the
/// relay engine. Loaded once from `.env`/process variables.
#[derive(Clone, PartialEq, Eq)]
pub struct RelayConfig {
    node_host: String,
    node_port: u16,
    node_user: String,
    node_pass: String,
    feed_url: String,
    poll_interval: Duration,
    fetch_limit: u32,
    http_timeout: Option<Duration>,
}

impl RelayConfig {
    /// Loads configuration by hydrating `.env` (if present) and reading the
    /// `RELAY_*` process variables. Only the node credentials are required;
    /// everything else falls back to the defaults above.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let node_host =
            get_optional_var("RELAY_NODE_HOST").unwrap_or_else(|| DEFAULT_NODE_HOST.to_string());
        let node_port = parse_optional("RELAY_NODE_PORT")?.unwrap_or(DEFAULT_NODE_PORT);
        let node_user = get_required_var("RELAY_NODE_USER")?;
        let node_pass = get_required_var("RELAY_NODE_PASS")?;
        let feed_url =
            get_optional_var("RELAY_FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string());
        let poll_interval = Duration::from_millis(
            parse_optional("RELAY_POLL_INTERVAL_MS")?.unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        );

        let fetch_limit = parse_optional("RELAY_FETCH_LIMIT")?.unwrap_or(DEFAULT_FETCH_LIMIT);
        if fetch_limit == 0 {
            return Err(ConfigError::OutOfRange {
                key: "RELAY_FETCH_LIMIT",
                reason: "must be greater than zero",
            });
        }

        let http_timeout = match parse_optional("RELAY_HTTP_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
        {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            node_host,
            node_port,
            node_user,
            node_pass,
            feed_url,
            poll_interval,
            fetch_limit,
            http_timeout,
        })
    }

    pub fn node_host(&self) -> &str {
        &self.node_host
    }

    pub fn node_port(&self) -> u16 {
        self.node_port
    }

    pub fn node_user(&self) -> &str {
        &self.node_user
    }

    pub fn node_pass(&self) -> &str {
        &self.node_pass
    }

    /// JSON-RPC endpoint of the node. Credentials travel as basic auth, not
    /// in the URL, so this is safe to log.
    pub fn node_url(&self) -> String {
        format!("http://{}:{}/", self.node_host, self.node_port)
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn fetch_limit(&self) -> u32 {
        self.fetch_limit
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("node_host", &self.node_host)
            .field("node_port", &self.node_port)
            .field("node_user", &self.node_user)
            .field("node_pass", &"<redacted>")
            .field("feed_url", &self.feed_url)
            .field("poll_interval", &self.poll_interval)
            .field("fetch_limit", &self.fetch_limit)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

fn get_required_var(key: &'static str) -> Result<String, ConfigError> {
    get_optional_var(key).ok_or(ConfigError::MissingVar { key })
}

fn get_optional_var(key: &'static str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_optional<T>(key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr<Err = std::num::ParseIntError>,
{
    get_optional_var(key)
        .map(|raw| {
            raw.parse()
                .map_err(|source| ConfigError::InvalidNumber { key, source })
        })
        .transpose()
}

pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("RELAY_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }

    Ok(())
}

/// Errors emitted when `.env` hydration or environment parsing fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("invalid integer in `{key}`: {source}")]
    InvalidNumber {
        key: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("invalid value in `{key}`: {reason}")]
    OutOfRange {
        key: &'static str,
        reason: &'static str,
    },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_GUARD: Mutex<()> = Mutex::new(());

    const OPTIONAL_KEYS: [&str; 6] = [
        "RELAY_NODE_HOST",
        "RELAY_NODE_PORT",
        "RELAY_FEED_URL",
        "RELAY_POLL_INTERVAL_MS",
        "RELAY_FETCH_LIMIT",
        "RELAY_HTTP_TIMEOUT_SECS",
    ];

    fn set_env() {
        std::env::set_var("RELAY_SKIP_DOTENV", "1");
        std::env::set_var("RELAY_NODE_USER", "user");
        std::env::set_var("RELAY_NODE_PASS", "pass");
        for key in OPTIONAL_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();

        let config = RelayConfig::load_from_env().expect("config loads");
        assert_eq!(config.node_host(), DEFAULT_NODE_HOST);
        assert_eq!(config.node_port(), DEFAULT_NODE_PORT);
        assert_eq!(config.node_user(), "user");
        assert_eq!(config.node_pass(), "pass");
        assert_eq!(config.feed_url(), DEFAULT_FEED_URL);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.fetch_limit(), 1000);
        assert_eq!(config.http_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.node_url(), "http://127.0.0.1:9332/");
    }

    #[test]
    fn config_loader_reads_env() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("RELAY_NODE_HOST", " 10.0.0.5 ");
        std::env::set_var("RELAY_NODE_PORT", "19332");
        std::env::set_var("RELAY_FEED_URL", "http://feed.local/txs");
        std::env::set_var("RELAY_POLL_INTERVAL_MS", "250");
        std::env::set_var("RELAY_FETCH_LIMIT", "50");
        std::env::set_var("RELAY_HTTP_TIMEOUT_SECS", "0");

        let config = RelayConfig::load_from_env().expect("config loads");
        assert_eq!(config.node_url(), "http://10.0.0.5:19332/");
        assert_eq!(config.feed_url(), "http://feed.local/txs");
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.fetch_limit(), 50);
        assert_eq!(config.http_timeout(), None);

        set_env();
    }

    #[test]
    fn empty_required_env_var_is_treated_as_missing() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("RELAY_NODE_PASS", "   ");

        let err = RelayConfig::load_from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingVar {
                key: "RELAY_NODE_PASS"
            }
        ));

        set_env();
    }

    #[test]
    fn malformed_port_is_rejected() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("RELAY_NODE_PORT", "not-a-port");

        let err = RelayConfig::load_from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                key: "RELAY_NODE_PORT",
                ..
            }
        ));

        set_env();
    }

    #[test]
    fn zero_fetch_limit_is_rejected() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("RELAY_FETCH_LIMIT", "0");

        let err = RelayConfig::load_from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                key: "RELAY_FETCH_LIMIT",
                ..
            }
        ));

        set_env();
    }

    #[test]
    fn debug_output_redacts_password() {
        let _guard = ENV_GUARD.lock().unwrap();
        set_env();
        std::env::set_var("RELAY_NODE_PASS", "hunter2");

        let config = RelayConfig::load_from_env().expect("config loads");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));

        set_env();
    }
}

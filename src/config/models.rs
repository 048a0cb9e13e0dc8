// src/config/models.rs
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Key the startup summary reserves for its own timestamp.
pub const TIMESTAMP_KEY: &str = "timestamp";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8082;
pub const DEFAULT_LARAVEL_API_URL: &str = "http://localhost:8080/api/users";
pub const DEFAULT_GO_SERVICE_URL: &str = "http://localhost:8081/ping";
pub const DEFAULT_UPSTREAM_A_NAME: &str = "laravel_api";
pub const PHP_UPSTREAM_A_NAME: &str = "php_api";
pub const DEFAULT_UPSTREAM_B_NAME: &str = "go_service";
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;
pub const MAX_PROBE_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid listen host {0:?}")]
    InvalidHost(String),

    #[error("Listen port must be between 1 and 65535, got {0}")]
    InvalidPort(i64),

    #[error("Invalid URL for {name}: {reason}")]
    InvalidUrl { name: String, reason: String },

    #[error("Probe timeout must be between 1 and {max} seconds, got {0}", max = MAX_PROBE_TIMEOUT_SECS)]
    InvalidTimeout(i64),

    #[error("Invalid upstream name {0:?}")]
    InvalidUpstreamName(String),

    #[error("Upstream names must be distinct, both are {0:?}")]
    DuplicateUpstreamName(String),

    #[error("Unknown log format {0:?} (expected \"pretty\" or \"json\")")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// A peer service probed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    /// Logical service name, used as the key in the probe summary.
    pub name: String,
    pub url: Url,
}

impl Upstream {
    pub fn new(name: impl Into<String>, url: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() || name == TIMESTAMP_KEY {
            return Err(ConfigError::InvalidUpstreamName(name));
        }

        let url = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            name: name.clone(),
            reason: format!("{url:?}: {e}"),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                reason: format!("unsupported scheme {:?}", url.scheme()),
                name,
            });
        }

        Ok(Self { name, url })
    }
}

/// Process configuration. Built once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub upstream_a: Upstream,
    pub upstream_b: Upstream,
    pub probe_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Upstreams in the order they are probed.
    pub fn upstreams(&self) -> [&Upstream; 2] {
        [&self.upstream_a, &self.upstream_b]
    }

    pub fn log_loaded(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  LISTEN_HOST: {}", self.host);
        tracing::info!("  PORT: {}", self.port);
        for upstream in self.upstreams() {
            tracing::info!("  {}: {}", upstream.name, upstream.url);
        }
        tracing::info!("  PROBE_TIMEOUT_SECS: {}", self.probe_timeout.as_secs());
    }
}

/// Flat view of every layered source, keyed the way the environment names them.
#[derive(Debug, Deserialize)]
pub(crate) struct RawSettings {
    pub listen_host: String,
    // Wider than the targets so out-of-range values are rejected, not narrowed.
    pub port: i64,
    pub laravel_api_url: String,
    pub php_api_url: Option<String>,
    pub go_service_url: String,
    pub upstream_a_name: Option<String>,
    pub upstream_b_name: String,
    pub probe_timeout_secs: i64,
    pub log_format: String,
}

impl TryFrom<RawSettings> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let host = raw
            .listen_host
            .trim()
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidHost(raw.listen_host.clone()))?;

        let port = u16::try_from(raw.port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or(ConfigError::InvalidPort(raw.port))?;

        // PHP deployments name their first upstream differently.
        let (a_url, a_default_name) = match raw.php_api_url {
            Some(url) => (url, PHP_UPSTREAM_A_NAME),
            None => (raw.laravel_api_url, DEFAULT_UPSTREAM_A_NAME),
        };
        let a_name = raw
            .upstream_a_name
            .unwrap_or_else(|| a_default_name.to_string());

        let upstream_a = Upstream::new(a_name, &a_url)?;
        let upstream_b = Upstream::new(raw.upstream_b_name, &raw.go_service_url)?;
        if upstream_a.name == upstream_b.name {
            return Err(ConfigError::DuplicateUpstreamName(upstream_a.name));
        }

        let probe_timeout_secs = u64::try_from(raw.probe_timeout_secs)
            .ok()
            .filter(|secs| (1..=MAX_PROBE_TIMEOUT_SECS).contains(secs))
            .ok_or(ConfigError::InvalidTimeout(raw.probe_timeout_secs))?;

        Ok(Self {
            host,
            port,
            upstream_a,
            upstream_b,
            probe_timeout: Duration::from_secs(probe_timeout_secs),
            log_format: raw.log_format.parse()?,
        })
    }
}

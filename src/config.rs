//! Configuration types for ticker-stream

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Bybit v5 public linear endpoint
pub const DEFAULT_WS_URL: &str = "wss://stream.bybit.com/v5/public/linear";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Ticker feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    /// Streaming endpoint
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Instruments to subscribe to (e.g. "ETHUSDT")
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Channel capacity when updates are delivered through a receiver
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_ws_url() -> String {
    DEFAULT_WS_URL.to_string()
}
fn default_symbols() -> Vec<String> {
    vec!["ETHUSDT".to_string()]
}
fn default_buffer_size() -> usize {
    1024
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            symbols: default_symbols(),
            buffer_size: default_buffer_size(),
        }
    }
}

/// Session timing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// How long a session runs before it is closed
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    /// Heartbeat interval; Bybit drops connections idle for more than ~30s
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
    /// Handshake timeout
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_duration_secs() -> u64 {
    30
}
fn default_ping_interval_secs() -> u64 {
    20
}
fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            ping_interval_secs: default_ping_interval_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl SessionConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Default log filter, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port (0 = disabled)
    #[serde(default)]
    pub metrics_port: u16,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: 0,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a session
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.feed.symbols.is_empty() {
            anyhow::bail!("feed.symbols must name at least one instrument");
        }
        if self.feed.symbols.iter().any(|s| s.trim().is_empty()) {
            anyhow::bail!("feed.symbols contains an empty symbol");
        }
        if !(self.feed.ws_url.starts_with("ws://") || self.feed.ws_url.starts_with("wss://")) {
            anyhow::bail!("feed.ws_url must be a ws:// or wss:// URL, got {}", self.feed.ws_url);
        }
        if self.feed.buffer_size == 0 {
            anyhow::bail!("feed.buffer_size must be greater than zero");
        }
        if self.session.duration_secs == 0 {
            anyhow::bail!("session.duration_secs must be greater than zero");
        }
        if self.session.ping_interval_secs == 0 {
            anyhow::bail!("session.ping_interval_secs must be greater than zero");
        }
        if self.session.connect_timeout_secs == 0 {
            anyhow::bail!("session.connect_timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

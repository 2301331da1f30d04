//! WebSocket types and configuration

use std::time::Duration;
use thiserror::Error;

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Maximum time allowed for the TCP/TLS/WebSocket handshake
    pub connect_timeout: Duration,
    /// Interval for sending keepalive frames
    pub ping_interval: Duration,
    /// Text payload sent as an application-level heartbeat.
    /// When `None`, a protocol-level ping frame is sent instead.
    pub heartbeat: Option<String>,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout: Duration::from_secs(10),
            ping_interval: Duration::from_secs(20),
            heartbeat: None,
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set handshake timeout
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }

    /// Send `payload` as a text heartbeat instead of ping frames
    pub fn heartbeat(mut self, payload: impl Into<String>) -> Self {
        self.heartbeat = Some(payload.into());
        self
    }

    /// Reject settings the client cannot run with
    pub fn validate(&self) -> Result<(), WsError> {
        if self.connect_timeout.is_zero() {
            return Err(WsError::InvalidConfig("connect timeout must be non-zero".into()));
        }
        if self.ping_interval.is_zero() {
            return Err(WsError::InvalidConfig("ping interval must be non-zero".into()));
        }
        Ok(())
    }
}

/// WebSocket errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WsError {
    /// Connection could not be established (DNS, TLS, refusal)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Handshake did not complete in time
    #[error("Connection timed out after {0:?}")]
    Timeout(Duration),
    /// Send failed
    #[error("Send failed: {0}")]
    SendFailed(String),
    /// Error reported by the transport while reading
    #[error("Transport error: {0}")]
    Transport(String),
    /// Outbound payload could not be encoded
    #[error("Encode failed: {0}")]
    Encode(String),
    /// Configuration cannot be used to run a session
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Why a connection reached its terminal state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    /// Close code from the peer's close frame, if one was received or sent
    pub code: Option<u16>,
    /// Human-readable reason
    pub reason: String,
}

impl CloseInfo {
    pub fn new(code: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

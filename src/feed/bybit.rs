//! Bybit WebSocket ticker feed

use super::session::{SessionReport, TickerSession};
use super::sink::{ChannelSink, TickerSink};
use super::types::{SubscriptionRequest, TickerUpdate};
use super::TickerFeed;
use crate::config::{FeedConfig, SessionConfig, DEFAULT_WS_URL};
use crate::ws::{WsClient, WsConfig};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Application-level heartbeat expected by Bybit public streams
pub const BYBIT_HEARTBEAT: &str = r#"{"op":"ping"}"#;

/// Bybit ticker feed for `tickers.{SYMBOL}` topics
#[derive(Debug, Clone)]
pub struct BybitTickerFeed {
    ws_config: WsConfig,
    symbols: Vec<String>,
    buffer_size: usize,
}

impl BybitTickerFeed {
    /// Create a feed for the given symbols on the default endpoint
    pub fn new<S: AsRef<str>>(symbols: &[S]) -> Self {
        Self {
            ws_config: WsConfig::new(DEFAULT_WS_URL).heartbeat(BYBIT_HEARTBEAT),
            symbols: symbols.iter().map(|s| s.as_ref().to_uppercase()).collect(),
            buffer_size: 1024,
        }
    }

    /// Build a feed from configuration
    pub fn from_config(feed: &FeedConfig, session: &SessionConfig) -> Self {
        let ws_config = WsConfig::new(&feed.ws_url)
            .connect_timeout(session.connect_timeout())
            .ping_interval(session.ping_interval())
            .heartbeat(BYBIT_HEARTBEAT);

        Self {
            ws_config,
            buffer_size: feed.buffer_size,
            ..Self::new(feed.symbols.as_slice())
        }
    }

    /// Point the feed at another endpoint
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.ws_config.url = url.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.ws_config.url
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// The subscribe directive sent when the connection opens
    pub fn subscription(&self) -> SubscriptionRequest {
        SubscriptionRequest::tickers(self.symbols.as_slice())
    }

    /// Run one session on the current task until the connection closes or
    /// `cancel` fires
    pub async fn run<S: TickerSink>(&self, sink: S, cancel: CancellationToken) -> SessionReport {
        let mut session = TickerSession::new(self.subscription(), sink);
        let client = WsClient::new(self.ws_config.clone());

        tracing::info!(url = %client.url(), symbols = ?self.symbols, "Starting ticker session");

        // Errors were already reported to the session's hooks.
        if let Err(e) = client.run(&mut session, cancel).await {
            tracing::debug!(error = %e, "Ticker session ended with transport error");
        }

        session.into_report()
    }

    /// Run one session on a dedicated task
    pub fn spawn<S>(&self, sink: S, cancel: CancellationToken) -> JoinHandle<SessionReport>
    where
        S: TickerSink + 'static,
    {
        let feed = self.clone();
        tokio::spawn(async move { feed.run(sink, cancel).await })
    }

    /// Run one session for at most `budget`, then close it
    ///
    /// Returns early if the connection ends on its own. `shutdown` cancels
    /// the session immediately (e.g. on Ctrl-C).
    pub async fn run_for<S>(
        &self,
        sink: S,
        budget: Duration,
        shutdown: CancellationToken,
    ) -> anyhow::Result<SessionReport>
    where
        S: TickerSink + 'static,
    {
        let cancel = shutdown.child_token();
        let mut worker = self.spawn(sink, cancel.clone());

        tokio::select! {
            report = &mut worker => return Ok(report?),
            _ = tokio::time::sleep(budget) => {
                tracing::info!(budget_secs = budget.as_secs_f64(), "Session time budget elapsed");
            }
            _ = cancel.cancelled() => {
                tracing::info!("Session cancelled");
            }
        }

        cancel.cancel();
        Ok(worker.await?)
    }

    /// Run one session on a dedicated task, delivering updates over a channel
    ///
    /// The receiver closes when the session ends; the handle resolves to its
    /// report.
    pub fn subscribe_with_report(
        &self,
        cancel: CancellationToken,
    ) -> (mpsc::Receiver<TickerUpdate>, JoinHandle<SessionReport>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);

        tracing::info!(symbols = ?self.symbols, "Subscribing to Bybit tickers");
        let worker = self.spawn(ChannelSink::new(tx), cancel);

        (rx, worker)
    }
}

#[async_trait]
impl TickerFeed for BybitTickerFeed {
    async fn subscribe(
        &self,
        cancel: CancellationToken,
    ) -> anyhow::Result<mpsc::Receiver<TickerUpdate>> {
        let (rx, worker) = self.subscribe_with_report(cancel);

        tokio::spawn(async move {
            match worker.await {
                Ok(report) => tracing::info!(
                    tickers = report.stats.tickers,
                    close_code = ?report.close_code,
                    close_reason = ?report.close_reason,
                    error = ?report.error,
                    "Ticker subscription ended"
                ),
                Err(e) => tracing::error!(error = %e, "Ticker subscription task failed"),
            }
        });

        Ok(rx)
    }
}

//! One ticker subscription over one connection
//!
//! [`TickerSession`] is the [`WsHandler`] that turns connection lifecycle
//! events into subscribe frames, ticker updates and a final [`SessionReport`].

use super::frame::{decode_frame, FrameOutcome};
use super::sink::TickerSink;
use super::types::SubscriptionRequest;
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use crate::ws::{CloseInfo, WsError, WsHandler, WsSink};
use async_trait::async_trait;
use chrono::Utc;
use futures_util::SinkExt;
use serde::Serialize;
use tokio_tungstenite::tungstenite::Message;

/// Connection session lifecycle
///
/// `Idle -> Open -> Subscribed -> Receiving -> Closed`; `Closed` is reachable
/// from every state and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Open,
    Subscribed,
    Receiving,
    Closed,
}

impl SessionState {
    fn gauge_value(self) -> f64 {
        match self {
            SessionState::Idle => 0.0,
            SessionState::Open => 1.0,
            SessionState::Subscribed => 2.0,
            SessionState::Receiving => 3.0,
            SessionState::Closed => 4.0,
        }
    }
}

/// Per-session frame counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    /// Frames that produced a `TickerUpdate`
    pub tickers: u64,
    /// Operation replies (subscribe acks, pongs)
    pub acks: u64,
    /// Valid JSON that is not a ticker frame
    pub ignored: u64,
    /// Frames dropped because they could not be decoded
    pub malformed: u64,
}

impl FrameStats {
    /// All frames seen, whatever their outcome
    pub fn total(&self) -> u64 {
        self.tickers + self.acks + self.ignored + self.malformed
    }
}

/// Summary of a finished session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// State the session ended in (`Closed` once the connection has ended)
    pub state: SessionState,
    /// Frame counts by outcome
    pub stats: FrameStats,
    /// Number of subscribe frames sent (0 or 1)
    pub subscriptions_sent: u32,
    /// Close code sent or received; `None` when the connection ended without one
    pub close_code: Option<u16>,
    /// Why the connection ended, if it has
    pub close_reason: Option<String>,
    /// Last transport error, if any
    pub error: Option<String>,
}

/// Handler state for one subscription
pub struct TickerSession<S> {
    request: SubscriptionRequest,
    sink: S,
    state: SessionState,
    stats: FrameStats,
    subscriptions_sent: u32,
    close: Option<CloseInfo>,
    last_error: Option<WsError>,
}

impl<S: TickerSink> TickerSession<S> {
    pub fn new(request: SubscriptionRequest, sink: S) -> Self {
        Self {
            request,
            sink,
            state: SessionState::Idle,
            stats: FrameStats::default(),
            subscriptions_sent: 0,
            close: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    fn transition(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        tracing::debug!(from = ?self.state, to = ?next, "Session state change");
        self.state = next;
        telemetry::set_gauge(GaugeMetric::SessionState, next.gauge_value());
    }

    /// Decode one frame and route it
    pub async fn handle_frame(&mut self, text: &str) {
        match decode_frame(text, Utc::now()) {
            FrameOutcome::Ticker(update) => {
                self.stats.tickers += 1;
                telemetry::increment(CounterMetric::TickerFrame);
                self.transition(SessionState::Receiving);
                tracing::trace!(symbol = %update.symbol, "Ticker update");
                self.sink.on_update(update).await;
            }
            FrameOutcome::Ack { op, success, message } => {
                self.stats.acks += 1;
                telemetry::increment(CounterMetric::AckFrame);
                if success {
                    tracing::debug!(op = %op, "Operation acknowledged");
                } else {
                    tracing::warn!(op = %op, message = ?message, "Operation rejected by server");
                }
            }
            FrameOutcome::Ignored => {
                self.stats.ignored += 1;
                telemetry::increment(CounterMetric::IgnoredFrame);
                tracing::trace!(preview = %preview(text), "Ignoring non-ticker frame");
            }
            FrameOutcome::Malformed(e) => {
                self.stats.malformed += 1;
                telemetry::increment(CounterMetric::MalformedFrame);
                tracing::debug!(error = %e, preview = %preview(text), "Dropping malformed frame");
            }
        }
    }

    /// Consume the session and summarize it
    pub fn into_report(self) -> SessionReport {
        let (close_code, close_reason) = match self.close {
            Some(info) => (info.code, Some(info.reason)),
            None => (None, None),
        };
        SessionReport {
            state: self.state,
            stats: self.stats,
            subscriptions_sent: self.subscriptions_sent,
            close_code,
            close_reason,
            error: self.last_error.map(|e| e.to_string()),
        }
    }
}

#[async_trait]
impl<S: TickerSink> WsHandler for TickerSession<S> {
    async fn on_open(&mut self, sink: &mut WsSink) -> Result<(), WsError> {
        self.transition(SessionState::Open);

        if self.subscriptions_sent > 0 {
            return Ok(());
        }

        let payload = self
            .request
            .to_json()
            .map_err(|e| WsError::Encode(e.to_string()))?;
        sink.send(Message::Text(payload))
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))?;

        self.subscriptions_sent += 1;
        telemetry::set_gauge(GaugeMetric::SubscribedTopics, self.request.args.len() as f64);
        tracing::info!(topics = ?self.request.args, "Subscribed to ticker topics");
        self.transition(SessionState::Subscribed);
        Ok(())
    }

    async fn on_message(&mut self, text: &str) {
        self.handle_frame(text).await;
    }

    fn on_error(&mut self, err: &WsError) {
        telemetry::increment(CounterMetric::TransportError);
        tracing::warn!(error = %err, state = ?self.state, "Ticker stream transport error");
        self.last_error = Some(err.clone());
    }

    fn on_close(&mut self, info: &CloseInfo) {
        tracing::info!(
            code = ?info.code,
            reason = %info.reason,
            tickers = self.stats.tickers,
            ignored = self.stats.ignored,
            malformed = self.stats.malformed,
            "Ticker stream closed"
        );
        self.close = Some(info.clone());
        self.transition(SessionState::Closed);
    }
}

/// First 100 characters of a frame, for logs
fn preview(text: &str) -> String {
    text.chars().take(100).collect()
}

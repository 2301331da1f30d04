//! Single-session WebSocket client
//!
//! Drives one connection from handshake to close and reports every lifecycle
//! step to a [`WsHandler`]. There is no reconnection: when the connection ends
//! the session is over and any retry policy belongs to the caller.

use super::types::{CloseInfo, WsConfig, WsError};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

/// Write half of a connected WebSocket
pub type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// How long to wait for the peer to end the stream once close frames are exchanged
const CLOSE_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Lifecycle hooks invoked by [`WsClient::run`]
///
/// All hooks run on the task that owns the connection, so a slow hook stalls
/// the read loop.
#[async_trait]
pub trait WsHandler: Send {
    /// Called once after the handshake completes
    async fn on_open(&mut self, sink: &mut WsSink) -> Result<(), WsError>;

    /// Called for each text frame (and each UTF-8 binary frame)
    async fn on_message(&mut self, text: &str);

    /// Called for connect, send and read failures.
    ///
    /// The transport cannot be read after an error, so `on_close` always
    /// follows.
    fn on_error(&mut self, err: &WsError);

    /// Called exactly once when the session reaches its terminal state
    fn on_close(&mut self, info: &CloseInfo);
}

/// WebSocket client for a single session
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Connect, run the read loop until the peer closes, the transport fails
    /// or `cancel` fires, then return.
    ///
    /// Failures are reported to `handler` before being returned. A cancelled
    /// session sends a normal close frame and returns `Ok(())`.
    pub async fn run<H: WsHandler>(
        &self,
        handler: &mut H,
        cancel: CancellationToken,
    ) -> Result<(), WsError> {
        if let Err(e) = self.config.validate() {
            return Err(Self::fail(handler, e));
        }

        tracing::info!(url = %self.config.url, "Connecting to WebSocket");

        let connect = tokio::time::timeout(self.config.connect_timeout, connect_async(&self.config.url));
        let ws_stream = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                handler.on_close(&CloseInfo::new(None, "cancelled before connect"));
                return Ok(());
            }
            res = connect => match res {
                Ok(Ok((stream, _response))) => stream,
                Ok(Err(e)) => {
                    return Err(Self::fail(handler, WsError::ConnectionFailed(e.to_string())));
                }
                Err(_) => {
                    return Err(Self::fail(handler, WsError::Timeout(self.config.connect_timeout)));
                }
            }
        };

        let (mut write, mut read) = ws_stream.split();
        tracing::info!("WebSocket connected");

        if let Err(e) = handler.on_open(&mut write).await {
            let _ = write.close().await;
            return Err(Self::fail(handler, e));
        }

        let mut ping_interval = tokio::time::interval(self.config.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; the subscribe frame already went out.
        ping_interval.tick().await;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::info!("Closing WebSocket on request");
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: "client shutdown".into(),
                    };
                    if let Err(e) = write.send(Message::Close(Some(frame))).await {
                        tracing::debug!(error = %e, "Close frame not delivered");
                    }
                    finish_close(&mut write, &mut read).await;
                    handler.on_close(&CloseInfo::new(Some(1000), "client shutdown"));
                    return Ok(());
                }

                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            handler.on_message(&text).await;
                        }
                        Some(Ok(Message::Binary(data))) => match String::from_utf8(data) {
                            Ok(text) => handler.on_message(&text).await,
                            Err(_) => tracing::trace!("Ignoring non-UTF-8 binary frame"),
                        },
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = write.send(Message::Pong(data)).await {
                                return Err(Self::fail(handler, WsError::SendFailed(e.to_string())));
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let info = match frame {
                                Some(f) => CloseInfo::new(Some(u16::from(f.code)), f.reason.into_owned()),
                                None => CloseInfo::new(None, "closed by peer"),
                            };
                            tracing::info!(code = ?info.code, reason = %info.reason, "Received close frame");
                            finish_close(&mut write, &mut read).await;
                            handler.on_close(&info);
                            return Ok(());
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            return Err(Self::fail(handler, WsError::Transport(e.to_string())));
                        }
                        None => {
                            let err = WsError::Transport("stream ended unexpectedly".into());
                            return Err(Self::fail(handler, err));
                        }
                    }
                }

                _ = ping_interval.tick() => {
                    let ping = match &self.config.heartbeat {
                        Some(payload) => Message::Text(payload.clone()),
                        None => Message::Ping(Vec::new()),
                    };
                    if let Err(e) = write.send(ping).await {
                        return Err(Self::fail(handler, WsError::SendFailed(e.to_string())));
                    }
                }
            }
        }
    }

    /// Report a terminal error to the handler and hand it back
    fn fail<H: WsHandler>(handler: &mut H, err: WsError) -> WsError {
        tracing::warn!(error = %err, "WebSocket session ended with error");
        handler.on_error(&err);
        handler.on_close(&CloseInfo::new(None, err.to_string()));
        err
    }
}

/// Complete the closing handshake.
///
/// tungstenite queues the reply to a peer's close frame until the next write
/// or read, and the peer only sees a clean close once the stream is read to
/// its end.
async fn finish_close(write: &mut WsSink, read: &mut WsSource) {
    if let Err(e) = write.flush().await {
        tracing::debug!(error = %e, "Close reply not flushed");
    }

    let drained = tokio::time::timeout(CLOSE_DRAIN_TIMEOUT, async {
        while let Some(Ok(_)) = read.next().await {}
    })
    .await;

    if drained.is_err() {
        tracing::debug!("Peer kept the connection open after close");
    }
}

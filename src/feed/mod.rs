//! Ticker feed module
//!
//! Subscribes to live ticker channels over WebSocket and delivers decoded
//! updates to a consumer.

mod bybit;
mod frame;
mod session;
mod sink;
mod types;

pub use bybit::{BybitTickerFeed, BYBIT_HEARTBEAT};
pub use frame::{decode_frame, FrameError, FrameOutcome};
pub use session::{FrameStats, SessionReport, SessionState, TickerSession};
pub use sink::{ChannelSink, OutputFormat, PrintSink, TickerSink};
pub use types::{
    is_ticker_topic, ticker_topic, SubscriptionRequest, TickerField, TickerUpdate, NOT_AVAILABLE,
};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Trait for ticker feed implementations
#[async_trait]
pub trait TickerFeed: Send + Sync {
    /// Subscribe to ticker updates until `cancel` fires or the connection ends
    async fn subscribe(
        &self,
        cancel: CancellationToken,
    ) -> anyhow::Result<mpsc::Receiver<TickerUpdate>>;
}

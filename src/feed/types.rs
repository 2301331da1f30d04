//! Ticker feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rendered in place of a field the feed did not send
pub const NOT_AVAILABLE: &str = "N/A";

/// Topic prefix of the ticker channel
pub const TICKER_TOPIC_PREFIX: &str = "tickers";

/// Build the ticker topic for a symbol (e.g. `tickers.ETHUSDT`)
pub fn ticker_topic(symbol: &str) -> String {
    format!("{}.{}", TICKER_TOPIC_PREFIX, symbol)
}

/// Whether `topic` names a ticker channel
pub fn is_ticker_topic(topic: &str) -> bool {
    topic
        .split_once('.')
        .map(|(channel, symbol)| channel == TICKER_TOPIC_PREFIX && !symbol.is_empty())
        .unwrap_or(false)
}

/// Numeric fields carried by a ticker update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerField {
    LastPrice,
    Bid1Price,
    Ask1Price,
    HighPrice24h,
    LowPrice24h,
    Volume24h,
}

/// A single decoded ticker snapshot
///
/// Price fields keep the exact decimal string sent by the exchange. `None`
/// means the field was not in the frame and renders as [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerUpdate {
    /// Instrument identifier (e.g., "ETHUSDT")
    pub symbol: String,
    /// Last traded price
    pub last_price: Option<String>,
    /// Best bid price
    pub bid1_price: Option<String>,
    /// Best ask price
    pub ask1_price: Option<String>,
    /// Highest price over the last 24 hours
    pub high_price_24h: Option<String>,
    /// Lowest price over the last 24 hours
    pub low_price_24h: Option<String>,
    /// Traded volume over the last 24 hours, in the base asset
    pub volume_24h: Option<String>,
    /// Local timestamp when the frame was decoded
    pub received_at: DateTime<Utc>,
}

impl TickerUpdate {
    /// Create an update with no price fields set
    pub fn new(symbol: impl Into<String>, received_at: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            last_price: None,
            bid1_price: None,
            ask1_price: None,
            high_price_24h: None,
            low_price_24h: None,
            volume_24h: None,
            received_at,
        }
    }

    /// Raw string value of a field, if present
    pub fn raw(&self, field: TickerField) -> Option<&str> {
        let value = match field {
            TickerField::LastPrice => &self.last_price,
            TickerField::Bid1Price => &self.bid1_price,
            TickerField::Ask1Price => &self.ask1_price,
            TickerField::HighPrice24h => &self.high_price_24h,
            TickerField::LowPrice24h => &self.low_price_24h,
            TickerField::Volume24h => &self.volume_24h,
        };
        value.as_deref()
    }

    /// Field value for display, [`NOT_AVAILABLE`] when absent
    pub fn display_value(&self, field: TickerField) -> &str {
        self.raw(field).unwrap_or(NOT_AVAILABLE)
    }

    /// Field parsed as a decimal. Absent or unparseable values yield `None`.
    pub fn decimal(&self, field: TickerField) -> Option<Decimal> {
        self.raw(field).and_then(|s| Decimal::from_str(s).ok())
    }

    /// Ask minus bid, when both sides are present and numeric
    pub fn spread(&self) -> Option<Decimal> {
        let bid = self.decimal(TickerField::Bid1Price)?;
        let ask = self.decimal(TickerField::Ask1Price)?;
        Some(ask - bid)
    }
}

impl fmt::Display for TickerUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} last={} bid={} ask={} high24h={} low24h={} vol24h={}",
            self.symbol,
            self.display_value(TickerField::LastPrice),
            self.display_value(TickerField::Bid1Price),
            self.display_value(TickerField::Ask1Price),
            self.display_value(TickerField::HighPrice24h),
            self.display_value(TickerField::LowPrice24h),
            self.display_value(TickerField::Volume24h),
        )
    }
}

/// Outbound subscribe directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    /// Operation: always "subscribe"
    pub op: String,
    /// Topics in the order they were requested
    pub args: Vec<String>,
}

impl SubscriptionRequest {
    /// Subscribe to the given topics
    pub fn subscribe(topics: Vec<String>) -> Self {
        Self {
            op: "subscribe".to_string(),
            args: topics,
        }
    }

    /// Subscribe to the ticker channel of each symbol
    pub fn tickers<S: AsRef<str>>(symbols: &[S]) -> Self {
        Self::subscribe(symbols.iter().map(|s| ticker_topic(s.as_ref())).collect())
    }

    /// Encode as a JSON text frame
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

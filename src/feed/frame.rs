//! Inbound frame decoding
//!
//! Bybit v5 public frames look like
//! `{"topic":"tickers.ETHUSDT","type":"snapshot","data":{...},"ts":...}`;
//! operation acknowledgements look like
//! `{"success":true,"ret_msg":"","op":"subscribe","conn_id":"..."}`.

use super::types::{is_ticker_topic, TickerUpdate};
use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Why a frame could not be decoded
#[derive(Debug, Error)]
pub enum FrameError {
    /// Frame text is not JSON, or not a JSON object
    #[error("invalid frame: {0}")]
    InvalidJson(#[source] serde_json::Error),
    /// Ticker frame whose `data` is not an object
    #[error("ticker payload is not an object")]
    PayloadNotObject,
    /// Ticker frame whose `data` has fields of the wrong type
    #[error("invalid ticker payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

/// Result of decoding one inbound frame
#[derive(Debug)]
pub enum FrameOutcome {
    /// A ticker update for the consumer
    Ticker(TickerUpdate),
    /// Reply to an operation we sent (subscribe, ping)
    Ack {
        op: String,
        success: bool,
        message: Option<String>,
    },
    /// Well-formed frame that is not a ticker
    Ignored,
    /// Frame that could not be decoded
    Malformed(FrameError),
}

impl FrameOutcome {
    /// Short label used for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            FrameOutcome::Ticker(_) => "ticker",
            FrameOutcome::Ack { .. } => "ack",
            FrameOutcome::Ignored => "ignored",
            FrameOutcome::Malformed(_) => "malformed",
        }
    }
}

/// Top-level frame envelope
#[derive(Debug, Deserialize)]
struct WireFrame {
    topic: Option<String>,
    data: Option<Value>,
    op: Option<String>,
    success: Option<bool>,
    ret_msg: Option<String>,
}

/// Ticker payload. Every field is optional; delta frames carry only the
/// fields that changed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTicker {
    #[serde(default, deserialize_with = "string_or_number")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    last_price: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    bid1_price: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    ask1_price: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    high_price_24h: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    low_price_24h: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    volume_24h: Option<String>,
}

/// Accept a string or a bare number; null and "" count as absent
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Decode one text frame
pub fn decode_frame(text: &str, received_at: DateTime<Utc>) -> FrameOutcome {
    let frame: WireFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => return FrameOutcome::Malformed(FrameError::InvalidJson(e)),
    };

    let topic = match frame.topic.as_deref() {
        Some(topic) => topic,
        None => {
            return match frame.op {
                Some(op) => FrameOutcome::Ack {
                    op,
                    success: frame.success.unwrap_or(true),
                    message: frame.ret_msg.filter(|m| !m.is_empty()),
                },
                None => FrameOutcome::Ignored,
            };
        }
    };

    if !is_ticker_topic(topic) {
        return FrameOutcome::Ignored;
    }

    let data = match frame.data {
        Some(data) => data,
        None => return FrameOutcome::Ignored,
    };
    if !data.is_object() {
        return FrameOutcome::Malformed(FrameError::PayloadNotObject);
    }

    let ticker: WireTicker = match serde_json::from_value(data) {
        Ok(ticker) => ticker,
        Err(e) => return FrameOutcome::Malformed(FrameError::InvalidPayload(e)),
    };

    let symbol = ticker.symbol.unwrap_or_else(|| {
        topic
            .split_once('.')
            .map(|(_, symbol)| symbol.to_string())
            .unwrap_or_default()
    });

    FrameOutcome::Ticker(TickerUpdate {
        symbol,
        last_price: ticker.last_price,
        bid1_price: ticker.bid1_price,
        ask1_price: ticker.ask1_price,
        high_price_24h: ticker.high_price_24h,
        low_price_24h: ticker.low_price_24h,
        volume_24h: ticker.volume_24h,
        received_at,
    })
}

//! Prometheus metrics
//!
//! Recorded through the `metrics` facade; without an installed exporter every
//! call is a no-op.

/// Counter metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMetric {
    /// Frame decoded into a ticker update
    TickerFrame,
    /// Operation acknowledgement (subscribe, ping)
    AckFrame,
    /// Well-formed frame on another channel
    IgnoredFrame,
    /// Frame that failed to decode
    MalformedFrame,
    /// Transport-level error reported by the connection
    TransportError,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeMetric {
    /// Current session state (0 = idle .. 4 = closed)
    SessionState,
    /// Number of topics in the active subscription
    SubscribedTopics,
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    match metric {
        CounterMetric::TickerFrame => {
            metrics::counter!("ticker_stream_frames_total", "outcome" => "ticker").increment(1)
        }
        CounterMetric::AckFrame => {
            metrics::counter!("ticker_stream_frames_total", "outcome" => "ack").increment(1)
        }
        CounterMetric::IgnoredFrame => {
            metrics::counter!("ticker_stream_frames_total", "outcome" => "ignored").increment(1)
        }
        CounterMetric::MalformedFrame => {
            metrics::counter!("ticker_stream_frames_total", "outcome" => "malformed").increment(1)
        }
        CounterMetric::TransportError => {
            metrics::counter!("ticker_stream_transport_errors_total").increment(1)
        }
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    match metric {
        GaugeMetric::SessionState => metrics::gauge!("ticker_stream_session_state").set(value),
        GaugeMetric::SubscribedTopics => {
            metrics::gauge!("ticker_stream_subscribed_topics").set(value)
        }
    }
}

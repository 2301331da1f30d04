//! ticker-stream: live crypto ticker subscription client
//!
//! This library provides:
//! - A single-session WebSocket client with lifecycle hooks
//! - Bybit ticker subscription and frame decoding
//! - Pluggable consumers for decoded updates
//! - Time-boxed sessions with cooperative cancellation
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod feed;
pub mod telemetry;
pub mod ws;

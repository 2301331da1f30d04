//! WebSocket client library
//!
//! Provides a single-session WebSocket client with lifecycle hooks,
//! keepalive handling and cooperative cancellation.

mod client;
mod types;

pub use client::{WsClient, WsHandler, WsSink};
pub use types::{CloseInfo, WsConfig, WsError};

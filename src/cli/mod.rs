//! CLI interface for ticker-stream
//!
//! Provides subcommands for:
//! - `stream`: Subscribe to live tickers for a fixed time window
//! - `config`: Show the effective configuration

mod stream;

pub use stream::StreamArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ticker-stream")]
#[command(about = "Stream live crypto tickers from a Bybit-style WebSocket feed")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Subscribe to tickers and print each update
    Stream(StreamArgs),
    /// Show the effective configuration
    Config,
}

//! Consumers of decoded ticker updates

use super::types::TickerUpdate;
use async_trait::async_trait;
use std::io::Write;
use tokio::sync::mpsc;

/// Receives every ticker update on the connection's worker task
///
/// The worker awaits each call, so a slow sink stalls the read loop.
#[async_trait]
pub trait TickerSink: Send {
    async fn on_update(&mut self, update: TickerUpdate);
}

/// Line format used by [`PrintSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `ETHUSDT last=2500.1 bid=N/A ...`
    Plain,
    /// One JSON object per line
    Json,
}

/// Writes one line per update
pub struct PrintSink<W> {
    format: OutputFormat,
    out: W,
}

impl PrintSink<std::io::Stdout> {
    /// Print to standard output
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, std::io::stdout())
    }
}

impl<W: Write + Send> PrintSink<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_update(&mut self, update: &TickerUpdate) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Plain => writeln!(self.out, "{}", update)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, update)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

#[async_trait]
impl<W: Write + Send> TickerSink for PrintSink<W> {
    async fn on_update(&mut self, update: TickerUpdate) {
        if let Err(e) = self.write_update(&update) {
            tracing::warn!(error = %e, symbol = %update.symbol, "Failed to print ticker update");
        }
    }
}

/// Forwards updates into a channel
pub struct ChannelSink {
    tx: mpsc::Sender<TickerUpdate>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<TickerUpdate>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl TickerSink for ChannelSink {
    async fn on_update(&mut self, update: TickerUpdate) {
        if self.tx.send(update).await.is_err() {
            tracing::debug!("Ticker receiver dropped, update discarded");
        }
    }
}

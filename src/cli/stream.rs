//! Stream command implementation

use crate::config::Config;
use crate::feed::{BybitTickerFeed, OutputFormat, PrintSink};
use clap::Args;
use tokio_util::sync::CancellationToken;

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Symbol to subscribe to (repeatable); replaces `feed.symbols`
    #[arg(short, long = "symbol")]
    pub symbols: Vec<String>,

    /// Session length in seconds; replaces `session.duration_secs`
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// WebSocket endpoint; replaces `feed.ws_url`
    #[arg(long)]
    pub url: Option<String>,

    /// Print updates as JSON lines
    #[arg(long)]
    pub json: bool,
}

impl StreamArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &Config) -> anyhow::Result<Config> {
        let mut config = config.clone();
        if !self.symbols.is_empty() {
            config.feed.symbols = self.symbols.clone();
        }
        if let Some(duration) = self.duration {
            config.session.duration_secs = duration;
        }
        if let Some(ref url) = self.url {
            config.feed.ws_url = url.clone();
        }
        config.validate()?;
        Ok(config)
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let config = self.apply(config)?;
        let feed = BybitTickerFeed::from_config(&config.feed, &config.session);
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Plain
        };

        let shutdown = CancellationToken::new();
        let signal = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received shutdown signal");
                signal.cancel();
            }
        });

        let report = feed
            .run_for(
                PrintSink::stdout(format),
                config.session.duration(),
                shutdown,
            )
            .await?;

        tracing::info!(
            state = ?report.state,
            tickers = report.stats.tickers,
            acks = report.stats.acks,
            ignored = report.stats.ignored,
            malformed = report.stats.malformed,
            error = ?report.error,
            "Ticker session finished"
        );

        Ok(())
    }
}

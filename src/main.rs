use clap::Parser;
use ticker_stream::cli::{Cli, Commands};
use ticker_stream::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    ticker_stream::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Stream(args) => {
            tracing::info!("Starting ticker stream");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

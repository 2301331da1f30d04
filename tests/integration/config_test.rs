//! Integration tests for configuration loading

use std::io::Write;
use ticker_stream::config::Config;
use ticker_stream::feed::BybitTickerFeed;

#[test]
fn test_example_config_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.feed.symbols, vec!["ETHUSDT"]);
    assert_eq!(config.session.duration_secs, 30);
}

#[test]
fn test_config_file_builds_feed() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [feed]
        ws_url = "wss://stream-testnet.bybit.com/v5/public/linear"
        symbols = ["btcusdt", "ETHUSDT"]
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    let feed = BybitTickerFeed::from_config(&config.feed, &config.session);

    assert_eq!(feed.url(), "wss://stream-testnet.bybit.com/v5/public/linear");
    assert_eq!(
        feed.subscription().args,
        vec!["tickers.BTCUSDT", "tickers.ETHUSDT"]
    );
}

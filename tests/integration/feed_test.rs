//! Integration tests for the ticker feed

use crate::support::{mock_server, refused_url};
use std::time::Duration;
use ticker_stream::config::{FeedConfig, SessionConfig};
use ticker_stream::feed::{
    BybitTickerFeed, ChannelSink, SessionState, TickerFeed, TickerField, TickerUpdate,
    BYBIT_HEARTBEAT, NOT_AVAILABLE,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const SUBSCRIBE_ETH: &str = r#"{"op":"subscribe","args":["tickers.ETHUSDT"]}"#;
const ETH_TICKER: &str =
    r#"{"topic":"tickers.ETHUSDT","data":{"symbol":"ETHUSDT","lastPrice":"2500.1"}}"#;

async fn drain(mut rx: mpsc::Receiver<TickerUpdate>) -> Vec<TickerUpdate> {
    let mut updates = Vec::new();
    while let Some(update) = rx.recv().await {
        updates.push(update);
    }
    updates
}

#[tokio::test]
async fn test_session_subscribes_once_and_emits_tickers() {
    let server = mock_server(
        vec![
            r#"{"success":true,"ret_msg":"","conn_id":"c1","op":"subscribe"}"#.to_string(),
            "this is not json".to_string(),
            r#"{"topic":"publicTrade.ETHUSDT","data":[{"p":"2500.0"}]}"#.to_string(),
            ETH_TICKER.to_string(),
        ],
        true,
    )
    .await;

    let feed = BybitTickerFeed::new(&["ETHUSDT"]).with_url(&server.url);
    let (tx, rx) = mpsc::channel(16);

    let report = tokio::time::timeout(
        Duration::from_secs(10),
        feed.run_for(ChannelSink::new(tx), Duration::from_secs(5), CancellationToken::new()),
    )
    .await
    .expect("session timed out")
    .unwrap();

    let updates = drain(rx).await;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].symbol, "ETHUSDT");
    assert_eq!(updates[0].last_price.as_deref(), Some("2500.1"));
    assert_eq!(updates[0].bid1_price, None);
    assert_eq!(updates[0].display_value(TickerField::Bid1Price), NOT_AVAILABLE);

    assert_eq!(report.state, SessionState::Closed);
    assert_eq!(report.subscriptions_sent, 1);
    assert_eq!(report.stats.tickers, 1);
    assert_eq!(report.stats.acks, 1);
    assert_eq!(report.stats.ignored, 1);
    assert_eq!(report.stats.malformed, 1);

    assert_eq!(report.close_reason.as_deref(), Some("closed by peer"));
    assert!(report.error.is_none());

    let log = server.handle.await.unwrap();
    assert_eq!(log.received.first().map(String::as_str), Some(SUBSCRIBE_ETH));
    assert_eq!(log.received.iter().filter(|f| f.contains("subscribe")).count(), 1);
    assert!(log.clean_end, "client left without answering the close frame");
}

#[tokio::test]
async fn test_time_budget_ends_idle_session() {
    let server = mock_server(Vec::new(), false).await;
    let feed = BybitTickerFeed::new(&["ETHUSDT"]).with_url(&server.url);
    let (tx, rx) = mpsc::channel(16);

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        feed.run_for(
            ChannelSink::new(tx),
            Duration::from_millis(300),
            CancellationToken::new(),
        ),
    )
    .await
    .expect("budget did not end the session")
    .unwrap();

    assert!(drain(rx).await.is_empty());
    assert_eq!(report.state, SessionState::Closed);
    assert_eq!(report.stats.total(), 0);
    assert_eq!(report.close_code, Some(1000));

    let log = server.handle.await.unwrap();
    assert_eq!(log.received, vec![SUBSCRIBE_ETH.to_string()]);
    assert!(log.clean_end);
}

#[tokio::test]
async fn test_shutdown_token_cancels_session() {
    let server = mock_server(Vec::new(), false).await;
    let feed = BybitTickerFeed::new(&["ETHUSDT"]).with_url(&server.url);
    let (tx, _rx) = mpsc::channel(16);

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        feed.run_for(ChannelSink::new(tx), Duration::from_secs(60), shutdown),
    )
    .await
    .expect("shutdown did not end the session")
    .unwrap();

    assert_eq!(report.state, SessionState::Closed);
    assert_eq!(report.subscriptions_sent, 1);
}

#[tokio::test]
async fn test_connection_refused_is_reported_not_fatal() {
    let feed = BybitTickerFeed::new(&["ETHUSDT"]).with_url(refused_url());
    let (tx, rx) = mpsc::channel(16);

    let report = feed
        .run_for(ChannelSink::new(tx), Duration::from_secs(5), CancellationToken::new())
        .await
        .unwrap();

    assert!(drain(rx).await.is_empty());
    assert_eq!(report.state, SessionState::Closed);
    assert_eq!(report.subscriptions_sent, 0);
    assert!(report.error.unwrap().starts_with("Connection failed"));
}

#[tokio::test]
async fn test_feed_trait_delivers_through_receiver() {
    let server = mock_server(
        vec![
            ETH_TICKER.to_string(),
            r#"{"topic":"tickers.ETHUSDT","type":"delta","data":{"bid1Price":"2500.0"}}"#
                .to_string(),
        ],
        true,
    )
    .await;

    let feed = BybitTickerFeed::new(&["ETHUSDT"]).with_url(&server.url);
    let rx = feed.subscribe(CancellationToken::new()).await.unwrap();

    let updates = tokio::time::timeout(Duration::from_secs(5), drain(rx))
        .await
        .expect("feed did not finish");

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[1].symbol, "ETHUSDT");
    assert_eq!(updates[1].bid1_price.as_deref(), Some("2500.0"));
    assert_eq!(updates[1].last_price, None);
}

#[tokio::test]
async fn test_subscription_report_survives_connect_failure() {
    let feed = BybitTickerFeed::new(&["ETHUSDT"]).with_url(refused_url());
    let (rx, worker) = feed.subscribe_with_report(CancellationToken::new());

    let updates = tokio::time::timeout(Duration::from_secs(5), drain(rx))
        .await
        .expect("receiver was not closed");
    let report = worker.await.unwrap();

    assert!(updates.is_empty());
    assert_eq!(report.state, SessionState::Closed);
    assert_eq!(report.subscriptions_sent, 0);
    assert!(report.error.unwrap().starts_with("Connection failed"));
    assert!(report.close_reason.is_some());
}

#[tokio::test]
async fn test_subscription_report_records_peer_close() {
    let server = mock_server(vec![ETH_TICKER.to_string()], true).await;
    let feed = BybitTickerFeed::new(&["ETHUSDT"]).with_url(&server.url);
    let (rx, worker) = feed.subscribe_with_report(CancellationToken::new());

    let updates = tokio::time::timeout(Duration::from_secs(5), drain(rx))
        .await
        .expect("feed did not finish");
    let report = worker.await.unwrap();

    assert_eq!(updates.len(), 1);
    assert_eq!(report.stats.tickers, 1);
    assert_eq!(report.close_reason.as_deref(), Some("closed by peer"));
    assert!(report.error.is_none());
    assert!(server.handle.await.unwrap().clean_end);
}

#[tokio::test]
async fn test_heartbeat_sent_on_interval() {
    let server = mock_server(Vec::new(), false).await;
    let feed_config = FeedConfig {
        ws_url: server.url.clone(),
        symbols: vec!["ETHUSDT".to_string()],
        buffer_size: 16,
    };
    let session = SessionConfig {
        ping_interval_secs: 1,
        ..SessionConfig::default()
    };
    let feed = BybitTickerFeed::from_config(&feed_config, &session);
    let (tx, _rx) = mpsc::channel(16);

    feed.run_for(
        ChannelSink::new(tx),
        Duration::from_millis(1500),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    let received = server.handle.await.unwrap().received;
    assert_eq!(received[0], SUBSCRIBE_ETH);
    assert!(received.iter().any(|f| f == BYBIT_HEARTBEAT));
    assert_eq!(received.iter().filter(|f| f.contains("subscribe")).count(), 1);
}

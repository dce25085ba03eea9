//! Integration tests for captured feed replay

use rust_decimal_macros::dec;
use std::io::Write;
use std::sync::Arc;
use tape_flow::clock::ManualClock;
use tape_flow::feed::{FeedSource, FileReplayFeed};
use tape_flow::ledger::Level;
use tape_flow::store::MarketStore;
use tempfile::NamedTempFile;

const NOW: i64 = 1_709_908_217_000;

fn feed_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let lines = [
        r#"{"notify":[{"heartbeat":"1709908216000"}]}"#,
        r#"{"data":[{"service":"QUOTE","timestamp":1709908216000,"content":[{"key":"SPY","bidPrice":"450.00","askPrice":"450.02","bidSize":"3","askSize":"4","quoteTime":1709908216000,"tradeTime":1709908215900}]}]}"#,
        r#"{"data":[{"service":"TIMESALE_EQUITY","timestamp":1709908216500,"content":[{"key":"SPY","time":1709908216400,"price":"450.00","size":"100","sequence":1},{"key":"SPY","price":"bad"},{"key":"SPY","time":1709908216450,"price":"450.02","size":"40","sequence":2}]}]}"#,
        "not json",
        r#"{"data":[{"service":"LISTED_BOOK","timestamp":1709908216600,"content":[{"key":"SPY","bids":[{"price":"450.00","size":"300"},{"price":"449.50","size":"900"}],"asks":[{"price":"450.02","size":"200"}]}]}]}"#,
        r#"{"data":[{"service":"CHART_EQUITY","timestamp":1709908216700,"content":[{"key":"SPY","sequence":5,"open":"449.9","high":"450.1","low":"449.8","close":"450.0","volume":"12000"}]}]}"#,
        r#"{"data":[{"service":"CHART_EQUITY","timestamp":1709908216800,"content":[{"key":"SPY","sequence":5,"open":"449.9","high":"450.2","low":"449.8","close":"450.1","volume":"13000"}]}]}"#,
        r#"{"data":[{"service":"NEWS_HEADLINE","timestamp":1709908216900,"content":[{"key":"SPY"}]}]}"#,
    ];
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[tokio::test]
async fn test_replay_into_store() {
    let file = feed_file();
    let store = MarketStore::new(Arc::new(ManualClock::at_millis(NOW)));

    let rx = FileReplayFeed::new(file.path()).subscribe().await.unwrap();
    let report = store.run(rx).await;

    assert_eq!(report.applied, 6);
    assert_eq!(report.skipped, 2);

    assert_eq!(store.print_count("SPY", Some(Level::AtBid), 0), 1);
    assert_eq!(store.print_count("SPY", Some(Level::AtAsk), 0), 1);
    assert_eq!(store.quote_latency_ms("SPY"), Some(1709908216000 - 1709908216450));

    let book = store.book_data("SPY");
    assert_eq!(book.bids.len(), 1);
    assert_eq!(store.book_pie_data("SPY", 0).bid.size, dec!(1200));

    let candles = store.candles("SPY");
    assert_eq!(candles.len(), 1);
    assert_eq!(candles[0].close, dec!(450.1));
}

#[tokio::test]
async fn test_replay_missing_file_errors() {
    let result = FileReplayFeed::new("/nonexistent/feed.jsonl").subscribe().await;
    assert!(result.is_err());
}

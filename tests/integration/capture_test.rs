//! Integration tests for real-time CSV capture

use chrono::Local;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tape_flow::capture::{capture_file_path, CaptureSchema, CaptureSink, SinkConfig};
use tape_flow::clock::{Clock, ManualClock};
use tape_flow::feed::{FeedMessage, QuoteMessage, Service, ServiceBlock, TimeSaleMessage};
use tape_flow::store::MarketStore;
use tempfile::TempDir;

const NOW: i64 = 1_709_908_217_000;

fn blocks(trades: usize) -> FeedMessage {
    let mut blocks = vec![ServiceBlock::Quote(QuoteMessage {
        symbol: "SPY".to_string(),
        bid_price: dec!(450.00),
        ask_price: dec!(450.02),
        bid_size: Decimal::ONE,
        ask_size: Decimal::ONE,
        last_price: Decimal::ZERO,
        last_size: Decimal::ZERO,
        quote_time: NOW,
        trade_time: NOW,
    })];
    for i in 0..trades {
        blocks.push(ServiceBlock::TimeSale(TimeSaleMessage {
            symbol: "SPY".to_string(),
            time: NOW + i as i64,
            price: dec!(450.00),
            size: dec!(10),
            sequence: i as i64,
        }));
    }
    FeedMessage::new(NOW, blocks)
}

#[tokio::test]
async fn test_capture_writes_one_header_per_day() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::at_millis(NOW));
    let sink = CaptureSink::spawn(
        SinkConfig {
            output_dir: dir.path().to_path_buf(),
            channel_capacity: 64,
            schema: CaptureSchema::new(vec![
                "symbol".to_string(),
                "price".to_string(),
                "size".to_string(),
                "level".to_string(),
            ]),
        },
        clock.clone(),
    );
    let store = MarketStore::new(clock.clone()).with_capture(sink);

    store.dispatch(&blocks(3));
    store.dispatch(&blocks(2));
    store.capture().unwrap().flush().await.unwrap();

    let date = clock.now().with_timezone(&Local).date_naive();
    let path = capture_file_path(dir.path(), Service::TimesaleEquity, "SPY", date);
    let content = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines[0], "symbol,price,size,level");
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[1], "SPY,450.00,10,2");
    assert_eq!(lines.iter().filter(|l| l.starts_with("symbol")).count(), 1);
}

#[tokio::test]
async fn test_capture_failure_does_not_stop_ingestion() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::at_millis(NOW));
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let sink = CaptureSink::spawn(
        SinkConfig {
            output_dir: blocker,
            channel_capacity: 64,
            schema: CaptureSchema::default(),
        },
        clock.clone(),
    );
    let store = MarketStore::new(clock).with_capture(sink);

    let report = store.dispatch(&blocks(4));
    store.capture().unwrap().flush().await.unwrap();

    assert_eq!(report.applied, 5);
    assert_eq!(store.print_count("SPY", None, 0), 4);
    let stats = store.capture().unwrap().stats();
    assert_eq!(stats.write_failures, 4);
    assert_eq!(stats.rows_written, 0);
}

//! Integration tests for feed recording and replay of the recording

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tape_flow::clock::ManualClock;
use tape_flow::feed::{
    BookEntry, ChartMessage, FeedMessage, FeedRecorder, FeedSource, FileReplayFeed,
    ListedBookMessage, QuoteMessage, RecorderConfig, ServiceBlock, TimeSaleMessage,
};
use tape_flow::ledger::Level;
use tape_flow::store::MarketStore;
use tempfile::TempDir;

const NOW: i64 = 1_709_908_230_000;

fn quote(bid: Decimal, ask: Decimal, at: i64) -> ServiceBlock {
    ServiceBlock::Quote(QuoteMessage {
        symbol: "SPY".to_string(),
        bid_price: bid,
        ask_price: ask,
        bid_size: dec!(3),
        ask_size: dec!(4),
        last_price: Decimal::ZERO,
        last_size: Decimal::ZERO,
        quote_time: at,
        trade_time: at - 50,
    })
}

fn trade(symbol: &str, time: i64, price: Decimal, size: Decimal, sequence: i64) -> ServiceBlock {
    ServiceBlock::TimeSale(TimeSaleMessage {
        symbol: symbol.to_string(),
        time,
        price,
        size,
        sequence,
    })
}

fn book(bids: &[(Decimal, Decimal)], asks: &[(Decimal, Decimal)]) -> ServiceBlock {
    let side = |levels: &[(Decimal, Decimal)]| -> Vec<BookEntry> {
        levels.iter().map(|&(p, s)| BookEntry::new(p, s)).collect()
    };
    ServiceBlock::ListedBook(ListedBookMessage {
        symbol: "SPY".to_string(),
        bids: side(bids),
        asks: side(asks),
    })
}

fn bar(sequence: i64, close: Decimal, volume: Decimal) -> ServiceBlock {
    ServiceBlock::Chart(ChartMessage {
        symbol: "SPY".to_string(),
        sequence,
        open: dec!(450.00),
        high: dec!(450.20),
        low: dec!(449.90),
        close,
        volume,
    })
}

fn session() -> Vec<FeedMessage> {
    vec![
        FeedMessage::single(NOW - 9_000, quote(dec!(450.00), dec!(450.02), NOW - 9_000)),
        FeedMessage::new(
            NOW - 8_000,
            vec![
                trade("SPY", NOW - 8_100, dec!(450.00), dec!(100), 1),
                trade("SPY", NOW - 8_050, dec!(450.02), dec!(40), 2),
                trade("SPY", NOW - 8_020, dec!(450.03), dec!(25), 3),
                // skipped on dispatch, and again on replay
                trade("", NOW - 8_000, dec!(1), dec!(1), 4),
            ],
        ),
        FeedMessage::single(
            NOW - 7_000,
            book(
                &[(dec!(450.00), dec!(300)), (dec!(449.50), dec!(900))],
                &[(dec!(450.02), dec!(200))],
            ),
        ),
        FeedMessage::single(NOW - 6_000, bar(5, dec!(450.00), dec!(12000))),
        FeedMessage::new(
            NOW - 5_000,
            vec![
                quote(dec!(449.98), dec!(450.01), NOW - 5_000),
                trade("SPY", NOW - 4_900, dec!(449.97), dec!(60), 5),
                trade("SPY", NOW - 4_800, dec!(450.01), dec!(10), 6),
                bar(5, dec!(450.10), dec!(13000)),
            ],
        ),
        FeedMessage::single(NOW - 3_000, trade("QQQ", NOW - 3_000, dec!(380.00), dec!(5), 1)),
        FeedMessage::new(NOW - 2_000, vec![]),
    ]
}

fn assert_same_state(live: &MarketStore, replayed: &MarketStore) {
    assert_eq!(replayed.symbols(), live.symbols());
    assert_eq!(replayed.quote("SPY"), live.quote("SPY"));
    assert_eq!(replayed.quote_latency_ms("SPY"), live.quote_latency_ms("SPY"));

    for symbol in ["SPY", "QQQ"] {
        assert_eq!(replayed.print_count(symbol, None, 0), live.print_count(symbol, None, 0));
        assert_eq!(
            replayed.print_count(symbol, Some(Level::Unknown), 0),
            live.print_count(symbol, Some(Level::Unknown), 0)
        );
        for window in [0, 5, 60] {
            assert_eq!(replayed.print_sum(symbol, None, window), live.print_sum(symbol, None, window));
            assert_eq!(replayed.prints_data(symbol, window, false), live.prints_data(symbol, window, false));
            assert_eq!(replayed.prints_data(symbol, window, true), live.prints_data(symbol, window, true));
            assert_eq!(
                replayed.prints_buys_sells_data(symbol, window, true),
                live.prints_buys_sells_data(symbol, window, true)
            );
            assert_eq!(
                replayed.prints_movement_buys_sells_data(symbol, window),
                live.prints_movement_buys_sells_data(symbol, window)
            );
        }
    }

    assert_eq!(replayed.book_data("SPY"), live.book_data("SPY"));
    assert_eq!(replayed.book_pie_data("SPY", 0), live.book_pie_data("SPY", 0));
    assert_eq!(replayed.book_composite_pie_data("SPY"), live.book_composite_pie_data("SPY"));
    assert_eq!(replayed.candles("SPY"), live.candles("SPY"));
}

#[tokio::test]
async fn test_recorded_session_replays_to_same_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feed.jsonl");
    let clock = Arc::new(ManualClock::at_millis(NOW));

    let live = MarketStore::new(clock.clone()).with_recorder(FeedRecorder::spawn(RecorderConfig {
        path: path.clone(),
        channel_capacity: 64,
    }));
    for message in session() {
        live.dispatch(&message);
    }
    let recorder = live.recorder().unwrap();
    recorder.flush().await.unwrap();

    // the message without blocks is not recorded
    assert_eq!(recorder.stats().lines_written, 6);
    assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 6);

    let replayed = MarketStore::new(clock);
    let rx = FileReplayFeed::new(&path).subscribe().await.unwrap();
    let report = replayed.run(rx).await;

    assert_eq!(report.applied, 11);
    assert_eq!(report.skipped, 1);
    assert!(replayed.recorder().is_none());

    assert_same_state(&live, &replayed);
    assert_eq!(replayed.print_count("SPY", None, 0), 5);
    assert_eq!(replayed.candles("SPY")[0].close, dec!(450.10));
    assert_eq!(replayed.book_pie_data("SPY", 0).bid.size, dec!(1200));
}

#[tokio::test]
async fn test_recording_appends_across_sessions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("feed.jsonl");
    let clock = Arc::new(ManualClock::at_millis(NOW));
    let config = RecorderConfig {
        path: path.clone(),
        channel_capacity: 64,
    };

    let mut first = session();
    let second = first.split_off(3);

    for part in [first, second] {
        let store = MarketStore::new(clock.clone()).with_recorder(FeedRecorder::spawn(config.clone()));
        for message in &part {
            store.dispatch(message);
        }
        store.recorder().unwrap().flush().await.unwrap();
    }

    let replayed = MarketStore::new(clock.clone());
    let rx = FileReplayFeed::new(&path).subscribe().await.unwrap();
    replayed.run(rx).await;

    let live = MarketStore::new(clock);
    for message in session() {
        live.dispatch(&message);
    }
    assert_same_state(&live, &replayed);
}

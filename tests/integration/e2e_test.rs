//! End-to-end integration tests

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tape_flow::clock::ManualClock;
use tape_flow::config::Config;
use tape_flow::feed::{FeedMessage, QuoteMessage, ServiceBlock, TimeSaleMessage};
use tape_flow::ledger::Level;
use tape_flow::store::MarketStore;

// 2024-03-08 14:30:17 UTC
const NOW: i64 = 1_709_908_217_000;

fn quote(bid: Decimal, ask: Decimal) -> FeedMessage {
    FeedMessage::single(
        NOW,
        ServiceBlock::Quote(QuoteMessage {
            symbol: "SPY".to_string(),
            bid_price: bid,
            ask_price: ask,
            bid_size: dec!(5),
            ask_size: dec!(7),
            last_price: Decimal::ZERO,
            last_size: Decimal::ZERO,
            quote_time: NOW,
            trade_time: NOW,
        }),
    )
}

fn trade(time: i64, price: Decimal, size: Decimal) -> FeedMessage {
    FeedMessage::single(
        NOW,
        ServiceBlock::TimeSale(TimeSaleMessage {
            symbol: "SPY".to_string(),
            time,
            price,
            size,
            sequence: 0,
        }),
    )
}

#[test]
fn test_spy_scenario() {
    let store = MarketStore::new(Arc::new(ManualClock::at_millis(NOW)));

    store.dispatch(&quote(dec!(450.00), dec!(450.02)));
    store.dispatch(&trade(NOW, dec!(450.00), dec!(100)));

    let tape = store.tape("SPY");
    let first = tape.last().unwrap();
    assert_eq!(first.level, Level::AtBid);

    let by_size = store.prints_buys_sells_data("SPY", 0, true);
    assert_eq!(by_size.buys.get(&17), Some(&dec!(100)));
    assert!(by_size.sells.is_empty());
    let by_count = store.prints_buys_sells_data("SPY", 0, false);
    assert_eq!(by_count.buys.get(&17), Some(&dec!(1)));

    // bid lifts: only drops count as bid movement
    store.dispatch(&quote(dec!(450.01), dec!(450.02)));
    store.dispatch(&trade(NOW, dec!(450.01), dec!(50)));
    let second = store.tape("SPY").last().cloned().unwrap();
    assert_eq!(second.level, Level::AtBid);
    assert_eq!(second.bid_incr, Decimal::ZERO);

    // bid falls back by a cent
    store.dispatch(&quote(dec!(450.00), dec!(450.02)));
    store.dispatch(&trade(NOW, dec!(450.00), dec!(25)));
    let third = store.tape("SPY").last().cloned().unwrap();
    assert_eq!(third.level, Level::AtBid);
    assert_eq!(third.bid_incr, dec!(0.01));

    assert_eq!(store.print_sum("SPY", Some(Level::AtBid), 0), dec!(175));
    assert_eq!(store.prints_movement_buys_sells_data("SPY", 0).buys.get(&17), Some(&dec!(0.01)));
    assert_eq!(store.quote_latency_ms("SPY"), Some(0));
}

#[test]
fn test_classification_table() {
    let store = MarketStore::new(Arc::new(ManualClock::at_millis(NOW)));
    store.dispatch(&quote(dec!(100.00), dec!(100.05)));

    let cases = [
        (dec!(99.99), Level::BelowBid),
        (dec!(100.00), Level::AtBid),
        (dec!(100.009), Level::AtBid),
        (dec!(100.02), Level::MidSpread),
        (dec!(100.045), Level::AtAsk),
        (dec!(100.05), Level::AtAsk),
        (dec!(100.06), Level::AboveAsk),
    ];
    for (price, _) in cases {
        store.dispatch(&trade(NOW, price, dec!(1)));
    }

    let levels: Vec<Level> = store.tape("SPY").iter().map(|p| p.level).collect();
    let expected: Vec<Level> = cases.iter().map(|(_, level)| *level).collect();
    assert_eq!(levels, expected);
}

#[test]
fn test_default_config_store_has_no_capture() {
    let store = MarketStore::from_config(&Config::default());
    assert!(store.capture().is_none());
    assert!(store.symbols().is_empty());
}

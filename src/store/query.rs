//! Dashboard query surface
//!
//! Every query takes a symbol and tolerates one that has never been seen,
//! returning zero or empty results. `window_secs == 0` means the whole
//! session.

use super::MarketStore;
use crate::aggregate::{self, BuysSells, LevelBreakdown, Measure};
use crate::candle::Candle;
use crate::events::StoreEvent;
use crate::ledger::{Level, PrintTape};
use crate::orderbook::{BookData, BookPie};
use crate::quote::QuoteSnapshot;
use crate::window::Window;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::broadcast;

impl MarketStore {
    /// Number of prints, optionally for one level
    pub fn print_count(&self, symbol: &str, level: Option<Level>, window_secs: u64) -> usize {
        self.ledger
            .count(symbol, level, Window::seconds(window_secs), self.clock.now_millis())
    }

    /// Total print size, optionally for one level
    pub fn print_sum(&self, symbol: &str, level: Option<Level>, window_secs: u64) -> Decimal {
        self.ledger
            .sum(symbol, level, Window::seconds(window_secs), self.clock.now_millis())
    }

    /// Count or size for each level 1..=5
    pub fn prints_data(&self, symbol: &str, window_secs: u64, by_size: bool) -> LevelBreakdown {
        aggregate::prints_data(
            &self.tape(symbol),
            Window::seconds(window_secs),
            self.clock.now_millis(),
            Measure::from_size_flag(by_size),
        )
    }

    /// Per-second buy and sell series
    pub fn prints_buys_sells_data(&self, symbol: &str, window_secs: u64, by_size: bool) -> BuysSells {
        aggregate::buys_sells(
            &self.tape(symbol),
            Window::seconds(window_secs),
            self.clock.now_millis(),
            Measure::from_size_flag(by_size),
        )
    }

    /// Per-second bid drops for buys and ask rises for sells
    pub fn prints_movement_buys_sells_data(&self, symbol: &str, window_secs: u64) -> BuysSells {
        aggregate::movement_buys_sells(
            &self.tape(symbol),
            Window::seconds(window_secs),
            self.clock.now_millis(),
        )
    }

    /// Current banded book levels
    pub fn book_data(&self, symbol: &str) -> BookData {
        self.book.book_data(symbol)
    }

    /// Best price and size seen per side inside the window
    pub fn book_pie_data(&self, symbol: &str, window_secs: u64) -> BookPie {
        self.book
            .pie(symbol, Window::seconds(window_secs), self.clock.now())
    }

    /// Weighted multi-window book pressure
    pub fn book_composite_pie_data(&self, symbol: &str) -> BookPie {
        self.book.composite(symbol, self.clock.now())
    }

    pub fn quote(&self, symbol: &str) -> Option<QuoteSnapshot> {
        self.quotes.get(symbol)
    }

    /// Bars in sequence order
    pub fn candles(&self, symbol: &str) -> Vec<Candle> {
        self.candles.bars(symbol)
    }

    /// `quote_time - time` of the latest enriched print
    pub fn quote_latency_ms(&self, symbol: &str) -> Option<i64> {
        self.ledger.quote_latency_ms(symbol)
    }

    /// Snapshot of a symbol's classified prints
    pub fn tape(&self, symbol: &str) -> Arc<PrintTape> {
        self.ledger.snapshot(symbol).unwrap_or_default()
    }

    /// Symbols with at least one print
    pub fn symbols(&self) -> Vec<String> {
        self.ledger.symbols()
    }

    /// Receive change events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}

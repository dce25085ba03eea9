//! Order book consolidator
//!
//! Keeps the top of each symbol's listed book within a fixed band of the
//! best level, plus a five-minute history of every level seen. Pie and
//! composite views sum that history over trailing windows.

mod book;

pub use book::SymbolBook;

use crate::feed::BookEntry;
use crate::shared::SymbolMap;
use crate::window::Window;
use book::Side;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Max distance from the first raw level for a level to stay current
pub const BAND: Decimal = dec!(0.30);

/// History older than this is pruned
pub const PRUNE_HORIZON_SECS: u64 = 300;

/// `(window seconds, weight)` pairs of the composite pressure view
pub const COMPOSITE_WINDOWS: [(u64, u32); 4] = [(2, 8), (10, 4), (30, 2), (60, 1)];

/// A level held by the consolidator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Decimal,
    pub size: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// Current banded levels for a symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookData {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

/// Aggregate for one side: best historical price and a size total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSide {
    pub price: Decimal,
    pub size: Decimal,
}

/// Bid and ask aggregates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPie {
    pub bid: BookSide,
    pub ask: BookSide,
}

/// Per-symbol book state
#[derive(Debug, Default)]
pub struct OrderBookConsolidator {
    books: SymbolMap<SymbolBook>,
}

impl OrderBookConsolidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a symbol's current levels and record them in history
    pub fn update_book(&self, symbol: &str, bids: &[BookEntry], asks: &[BookEntry], now: DateTime<Utc>) {
        self.books
            .get_or_default(symbol)
            .update(|book| book.apply(bids, asks, now));

        tracing::trace!(symbol, bids = bids.len(), asks = asks.len(), "Book updated");
    }

    /// Drop history older than the prune horizon.
    ///
    /// Every update already prunes its own symbol. This catches symbols that
    /// stopped updating, and runs only if no update holds the writer lock.
    pub fn prune(&self, symbol: &str, now: DateTime<Utc>) -> usize {
        let Some(cell) = self.books.get(symbol) else {
            return 0;
        };

        let removed = cell.try_update(|book| book.prune(now)).unwrap_or(0);
        if removed > 0 {
            tracing::debug!(symbol, removed, "Pruned book history");
        }
        removed
    }

    /// Current banded levels
    pub fn book_data(&self, symbol: &str) -> BookData {
        self.books
            .snapshot(symbol)
            .map(|book| BookData {
                bids: book.bids().to_vec(),
                asks: book.asks().to_vec(),
            })
            .unwrap_or_default()
    }

    /// Best historical price and size seen per side inside `window`
    pub fn pie(&self, symbol: &str, window: Window, now: DateTime<Utc>) -> BookPie {
        self.prune(symbol, now);
        let Some(book) = self.books.snapshot(symbol) else {
            return BookPie::default();
        };

        BookPie {
            bid: book.side_total(Side::Bid, window, now),
            ask: book.side_total(Side::Ask, window, now),
        }
    }

    /// Weighted sum of side totals over the composite windows
    pub fn composite(&self, symbol: &str, now: DateTime<Utc>) -> BookPie {
        self.prune(symbol, now);
        let Some(book) = self.books.snapshot(symbol) else {
            return BookPie::default();
        };

        let weighted = |side: Side| {
            let mut out = BookSide {
                price: book.side_total(side, Window::All, now).price,
                size: Decimal::ZERO,
            };
            for (secs, weight) in COMPOSITE_WINDOWS {
                out.size += book.side_total(side, Window::Trailing(secs), now).size * Decimal::from(weight);
            }
            out
        };

        BookPie {
            bid: weighted(Side::Bid),
            ask: weighted(Side::Ask),
        }
    }

    pub fn symbols(&self) -> Vec<String> {
        self.books.symbols()
    }
}

//! Quote cache
//!
//! Latest level-one quote per symbol. Each update overwrites the previous
//! snapshot; no history is kept.

use crate::feed::QuoteMessage;
use crate::shared::SymbolMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Most recently decoded quote for a symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub bid: Decimal,
    pub ask: Decimal,
    pub bid_size: Decimal,
    pub ask_size: Decimal,
    pub last: Decimal,
    pub last_size: Decimal,
    /// Epoch milliseconds
    pub quote_time: i64,
    /// Epoch milliseconds
    pub trade_time: i64,
}

impl From<&QuoteMessage> for QuoteSnapshot {
    fn from(msg: &QuoteMessage) -> Self {
        Self {
            bid: msg.bid_price,
            ask: msg.ask_price,
            bid_size: msg.bid_size,
            ask_size: msg.ask_size,
            last: msg.last_price,
            last_size: msg.last_size,
            quote_time: msg.quote_time,
            trade_time: msg.trade_time,
        }
    }
}

/// Per-symbol latest quote
#[derive(Debug, Default)]
pub struct QuoteCache {
    quotes: SymbolMap<QuoteSnapshot>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored quote for `symbol`
    pub fn update(&self, symbol: &str, quote: QuoteSnapshot) {
        self.quotes.get_or_default(symbol).update(|current| *current = quote);
    }

    /// Stored quote, or `None` if no quote has arrived for `symbol`
    pub fn get(&self, symbol: &str) -> Option<QuoteSnapshot> {
        self.quotes.snapshot(symbol).map(|q| QuoteSnapshot::clone(&q))
    }

    /// Symbols with a quote
    pub fn symbols(&self) -> Vec<String> {
        self.quotes.symbols()
    }
}

//! Typed inbound message envelopes
//!
//! These are produced by an upstream decoder. Field names follow the
//! streamer's named schema; the symbol travels as `key`.

use crate::error::IngestError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Streamer service that produced a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Service {
    Quote,
    TimesaleEquity,
    ListedBook,
    ChartEquity,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Quote => "QUOTE",
            Service::TimesaleEquity => "TIMESALE_EQUITY",
            Service::ListedBook => "LISTED_BOOK",
            Service::ChartEquity => "CHART_EQUITY",
        }
    }

    /// Parse a wire service name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "QUOTE" => Some(Service::Quote),
            "TIMESALE_EQUITY" => Some(Service::TimesaleEquity),
            "LISTED_BOOK" => Some(Service::ListedBook),
            "CHART_EQUITY" => Some(Service::ChartEquity),
            _ => None,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level-one quote update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteMessage {
    #[serde(rename = "key")]
    pub symbol: String,
    #[serde(default)]
    pub bid_price: Decimal,
    #[serde(default)]
    pub ask_price: Decimal,
    #[serde(default)]
    pub bid_size: Decimal,
    #[serde(default)]
    pub ask_size: Decimal,
    #[serde(default)]
    pub last_price: Decimal,
    #[serde(default)]
    pub last_size: Decimal,
    /// Epoch milliseconds
    #[serde(default)]
    pub quote_time: i64,
    /// Epoch milliseconds
    #[serde(default)]
    pub trade_time: i64,
}

/// A single reported trade (time & sales)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSaleMessage {
    #[serde(rename = "key")]
    pub symbol: String,
    /// Epoch milliseconds
    pub time: i64,
    pub price: Decimal,
    pub size: Decimal,
    #[serde(default)]
    pub sequence: i64,
}

/// One raw price level of a listed book
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookEntry {
    pub price: Decimal,
    pub size: Decimal,
}

impl BookEntry {
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }
}

/// Listed exchange book, best level first on each side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedBookMessage {
    #[serde(rename = "key")]
    pub symbol: String,
    #[serde(default)]
    pub bids: Vec<BookEntry>,
    #[serde(default)]
    pub asks: Vec<BookEntry>,
}

/// One-minute OHLCV bar, keyed by sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMessage {
    #[serde(rename = "key")]
    pub symbol: String,
    pub sequence: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// A decoded content block of a known service
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceBlock {
    Quote(QuoteMessage),
    TimeSale(TimeSaleMessage),
    ListedBook(ListedBookMessage),
    Chart(ChartMessage),
}

impl ServiceBlock {
    pub fn service(&self) -> Service {
        match self {
            ServiceBlock::Quote(_) => Service::Quote,
            ServiceBlock::TimeSale(_) => Service::TimesaleEquity,
            ServiceBlock::ListedBook(_) => Service::ListedBook,
            ServiceBlock::Chart(_) => Service::ChartEquity,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            ServiceBlock::Quote(m) => &m.symbol,
            ServiceBlock::TimeSale(m) => &m.symbol,
            ServiceBlock::ListedBook(m) => &m.symbol,
            ServiceBlock::Chart(m) => &m.symbol,
        }
    }

    /// Structural checks applied before a block touches any state
    pub fn validate(&self) -> Result<(), IngestError> {
        let service = self.service().as_str();
        if self.symbol().is_empty() {
            return Err(IngestError::EmptySymbol { service });
        }

        let malformed = |reason: &str| IngestError::Malformed {
            service,
            symbol: self.symbol().to_string(),
            reason: reason.to_string(),
        };

        match self {
            ServiceBlock::Quote(_) => Ok(()),
            ServiceBlock::TimeSale(m) => {
                if m.time < 0 {
                    Err(malformed("negative trade time"))
                } else if m.size.is_sign_negative() && !m.size.is_zero() {
                    Err(malformed("negative trade size"))
                } else {
                    Ok(())
                }
            }
            ServiceBlock::ListedBook(m) => {
                if m.bids.is_empty() && m.asks.is_empty() {
                    Err(malformed("book has no levels"))
                } else {
                    Ok(())
                }
            }
            ServiceBlock::Chart(m) => {
                if m.high < m.low {
                    Err(malformed("bar high below low"))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// One service envelope of an inbound message
#[derive(Debug, Clone, PartialEq)]
pub struct FeedMessage {
    /// Envelope timestamp, epoch milliseconds
    pub timestamp: i64,
    /// Successfully decoded blocks, in wire order
    pub blocks: Vec<ServiceBlock>,
    /// Blocks the decoder already had to drop
    pub rejected: usize,
}

impl FeedMessage {
    pub fn new(timestamp: i64, blocks: Vec<ServiceBlock>) -> Self {
        Self {
            timestamp,
            blocks,
            rejected: 0,
        }
    }

    pub fn single(timestamp: i64, block: ServiceBlock) -> Self {
        Self::new(timestamp, vec![block])
    }
}

//! Enriched, classified trade prints

use super::classify::{classify, Level};
use crate::feed::TimeSaleMessage;
use crate::quote::QuoteSnapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A trade print with the quote that was current when it arrived.
///
/// Immutable once appended to a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePrint {
    pub symbol: String,
    /// Epoch milliseconds
    pub time: i64,
    pub price: Decimal,
    pub size: Decimal,
    pub sequence: i64,
    pub bid: Decimal,
    pub ask: Decimal,
    pub bid_size: Decimal,
    pub ask_size: Decimal,
    pub last: Decimal,
    pub last_size: Decimal,
    pub quote_time: i64,
    pub trade_time: i64,
    /// How far the bid dropped since the previous print (never negative)
    pub bid_incr: Decimal,
    /// How far the ask rose since the previous print (never negative)
    pub ask_incr: Decimal,
    pub level: Level,
}

impl TradePrint {
    /// Enrich a raw print with `quote` and classify it.
    ///
    /// Without a quote the enrichment fields stay zero and the level is
    /// [`Level::Unknown`]. `previous` is the last print already stored for
    /// the symbol; the first print of a session, or one following a print
    /// that never saw a quote, is compared with itself.
    pub fn enrich(
        raw: &TimeSaleMessage,
        quote: Option<&QuoteSnapshot>,
        previous: Option<&TradePrint>,
    ) -> Self {
        let mut print = Self {
            symbol: raw.symbol.clone(),
            time: raw.time,
            price: raw.price,
            size: raw.size,
            sequence: raw.sequence,
            bid: Decimal::ZERO,
            ask: Decimal::ZERO,
            bid_size: Decimal::ZERO,
            ask_size: Decimal::ZERO,
            last: Decimal::ZERO,
            last_size: Decimal::ZERO,
            quote_time: 0,
            trade_time: 0,
            bid_incr: Decimal::ZERO,
            ask_incr: Decimal::ZERO,
            level: Level::Unknown,
        };

        let Some(quote) = quote else {
            return print;
        };

        print.bid = quote.bid;
        print.ask = quote.ask;
        print.bid_size = quote.bid_size;
        print.ask_size = quote.ask_size;
        print.last = quote.last;
        print.last_size = quote.last_size;
        print.quote_time = quote.quote_time;
        print.trade_time = quote.trade_time;

        let (prev_bid, prev_ask) = previous
            .filter(|p| p.has_quote())
            .map(|p| (p.bid, p.ask))
            .unwrap_or((print.bid, print.ask));
        if print.bid < prev_bid {
            print.bid_incr = prev_bid - print.bid;
        }
        if print.ask > prev_ask {
            print.ask_incr = print.ask - prev_ask;
        }

        print.level = classify(print.bid, print.ask, print.price);
        print
    }

    /// Whether a quote was available when this print was enriched
    pub fn has_quote(&self) -> bool {
        !(self.bid.is_zero() && self.ask.is_zero())
    }

    /// Field value by schema name, formatted for a CSV row
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "symbol" | "key" => self.symbol.clone(),
            "time" => self.time.to_string(),
            "price" => self.price.to_string(),
            "size" => self.size.to_string(),
            "sequence" => self.sequence.to_string(),
            "bid" => self.bid.to_string(),
            "ask" => self.ask.to_string(),
            "bidSize" => self.bid_size.to_string(),
            "askSize" => self.ask_size.to_string(),
            "last" => self.last.to_string(),
            "lastSize" => self.last_size.to_string(),
            "quoteTime" => self.quote_time.to_string(),
            "tradeTime" => self.trade_time.to_string(),
            "bidIncr" => self.bid_incr.to_string(),
            "askIncr" => self.ask_incr.to_string(),
            "level" => self.level.to_string(),
            _ => return None,
        };
        Some(value)
    }
}

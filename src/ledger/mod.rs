//! Trade classifier and ledger
//!
//! Each time & sales print is enriched with the symbol's current quote,
//! classified into a [`Level`], appended to that symbol's tape, and handed to
//! the capture sink. Appends for one symbol are serialised; readers work on
//! published snapshots and never wait on an append.

mod classify;
mod print;
mod query;
mod tape;

pub use classify::{classify, Level, MID_SPREAD_TOLERANCE};
pub use print::TradePrint;
pub use tape::{PrintTape, CHUNK_SIZE};

use crate::capture::CaptureSink;
use crate::error::CaptureError;
use crate::feed::{Service, TimeSaleMessage};
use crate::quote::QuoteCache;
use crate::shared::SymbolMap;
use crate::telemetry;
use crate::window::Window;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Per-symbol append-only record of classified prints
#[derive(Debug, Default)]
pub struct Ledger {
    tapes: SymbolMap<PrintTape>,
    capture: Option<CaptureSink>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror every append to `sink`
    pub fn with_capture(mut self, sink: CaptureSink) -> Self {
        self.capture = Some(sink);
        self
    }

    pub fn capture(&self) -> Option<&CaptureSink> {
        self.capture.as_ref()
    }

    /// Enrich, classify and append a raw print.
    ///
    /// The quote lookup, the comparison with the previous print and the
    /// append all happen under the symbol's writer lock. A print is stored
    /// even when no quote exists yet.
    pub fn append(&self, quotes: &QuoteCache, raw: &TimeSaleMessage) -> TradePrint {
        let cell = self.tapes.get_or_default(&raw.symbol);

        let print = cell.update(|tape| {
            let quote = quotes.get(&raw.symbol);
            let print = TradePrint::enrich(raw, quote.as_ref(), tape.last());
            tape.push(print.clone());

            if let Some(sink) = &self.capture {
                match sink.submit(Service::TimesaleEquity, &print) {
                    Ok(()) => {}
                    Err(CaptureError::QueueFull) => {
                        tracing::debug!(symbol = %print.symbol, "Capture queue full, row dropped");
                    }
                    Err(e) => {
                        tracing::warn!(symbol = %print.symbol, error = %e, "Print not captured");
                    }
                }
            }

            print
        });

        telemetry::record_print(print.level);
        tracing::trace!(
            symbol = %print.symbol,
            price = %print.price,
            size = %print.size,
            level = %print.level,
            "Appended print"
        );

        print
    }

    /// Published tape for a symbol
    pub fn snapshot(&self, symbol: &str) -> Option<Arc<PrintTape>> {
        self.tapes.snapshot(symbol)
    }

    /// Number of prints, optionally for one level, inside `window`
    pub fn count(&self, symbol: &str, level: Option<Level>, window: Window, now_millis: i64) -> usize {
        self.snapshot(symbol)
            .map_or(0, |tape| tape.count(level, window, now_millis))
    }

    /// Total print size, optionally for one level, inside `window`
    pub fn sum(&self, symbol: &str, level: Option<Level>, window: Window, now_millis: i64) -> Decimal {
        self.snapshot(symbol)
            .map_or(Decimal::ZERO, |tape| tape.sum(level, window, now_millis))
    }

    /// `quote_time - time` for the latest enriched print
    pub fn quote_latency_ms(&self, symbol: &str) -> Option<i64> {
        self.snapshot(symbol).and_then(|tape| tape.quote_latency_ms())
    }

    pub fn len(&self, symbol: &str) -> usize {
        self.snapshot(symbol).map_or(0, |tape| tape.len())
    }

    pub fn symbols(&self) -> Vec<String> {
        self.tapes.symbols()
    }
}

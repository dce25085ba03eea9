//! Market data store
//!
//! `MarketStore` owns every per-symbol component, routes inbound service
//! blocks to them, and answers dashboard queries. One store is built per
//! process and shared by reference.
//!
//! ```text
//! every message ───► FeedRecorder (optional)
//! QUOTE ───────────► QuoteCache
//! TIMESALE_EQUITY ─► Ledger (enrich from QuoteCache) ─► CaptureSink
//! LISTED_BOOK ─────► OrderBookConsolidator
//! CHART_EQUITY ────► CandleStore
//! ```

mod query;

use crate::candle::{Candle, CandleStore};
use crate::capture::CaptureSink;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::events::{EventBus, StoreEvent};
use crate::error::CaptureError;
use crate::feed::{FeedMessage, FeedRecorder, ServiceBlock};
use crate::ledger::Ledger;
use crate::orderbook::OrderBookConsolidator;
use crate::quote::{QuoteCache, QuoteSnapshot};
use crate::telemetry;
use std::ops::AddAssign;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outcome of dispatching one or more messages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Blocks applied to the store
    pub applied: usize,
    /// Blocks rejected by the decoder or by validation
    pub skipped: usize,
}

impl AddAssign for DispatchReport {
    fn add_assign(&mut self, other: Self) {
        self.applied += other.applied;
        self.skipped += other.skipped;
    }
}

/// Process-wide market state
pub struct MarketStore {
    quotes: QuoteCache,
    ledger: Ledger,
    book: OrderBookConsolidator,
    candles: CandleStore,
    events: EventBus,
    recorder: Option<FeedRecorder>,
    clock: Arc<dyn Clock>,
}

impl MarketStore {
    /// Empty store reading time from `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            quotes: QuoteCache::new(),
            ledger: Ledger::new(),
            book: OrderBookConsolidator::new(),
            candles: CandleStore::new(),
            events: EventBus::default(),
            recorder: None,
            clock,
        }
    }

    /// Store on the system clock, configured from `config`.
    ///
    /// Spawns the capture writer and the feed recorder when they are
    /// enabled, so it must be called inside a tokio runtime in that case.
    pub fn from_config(config: &Config) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let mut store = Self::new(Arc::clone(&clock)).with_events(EventBus::new(config.events.capacity));

        if config.capture.enabled {
            let sink = CaptureSink::spawn(config.capture.sink_config(), clock);
            tracing::info!(output_dir = ?sink.output_dir(), "Real-time capture enabled");
            store = store.with_capture(sink);
        }

        if config.capture.record_feed {
            let recorder = FeedRecorder::spawn(config.capture.recorder_config());
            tracing::info!(path = ?recorder.path(), "Feed recording enabled");
            store = store.with_recorder(recorder);
        }

        store
    }

    /// Mirror appended prints to `sink`
    pub fn with_capture(mut self, sink: CaptureSink) -> Self {
        self.ledger = self.ledger.with_capture(sink);
        self
    }

    /// Record every dispatched message to `recorder`
    pub fn with_recorder(mut self, recorder: FeedRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn capture(&self) -> Option<&CaptureSink> {
        self.ledger.capture()
    }

    pub fn recorder(&self) -> Option<&FeedRecorder> {
        self.recorder.as_ref()
    }

    /// Apply every valid block of `message` in order.
    ///
    /// An invalid block is logged and skipped; the remaining blocks are still
    /// applied. Never fails.
    pub fn dispatch(&self, message: &FeedMessage) -> DispatchReport {
        if let Some(recorder) = &self.recorder {
            match recorder.submit(message) {
                Ok(()) => {}
                Err(CaptureError::QueueFull) => {
                    tracing::debug!(timestamp = message.timestamp, "Recorder queue full, message dropped");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Feed message not recorded");
                }
            }
        }

        let mut report = DispatchReport {
            applied: 0,
            skipped: message.rejected,
        };
        if message.rejected > 0 {
            telemetry::record_blocks_skipped("decode", message.rejected as u64);
        }

        for block in &message.blocks {
            match block.validate() {
                Ok(()) => {
                    self.apply(block);
                    telemetry::record_block_applied(block.service().as_str());
                    report.applied += 1;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping invalid block");
                    telemetry::record_blocks_skipped(e.reason_label(), 1);
                    report.skipped += 1;
                }
            }
        }

        self.events.publish(StoreEvent::BatchApplied {
            applied: report.applied,
            skipped: report.skipped,
        });
        report
    }

    fn apply(&self, block: &ServiceBlock) {
        match block {
            ServiceBlock::Quote(quote) => {
                self.quotes.update(&quote.symbol, QuoteSnapshot::from(quote));
                self.events.publish(StoreEvent::QuoteUpdated {
                    symbol: quote.symbol.clone(),
                });
            }
            ServiceBlock::TimeSale(raw) => {
                let print = self.ledger.append(&self.quotes, raw);
                self.events.publish(StoreEvent::PrintAppended {
                    symbol: print.symbol,
                    level: print.level,
                });
            }
            ServiceBlock::ListedBook(book) => {
                self.book.update_book(&book.symbol, &book.bids, &book.asks, self.clock.now());
                self.events.publish(StoreEvent::BookUpdated {
                    symbol: book.symbol.clone(),
                });
            }
            ServiceBlock::Chart(bar) => {
                self.candles.upsert(&bar.symbol, Candle::from(bar));
                self.events.publish(StoreEvent::CandleUpserted {
                    symbol: bar.symbol.clone(),
                    sequence: bar.sequence,
                });
            }
        }
    }

    /// Dispatch messages until the sender side closes
    pub async fn run(&self, mut rx: mpsc::Receiver<FeedMessage>) -> DispatchReport {
        let mut total = DispatchReport::default();
        while let Some(message) = rx.recv().await {
            total += self.dispatch(&message);
        }

        tracing::info!(applied = total.applied, skipped = total.skipped, "Feed drained");
        total
    }
}

impl std::fmt::Debug for MarketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketStore")
            .field("quotes", &self.quotes)
            .field("ledger", &self.ledger)
            .field("book", &self.book)
            .field("candles", &self.candles)
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}

//! Per-symbol book state

use super::{BookLevel, BookSide, BAND, PRUNE_HORIZON_SECS};
use crate::feed::BookEntry;
use crate::window::Window;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::Arc;

/// Levels recorded by one book update on one side
#[derive(Debug, Clone)]
struct Batch {
    observed_at: DateTime<Utc>,
    levels: Arc<[BookEntry]>,
}

/// Which side of the book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Bid,
    Ask,
}

impl Side {
    /// Whether `a` is a better price than `b` on this side
    fn better(self, a: Decimal, b: Decimal) -> bool {
        match self {
            Side::Bid => a > b,
            Side::Ask => a < b,
        }
    }
}

/// Current banded levels plus the trailing history of every level seen
#[derive(Debug, Clone, Default)]
pub struct SymbolBook {
    bids: Vec<BookLevel>,
    asks: Vec<BookLevel>,
    all_bids: VecDeque<Batch>,
    all_asks: VecDeque<Batch>,
}

impl SymbolBook {
    /// Replace the current levels from a raw book update.
    ///
    /// Only levels priced strictly within [`BAND`] of the first raw level on
    /// each side stay current. Every raw level goes into the history, and
    /// history older than the prune horizon is dropped.
    pub fn apply(&mut self, bids: &[BookEntry], asks: &[BookEntry], observed_at: DateTime<Utc>) {
        self.bids = banded(bids, observed_at);
        self.asks = banded(asks, observed_at);
        record(&mut self.all_bids, bids, observed_at);
        record(&mut self.all_asks, asks, observed_at);
        self.prune(observed_at);
    }

    /// Drop history observed before `now` minus the prune horizon.
    /// Returns how many levels were removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let Some(cutoff) = horizon().cutoff(now) else {
            return 0;
        };
        prune_side(&mut self.all_bids, cutoff) + prune_side(&mut self.all_asks, cutoff)
    }

    pub fn bids(&self) -> &[BookLevel] {
        &self.bids
    }

    pub fn asks(&self) -> &[BookLevel] {
        &self.asks
    }

    /// Number of levels held in history, both sides
    pub fn history_len(&self) -> usize {
        count(&self.all_bids) + count(&self.all_asks)
    }

    /// Best historical price and total size observed inside `window`.
    ///
    /// History older than the prune horizon is ignored whether or not a
    /// prune has run.
    pub(crate) fn side_total(&self, side: Side, window: Window, now: DateTime<Utc>) -> BookSide {
        let history = match side {
            Side::Bid => &self.all_bids,
            Side::Ask => &self.all_asks,
        };
        let live = horizon().cutoff(now);
        let cutoff = window.cutoff(now);

        let mut total = BookSide::default();
        let mut best: Option<Decimal> = None;

        for batch in history {
            if live.is_some_and(|c| batch.observed_at < c) {
                continue;
            }
            for level in batch.levels.iter() {
                if best.map_or(true, |b| side.better(level.price, b)) {
                    best = Some(level.price);
                }
            }
            if cutoff.map_or(true, |c| batch.observed_at >= c) {
                total.size += batch.levels.iter().map(|l| l.size).sum::<Decimal>();
            }
        }

        total.price = best.unwrap_or(Decimal::ZERO);
        total
    }
}

fn horizon() -> Window {
    Window::Trailing(PRUNE_HORIZON_SECS)
}

fn banded(raw: &[BookEntry], observed_at: DateTime<Utc>) -> Vec<BookLevel> {
    let Some(top) = raw.first() else {
        return Vec::new();
    };

    raw.iter()
        .filter(|entry| (entry.price - top.price).abs() < BAND)
        .map(|entry| BookLevel {
            price: entry.price,
            size: entry.size,
            observed_at,
        })
        .collect()
}

fn record(history: &mut VecDeque<Batch>, raw: &[BookEntry], observed_at: DateTime<Utc>) {
    if raw.is_empty() {
        return;
    }
    history.push_back(Batch {
        observed_at,
        levels: Arc::from(raw),
    });
}

fn prune_side(history: &mut VecDeque<Batch>, cutoff: DateTime<Utc>) -> usize {
    let before = count(history);
    history.retain(|batch| batch.observed_at >= cutoff);
    before - count(history)
}

fn count(history: &VecDeque<Batch>) -> usize {
    history.iter().map(|batch| batch.levels.len()).sum()
}

//! Append-only print storage with cheap snapshots
//!
//! Prints are held in sealed, shared chunks plus a short open tail. Cloning
//! a tape copies chunk pointers and the tail only, so publishing a new
//! snapshot after every append stays proportional to the chunk size.

use super::print::TradePrint;
use std::sync::Arc;

/// Prints per sealed chunk
pub const CHUNK_SIZE: usize = 512;

/// One symbol's prints in arrival order
#[derive(Debug, Clone, Default)]
pub struct PrintTape {
    sealed: Vec<Arc<[TradePrint]>>,
    tail: Vec<TradePrint>,
    len: usize,
    /// `quote_time - time` of the latest enriched print
    quote_latency_ms: Option<i64>,
}

impl PrintTape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently appended print
    pub fn last(&self) -> Option<&TradePrint> {
        self.tail
            .last()
            .or_else(|| self.sealed.last().and_then(|chunk| chunk.last()))
    }

    /// Prints in arrival order
    pub fn iter(&self) -> impl Iterator<Item = &TradePrint> + '_ {
        self.sealed
            .iter()
            .flat_map(|chunk| chunk.iter())
            .chain(self.tail.iter())
    }

    pub fn quote_latency_ms(&self) -> Option<i64> {
        self.quote_latency_ms
    }

    pub(crate) fn push(&mut self, print: TradePrint) {
        if print.has_quote() {
            self.quote_latency_ms = Some(print.quote_time - print.time);
        }

        self.tail.push(print);
        self.len += 1;

        if self.tail.len() >= CHUNK_SIZE {
            let chunk: Arc<[TradePrint]> = Arc::from(std::mem::take(&mut self.tail));
            self.sealed.push(chunk);
        }
    }
}

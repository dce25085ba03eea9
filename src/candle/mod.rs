//! Candle store
//!
//! One-minute bars per symbol keyed by sequence. A resent sequence
//! overwrites the stored bar; bars are never deleted.

use crate::feed::ChartMessage;
use crate::shared::SymbolMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OHLCV bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub sequence: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl From<&ChartMessage> for Candle {
    fn from(msg: &ChartMessage) -> Self {
        Self {
            sequence: msg.sequence,
            open: msg.open,
            high: msg.high,
            low: msg.low,
            close: msg.close,
            volume: msg.volume,
        }
    }
}

/// Per-symbol bars ordered by sequence
#[derive(Debug, Default)]
pub struct CandleStore {
    bars: SymbolMap<BTreeMap<i64, Candle>>,
}

impl CandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bar, or replace the one with the same sequence.
    /// Returns `true` when a bar was replaced.
    pub fn upsert(&self, symbol: &str, candle: Candle) -> bool {
        let sequence = candle.sequence;
        let replaced = self
            .bars
            .get_or_default(symbol)
            .update(|bars| bars.insert(sequence, candle).is_some());

        if replaced {
            tracing::debug!(symbol, sequence, "Candle replaced");
        }
        replaced
    }

    pub fn get(&self, symbol: &str, sequence: i64) -> Option<Candle> {
        self.bars
            .snapshot(symbol)
            .and_then(|bars| bars.get(&sequence).cloned())
    }

    /// All bars for a symbol in sequence order
    pub fn bars(&self, symbol: &str) -> Vec<Candle> {
        self.bars
            .snapshot(symbol)
            .map(|bars| bars.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, symbol: &str) -> usize {
        self.bars.snapshot(symbol).map_or(0, |bars| bars.len())
    }
}

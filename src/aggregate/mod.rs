//! Windowed aggregation over print tapes
//!
//! Read-only views used by dashboards: a per-level breakdown and per-second
//! series for the buy bucket (levels 1-2) and the sell bucket (levels 4-5).
//!
//! Series are keyed by the second-of-minute of each print (0-59). Prints
//! from different minutes that share a second land in the same bucket.
//! Buckets appear in the order their first print appears on the tape.

use crate::ledger::{Level, PrintTape, TradePrint};
use crate::window::Window;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What a bucket accumulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    /// Number of prints
    #[default]
    Count,
    /// Sum of print sizes
    Size,
}

impl Measure {
    /// Map a dashboard "by size" toggle
    pub fn from_size_flag(by_size: bool) -> Self {
        if by_size {
            Measure::Size
        } else {
            Measure::Count
        }
    }

    fn of(self, print: &TradePrint) -> Decimal {
        match self {
            Measure::Count => Decimal::ONE,
            Measure::Size => print.size,
        }
    }
}

/// Count or size for each classified level, 1 through 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelBreakdown {
    values: [Decimal; 5],
}

impl LevelBreakdown {
    /// Value for a level. `Unknown` is never tracked and reads as zero.
    pub fn get(&self, level: Level) -> Decimal {
        match level {
            Level::Unknown => Decimal::ZERO,
            other => self.values[usize::from(other.as_u8()) - 1],
        }
    }

    /// Values for levels 1..=5 in order
    pub fn values(&self) -> &[Decimal; 5] {
        &self.values
    }

    pub fn total(&self) -> Decimal {
        self.values.iter().copied().sum()
    }

    fn add(&mut self, level: Level, amount: Decimal) {
        if level != Level::Unknown {
            self.values[usize::from(level.as_u8()) - 1] += amount;
        }
    }
}

/// Per-second values keyed by second-of-minute
pub type SecondSeries = IndexMap<u8, Decimal>;

/// Buy and sell series side by side
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuysSells {
    /// Levels 1-2
    pub buys: SecondSeries,
    /// Levels 4-5
    pub sells: SecondSeries,
}

impl BuysSells {
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    /// Series values without their keys, as chart widgets consume them
    pub fn buy_values(&self) -> Vec<Decimal> {
        self.buys.values().copied().collect()
    }

    pub fn sell_values(&self) -> Vec<Decimal> {
        self.sells.values().copied().collect()
    }
}

/// Second-of-minute of an epoch-millisecond timestamp
pub fn second_of_minute(time_millis: i64) -> u8 {
    // rem_euclid keeps pre-epoch times in 0..60
    time_millis.div_euclid(1000).rem_euclid(60) as u8
}

/// Count or size per classified level inside `window`
pub fn prints_data(tape: &PrintTape, window: Window, now_millis: i64, measure: Measure) -> LevelBreakdown {
    let mut breakdown = LevelBreakdown::default();
    for print in tape.matching(None, window, now_millis) {
        breakdown.add(print.level, measure.of(print));
    }
    breakdown
}

/// Buy and sell series of print counts or sizes
pub fn buys_sells(tape: &PrintTape, window: Window, now_millis: i64, measure: Measure) -> BuysSells {
    bucket(tape, window, now_millis, |print| measure.of(print), |print| measure.of(print))
}

/// Buy series of bid drops and sell series of ask rises
pub fn movement_buys_sells(tape: &PrintTape, window: Window, now_millis: i64) -> BuysSells {
    bucket(tape, window, now_millis, |print| print.bid_incr, |print| print.ask_incr)
}

fn bucket(
    tape: &PrintTape,
    window: Window,
    now_millis: i64,
    buy_value: impl Fn(&TradePrint) -> Decimal,
    sell_value: impl Fn(&TradePrint) -> Decimal,
) -> BuysSells {
    let mut series = BuysSells::default();

    for print in tape.matching(None, window, now_millis) {
        let (target, value) = if print.level.is_buy() {
            (&mut series.buys, buy_value(print))
        } else if print.level.is_sell() {
            (&mut series.sells, sell_value(print))
        } else {
            continue;
        };

        *target.entry(second_of_minute(print.time)).or_insert(Decimal::ZERO) += value;
    }

    series
}

//! Count and size queries over a print tape
//!
//! Prints are usually time ordered but delivery can reorder them slightly,
//! so every query is a full predicate scan.

use super::classify::Level;
use super::print::TradePrint;
use super::tape::PrintTape;
use crate::window::Window;
use rust_decimal::Decimal;

impl PrintTape {
    /// Prints matching an optional level inside `window`
    pub fn matching(
        &self,
        level: Option<Level>,
        window: Window,
        now_millis: i64,
    ) -> impl Iterator<Item = &TradePrint> + '_ {
        let cutoff = window.cutoff_millis(now_millis);
        self.iter().filter(move |p| {
            level.map_or(true, |l| p.level == l) && cutoff.map_or(true, |c| p.time >= c)
        })
    }

    /// Number of prints
    pub fn count(&self, level: Option<Level>, window: Window, now_millis: i64) -> usize {
        self.matching(level, window, now_millis).count()
    }

    /// Total size of prints
    pub fn sum(&self, level: Option<Level>, window: Window, now_millis: i64) -> Decimal {
        self.matching(level, window, now_millis).map(|p| p.size).sum()
    }
}

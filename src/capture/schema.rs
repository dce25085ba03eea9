//! CSV field schema and row formatting

use crate::ledger::TradePrint;
use serde::{Deserialize, Serialize};

/// Field order of the time & sales capture
pub const DEFAULT_FIELDS: [&str; 16] = [
    "symbol",
    "time",
    "price",
    "size",
    "sequence",
    "bid",
    "ask",
    "bidSize",
    "askSize",
    "last",
    "lastSize",
    "quoteTime",
    "tradeTime",
    "bidIncr",
    "askIncr",
    "level",
];

/// Ordered list of field names for header and rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSchema {
    fields: Vec<String>,
}

impl CaptureSchema {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Header line, newline terminated
    pub fn header(&self) -> String {
        let mut line = self.fields.join(",");
        line.push('\n');
        line
    }

    /// Row for `print` in schema order, newline terminated.
    ///
    /// Values are not quoted; unknown fields are left empty.
    pub fn row(&self, print: &TradePrint) -> String {
        let mut line = self
            .fields
            .iter()
            .map(|name| print.field(name).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(",");
        line.push('\n');
        line
    }
}

impl Default for CaptureSchema {
    fn default() -> Self {
        Self::new(DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect())
    }
}

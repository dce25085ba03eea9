//! Trade print classification against the prevailing quote

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum gap to the bid or ask for a print to count as mid-spread
pub const MID_SPREAD_TOLERANCE: Decimal = dec!(0.01);

/// Where a print's price fell relative to bid/ask at arrival
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Level {
    /// No usable quote or price
    Unknown = 0,
    /// Below the bid
    BelowBid = 1,
    /// At the bid, or within tolerance above it
    AtBid = 2,
    /// Inside the spread
    MidSpread = 3,
    /// At the ask, or within tolerance below it
    AtAsk = 4,
    /// Above the ask
    AboveAsk = 5,
}

impl Level {
    /// Classified levels, in order
    pub const CLASSIFIED: [Level; 5] = [
        Level::BelowBid,
        Level::AtBid,
        Level::MidSpread,
        Level::AtAsk,
        Level::AboveAsk,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Level::Unknown),
            1 => Some(Level::BelowBid),
            2 => Some(Level::AtBid),
            3 => Some(Level::MidSpread),
            4 => Some(Level::AtAsk),
            5 => Some(Level::AboveAsk),
            _ => None,
        }
    }

    /// Levels 1 and 2. Dashboards label this bucket "buys".
    pub fn is_buy(self) -> bool {
        matches!(self, Level::BelowBid | Level::AtBid)
    }

    /// Levels 4 and 5. Dashboards label this bucket "sells".
    pub fn is_sell(self) -> bool {
        matches!(self, Level::AtAsk | Level::AboveAsk)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Classify a print price against the bid and ask
pub fn classify(bid: Decimal, ask: Decimal, price: Decimal) -> Level {
    if bid <= Decimal::ZERO || ask <= Decimal::ZERO || price <= Decimal::ZERO {
        return Level::Unknown;
    }

    if price < bid {
        Level::BelowBid
    } else if price == bid {
        Level::AtBid
    } else if price < ask {
        if price - bid < MID_SPREAD_TOLERANCE {
            Level::AtBid
        } else if ask - price < MID_SPREAD_TOLERANCE {
            Level::AtAsk
        } else {
            Level::MidSpread
        }
    } else if price == ask {
        Level::AtAsk
    } else {
        Level::AboveAsk
    }
}

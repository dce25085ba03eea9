//! Trailing time windows for aggregate queries

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A trailing window measured back from "now"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Window {
    /// Whole session
    #[default]
    All,
    /// Last N seconds
    Trailing(u64),
}

impl Window {
    /// `0` means the whole session
    pub fn seconds(secs: u64) -> Self {
        if secs == 0 {
            Window::All
        } else {
            Window::Trailing(secs)
        }
    }

    /// Earliest epoch millisecond still inside the window
    pub fn cutoff_millis(&self, now_millis: i64) -> Option<i64> {
        match self {
            Window::All => None,
            Window::Trailing(secs) => {
                let span = i64::try_from(*secs).unwrap_or(i64::MAX).saturating_mul(1000);
                Some(now_millis.saturating_sub(span))
            }
        }
    }

    /// Earliest instant still inside the window
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Window::All => None,
            Window::Trailing(secs) => {
                let secs = i64::try_from(*secs).unwrap_or(i64::MAX);
                Some(
                    Duration::try_seconds(secs)
                        .and_then(|span| now.checked_sub_signed(span))
                        .unwrap_or(DateTime::<Utc>::MIN_UTC),
                )
            }
        }
    }

    /// Whether an epoch-millisecond timestamp falls inside the window
    pub fn contains_millis(&self, time: i64, now_millis: i64) -> bool {
        self.cutoff_millis(now_millis).map_or(true, |cutoff| time >= cutoff)
    }
}

impl From<u64> for Window {
    fn from(secs: u64) -> Self {
        Window::seconds(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_unbounded() {
        assert_eq!(Window::seconds(0), Window::All);
        assert!(Window::All.contains_millis(i64::MIN, 0));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let now = 1_700_000_060_000;
        let window = Window::seconds(60);
        assert_eq!(window.cutoff_millis(now), Some(1_700_000_000_000));
        assert!(window.contains_millis(1_700_000_000_000, now));
        assert!(!window.contains_millis(1_699_999_999_999, now));
    }

    #[test]
    fn test_huge_window_saturates() {
        let now = Utc::now();
        assert!(Window::seconds(u64::MAX).cutoff(now).is_some());
        assert!(Window::seconds(u64::MAX).contains_millis(0, now.timestamp_millis()));
    }
}

//! tape-flow: trade print classification and order-flow aggregation
//!
//! This library provides the core components for:
//! - Typed market data envelopes, feed recording and replay
//! - Latest quote per symbol
//! - Classification of trade prints against the prevailing bid/ask
//! - Append-only per-symbol print ledgers with windowed counts and sums
//! - Per-second buy/sell series for charting
//! - Banded order book levels and time-weighted book pressure
//! - Sequence-keyed candle storage
//! - Best-effort CSV capture of classified prints
//! - Change notification for dashboards
//! - Logging and Prometheus metrics

pub mod aggregate;
pub mod candle;
pub mod capture;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod feed;
pub mod ledger;
pub mod orderbook;
pub mod quote;
pub mod shared;
pub mod store;
pub mod telemetry;
pub mod window;

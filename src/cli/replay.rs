//! Replay command implementation

use crate::capture::CaptureSink;
use crate::clock::{Clock, ManualClock};
use crate::config::Config;
use crate::events::EventBus;
use crate::feed::{FeedSource, FileReplayFeed};
use crate::ledger::Level;
use crate::store::{DispatchReport, MarketStore};
use chrono::DateTime;
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON-lines feed capture to replay
    #[arg(short, long)]
    pub file: PathBuf,

    /// Only summarise this symbol
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Trailing window for the summary, in seconds (0 = whole session)
    #[arg(short, long, default_value = "60")]
    pub window: u64,

    /// Pause between feed lines in ms
    #[arg(long, default_value = "0")]
    pub delay_ms: u64,

    /// Write classified prints to CSV while replaying
    #[arg(long)]
    pub capture: bool,
}

impl ReplayArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        // Windows are measured against feed time, not wall time
        let clock = Arc::new(ManualClock::at_millis(0));
        // Never recorded, even when `record_feed` is set
        let mut store = MarketStore::new(clock.clone()).with_events(EventBus::new(config.events.capacity));
        if config.capture.record_feed {
            tracing::info!(feed_file = ?config.capture.feed_file, "Feed recording is off while replaying");
        }

        if self.capture {
            let sink = CaptureSink::spawn(config.capture.sink_config(), clock.clone());
            tracing::info!(output_dir = ?sink.output_dir(), "Capturing replayed prints");
            store = store.with_capture(sink);
        }

        let feed = FileReplayFeed::new(&self.file).with_delay(Duration::from_millis(self.delay_ms));
        let mut rx = feed.subscribe().await?;

        let mut report = DispatchReport::default();
        while let Some(message) = rx.recv().await {
            if let Some(at) = DateTime::from_timestamp_millis(message.timestamp) {
                if at > clock.now() {
                    clock.set(at);
                }
            }
            report += store.dispatch(&message);
        }

        if let Some(sink) = store.capture() {
            sink.flush().await?;
            let stats = sink.stats();
            println!(
                "Captured {} rows into {} files ({} dropped, {} failed)",
                stats.rows_written, stats.files_created, stats.rows_dropped, stats.write_failures
            );
        }

        println!("Applied {} blocks, skipped {}", report.applied, report.skipped);

        let symbols = match &self.symbol {
            Some(symbol) => vec![symbol.clone()],
            None => store.symbols(),
        };
        for symbol in symbols {
            self.print_summary(&store, &symbol);
        }

        Ok(())
    }

    fn print_summary(&self, store: &MarketStore, symbol: &str) {
        let window = self.window;
        let counts = store.prints_data(symbol, window, false);
        let sizes = store.prints_data(symbol, window, true);
        let series = store.prints_buys_sells_data(symbol, window, true);
        let pie = store.book_pie_data(symbol, window);
        let composite = store.book_composite_pie_data(symbol);

        println!();
        println!("{} (window {}s)", symbol, window);
        println!(
            "  Prints: {} total, {} unclassified",
            store.print_count(symbol, None, window),
            store.print_count(symbol, Some(Level::Unknown), window)
        );
        for level in Level::CLASSIFIED {
            println!(
                "  Level {}: {:>8} prints {:>12} size",
                level,
                counts.get(level).to_string(),
                sizes.get(level).to_string()
            );
        }
        println!(
            "  Buys: {}  Sells: {}",
            series.buys.values().copied().sum::<Decimal>(),
            series.sells.values().copied().sum::<Decimal>()
        );
        println!(
            "  Book pie: bid {} x {}  ask {} x {}",
            pie.bid.price, pie.bid.size, pie.ask.price, pie.ask.size
        );
        println!(
            "  Composite: bid {}  ask {}",
            composite.bid.size, composite.ask.size
        );
        if let Some(latency) = store.quote_latency_ms(symbol) {
            println!("  Quote latency: {}ms", latency);
        }
        println!("  Candles: {}", store.candles(symbol).len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LINE: &str = r#"{"data":[{"service":"TIMESALE_EQUITY","timestamp":1709908216500,"content":[{"key":"SPY","time":1709908216400,"price":450.0,"size":100,"sequence":1}]}]}"#;

    fn args(file: PathBuf) -> ReplayArgs {
        ReplayArgs {
            file,
            symbol: Some("SPY".to_string()),
            window: 0,
            delay_ms: 0,
            capture: false,
        }
    }

    #[tokio::test]
    async fn test_replay_never_records_feed() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("session.jsonl");
        std::fs::write(&input, format!("{LINE}\n")).unwrap();

        let mut config = Config::default();
        config.capture.record_feed = true;
        config.capture.feed_file = dir.path().join("recorded.jsonl");

        args(input.clone()).execute(&config).await.unwrap();

        assert!(!config.capture.feed_file.exists());
        assert_eq!(std::fs::read_to_string(&input).unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn test_replaying_the_record_file_leaves_it_unchanged() {
        let dir = TempDir::new().unwrap();
        let feed_file = dir.path().join("feed.jsonl");
        std::fs::write(&feed_file, format!("{LINE}\n{LINE}\n")).unwrap();

        let mut config = Config::default();
        config.capture.record_feed = true;
        config.capture.feed_file = feed_file.clone();

        args(feed_file.clone()).execute(&config).await.unwrap();

        assert_eq!(std::fs::read_to_string(&feed_file).unwrap().lines().count(), 2);
    }

    #[tokio::test]
    async fn test_missing_input_is_error() {
        let config = Config::default();
        assert!(args(PathBuf::from("/nonexistent/session.jsonl"))
            .execute(&config)
            .await
            .is_err());
    }
}

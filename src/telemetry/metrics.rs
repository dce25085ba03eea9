//! Prometheus metrics
//!
//! Counters are recorded through the `metrics` facade. Without an installed
//! recorder every call is a no-op.

use crate::ledger::Level;
use metrics::{counter, describe_counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

const BLOCKS_APPLIED: &str = "tapeflow_blocks_applied_total";
const BLOCKS_SKIPPED: &str = "tapeflow_blocks_skipped_total";
const PRINTS_APPENDED: &str = "tapeflow_prints_appended_total";
const CAPTURE_ROWS_WRITTEN: &str = "tapeflow_capture_rows_written_total";
const CAPTURE_FAILURES: &str = "tapeflow_capture_failures_total";
const CAPTURE_DROPPED: &str = "tapeflow_capture_dropped_total";
const FEED_LINES_RECORDED: &str = "tapeflow_feed_lines_recorded_total";
const FEED_RECORD_FAILURES: &str = "tapeflow_feed_record_failures_total";
const FEED_RECORD_DROPPED: &str = "tapeflow_feed_record_dropped_total";

/// Install the Prometheus exporter with an HTTP listener on `port`
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;

    describe_counter!(BLOCKS_APPLIED, "Inbound service blocks applied to the store");
    describe_counter!(BLOCKS_SKIPPED, "Inbound service blocks skipped");
    describe_counter!(PRINTS_APPENDED, "Trade prints appended to the ledger");
    describe_counter!(CAPTURE_ROWS_WRITTEN, "CSV rows written by the capture sink");
    describe_counter!(CAPTURE_FAILURES, "CSV writes that failed");
    describe_counter!(CAPTURE_DROPPED, "CSV rows dropped on a full capture queue");
    describe_counter!(FEED_LINES_RECORDED, "Feed messages appended to the feed record");
    describe_counter!(FEED_RECORD_FAILURES, "Feed record writes that failed");
    describe_counter!(FEED_RECORD_DROPPED, "Feed messages dropped on a full recorder queue");

    tracing::info!(addr = %addr, "Prometheus metrics exporter started");
    Ok(())
}

/// A service block reached the store
pub fn record_block_applied(service: &'static str) {
    counter!(BLOCKS_APPLIED, "service" => service).increment(1);
}

/// Service blocks were skipped
pub fn record_blocks_skipped(reason: &'static str, count: u64) {
    counter!(BLOCKS_SKIPPED, "reason" => reason).increment(count);
}

/// A print was appended at `level`
pub fn record_print(level: Level) {
    counter!(PRINTS_APPENDED, "level" => level.to_string()).increment(1);
}

pub fn record_capture_written() {
    counter!(CAPTURE_ROWS_WRITTEN).increment(1);
}

pub fn record_capture_failure() {
    counter!(CAPTURE_FAILURES).increment(1);
}

pub fn record_capture_dropped() {
    counter!(CAPTURE_DROPPED).increment(1);
}

pub fn record_feed_line_written() {
    counter!(FEED_LINES_RECORDED).increment(1);
}

pub fn record_feed_record_failure() {
    counter!(FEED_RECORD_FAILURES).increment(1);
}

pub fn record_feed_record_dropped() {
    counter!(FEED_RECORD_DROPPED).increment(1);
}

//! Telemetry module
//!
//! Logging and metrics

mod logging;
mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{
    init_metrics, record_block_applied, record_blocks_skipped, record_capture_dropped,
    record_capture_failure, record_capture_written, record_feed_line_written,
    record_feed_record_dropped, record_feed_record_failure, record_print,
};

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level, config.log_format)?;

    if config.metrics_port != 0 {
        init_metrics(config.metrics_port)?;
    }

    Ok(())
}

//! Configuration types for tape-flow

use crate::capture::{CaptureSchema, SinkConfig, DEFAULT_FIELDS};
use crate::feed::RecorderConfig;
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Real-time CSV capture of classified prints
#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// Mirror every appended print to CSV
    #[serde(default)]
    pub enabled: bool,

    /// Directory for capture files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Rows queued between the ledger and the writer before rows are dropped
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Column order of capture files
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,

    /// Append every dispatched feed message to `feed_file`.
    /// Never applies while replaying.
    #[serde(default)]
    pub record_feed: bool,

    /// JSON-lines feed record, readable by `replay`
    #[serde(default = "default_feed_file")]
    pub feed_file: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./capture")
}
fn default_feed_file() -> PathBuf {
    PathBuf::from("./capture/feed.jsonl")
}
fn default_channel_capacity() -> usize {
    10_000
}
fn default_fields() -> Vec<String> {
    DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_dir: default_output_dir(),
            channel_capacity: default_channel_capacity(),
            fields: default_fields(),
            record_feed: false,
            feed_file: default_feed_file(),
        }
    }
}

impl CaptureConfig {
    /// Sink settings for these options
    pub fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            output_dir: self.output_dir.clone(),
            channel_capacity: self.channel_capacity,
            schema: CaptureSchema::new(self.fields.clone()),
        }
    }

    /// Recorder settings for these options
    pub fn recorder_config(&self) -> RecorderConfig {
        RecorderConfig {
            path: self.feed_file.clone(),
            channel_capacity: self.channel_capacity,
        }
    }
}

/// Change notification channel
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Events buffered per subscriber before it starts lagging
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

fn default_event_capacity() -> usize {
    crate::events::DEFAULT_CAPACITY
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Prometheus exporter port, 0 disables it
    #[serde(default)]
    pub metrics_port: u16,

    /// Fallback filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: 0,
            log_level: default_log_level(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

//! Background CSV writer fed by the ledger's append path

use super::file::{append_line, capture_file_path};
use super::schema::CaptureSchema;
use crate::clock::Clock;
use crate::error::CaptureError;
use crate::feed::Service;
use crate::ledger::TradePrint;
use crate::telemetry;
use chrono::{DateTime, Local, Utc};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Configuration for the capture writer
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Directory the CSV files are written to
    pub output_dir: PathBuf,
    /// Rows buffered between the ledger and the writer
    pub channel_capacity: usize,
    /// Field order for header and rows
    pub schema: CaptureSchema,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./capture"),
            channel_capacity: 10_000,
            schema: CaptureSchema::default(),
        }
    }
}

/// Capture statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SinkStats {
    pub rows_received: u64,
    pub rows_written: u64,
    pub rows_dropped: u64,
    pub write_failures: u64,
    pub files_created: u64,
}

enum SinkCommand {
    Row(Service, TradePrint),
    Flush(oneshot::Sender<()>),
}

/// Handle to the capture writer task. Cheap to clone.
#[derive(Clone)]
pub struct CaptureSink {
    tx: mpsc::Sender<SinkCommand>,
    stats: Arc<RwLock<SinkStats>>,
    output_dir: PathBuf,
}

impl CaptureSink {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    pub fn spawn(config: SinkConfig, clock: Arc<dyn Clock>) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let stats = Arc::new(RwLock::new(SinkStats::default()));
        let output_dir = config.output_dir.clone();

        let writer_stats = Arc::clone(&stats);
        tokio::spawn(async move {
            Self::run_writer(rx, config, clock, writer_stats).await;
        });

        Self {
            tx,
            stats,
            output_dir,
        }
    }

    async fn run_writer(
        mut rx: mpsc::Receiver<SinkCommand>,
        config: SinkConfig,
        clock: Arc<dyn Clock>,
        stats: Arc<RwLock<SinkStats>>,
    ) {
        let header = config.schema.header();

        if let Err(e) = tokio::fs::create_dir_all(&config.output_dir).await {
            tracing::error!(path = ?config.output_dir, error = %e, "Failed to create capture directory");
        }

        while let Some(command) = rx.recv().await {
            match command {
                SinkCommand::Row(service, print) => {
                    stats.write().rows_received += 1;

                    let date = local_date(clock.now());
                    let path = capture_file_path(&config.output_dir, service, &print.symbol, date);
                    let row = config.schema.row(&print);

                    match append_line(&path, &header, &row).await {
                        Ok(created) => {
                            let mut s = stats.write();
                            s.rows_written += 1;
                            if created {
                                s.files_created += 1;
                                tracing::info!(path = ?path, "Started capture file");
                            }
                            telemetry::record_capture_written();
                        }
                        Err(e) => {
                            stats.write().write_failures += 1;
                            telemetry::record_capture_failure();
                            tracing::error!(error = %e, symbol = %print.symbol, "Failed to capture print");
                        }
                    }
                }
                SinkCommand::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }

        tracing::info!("Capture writer shutting down");
    }

    /// Queue a print for capture without waiting.
    ///
    /// A full queue drops the row; classification never waits on disk.
    pub fn submit(&self, service: Service, print: &TradePrint) -> Result<(), CaptureError> {
        match self.tx.try_send(SinkCommand::Row(service, print.clone())) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.stats.write().rows_dropped += 1;
                telemetry::record_capture_dropped();
                Err(CaptureError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(CaptureError::Closed),
        }
    }

    /// Wait until every row queued before this call has been handled
    pub async fn flush(&self) -> Result<(), CaptureError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(SinkCommand::Flush(ack_tx))
            .await
            .map_err(|_| CaptureError::Closed)?;
        ack_rx.await.map_err(|_| CaptureError::Closed)
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    pub fn stats(&self) -> SinkStats {
        self.stats.read().clone()
    }
}

impl std::fmt::Debug for CaptureSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSink")
            .field("output_dir", &self.output_dir)
            .finish_non_exhaustive()
    }
}

fn local_date(now: DateTime<Utc>) -> chrono::NaiveDate {
    now.with_timezone(&Local).date_naive()
}

//! Background recorder of the dispatched feed
//!
//! Every message handed to the store is appended as one JSON line, in the
//! format [`FileReplayFeed`](super::FileReplayFeed) reads back.

use super::encode::encode_message;
use super::FeedMessage;
use crate::error::CaptureError;
use crate::telemetry;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};

/// Configuration for the feed recorder
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// JSON-lines file messages are appended to
    pub path: PathBuf,
    /// Messages buffered between dispatch and the writer
    pub channel_capacity: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./capture/feed.jsonl"),
            channel_capacity: 10_000,
        }
    }
}

/// Recorder statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecorderStats {
    pub messages_received: u64,
    pub lines_written: u64,
    pub messages_dropped: u64,
    pub write_failures: u64,
}

enum RecorderCommand {
    Message(FeedMessage),
    Flush(oneshot::Sender<()>),
}

/// Handle to the recorder task. Cheap to clone.
#[derive(Clone)]
pub struct FeedRecorder {
    tx: mpsc::Sender<RecorderCommand>,
    stats: Arc<RwLock<RecorderStats>>,
    path: PathBuf,
}

impl FeedRecorder {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    pub fn spawn(config: RecorderConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let stats = Arc::new(RwLock::new(RecorderStats::default()));
        let path = config.path;

        let writer_stats = Arc::clone(&stats);
        let writer_path = path.clone();
        tokio::spawn(async move {
            Self::run_writer(rx, writer_path, writer_stats).await;
        });

        Self { tx, stats, path }
    }

    async fn run_writer(
        mut rx: mpsc::Receiver<RecorderCommand>,
        path: PathBuf,
        stats: Arc<RwLock<RecorderStats>>,
    ) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                tracing::error!(path = ?parent, error = %e, "Failed to create feed record directory");
            }
        }

        // Opened on first write and reopened after a failed one
        let mut file: Option<File> = None;

        while let Some(command) = rx.recv().await {
            match command {
                RecorderCommand::Message(message) => {
                    stats.write().messages_received += 1;

                    match append_message(&mut file, &path, &message).await {
                        Ok(()) => {
                            stats.write().lines_written += 1;
                            telemetry::record_feed_line_written();
                        }
                        Err(e) => {
                            stats.write().write_failures += 1;
                            telemetry::record_feed_record_failure();
                            tracing::error!(error = %e, timestamp = message.timestamp, "Failed to record feed message");
                        }
                    }
                }
                RecorderCommand::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }

        tracing::info!(path = ?path, "Feed recorder shutting down");
    }

    /// Queue a message for recording without waiting.
    ///
    /// Messages without blocks are ignored. A full queue drops the message.
    pub fn submit(&self, message: &FeedMessage) -> Result<(), CaptureError> {
        if message.blocks.is_empty() {
            return Ok(());
        }

        match self.tx.try_send(RecorderCommand::Message(message.clone())) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.stats.write().messages_dropped += 1;
                telemetry::record_feed_record_dropped();
                Err(CaptureError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(CaptureError::Closed),
        }
    }

    /// Wait until every message queued before this call has been handled
    pub async fn flush(&self) -> Result<(), CaptureError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(RecorderCommand::Flush(ack_tx))
            .await
            .map_err(|_| CaptureError::Closed)?;
        ack_rx.await.map_err(|_| CaptureError::Closed)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn stats(&self) -> RecorderStats {
        self.stats.read().clone()
    }
}

impl std::fmt::Debug for FeedRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedRecorder")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Append one encoded line. On failure the handle is left closed.
async fn append_message(
    file: &mut Option<File>,
    path: &Path,
    message: &FeedMessage,
) -> Result<(), CaptureError> {
    let io_err = |source| CaptureError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut line = encode_message(message)?;
    line.push('\n');

    let mut handle = match file.take() {
        Some(handle) => handle,
        None => OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(io_err)?,
    };

    handle.write_all(line.as_bytes()).await.map_err(io_err)?;
    handle.flush().await.map_err(io_err)?;

    *file = Some(handle);
    Ok(())
}

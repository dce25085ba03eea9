//! Replay of a captured feed file

use super::decode::decode_line;
use super::{FeedMessage, FeedSource};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Replays a JSON-lines capture as if it were arriving live
#[derive(Debug, Clone)]
pub struct FileReplayFeed {
    path: PathBuf,
    /// Pause after each line that carried data
    delay: Option<Duration>,
    buffer_size: usize,
}

impl FileReplayFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delay: None,
            buffer_size: 1024,
        }
    }

    /// Pause between data lines
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay).filter(|d| !d.is_zero());
        self
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn run_reader(
        file: File,
        delay: Option<Duration>,
        tx: mpsc::Sender<FeedMessage>,
    ) -> anyhow::Result<()> {
        let mut lines = BufReader::new(file).lines();
        let mut line_no = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }

            let messages = match decode_line(&line) {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::warn!(line = line_no, error = %e, "Skipping unparseable feed line");
                    continue;
                }
            };

            if messages.is_empty() {
                continue;
            }

            for message in messages {
                if tx.send(message).await.is_err() {
                    tracing::debug!("Replay receiver dropped, stopping");
                    return Ok(());
                }
            }

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }

        tracing::info!(lines = line_no, "Replay finished");
        Ok(())
    }
}

#[async_trait]
impl FeedSource for FileReplayFeed {
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<FeedMessage>> {
        let file = File::open(&self.path).await?;
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let delay = self.delay;
        let path = self.path.clone();

        tracing::info!(path = ?path, "Replaying feed file");

        tokio::spawn(async move {
            if let Err(e) = Self::run_reader(file, delay, tx).await {
                tracing::error!(path = ?path, error = %e, "Replay reader failed");
            }
        });

        Ok(rx)
    }
}

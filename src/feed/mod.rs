//! Inbound market data
//!
//! Typed service envelopes handed to the store, their JSON decoding and
//! encoding, a recorder that writes the dispatched feed to disk, and a file
//! replay source that reads it back.

mod decode;
mod encode;
mod record;
mod replay;
mod types;

pub use decode::{decode_block, decode_line};
pub use encode::encode_message;
pub use record::{FeedRecorder, RecorderConfig, RecorderStats};
pub use replay::FileReplayFeed;
pub use types::{
    BookEntry, ChartMessage, FeedMessage, ListedBookMessage, QuoteMessage, Service, ServiceBlock,
    TimeSaleMessage,
};

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Trait for anything that delivers decoded feed messages
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Start delivering messages
    async fn subscribe(&self) -> anyhow::Result<mpsc::Receiver<FeedMessage>>;
}

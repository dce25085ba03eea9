//! JSON encoding of feed messages into captured lines
//!
//! The output is the same `data` envelope shape [`decode_line`] reads, so a
//! recorded session replays through [`FileReplayFeed`].
//!
//! [`decode_line`]: super::decode_line
//! [`FileReplayFeed`]: super::FileReplayFeed

use super::types::{FeedMessage, Service, ServiceBlock};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
struct WireLine {
    data: Vec<WireEnvelope>,
}

#[derive(Debug, Serialize)]
struct WireEnvelope {
    service: Service,
    timestamp: i64,
    content: Vec<Value>,
}

/// Encode one message as a single JSON line, without the trailing newline.
///
/// Consecutive blocks of the same service share an envelope. Every envelope
/// carries the message timestamp.
pub fn encode_message(message: &FeedMessage) -> Result<String, serde_json::Error> {
    let mut data: Vec<WireEnvelope> = Vec::new();

    for block in &message.blocks {
        let service = block.service();
        let content = block_content(block)?;
        match data.last_mut() {
            Some(envelope) if envelope.service == service => envelope.content.push(content),
            _ => data.push(WireEnvelope {
                service,
                timestamp: message.timestamp,
                content: vec![content],
            }),
        }
    }

    serde_json::to_string(&WireLine { data })
}

fn block_content(block: &ServiceBlock) -> Result<Value, serde_json::Error> {
    match block {
        ServiceBlock::Quote(m) => serde_json::to_value(m),
        ServiceBlock::TimeSale(m) => serde_json::to_value(m),
        ServiceBlock::ListedBook(m) => serde_json::to_value(m),
        ServiceBlock::Chart(m) => serde_json::to_value(m),
    }
}

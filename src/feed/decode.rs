//! JSON decoding of captured streamer lines
//!
//! A line carries a `data` array of service envelopes. Each content block is
//! decoded on its own so one bad block never costs the rest of the line.

use super::types::{
    ChartMessage, FeedMessage, ListedBookMessage, QuoteMessage, Service, ServiceBlock,
    TimeSaleMessage,
};
use crate::error::IngestError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RawLine {
    #[serde(default)]
    data: Vec<RawEnvelope>,
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    service: String,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    content: Vec<Value>,
}

/// Decode one captured line into feed messages.
///
/// Lines without a `data` array (heartbeats, notifications, login responses)
/// decode to an empty list. Only a line that is not JSON at all is an error.
pub fn decode_line(line: &str) -> Result<Vec<FeedMessage>, serde_json::Error> {
    let raw: RawLine = serde_json::from_str(line)?;
    Ok(raw.data.into_iter().map(decode_envelope).collect())
}

fn decode_envelope(envelope: RawEnvelope) -> FeedMessage {
    let mut message = FeedMessage::new(envelope.timestamp, Vec::with_capacity(envelope.content.len()));

    let Some(service) = Service::parse(&envelope.service) else {
        let err = IngestError::UnknownService(envelope.service.clone());
        tracing::debug!(error = %err, blocks = envelope.content.len(), "Skipping envelope");
        message.rejected = envelope.content.len();
        return message;
    };

    for content in envelope.content {
        match decode_block(service, content) {
            Ok(block) => message.blocks.push(block),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable block");
                message.rejected += 1;
            }
        }
    }

    message
}

/// Decode a single content object for a known service
pub fn decode_block(service: Service, content: Value) -> Result<ServiceBlock, IngestError> {
    Ok(match service {
        Service::Quote => ServiceBlock::Quote(from_value::<QuoteMessage>(service, content)?),
        Service::TimesaleEquity => {
            ServiceBlock::TimeSale(from_value::<TimeSaleMessage>(service, content)?)
        }
        Service::ListedBook => {
            ServiceBlock::ListedBook(from_value::<ListedBookMessage>(service, content)?)
        }
        Service::ChartEquity => ServiceBlock::Chart(from_value::<ChartMessage>(service, content)?),
    })
}

fn from_value<T: DeserializeOwned>(service: Service, content: Value) -> Result<T, IngestError> {
    serde_json::from_value(content).map_err(|e| IngestError::Decode {
        service: service.to_string(),
        reason: e.to_string(),
    })
}

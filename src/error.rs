//! Error types for ingestion and capture

use thiserror::Error;

/// Reasons an inbound service block is rejected.
///
/// A rejected block is skipped on its own; the rest of the message is still
/// dispatched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("unknown service: {0}")]
    UnknownService(String),

    #[error("{service} block has an empty symbol")]
    EmptySymbol { service: &'static str },

    #[error("{service} block for {symbol}: {reason}")]
    Malformed {
        service: &'static str,
        symbol: String,
        reason: String,
    },

    #[error("failed to decode {service} content: {reason}")]
    Decode { service: String, reason: String },
}

impl IngestError {
    /// Short label used for metrics
    pub fn reason_label(&self) -> &'static str {
        match self {
            IngestError::UnknownService(_) => "unknown_service",
            IngestError::EmptySymbol { .. } => "empty_symbol",
            IngestError::Malformed { .. } => "malformed",
            IngestError::Decode { .. } => "decode",
        }
    }
}

/// Persistence sink failures. These are logged, never propagated into the
/// ingestion path.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode feed line: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("capture queue is full")]
    QueueFull,

    #[error("capture writer has shut down")]
    Closed,
}

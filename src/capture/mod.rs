//! Real-time capture of classified prints to CSV
//!
//! One file per service, symbol and day. The header is written when the file
//! is created; every print after that is one appended line.

mod file;
mod schema;
mod sink;

pub use file::{append_line, capture_file_name, capture_file_path};
pub use schema::{CaptureSchema, DEFAULT_FIELDS};
pub use sink::{CaptureSink, SinkConfig, SinkStats};

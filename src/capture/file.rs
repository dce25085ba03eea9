//! Capture file naming and line appends

use crate::error::CaptureError;
use crate::feed::Service;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// `"{service} {symbol} {Mon dd yyyy}.csv"`
pub fn capture_file_name(service: Service, symbol: &str, date: NaiveDate) -> String {
    format!("{} {} {}.csv", service, symbol, date.format("%b %d %Y"))
}

pub fn capture_file_path(dir: &Path, service: Service, symbol: &str, date: NaiveDate) -> PathBuf {
    dir.join(capture_file_name(service, symbol, date))
}

/// Append `row` to `path`, writing `header` first if the file is new.
///
/// Header and row go out in a single write so a reader never sees a file
/// with a header but a torn first row. Returns whether the file was created.
pub async fn append_line(path: &Path, header: &str, row: &str) -> Result<bool, CaptureError> {
    let io_err = |source| CaptureError::Io {
        path: path.display().to_string(),
        source,
    };

    let exists = tokio::fs::try_exists(path).await.map_err(io_err)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(io_err)?;

    let line = if exists {
        row.to_string()
    } else {
        format!("{header}{row}")
    };

    file.write_all(line.as_bytes()).await.map_err(io_err)?;
    file.flush().await.map_err(io_err)?;

    Ok(!exists)
}

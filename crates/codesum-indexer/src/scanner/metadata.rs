//! Last-modified timestamps for source files.

use crate::IndexerError;
use chrono::{DateTime, Local};
use std::path::Path;
use std::time::SystemTime;

/// Format used for the report's "Last Modified" column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Read the modification time of `path`, rendered in local time.
pub fn last_modified(path: &Path) -> Result<String, IndexerError> {
    let modified = std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| IndexerError::FileAccess {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(format_timestamp(modified))
}

/// Render a system time with [`TIMESTAMP_FORMAT`] in the local time zone.
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

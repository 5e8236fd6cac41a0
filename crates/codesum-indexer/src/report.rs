//! Append-only CSV report.
//!
//! The report is never read back or rewritten: every call appends rows, and
//! the header is written only when the file is new. Parsing a file twice
//! yields two rows.

use crate::scanner::{EntityKind, ParseRecord};
use crate::IndexerError;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column titles, written once at the top of a new report.
pub const REPORT_HEADER: [&str; 8] = [
    "File Name",
    "Classes",
    "Functions",
    "Enums",
    "Structs",
    "Macros",
    "Included Files",
    "Last Modified",
];

/// Separator between names inside one multi-valued cell.
pub const CELL_SEPARATOR: &str = ", ";

/// Appends parse records to a CSV file.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the report already holds content (an empty file counts as new).
    pub fn exists(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }

    /// Append one row per record, writing the header first if the report is new.
    ///
    /// Returns the number of data rows written. With no records and an
    /// existing report, the file is not touched at all.
    pub fn write(&self, records: &[ParseRecord]) -> Result<usize, IndexerError> {
        let needs_header = !self.exists();

        if records.is_empty() && !needs_header {
            debug!(path = ?self.path, "Nothing to append");
            return Ok(0);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;

        let mut writer = csv::Writer::from_writer(file);

        if needs_header {
            writer
                .write_record(REPORT_HEADER)
                .map_err(|e| self.write_error(e))?;
        }

        for record in records {
            writer
                .write_record(render_row(record))
                .map_err(|e| self.write_error(e))?;
        }

        writer.flush().map_err(|e| self.write_error(e))?;

        info!(
            path = ?self.path,
            rows = records.len(),
            header = needs_header,
            "Appended to report"
        );

        Ok(records.len())
    }

    fn write_error(&self, e: impl std::fmt::Display) -> IndexerError {
        IndexerError::ReportWrite {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

/// Render a record as the eight report cells.
pub fn render_row(record: &ParseRecord) -> Vec<String> {
    let mut row = Vec::with_capacity(REPORT_HEADER.len());
    row.push(record.path.clone());
    for kind in EntityKind::ALL {
        row.push(record.entities.get(kind).join(CELL_SEPARATOR));
    }
    row.push(record.last_modified.clone());
    row
}

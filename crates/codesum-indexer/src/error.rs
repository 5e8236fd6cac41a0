//! Indexer error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during indexing operations.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// A source file vanished or could not be read while it was being parsed
    #[error("Cannot access {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The working directory is not usable as a git checkout
    #[error("Repository error at {path}: {message}")]
    RepositoryState { path: PathBuf, message: String },

    /// The report could not be created or appended to
    #[error("Cannot write report {path}: {message}")]
    ReportWrite { path: PathBuf, message: String },

    /// Directory walk failed before producing any entries
    #[error("Walk error under {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// A unit of work panicked or was cancelled
    #[error("Worker failed on {path}: {message}")]
    Worker { path: PathBuf, message: String },

    /// Path not found
    #[error("Path not found: {0}")]
    NotFound(PathBuf),
}

impl IndexerError {
    /// Whether this error should abort the whole run rather than a single file.
    pub fn is_systemic(&self) -> bool {
        !matches!(
            self,
            IndexerError::FileAccess { .. } | IndexerError::Worker { .. }
        )
    }
}

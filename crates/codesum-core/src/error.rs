//! Core error types for codesum.

use codesum_indexer::IndexerError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a codesum run
#[derive(Debug, Error)]
pub enum CoreError {
    /// Indexing failed (repository, report, or scan root)
    #[error(transparent)]
    Indexer(#[from] IndexerError),

    /// Config file could not be read or parsed
    #[error("Invalid config file {path}: {message}")]
    Config { path: PathBuf, message: String },
}

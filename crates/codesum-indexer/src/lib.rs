//! codesum Indexer
//!
//! This crate provides the indexing engine for codesum, including:
//! - Recursive discovery of C-family source files
//! - Pattern-based entity extraction (classes, functions, macros, ...)
//! - Git-backed detection of files changed since the last commit
//! - A bounded, order-preserving worker pool for parsing
//! - An append-only CSV report

pub mod changes;
pub mod dispatcher;
mod error;
pub mod report;
pub mod scanner;

pub use changes::{ChangeDetector, ChangeOptions, ChangeScope};
pub use dispatcher::{Dispatcher, FileOutcome, NoProgress, Progress};
pub use error::IndexerError;
pub use report::{ReportWriter, REPORT_HEADER};
pub use scanner::{
    extract, parse_file, Entities, ParseRecord, ScanOptions, Scanner, SourceFile,
    DEFAULT_EXTENSIONS,
};

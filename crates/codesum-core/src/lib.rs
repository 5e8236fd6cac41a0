//! codesum Core Components
//!
//! This crate provides the run policy for codesum: configuration loading and
//! the pipeline that decides between a full scan and a changed-files pass.

pub mod config;
mod error;
pub mod pipeline;

pub use config::Config;
pub use error::CoreError;
pub use pipeline::{PassKind, PassSummary, Pipeline, RunOutcome, RunSummary};

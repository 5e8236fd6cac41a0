//! Bounded, order-preserving parallel parsing.
//!
//! Units of work are blocking (read + stat), so each one runs on tokio's
//! blocking pool while a semaphore caps how many are in flight. Results are
//! tagged with their input position and handed back in input order,
//! regardless of completion order.

use crate::scanner::{parse_file, ParseRecord, SourceFile};
use crate::IndexerError;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Outcome of parsing one file.
pub type FileOutcome = Result<ParseRecord, IndexerError>;

/// Progress hook advanced once per finished unit of work.
///
/// Purely advisory; the dispatcher's results never depend on it.
pub trait Progress: Send + Sync {
    fn begin(&self, _total: u64) {}
    fn advance(&self) {}
    fn finish(&self) {}
}

/// Progress hook that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// Runs file parsing across a fixed number of workers.
pub struct Dispatcher {
    worker_count: usize,
    progress: Arc<dyn Progress>,
}

impl Dispatcher {
    /// Worker count used when none is configured.
    pub const DEFAULT_WORKERS: usize = 4;

    /// Create a dispatcher with `worker_count` workers (at least one).
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
            progress: Arc::new(NoProgress),
        }
    }

    /// Report progress to `progress`.
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Parse every file; `result[i]` describes `files[i]`.
    ///
    /// A failure on one file is returned in that file's slot and does not
    /// affect the others.
    pub async fn run(&self, files: Vec<SourceFile>) -> Vec<FileOutcome> {
        let start = Instant::now();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();

        let outcomes: Vec<FileOutcome> = self
            .map_ordered(files, |file| parse_file(&file))
            .await
            .into_iter()
            .zip(paths)
            .map(|(joined, path)| {
                joined
                    .map_err(|message| IndexerError::Worker { path, message })
                    .and_then(|outcome| outcome)
            })
            .collect();

        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        info!(
            files = outcomes.len(),
            failed = failed,
            workers = self.worker_count,
            duration_ms = start.elapsed().as_millis(),
            "Dispatch complete"
        );

        outcomes
    }

    /// Apply `work` to every item on the worker pool, returning results in
    /// input order.
    ///
    /// An `Err` slot holds the message of a unit that panicked or was
    /// cancelled.
    pub async fn map_ordered<T, R, F>(&self, items: Vec<T>, work: F) -> Vec<Result<R, String>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        let total = items.len();
        self.progress.begin(total as u64);

        let work = Arc::new(work);
        let permits = Arc::new(Semaphore::new(self.worker_count));
        let mut tasks = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let work = Arc::clone(&work);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                // Held until the blocking unit returns
                let _permit = permits.acquire_owned().await.ok();
                let joined = tokio::task::spawn_blocking(move || work(item)).await;
                (index, joined.map_err(|e| e.to_string()))
            });
        }

        let mut slots: Vec<Option<Result<R, String>>> = (0..total).map(|_| None).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    if let Err(message) = &result {
                        warn!(index = index, error = %message, "Worker failed");
                    }
                    debug!(index = index, "Unit complete");
                    slots[index] = Some(result);
                    self.progress.advance();
                }
                Err(e) => warn!(error = %e, "Dispatch task failed"),
            }
        }

        self.progress.finish();

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err("unit of work did not complete".to_string())))
            .collect()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WORKERS)
    }
}

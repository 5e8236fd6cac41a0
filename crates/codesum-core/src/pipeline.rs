//! Run policy: decides which files to parse and appends them to the report.
//!
//! A run against a missing (or empty) report parses the whole tree and then,
//! unless `skip_changes_on_first_run` is set, also re-parses files that git
//! reports as changed, so those files appear twice. A run against an existing
//! report parses changed files only, and does nothing when there are none.

use crate::{Config, CoreError};
use codesum_indexer::{
    ChangeDetector, Dispatcher, IndexerError, NoProgress, Progress, ReportWriter, Scanner,
    SourceFile,
};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Which set of files a pass covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Every source file under the root
    Full,
    /// Files git reports as changed
    Changed,
}

/// Result of one scan-dispatch-append pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub kind: PassKind,
    /// Rows appended to the report
    pub parsed: usize,
    /// Report names of files that could not be parsed
    pub failures: Vec<String>,
}

/// What a run ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The report existed and nothing had changed
    NothingToDo,
    /// At least one pass ran
    Completed,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::NothingToDo => f.write_str("----- you're good to go, no files are modified"),
            RunOutcome::Completed => f.write_str("----- completed parsing the files"),
        }
    }
}

/// Summary of a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// The report did not exist (or was empty) when the run started
    pub first_run: bool,
    pub full_pass: Option<PassSummary>,
    pub changed_pass: Option<PassSummary>,
}

impl RunSummary {
    pub fn outcome(&self) -> RunOutcome {
        if self.full_pass.is_none() && self.changed_pass.is_none() {
            RunOutcome::NothingToDo
        } else {
            RunOutcome::Completed
        }
    }

    fn passes(&self) -> impl Iterator<Item = &PassSummary> {
        self.full_pass.iter().chain(self.changed_pass.iter())
    }

    /// Rows appended across both passes.
    pub fn parsed(&self) -> usize {
        self.passes().map(|p| p.parsed).sum()
    }

    /// Files that failed across both passes.
    pub fn failures(&self) -> Vec<&str> {
        self.passes()
            .flat_map(|p| p.failures.iter().map(String::as_str))
            .collect()
    }
}

/// One indexing run over a git working tree.
pub struct Pipeline {
    root: PathBuf,
    config: Config,
    progress: Arc<dyn Progress>,
}

impl Pipeline {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
            progress: Arc::new(NoProgress),
        }
    }

    /// Report per-file progress of each pass to `progress`.
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Location of the report this pipeline appends to.
    pub fn report_path(&self) -> PathBuf {
        self.config.report_path_for(&self.root)
    }

    /// Execute the run.
    ///
    /// Repository problems surface before anything is written. Files that
    /// cannot be read are logged and left out of the report; the run still
    /// succeeds.
    pub async fn run(&self) -> Result<RunSummary, CoreError> {
        let start = Instant::now();
        let root = self
            .root
            .canonicalize()
            .map_err(|_| IndexerError::NotFound(self.root.clone()))?;

        let report = ReportWriter::new(self.report_path());
        let first_run = !report.exists();

        // The repository handle is only needed to list changes up front
        let changed = {
            let detector = ChangeDetector::open(&root, self.config.change_options())?;
            let workdir = detector
                .workdir()
                .canonicalize()
                .unwrap_or_else(|_| detector.workdir().to_path_buf());
            let files = rebase_onto_root(detector.changed_files()?, &workdir, &root);
            exclude_report(files, report.path())
        };

        info!(
            root = ?root,
            first_run = first_run,
            changed = changed.len(),
            "Starting run"
        );

        let full_pass = if first_run {
            let files = Scanner::with_options(self.config.scan_options()).source_files(&root)?;
            Some(self.pass(PassKind::Full, files, &report).await?)
        } else {
            None
        };

        let changed_pass = if first_run && self.config.skip_changes_on_first_run {
            debug!("Skipping changed files on first run");
            None
        } else if changed.is_empty() {
            None
        } else {
            Some(self.pass(PassKind::Changed, changed, &report).await?)
        };

        let summary = RunSummary {
            first_run,
            full_pass,
            changed_pass,
        };

        info!(
            outcome = ?summary.outcome(),
            parsed = summary.parsed(),
            failed = summary.failures().len(),
            duration_ms = start.elapsed().as_millis(),
            "Run complete"
        );

        Ok(summary)
    }

    async fn pass(
        &self,
        kind: PassKind,
        files: Vec<SourceFile>,
        report: &ReportWriter,
    ) -> Result<PassSummary, CoreError> {
        debug!(pass = ?kind, files = files.len(), "Starting pass");

        let names: Vec<String> = files.iter().map(SourceFile::display_name).collect();
        let dispatcher = Dispatcher::new(self.config.worker_count)
            .with_progress(Arc::clone(&self.progress));
        let outcomes = dispatcher.run(files).await;

        let mut records = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();

        for (outcome, name) in outcomes.into_iter().zip(names) {
            match outcome {
                Ok(record) => records.push(record),
                Err(e) if !e.is_systemic() => {
                    warn!(file = %name, error = %e, "Skipping file");
                    failures.push(name);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let parsed = report.write(&records)?;

        Ok(PassSummary {
            kind,
            parsed,
            failures,
        })
    }
}

/// Turn workdir-relative changed paths into files named relative to `root`.
///
/// Changes outside `root` are dropped, so both passes report a file under the
/// same name when `root` is a subdirectory of the working tree.
fn rebase_onto_root(changed: Vec<PathBuf>, workdir: &Path, root: &Path) -> Vec<SourceFile> {
    let total = changed.len();
    let files: Vec<SourceFile> = changed
        .into_iter()
        .filter_map(|relative| {
            let path = workdir.join(relative);
            let under_root = path.strip_prefix(root).ok()?;
            Some(SourceFile::new(root, under_root.to_path_buf()))
        })
        .collect();

    if files.len() < total {
        debug!(
            outside = total - files.len(),
            root = ?root,
            "Ignoring changes outside the scan root"
        );
    }

    files
}

/// Drop the report itself from a list of changed files.
fn exclude_report(files: Vec<SourceFile>, report: &Path) -> Vec<SourceFile> {
    let report = report.canonicalize().unwrap_or_else(|_| report.to_path_buf());
    files
        .into_iter()
        .filter(|file| {
            let path = file.path.canonicalize().unwrap_or_else(|_| file.path.clone());
            path != report
        })
        .collect()
}

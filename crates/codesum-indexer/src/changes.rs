//! Git-backed detection of files changed since the last commit.
//!
//! A [`ChangeDetector`] owns the repository handle for exactly one run. It is
//! opened explicitly by the caller and dropped when the run ends.

use crate::scanner::{has_allowed_extension, SourceFile};
use crate::IndexerError;
use git2::{Delta, DiffOptions, ErrorCode, Repository, Tree};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Which comparison defines a "changed" file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeScope {
    /// Working tree (including staged changes) against the HEAD commit
    #[default]
    SinceHead,
    /// Working tree against the index, ignoring anything already staged
    Unstaged,
}

/// File change type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Tracked file whose content differs
    Modified,
    /// File staged for addition but not yet committed
    Added,
    /// File renamed or copied; the new path is reported
    Renamed,
    /// File changed type (e.g. regular file to symlink)
    TypeChange,
    /// File unknown to git
    Untracked,
    /// File with unresolved merge conflicts
    Conflicted,
}

/// A changed file, relative to the repository working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Path relative to the working directory
    pub path: PathBuf,
    /// Kind of change
    pub kind: ChangeKind,
}

/// Options for change detection.
#[derive(Debug, Clone, Default)]
pub struct ChangeOptions {
    /// Comparison to run
    pub scope: ChangeScope,
    /// Report untracked files as changed
    pub include_untracked: bool,
    /// Only report files with one of these extensions
    pub extensions: Option<Vec<String>>,
}

/// Lists working-tree changes of a git checkout.
pub struct ChangeDetector {
    repo: Repository,
    workdir: PathBuf,
    options: ChangeOptions,
}

impl ChangeDetector {
    /// Open the repository containing `path`.
    ///
    /// Fails with [`IndexerError::RepositoryState`] when `path` is not inside
    /// a git checkout or the repository has no working directory.
    pub fn open(path: &Path, options: ChangeOptions) -> Result<Self, IndexerError> {
        let repo = Repository::discover(path).map_err(|e| IndexerError::RepositoryState {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| IndexerError::RepositoryState {
                path: path.to_path_buf(),
                message: "bare repository has no working tree".to_string(),
            })?
            .to_path_buf();

        debug!(workdir = ?workdir, scope = ?options.scope, "Opened repository");

        Ok(Self {
            repo,
            workdir,
            options,
        })
    }

    /// Root of the working tree that reported paths are relative to.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// List changed files with their change kind, sorted by path.
    ///
    /// Deleted files are never reported.
    pub fn changes(&self) -> Result<Vec<FileChange>, IndexerError> {
        let mut opts = DiffOptions::new();
        opts.include_untracked(self.options.include_untracked)
            .recurse_untracked_dirs(self.options.include_untracked);

        let diff = match self.options.scope {
            ChangeScope::Unstaged => self.repo.diff_index_to_workdir(None, Some(&mut opts)),
            ChangeScope::SinceHead => {
                let head = self.head_tree()?;
                self.repo
                    .diff_tree_to_workdir_with_index(head.as_ref(), Some(&mut opts))
            }
        }
        .map_err(|e| self.repository_error(e))?;

        let mut changes: Vec<FileChange> = diff
            .deltas()
            .filter_map(|delta| {
                let kind = convert_delta(delta.status())?;
                let path = delta.new_file().path()?.to_path_buf();
                Some(FileChange { path, kind })
            })
            .filter(|change| match &self.options.extensions {
                Some(exts) => has_allowed_extension(&change.path, exts),
                None => true,
            })
            .collect();

        changes.sort_by(|a, b| a.path.cmp(&b.path));
        changes.dedup_by(|a, b| a.path == b.path);

        info!(count = changes.len(), scope = ?self.options.scope, "Detected changed files");

        Ok(changes)
    }

    /// Changed paths relative to [`ChangeDetector::workdir`].
    pub fn changed_files(&self) -> Result<Vec<PathBuf>, IndexerError> {
        Ok(self.changes()?.into_iter().map(|c| c.path).collect())
    }

    /// Changed files ready for parsing.
    pub fn source_files(&self) -> Result<Vec<SourceFile>, IndexerError> {
        Ok(self
            .changed_files()?
            .into_iter()
            .map(|relative| SourceFile::new(&self.workdir, relative))
            .collect())
    }

    /// Tree of the HEAD commit, or `None` on a branch with no commits yet.
    fn head_tree(&self) -> Result<Option<Tree<'_>>, IndexerError> {
        match self.repo.head() {
            Ok(head) => head
                .peel_to_tree()
                .map(Some)
                .map_err(|e| self.repository_error(e)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                debug!("HEAD is unborn, comparing against an empty tree");
                Ok(None)
            }
            Err(e) => Err(self.repository_error(e)),
        }
    }

    fn repository_error(&self, e: git2::Error) -> IndexerError {
        IndexerError::RepositoryState {
            path: self.workdir.clone(),
            message: e.message().to_string(),
        }
    }
}

/// Map a git delta status to our change kind; `None` for entries to skip.
fn convert_delta(status: Delta) -> Option<ChangeKind> {
    match status {
        Delta::Modified => Some(ChangeKind::Modified),
        Delta::Added => Some(ChangeKind::Added),
        Delta::Renamed | Delta::Copied => Some(ChangeKind::Renamed),
        Delta::Typechange => Some(ChangeKind::TypeChange),
        Delta::Untracked => Some(ChangeKind::Untracked),
        Delta::Conflicted => Some(ChangeKind::Conflicted),
        Delta::Deleted | Delta::Unmodified | Delta::Ignored | Delta::Unreadable => None,
    }
}

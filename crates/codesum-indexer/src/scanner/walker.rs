//! File system walker.

use crate::IndexerError;
use ignore::{WalkBuilder, WalkState};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::debug;

/// A discovered file entry.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// File system walker.
///
/// By default every file below the root is visited, including hidden and
/// gitignored ones. Ignore-file filtering can be switched on.
pub struct Walker {
    root: PathBuf,
    follow_symlinks: bool,
    respect_ignore_files: bool,
}

impl Walker {
    /// Create a new walker for the given root directory.
    pub fn new(root: &Path, follow_symlinks: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            follow_symlinks,
            respect_ignore_files: false,
        }
    }

    /// Honour `.gitignore`, `.ignore` and hidden-file rules while walking.
    pub fn respect_ignore_files(mut self, yes: bool) -> Self {
        self.respect_ignore_files = yes;
        self
    }

    /// Walk the directory tree and return all discovered files.
    pub fn walk(&self) -> Result<Vec<FileEntry>, IndexerError> {
        if !self.root.is_dir() {
            return Err(IndexerError::Walk {
                path: self.root.clone(),
                message: "not a directory".to_string(),
            });
        }

        let (tx, rx) = mpsc::channel();
        let filters = self.respect_ignore_files;

        let walker = WalkBuilder::new(&self.root)
            .follow_links(self.follow_symlinks)
            .standard_filters(filters)
            .hidden(filters)
            .git_ignore(filters)
            .git_global(filters)
            .git_exclude(filters)
            .ignore(filters)
            .parents(filters)
            .build_parallel();

        walker.run(|| {
            let tx = tx.clone();
            Box::new(move |result| {
                match result {
                    Ok(entry) => {
                        // Files, and symlinks that resolve to files
                        let is_file = entry
                            .file_type()
                            .map(|ft| ft.is_file() || (ft.is_symlink() && entry.path().is_file()))
                            .unwrap_or(false);
                        if is_file {
                            let size = std::fs::metadata(entry.path())
                                .map(|m| m.len())
                                .unwrap_or(0);
                            let _ = tx.send(FileEntry {
                                path: entry.path().to_path_buf(),
                                size,
                            });
                        }
                    }
                    Err(e) => {
                        // Don't fail the entire walk for individual errors
                        debug!(error = %e, "Walk error");
                    }
                }
                WalkState::Continue
            })
        });

        // Drop the original sender so the receiver knows when we're done
        drop(tx);

        let mut entries: Vec<FileEntry> = rx.into_iter().collect();

        // Sort by path for deterministic ordering
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(entries)
    }
}

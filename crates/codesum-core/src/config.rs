//! Configuration for codesum runs.

use crate::CoreError;
use codesum_indexer::scanner::default_extensions;
use codesum_indexer::{ChangeOptions, ChangeScope, Dispatcher, ScanOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-project config file looked up in the scan root.
pub const PROJECT_CONFIG_FILE: &str = ".codesum.yaml";

/// Run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Report location; relative paths are resolved against the scan root
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    /// Number of files parsed concurrently
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Extensions (without dot) that mark a file as a source file
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Honour .gitignore and skip hidden files during the full scan
    #[serde(default)]
    pub respect_ignore_files: bool,

    /// What counts as a changed file
    #[serde(default)]
    pub scope: ChangeScope,

    /// Treat untracked files as changed
    #[serde(default)]
    pub include_untracked: bool,

    /// Only re-parse changed files that pass the extension filter
    #[serde(default)]
    pub changed_extensions_only: bool,

    /// Skip the changed-files pass on the run that creates the report
    #[serde(default)]
    pub skip_changes_on_first_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_report_path() -> PathBuf {
    PathBuf::from("code documentation").join("parsed_data.csv")
}

fn default_worker_count() -> usize {
    Dispatcher::DEFAULT_WORKERS
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            worker_count: default_worker_count(),
            extensions: default_extensions(),
            respect_ignore_files: false,
            scope: ChangeScope::default(),
            include_untracked: false,
            changed_extensions_only: false,
            skip_changes_on_first_run: false,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration for `root`, falling back to defaults.
    ///
    /// Looks for `<root>/.codesum.yaml`, then the user config directory.
    /// Unreadable or malformed files are logged and skipped.
    pub fn load(root: &Path) -> Self {
        let candidates = [Some(root.join(PROJECT_CONFIG_FILE)), user_config_path()];

        for path in candidates.into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "Loaded config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load config file: {}", e);
                }
            }
        }

        Self::default()
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        // An empty file deserializes to unit, not a map
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| CoreError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Report location for a scan rooted at `root`.
    pub fn report_path_for(&self, root: &Path) -> PathBuf {
        if self.report_path.is_absolute() {
            self.report_path.clone()
        } else {
            root.join(&self.report_path)
        }
    }

    /// Options for the full-tree scan.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            extensions: self.extensions.clone(),
            respect_ignore_files: self.respect_ignore_files,
            ..Default::default()
        }
    }

    /// Options for change detection.
    pub fn change_options(&self) -> ChangeOptions {
        ChangeOptions {
            scope: self.scope,
            include_untracked: self.include_untracked,
            extensions: self
                .changed_extensions_only
                .then(|| self.extensions.clone()),
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("codesum").join("config.yaml"))
}

//! Source scanner module.
//!
//! Discovers C-family source files below a root, and turns a single file
//! into a [`ParseRecord`]: extracted entities plus its modification time.

mod extractor;
mod language;
mod metadata;
mod walker;

pub use extractor::{extract, Entities, EntityKind};
pub use language::{default_extensions, has_allowed_extension, DEFAULT_EXTENSIONS};
pub use metadata::{format_timestamp, last_modified, TIMESTAMP_FORMAT};
pub use walker::{FileEntry, Walker};

use crate::IndexerError;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Options for enumerating a source tree.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Extensions (without dot) that mark a file as a source file
    pub extensions: Vec<String>,
    /// Whether to honour .gitignore and skip hidden files
    pub respect_ignore_files: bool,
    /// Whether to follow symlinks
    pub follow_symlinks: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            respect_ignore_files: false,
            follow_symlinks: false,
        }
    }
}

/// A file to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path used for reading the file
    pub path: PathBuf,
    /// Path relative to the scan root or repository, shown in the report
    pub relative: PathBuf,
}

impl SourceFile {
    /// A file at `relative` below `base`.
    pub fn new(base: &Path, relative: impl Into<PathBuf>) -> Self {
        let relative = relative.into();
        Self {
            path: base.join(&relative),
            relative,
        }
    }

    /// Name written to the report's "File Name" column.
    pub fn display_name(&self) -> String {
        self.relative.to_string_lossy().into_owned()
    }
}

/// One parsed file, i.e. one row of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRecord {
    pub path: String,
    pub entities: Entities,
    /// Modification time, formatted with [`TIMESTAMP_FORMAT`]
    pub last_modified: String,
}

/// Read, extract and stat a single file.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn parse_file(file: &SourceFile) -> Result<ParseRecord, IndexerError> {
    let bytes = std::fs::read(&file.path).map_err(|source| IndexerError::FileAccess {
        path: file.path.clone(),
        source,
    })?;

    let content = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = content {
        debug!(path = ?file.path, "Invalid UTF-8, decoded lossily");
    }

    let entities = extract(&content);
    let last_modified = last_modified(&file.path)?;

    debug!(path = ?file.path, entities = entities.len(), "Parsed file");

    Ok(ParseRecord {
        path: file.display_name(),
        entities,
        last_modified,
    })
}

/// Enumerates the full set of source files below a root.
pub struct Scanner {
    options: ScanOptions,
}

impl Scanner {
    /// Create a new scanner with default options.
    pub fn new() -> Self {
        Self {
            options: ScanOptions::default(),
        }
    }

    /// Create a scanner with custom options.
    pub fn with_options(options: ScanOptions) -> Self {
        Self { options }
    }

    /// List source files below `root`, as paths relative to `root`, sorted.
    pub fn enumerate(&self, root: &Path) -> Result<Vec<PathBuf>, IndexerError> {
        let start = Instant::now();

        let root = root
            .canonicalize()
            .map_err(|_| IndexerError::NotFound(root.to_path_buf()))?;

        info!(path = ?root, "Starting scan");

        let entries = Walker::new(&root, self.options.follow_symlinks)
            .respect_ignore_files(self.options.respect_ignore_files)
            .walk()?;

        let total = entries.len();
        let mut bytes = 0u64;
        let files: Vec<PathBuf> = entries
            .into_iter()
            .filter(|entry| has_allowed_extension(&entry.path, &self.options.extensions))
            .map(|entry| {
                bytes += entry.size;
                entry
                    .path
                    .strip_prefix(&root)
                    .map(Path::to_path_buf)
                    .unwrap_or(entry.path)
            })
            .collect();

        info!(
            files = files.len(),
            skipped = total - files.len(),
            bytes = bytes,
            duration_ms = start.elapsed().as_millis(),
            "Scan complete"
        );

        Ok(files)
    }

    /// Enumerate `root` and wrap each result as a [`SourceFile`].
    pub fn source_files(&self, root: &Path) -> Result<Vec<SourceFile>, IndexerError> {
        Ok(self
            .enumerate(root)?
            .into_iter()
            .map(|relative| SourceFile::new(root, relative))
            .collect())
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_enumerate_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let files = Scanner::new().enumerate(temp_dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_enumerate_filters_by_extension() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src/detail")).unwrap();
        fs::write(root.join("main.cpp"), "int main() {}").unwrap();
        fs::write(root.join("src/util.c"), "").unwrap();
        fs::write(root.join("src/detail/util.hh"), "").unwrap();
        fs::write(root.join("README.md"), "# readme").unwrap();
        fs::write(root.join("src/lib.rs"), "fn main() {}").unwrap();

        let files = Scanner::new().enumerate(root).unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("main.cpp"),
                PathBuf::from("src/detail/util.hh"),
                PathBuf::from("src/util.c"),
            ]
        );
    }

    #[test]
    fn test_enumerate_missing_root() {
        let temp_dir = tempdir().unwrap();
        let err = Scanner::new()
            .enumerate(&temp_dir.path().join("missing"))
            .unwrap_err();
        assert!(matches!(err, IndexerError::NotFound(_)));
    }

    #[test]
    fn test_custom_extensions() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("a.c"), "").unwrap();
        fs::write(temp_dir.path().join("b.ino"), "").unwrap();

        let scanner = Scanner::with_options(ScanOptions {
            extensions: vec!["ino".to_string()],
            ..Default::default()
        });

        assert_eq!(
            scanner.enumerate(temp_dir.path()).unwrap(),
            vec![PathBuf::from("b.ino")]
        );
    }

    #[test]
    fn test_parse_file_record() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("a.cpp"), "class A { }; #define X 1").unwrap();

        let file = SourceFile::new(temp_dir.path(), "a.cpp");
        let record = parse_file(&file).unwrap();

        assert_eq!(record.path, "a.cpp");
        assert_eq!(record.entities.classes, vec!["A"]);
        assert_eq!(record.entities.macros, vec!["X"]);
        assert_eq!(record.last_modified, last_modified(&file.path).unwrap());
    }

    #[test]
    fn test_parse_file_invalid_utf8() {
        let temp_dir = tempdir().unwrap();
        let mut bytes = b"#define GOOD 1\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        bytes.extend_from_slice(b"struct After {\n};\n");
        fs::write(temp_dir.path().join("bad.h"), bytes).unwrap();

        let record = parse_file(&SourceFile::new(temp_dir.path(), "bad.h")).unwrap();

        assert_eq!(record.entities.macros, vec!["GOOD"]);
        assert_eq!(record.entities.structs, vec!["After"]);
    }

    #[test]
    fn test_parse_missing_file() {
        let temp_dir = tempdir().unwrap();
        let err = parse_file(&SourceFile::new(temp_dir.path(), "gone.c")).unwrap_err();
        assert!(matches!(err, IndexerError::FileAccess { .. }));
    }
}

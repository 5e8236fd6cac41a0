//! Source file filtering by extension.

use std::path::Path;

/// Extensions treated as C-family sources when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["c", "cpp", "h", "hpp", "cc", "hh"];

/// The default allow-list as owned strings.
pub fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

/// Check whether `path` ends in one of `extensions` (without the leading dot).
///
/// Comparison is case-sensitive: `FOO.C` is not a match for `c`.
pub fn has_allowed_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };

    extensions
        .iter()
        .any(|allowed| allowed.as_ref().trim_start_matches('.') == ext)
}

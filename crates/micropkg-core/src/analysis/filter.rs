//! Exclusion of files that do not count towards code size.
//!
//! Both rules split naively: the basename is whatever follows the last `/`,
//! the extension whatever follows the last `.` anywhere in the path. A path
//! without `.` therefore has the whole path as its extension, and configured
//! extensions are compared without stripping a leading dot.

use crate::config::AnalyzeOptions;
use crate::pkg::FileRecord;

/// Last `/`-separated segment of `path`.
#[must_use]
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Text after the last `.` in `path`, or all of `path` when it has none.
#[must_use]
pub fn extension(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Whether `path` survives both exclusion rules.
#[must_use]
pub fn is_relevant(path: &str, options: &AnalyzeOptions) -> bool {
    let base = basename(path);
    let ext = extension(path);
    !options.exclude_files.iter().any(|f| f == base)
        && !options.exclude_extensions.iter().any(|e| e == ext)
}

/// Drop excluded files, keeping the order of the rest.
#[must_use]
pub fn filter_files(files: Vec<FileRecord>, options: &AnalyzeOptions) -> Vec<FileRecord> {
    files
        .into_iter()
        .filter(|file| is_relevant(&file.path, options))
        .collect()
}

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default per-file size budget in bytes.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100;

/// Default file count ceiling.
pub const DEFAULT_MAX_FILES: u64 = 1;

/// Basenames excluded by default.
pub const DEFAULT_EXCLUDE_FILES: &[&str] = &["README.md", "LICENSE", "package.json"];

/// Extensions excluded by default.
pub const DEFAULT_EXCLUDE_EXTENSIONS: &[&str] = &[".md", ".txt"];

/// Thresholds and filters for a single package analysis.
///
/// Every field is optional in JSON; missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzeOptions {
    /// Size budget per file, in bytes of comment-stripped code.
    pub max_file_size: u64,

    /// Maximum number of surviving files.
    pub max_files: u64,

    /// Basenames dropped before measuring.
    pub exclude_files: Vec<String>,

    /// Path suffixes (text after the last `.`) dropped before measuring.
    pub exclude_extensions: Vec<String>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
            exclude_files: DEFAULT_EXCLUDE_FILES.iter().map(ToString::to_string).collect(),
            exclude_extensions: DEFAULT_EXCLUDE_EXTENSIONS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl AnalyzeOptions {
    /// Load options from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set the per-file size budget.
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Set the file count ceiling.
    #[must_use]
    pub fn with_max_files(mut self, max_files: u64) -> Self {
        self.max_files = max_files;
        self
    }

    /// Replace the excluded basenames.
    #[must_use]
    pub fn with_exclude_files(mut self, files: Vec<String>) -> Self {
        self.exclude_files = files;
        self
    }

    /// Replace the excluded extensions.
    #[must_use]
    pub fn with_exclude_extensions(mut self, extensions: Vec<String>) -> Self {
        self.exclude_extensions = extensions;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let opts = AnalyzeOptions::default();
        assert_eq!(opts.max_file_size, 100);
        assert_eq!(opts.max_files, 1);
        assert_eq!(opts.exclude_files, vec!["README.md", "LICENSE", "package.json"]);
        assert_eq!(opts.exclude_extensions, vec![".md", ".txt"]);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let opts: AnalyzeOptions = serde_json::from_str(r#"{"maxFiles": 3}"#).unwrap();
        assert_eq!(opts.max_files, 3);
        assert_eq!(opts.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(opts.exclude_files.len(), 3);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"maxFileSize": 250, "excludeExtensions": ["md", "map"]}}"#
        )
        .unwrap();

        let opts = AnalyzeOptions::from_file(file.path()).unwrap();
        assert_eq!(opts.max_file_size, 250);
        assert_eq!(opts.exclude_extensions, vec!["md", "map"]);
    }

    #[test]
    fn test_from_file_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = AnalyzeOptions::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = AnalyzeOptions::from_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}

//! Analysis pipeline error types.

use std::fmt;
use std::io;

/// Analysis error codes.
pub mod codes {
    pub const ANALYZE_RESOLUTION_FAILED: &str = "ANALYZE_RESOLUTION_FAILED";
    pub const ANALYZE_RETRIEVAL_FAILED: &str = "ANALYZE_RETRIEVAL_FAILED";
    pub const ANALYZE_EXTRACTION_FAILED: &str = "ANALYZE_EXTRACTION_FAILED";
}

/// Pipeline stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Package metadata could not be resolved (not found, malformed, transport).
    Resolution,
    /// The tarball could not be downloaded.
    Retrieval,
    /// The tarball could not be decoded into file records.
    Extraction,
}

impl FailureKind {
    /// Stable code for this failure kind.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Resolution => codes::ANALYZE_RESOLUTION_FAILED,
            Self::Retrieval => codes::ANALYZE_RETRIEVAL_FAILED,
            Self::Extraction => codes::ANALYZE_EXTRACTION_FAILED,
        }
    }
}

/// Failure of a single package analysis.
#[derive(Debug)]
pub struct AnalyzeError {
    kind: FailureKind,
    message: String,
}

impl AnalyzeError {
    /// Create a new error of the given kind.
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Get the failure kind.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a resolution error.
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::new(FailureKind::Resolution, msg)
    }

    /// Create a package not found error.
    #[must_use]
    pub fn not_found(name: &str) -> Self {
        Self::resolution(format!("Package not found: {name}"))
    }

    /// Create a malformed metadata error.
    #[must_use]
    pub fn malformed_metadata(name: &str, detail: &str) -> Self {
        Self::resolution(format!("Malformed registry metadata for '{name}': {detail}"))
    }

    /// Create a retrieval error.
    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::new(FailureKind::Retrieval, msg)
    }

    /// Create an extraction error.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::new(FailureKind::Extraction, msg)
    }
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message)
    }
}

impl std::error::Error for AnalyzeError {}

impl From<io::Error> for AnalyzeError {
    fn from(e: io::Error) -> Self {
        Self::extraction(e.to_string())
    }
}

impl From<reqwest::Error> for AnalyzeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::resolution(format!("Request timed out: {e}"))
        } else if e.is_connect() {
            Self::resolution(format!("Connection failed: {e}"))
        } else if e.is_decode() {
            Self::resolution(format!("Invalid JSON: {e}"))
        } else {
            Self::resolution(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AnalyzeError {
    fn from(e: serde_json::Error) -> Self {
        Self::resolution(format!("Invalid JSON: {e}"))
    }
}

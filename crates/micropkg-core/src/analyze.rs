//! Package analysis pipeline.
//!
//! resolve latest version -> download tarball -> assemble files -> filter ->
//! measure each file -> classify.

use crate::analysis::{analyze_file, classify, filter_files, AnalysisReport};
use crate::config::AnalyzeOptions;
use crate::pkg::{
    collect_files, download_tarball, AnalyzeError, ArchiveDecoder, FileRecord, PackageIdentifier,
    RegistryClient, TarGzDecoder, MAX_TARBALL_SIZE,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Runs package analyses against one registry.
///
/// Holds no per-analysis state; clones share the HTTP connection pool and
/// can run concurrently with different options.
#[derive(Clone)]
pub struct Analyzer {
    registry: RegistryClient,
    decoder: Arc<dyn ArchiveDecoder>,
    max_tarball_bytes: u64,
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("registry", self.registry.base_url())
            .field("max_tarball_bytes", &self.max_tarball_bytes)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    /// Create an analyzer that decodes `.tgz` tarballs from `registry`.
    #[must_use]
    pub fn new(registry: RegistryClient) -> Self {
        Self {
            registry,
            decoder: Arc::new(TarGzDecoder),
            max_tarball_bytes: MAX_TARBALL_SIZE,
        }
    }

    /// Create an analyzer using the registry URL from environment or default.
    ///
    /// # Errors
    /// Returns an error if the registry client cannot be created.
    pub fn from_env() -> Result<Self, AnalyzeError> {
        RegistryClient::from_env().map(Self::new)
    }

    /// Replace the archive decoder.
    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn ArchiveDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Set the largest tarball that will be downloaded.
    #[must_use]
    pub fn with_max_tarball_bytes(mut self, max: u64) -> Self {
        self.max_tarball_bytes = max;
        self
    }

    /// Get the registry client.
    #[must_use]
    pub fn registry(&self) -> &RegistryClient {
        &self.registry
    }

    /// Download the tarball of `package` and assemble its regular files.
    ///
    /// # Errors
    /// Returns a retrieval error if the download fails, or an extraction
    /// error if the archive cannot be decoded.
    pub async fn retrieve_files(
        &self,
        package: &PackageIdentifier,
    ) -> Result<Vec<FileRecord>, AnalyzeError> {
        let url = self.registry.tarball_url(&package.name, &package.version)?;
        debug!(url = %url, "downloading tarball");

        let bytes = download_tarball(self.registry.http(), url.as_str(), self.max_tarball_bytes)
            .await?;
        debug!(bytes = bytes.len(), "tarball downloaded");

        let decoder = Arc::clone(&self.decoder);
        tokio::task::spawn_blocking(move || collect_files(decoder.as_ref(), &bytes))
            .await
            .map_err(|e| AnalyzeError::extraction(format!("Extraction task failed: {e}")))?
    }

    /// Analyze the latest release of `name`.
    ///
    /// # Errors
    /// Returns an error tagged with the failing stage. No partial report is
    /// produced.
    pub async fn analyze(
        &self,
        name: &str,
        options: &AnalyzeOptions,
    ) -> Result<AnalysisReport, AnalyzeError> {
        let package = self.registry.resolve_latest(name).await?;
        debug!(package = %package.name, version = %package.version, "resolved latest version");

        let files = self.retrieve_files(&package).await?;
        let extracted = files.len();
        let relevant = filter_files(files, options);
        debug!(extracted, relevant = relevant.len(), "filtered files");

        let metrics = relevant.iter().map(analyze_file).collect();
        let report = classify(metrics, options);
        debug!(
            package = %package.name,
            total_size = report.total_size,
            is_micropackage = report.is_micropackage,
            "classified"
        );

        Ok(report)
    }

    /// Analyze `name`, logging any failure and returning `None` in its place.
    pub async fn analyze_or_none(
        &self,
        name: &str,
        options: &AnalyzeOptions,
    ) -> Option<AnalysisReport> {
        match self.analyze(name, options).await {
            Ok(report) => Some(report),
            Err(e) => {
                error!(package = name, code = e.code(), "Error: {}", e.message());
                None
            }
        }
    }
}

/// Analyze the latest release of `name` against the registry from the
/// environment. Every failure is logged and collapsed into `None`.
pub async fn analyze_package(name: &str, options: &AnalyzeOptions) -> Option<AnalysisReport> {
    match Analyzer::from_env() {
        Ok(analyzer) => analyzer.analyze_or_none(name, options).await,
        Err(e) => {
            error!(package = name, code = e.code(), "Error: {}", e.message());
            None
        }
    }
}

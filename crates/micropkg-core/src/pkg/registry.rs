//! npm registry client.

use super::error::AnalyzeError;
use reqwest::Client;
use serde::Serialize;
use url::Url;

/// Default npm registry URL.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

/// Environment variable to override registry URL.
pub const REGISTRY_ENV: &str = "MICROPKG_NPM_REGISTRY";

/// A package name pinned to the version the registry resolved for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageIdentifier {
    pub name: String,
    pub version: String,
}

/// Registry client for fetching package metadata.
///
/// The client carries no request timeout; callers that need a deadline wrap
/// the whole analysis.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: Url,
    http: Client,
}

impl RegistryClient {
    /// Create a new registry client with the given base URL.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(base_url: &str) -> Result<Self, AnalyzeError> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&normalized).map_err(|e| {
            AnalyzeError::resolution(format!("Invalid registry URL '{base_url}': {e}"))
        })?;

        let http = Client::builder()
            .user_agent(concat!("micropkg/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AnalyzeError::resolution(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    /// Create a client using the registry URL from environment or default.
    ///
    /// # Errors
    /// Returns an error if the client cannot be created.
    pub fn from_env() -> Result<Self, AnalyzeError> {
        let url = std::env::var(REGISTRY_ENV).unwrap_or_else(|_| DEFAULT_REGISTRY.to_string());
        Self::new(&url)
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the HTTP client (for reuse in tarball downloads).
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Canonical tarball URL for `name@version`.
    ///
    /// # Errors
    /// Returns an error if the URL cannot be built.
    pub fn tarball_url(&self, name: &str, version: &str) -> Result<Url, AnalyzeError> {
        self.base_url
            .join(&format!("{name}/-/{name}-{version}.tgz"))
            .map_err(|e| {
                AnalyzeError::retrieval(format!(
                    "Failed to build tarball URL for '{name}@{version}': {e}"
                ))
            })
    }

    /// Fetch the packument (package metadata) for a package.
    ///
    /// # Errors
    /// Returns an error if the request fails or the package is not found.
    pub async fn fetch_packument(&self, name: &str) -> Result<serde_json::Value, AnalyzeError> {
        let url = self
            .base_url
            .join(name)
            .map_err(|e| AnalyzeError::resolution(format!("Failed to build URL for '{name}': {e}")))?;

        let response = self.http.get(url.as_str()).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AnalyzeError::not_found(name));
        }

        if !response.status().is_success() {
            return Err(AnalyzeError::resolution(format!(
                "Registry returned status {} for '{name}'",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        let json: serde_json::Value = serde_json::from_slice(&body)?;
        Ok(json)
    }

    /// Resolve `name` to its `latest` distribution tag.
    ///
    /// # Errors
    /// Returns a resolution error if the name is empty, the package does not
    /// exist, or the metadata has no usable `dist-tags.latest`.
    pub async fn resolve_latest(&self, name: &str) -> Result<PackageIdentifier, AnalyzeError> {
        if name.is_empty() {
            return Err(AnalyzeError::resolution("Package name must not be empty"));
        }

        let packument = self.fetch_packument(name).await?;
        let version = latest_version(name, &packument)?;

        Ok(PackageIdentifier {
            name: name.to_string(),
            version: version.to_string(),
        })
    }
}

/// Extract the latest version from a packument.
///
/// # Errors
/// Returns a resolution error if `dist-tags` is not an object or `latest` is
/// missing or not a string.
pub fn latest_version<'a>(
    name: &str,
    packument: &'a serde_json::Value,
) -> Result<&'a str, AnalyzeError> {
    let tags = packument
        .get("dist-tags")
        .and_then(serde_json::Value::as_object)
        .ok_or_else(|| AnalyzeError::malformed_metadata(name, "missing dist-tags object"))?;

    tags.get("latest")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| AnalyzeError::malformed_metadata(name, "dist-tags.latest is not a string"))
}

//! Catalog document sources and the fallback-to-default loader.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::ThemeCatalog;
use crate::error::CatalogError;

/// Where a catalog document comes from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable location used in diagnostics.
    fn location(&self) -> String;

    /// Retrieve the raw document text.
    async fn fetch(&self) -> Result<String, CatalogError>;
}

/// Catalog served over HTTP(S).
pub struct HttpCatalogSource {
    http: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    /// Build a source with an optional request timeout. Without one a stalled
    /// endpoint delays startup until the transport gives up.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder().user_agent("themesync/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<String, CatalogError> {
        let response = self
            .http
            .get(&self.url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// Catalog read from the local filesystem.
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String, CatalogError> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

/// Pick a source for a configured location: `http(s)://` URLs go over the
/// network, anything else is a path relative to `base_dir`.
pub fn source_for_location(
    location: &str,
    base_dir: &Path,
    timeout: Option<Duration>,
) -> Box<dyn CatalogSource> {
    let trimmed = location.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Box::new(HttpCatalogSource::new(trimmed, timeout))
    } else {
        Box::new(FileCatalogSource::new(base_dir.join(trimmed)))
    }
}

/// Resolve the theme catalog, falling back to the built-in default on any
/// failure. The fallback replaces the catalog wholesale and is only logged.
pub async fn load_theme_catalog(source: &dyn CatalogSource) -> ThemeCatalog {
    let result = match source.fetch().await {
        Ok(text) => ThemeCatalog::from_document(&text),
        Err(err) => Err(err),
    };
    match result {
        Ok(catalog) => {
            tracing::debug!(
                location = %source.location(),
                themes = catalog.len(),
                "loaded theme catalog"
            );
            catalog
        }
        Err(err) => {
            tracing::warn!(
                location = %source.location(),
                error = %err,
                "theme catalog unavailable; using built-in defaults"
            );
            ThemeCatalog::builtin()
        }
    }
}

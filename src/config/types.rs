//! Configuration data model.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::defaults::{
    default_audit_threshold, default_catalog_location, DEFAULT_AUDIT_PAGES,
    DEFAULT_AUDIT_TIMEOUT_SECS, DEFAULT_THEMES_CSS,
};

/// Top-level runtime configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub store: StoreConfig,
    pub audit: AuditConfig,
    pub check: CheckConfig,
}

/// Where the theme catalog document lives.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// `http(s)://` URL or path relative to the page directory.
    pub location: String,
    /// Request timeout for HTTP catalogs; unset means no client timeout.
    pub timeout_secs: Option<u64>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            location: default_catalog_location(),
            timeout_secs: None,
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(|secs| Duration::from_secs(secs.max(1)))
    }
}

/// Preference store settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// Explicit preference file; defaults under the config root.
    pub path: Option<String>,
}

/// Accessibility audit settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuditConfig {
    pub threshold: usize,
    pub timeout_secs: u64,
    pub pages: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            threshold: default_audit_threshold(),
            timeout_secs: DEFAULT_AUDIT_TIMEOUT_SECS,
            pages: DEFAULT_AUDIT_PAGES.iter().map(|page| page.to_string()).collect(),
        }
    }
}

impl AuditConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Consistency check locations, relative to the project root.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CheckConfig {
    pub themes_json: String,
    pub themes_css: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            themes_json: default_catalog_location(),
            themes_css: DEFAULT_THEMES_CSS.to_string(),
        }
    }
}

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Explicit `--config` path.
    Explicit(PathBuf),
    /// `./themesync.toml`.
    Local,
    /// Per-user config file.
    Global(PathBuf),
    /// No file found.
    BuiltInDefaults,
}

/// Config plus the source it was read from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: ConfigSource,
}

/// Result of `themesync init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobalConfigInitResult {
    Created { path: PathBuf },
    AlreadyInitialized { path: PathBuf },
    Overwritten { path: PathBuf, backup_path: PathBuf },
}

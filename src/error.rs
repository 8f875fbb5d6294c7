//! Error types shared across the crate.
//!
//! None of these escape the preference synchronizer's public operations; they
//! surface only from collaborators (catalog sources, stores) and from the
//! checker/audit commands, whose failures are fatal for their own process.

use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading or parsing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// CatalogError
// ---------------------------------------------------------------------------

/// Reasons a theme catalog document could not be used.
#[derive(Debug)]
pub enum CatalogError {
    /// Network / reqwest-level error.
    Http(reqwest::Error),
    /// Non-2xx status from the catalog endpoint.
    Status(u16),
    /// Local catalog file could not be read.
    Io(std::io::Error),
    /// Document is not valid JSON or lacks a `themes` array.
    Malformed(serde_json::Error),
    /// Document parsed but no entry carried a usable id.
    Empty,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Malformed(e) => write!(f, "malformed catalog: {e}"),
            Self::Empty => write!(f, "catalog contains no valid themes"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e)
    }
}

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Failures of the persistent preference store.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Serialize(e) => write!(f, "serialize: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Serialize(e)
    }
}

// ---------------------------------------------------------------------------
// CheckError
// ---------------------------------------------------------------------------

/// Fatal preconditions of the theme consistency check.
#[derive(Debug)]
pub enum CheckError {
    /// The central theme list is absent.
    MissingThemeList(PathBuf),
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The theme list parsed but yielded no ids.
    NoThemes(PathBuf),
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingThemeList(path) => {
                write!(f, "{} is missing; add the central theme list", path.display())
            }
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Json(e) => write!(f, "json: {e}"),
            Self::NoThemes(path) => write!(f, "no themes found in {}", path.display()),
        }
    }
}

impl std::error::Error for CheckError {}

impl From<std::io::Error> for CheckError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

// ---------------------------------------------------------------------------
// AuditError
// ---------------------------------------------------------------------------

/// Errors that abort an accessibility audit run.
#[derive(Debug)]
pub enum AuditError {
    Http(reqwest::Error),
    /// Non-2xx status while fetching a page.
    Status(String, u16),
    Io(PathBuf, std::io::Error),
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "http: {e}"),
            Self::Status(url, code) => write!(f, "{url}: status {code}"),
            Self::Io(path, e) => write!(f, "{}: {e}", path.display()),
        }
    }
}

impl std::error::Error for AuditError {}

impl From<reqwest::Error> for AuditError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

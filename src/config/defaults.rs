//! Default configuration constants.

use crate::a11y::DEFAULT_THRESHOLD;
use crate::catalog::DEFAULT_CATALOG_LOCATION;

/// Embedded default `themesync.toml` written by `themesync init`.
pub(super) const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../templates/themesync.toml");
/// Config file name, both local and global.
pub(super) const CONFIG_FILE_NAME: &str = "themesync.toml";
/// Application directory under the config root.
pub(super) const APP_DIR_NAME: &str = "themesync";
/// Preference store file name under the application directory.
pub(super) const STORE_FILE_NAME: &str = "preferences.toml";
/// Default timeout for audit page fetches.
pub(super) const DEFAULT_AUDIT_TIMEOUT_SECS: u64 = 30;
pub(super) const DEFAULT_THEMES_CSS: &str = "assets/themes.css";

pub(super) const DEFAULT_AUDIT_PAGES: &[&str] = &[
    "http://localhost:5000/GenresTool.html",
    "http://localhost:5000/SONGTEXTTOOL.html",
    "http://localhost:5000/index_templates_tool.html",
];

pub(super) fn default_catalog_location() -> String {
    DEFAULT_CATALOG_LOCATION.to_string()
}

pub(super) fn default_audit_threshold() -> usize {
    DEFAULT_THRESHOLD
}

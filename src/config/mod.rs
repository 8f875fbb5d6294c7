//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`THEMESYNC_CATALOG_URL`,
//!    `THEMESYNC_AUDIT_THRESHOLD`)
//! 2. TOML file specified via --config CLI flag
//! 3. ./themesync.toml in the current directory
//! 4. $XDG_CONFIG_HOME/themesync/themesync.toml (or
//!    ~/.config/themesync/themesync.toml)
//! 5. Built-in defaults

mod defaults;
mod env;
mod init;
mod loader;
mod sources;
mod types;

pub use env::{AUDIT_THRESHOLD_ENV, CATALOG_URL_ENV};
pub use init::{
    config_root_dir, default_global_config_path, default_store_path,
    initialize_config_at_path, initialize_default_global_config,
};
pub use loader::load_config;
pub use types::{
    AuditConfig, CatalogConfig, CheckConfig, Config, ConfigSource, GlobalConfigInitResult,
    LoadedConfig, StoreConfig,
};

//! CLI argument parsing via clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Theme and font-size preference tooling for static HTML tool pages.
#[derive(Debug, Parser)]
#[command(
    name = "themesync",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("THEMESYNC_BUILD_GIT_HASH"), ")")
)]
pub struct Args {
    /// Path to config file (default: ./themesync.toml or ~/.config/themesync/themesync.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the preference startup sequence against a page and report the result.
    Apply {
        /// HTML page to load.
        page: PathBuf,
        /// Theme to apply after startup.
        #[arg(long)]
        theme: Option<String>,
        /// Font size to apply after startup (small, base, large).
        #[arg(long = "font-size")]
        font_size: Option<String>,
        /// Advance the theme this many times after startup.
        #[arg(long, value_name = "N")]
        cycle: Option<usize>,
        /// Behave as if the system prefers a dark appearance.
        #[arg(long = "prefers-dark")]
        prefers_dark: bool,
        /// Keep preferences in memory instead of the preference file.
        #[arg(long, conflicts_with = "store")]
        ephemeral: bool,
        /// Preference file to use instead of the configured one.
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Verify theme choosers in every page match the central theme list.
    Check {
        /// Project root holding the HTML pages (default: current directory).
        root: Option<PathBuf>,
    },
    /// Scan pages for accessibility findings and enforce the threshold.
    Audit {
        /// Page URLs or paths (default: configured pages).
        pages: Vec<String>,
        /// Maximum total findings tolerated.
        #[arg(long)]
        threshold: Option<usize>,
    },
    /// Write the default config to ~/.config/themesync/themesync.toml.
    Init {
        /// Back up and overwrite an existing config.
        #[arg(long)]
        force: bool,
    },
}

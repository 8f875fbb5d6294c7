//! Theme consistency check across the theme list, stylesheet, and pages.
//!
//! The central `themes.json` is the source of truth. Every non-default theme
//! needs a `data-theme="<id>"` rule in the stylesheet, and every theme chooser
//! in every top-level HTML page must offer exactly the listed ids.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::LIGHT_THEME;
use crate::error::CheckError;
use crate::sync::THEME_SELECT_MARKER;

/// Input locations for a check run.
#[derive(Debug, Clone)]
pub struct CheckPaths {
    /// Directory scanned (non-recursively) for `*.html`.
    pub root: PathBuf,
    pub themes_json: PathBuf,
    pub themes_css: PathBuf,
}

impl CheckPaths {
    /// Resolve the standard layout (`config/themes.json`,
    /// `assets/themes.css`) under `root`, honoring relative overrides.
    pub fn under(root: &Path, themes_json: &str, themes_css: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            themes_json: root.join(themes_json),
            themes_css: root.join(themes_css),
        }
    }
}

/// One chooser whose options differ from the theme list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooserMismatch {
    /// Listed ids the chooser does not offer.
    pub missing: Vec<String>,
    /// Offered values the list does not know.
    pub unknown: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// No theme chooser on the page.
    Skipped,
    Consistent,
    Mismatched(Vec<ChooserMismatch>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file: String,
    pub status: FileStatus,
}

/// Result of a check run that got past its fatal preconditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub themes: Vec<String>,
    /// Themes lacking a stylesheet rule. Non-empty means the page scan was
    /// not performed.
    pub missing_in_css: Vec<String>,
    pub files: Vec<FileOutcome>,
}

impl CheckReport {
    pub fn is_consistent(&self) -> bool {
        self.missing_in_css.is_empty()
            && self
                .files
                .iter()
                .all(|outcome| !matches!(outcome.status, FileStatus::Mismatched(_)))
    }
}

#[derive(Deserialize)]
struct ThemeList {
    #[serde(default)]
    themes: Vec<Value>,
}

/// Read theme ids from a `themes.json` document.
pub fn theme_ids_from_document(text: &str) -> Result<Vec<String>, serde_json::Error> {
    let list: ThemeList = serde_json::from_str(text)?;
    let mut ids: Vec<String> = Vec::new();
    for entry in &list.themes {
        let Some(id) = entry.get("id").and_then(Value::as_str).map(str::trim) else {
            continue;
        };
        if !id.is_empty() && !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

/// Themes without a `data-theme="<id>"` rule. `light` lives in `:root`.
pub fn themes_missing_in_css(themes: &[String], css: &str) -> Vec<String> {
    themes
        .iter()
        .filter(|theme| theme.as_str() != LIGHT_THEME)
        .filter(|theme| !css.contains(&format!("data-theme=\"{theme}\"")))
        .cloned()
        .collect()
}

/// Compare every theme chooser in `html` with `themes`. `None` when the page
/// has no chooser.
pub fn chooser_mismatches(html: &str, themes: &[String]) -> Option<Vec<ChooserMismatch>> {
    let document = Html::parse_document(html);
    let chooser_selector =
        Selector::parse(&format!("[{THEME_SELECT_MARKER}]")).expect("valid chooser selector");
    let option_selector = Selector::parse("option").expect("valid option selector");

    let mut found = false;
    let mut mismatches = Vec::new();
    for chooser in document.select(&chooser_selector) {
        found = true;
        let offered: BTreeSet<String> = chooser
            .select(&option_selector)
            .filter_map(|option| option.value().attr("value"))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();

        let missing: Vec<String> = themes
            .iter()
            .filter(|theme| !offered.contains(theme.as_str()))
            .cloned()
            .collect();
        let unknown: Vec<String> = offered
            .iter()
            .filter(|value| !themes.contains(value))
            .cloned()
            .collect();
        if !missing.is_empty() || !unknown.is_empty() {
            mismatches.push(ChooserMismatch { missing, unknown });
        }
    }
    found.then_some(mismatches)
}

/// Run the full check.
pub fn run_check(paths: &CheckPaths) -> Result<CheckReport, CheckError> {
    if !paths.themes_json.exists() {
        return Err(CheckError::MissingThemeList(paths.themes_json.clone()));
    }
    let themes = theme_ids_from_document(&std::fs::read_to_string(&paths.themes_json)?)?;
    if themes.is_empty() {
        return Err(CheckError::NoThemes(paths.themes_json.clone()));
    }

    let css = std::fs::read_to_string(&paths.themes_css)?;
    let missing_in_css = themes_missing_in_css(&themes, &css);
    if !missing_in_css.is_empty() {
        return Ok(CheckReport {
            themes,
            missing_in_css,
            files: Vec::new(),
        });
    }

    let mut html_files: Vec<PathBuf> = std::fs::read_dir(&paths.root)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "html"))
        .collect();
    html_files.sort();

    let mut files = Vec::new();
    for path in html_files {
        let html = std::fs::read_to_string(&path)?;
        let file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let status = match chooser_mismatches(&html, &themes) {
            None => FileStatus::Skipped,
            Some(found) if found.is_empty() => FileStatus::Consistent,
            Some(found) => FileStatus::Mismatched(found),
        };
        tracing::debug!(file = %file, ?status, "checked page");
        files.push(FileOutcome { file, status });
    }

    Ok(CheckReport {
        themes,
        missing_in_css,
        files,
    })
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// Report lines for one file; consistent files produce none.
pub fn describe_outcome(outcome: &FileOutcome) -> Vec<String> {
    match &outcome.status {
        FileStatus::Skipped => vec![format!(
            "[{}] has no theme chooser ({THEME_SELECT_MARKER}); skipped.",
            outcome.file
        )],
        FileStatus::Consistent => Vec::new(),
        FileStatus::Mismatched(found) => found
            .iter()
            .map(|mismatch| {
                format!(
                    "[{}] theme chooser differs. Missing: {} | Unknown: {}",
                    outcome.file,
                    list_or_dash(&mismatch.missing),
                    list_or_dash(&mismatch.unknown)
                )
            })
            .collect(),
    }
}

//! Theme catalog: the canonical ordered list of themes and their labels.
//!
//! A catalog is resolved once at startup, either from an external document or
//! from the built-in default, and is immutable afterward. Every theme id the
//! rest of the crate handles is validated against it.

use serde::Deserialize;
use serde_json::Value;

use crate::error::CatalogError;

mod source;

pub use source::{
    load_theme_catalog, source_for_location, CatalogSource, FileCatalogSource, HttpCatalogSource,
};

/// Relative location of the external catalog document.
pub const DEFAULT_CATALOG_LOCATION: &str = "config/themes.json";
/// Preferred fallback theme id.
pub const LIGHT_THEME: &str = "light";
/// Theme chosen when the system signals a dark appearance preference.
pub const DARK_THEME: &str = "dark";

const BUILTIN_THEMES: &[(&str, &str)] = &[
    ("light", "Light"),
    ("dark", "Dark"),
    ("contrast", "Contrast"),
    ("solar", "Solar"),
];

/// One selectable theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeEntry {
    pub id: String,
    /// Human-readable display text.
    pub label: String,
}

impl ThemeEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Ordered, non-empty set of themes with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeCatalog {
    entries: Vec<ThemeEntry>,
}

impl Default for ThemeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ThemeCatalog {
    /// The catalog used whenever no external document is usable.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_THEMES
                .iter()
                .map(|(id, label)| ThemeEntry::new(*id, *label))
                .collect(),
        }
    }

    /// Build a catalog from entries, trimming ids and dropping blank or
    /// duplicate ones. Returns `None` when nothing survives.
    pub fn from_entries(entries: impl IntoIterator<Item = ThemeEntry>) -> Option<Self> {
        let mut kept: Vec<ThemeEntry> = Vec::new();
        for entry in entries {
            let id = entry.id.trim();
            if id.is_empty() || kept.iter().any(|existing| existing.id == id) {
                continue;
            }
            let label = entry.label.trim();
            let label = if label.is_empty() { id } else { label };
            kept.push(ThemeEntry::new(id, label));
        }
        (!kept.is_empty()).then_some(Self { entries: kept })
    }

    /// Parse a catalog document of shape `{ "themes": [{ "id", "label"? }] }`.
    ///
    /// Entries that are not objects or whose id is not a non-blank string are
    /// skipped; a document where nothing survives is [`CatalogError::Empty`].
    pub fn from_document(text: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(text)?;
        let entries = document.themes.iter().filter_map(|raw| {
            let id = raw.get("id")?.as_str()?;
            let label = raw.get("label").and_then(Value::as_str).unwrap_or(id);
            Some(ThemeEntry::new(id, label))
        });
        Self::from_entries(entries).ok_or(CatalogError::Empty)
    }

    pub fn entries(&self) -> &[ThemeEntry] {
        &self.entries
    }

    /// Theme ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Display label for `id`, or the id itself when unknown.
    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.label.as_str())
            .unwrap_or(id)
    }

    /// `light` when present, otherwise the first entry.
    pub fn default_id(&self) -> &str {
        if self.contains(LIGHT_THEME) {
            LIGHT_THEME
        } else {
            &self.entries[0].id
        }
    }

    /// Map any requested id onto a valid one.
    pub fn coerce<'a>(&'a self, requested: &str) -> &'a str {
        match self.position(requested) {
            Some(idx) => &self.entries[idx].id,
            None => self.default_id(),
        }
    }

    /// Next theme in catalog order with wraparound. An unknown `current`
    /// advances to the first entry.
    pub fn next_after(&self, current: &str) -> &str {
        let next = match self.position(current) {
            Some(idx) => (idx + 1) % self.entries.len(),
            None => 0,
        };
        &self.entries[next].id
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    themes: Vec<Value>,
}

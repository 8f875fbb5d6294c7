//! End-to-end startup scenarios against parsed pages and on-disk fixtures.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use themesync::a11y::{run_audit, HttpPageFetcher, PageRef, StaticScanner};
use themesync::catalog::{FileCatalogSource, HttpCatalogSource};
use themesync::check::{run_check, CheckPaths, FileStatus};
use themesync::page::Page;
use themesync::prefs::{FileStore, MemoryStore, PreferenceStore, FONT_KEY, THEME_KEY};
use themesync::sync::{
    start, ControlEvent, FixedSignal, Surface, LIVE_REGION_ID, THEME_ATTR,
};

static COUNTER: AtomicU64 = AtomicU64::new(0);

struct Fixture {
    root: PathBuf,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!(
            "themesync-it-{name}-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&root).expect("fixture dir");
        Self { root }
    }

    fn write(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("fixture parent");
        }
        fs::write(&path, text).expect("fixture file");
        path
    }

    fn path(&self) -> &Path {
        &self.root
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

const TOOL_PAGE: &str = r#"<!doctype html>
<html lang="en"><head><title>Genres</title></head>
<body>
  <header><h1>Genres</h1></header>
  <main>
    <select id="theme" data-theme-select></select>
    <button id="toggle" data-theme-toggle>Theme</button>
    <select id="font" data-font-select>
      <option value="small">Small</option>
      <option value="base">Base</option>
      <option value="large">Large</option>
    </select>
    <button id="bigger" data-font-button="large">A+</button>
  </main>
</body></html>"#;

const THEMES_JSON: &str =
    r#"{"themes":[{"id":"light","label":"Light"},{"id":"dark","label":"Dark"},{"id":"sepia","label":"Sepia"}]}"#;

fn no_signal() -> Box<FixedSignal> {
    Box::new(FixedSignal(None))
}

#[tokio::test]
async fn file_catalog_drives_chooser_options_and_stored_theme() {
    let fixture = Fixture::new("catalog");
    let catalog_path = fixture.write("config/themes.json", THEMES_JSON);
    let source = FileCatalogSource::new(catalog_path);
    let store = MemoryStore::new().with(THEME_KEY, "sepia");

    let (sync, state) = start(&source, Page::parse(TOOL_PAGE), store, no_signal()).await;

    assert_eq!(state.theme, "sepia");
    assert!(state.audit.missing_landmarks.is_empty());
    let page = sync.surface();
    let chooser = page.element_by_id("theme").expect("chooser");
    assert_eq!(page.option_values(chooser), vec!["light", "dark", "sepia"]);
    assert_eq!(page.value(chooser).as_deref(), Some("sepia"));
    assert_eq!(page.root_attr(THEME_ATTR).as_deref(), Some("sepia"));
    assert_eq!(page.body_attr(THEME_ATTR).as_deref(), Some("sepia"));
}

#[tokio::test]
async fn unreachable_catalog_falls_back_to_builtin_list() {
    let source = HttpCatalogSource::new("http://127.0.0.1:9/config/themes.json", None);

    let (sync, state) = start(&source, Page::parse(TOOL_PAGE), MemoryStore::new(), no_signal()).await;

    assert_eq!(
        sync.catalog().ids().collect::<Vec<_>>(),
        vec!["light", "dark", "contrast", "solar"]
    );
    assert_eq!(state.theme, "light");
}

#[tokio::test]
async fn system_dark_preference_applies_without_stored_theme() {
    let fixture = Fixture::new("system-dark");
    let source = FileCatalogSource::new(fixture.write("themes.json", THEMES_JSON));

    let (_sync, state) = start(
        &source,
        Page::parse(TOOL_PAGE),
        MemoryStore::new(),
        Box::new(FixedSignal(Some(true))),
    )
    .await;

    assert_eq!(state.theme, "dark");
}

#[tokio::test]
async fn unknown_stored_theme_coerces_to_light() {
    let fixture = Fixture::new("neon");
    let source = FileCatalogSource::new(fixture.write("themes.json", THEMES_JSON));
    let store = MemoryStore::new().with(THEME_KEY, "neon");

    let (sync, state) = start(&source, Page::parse(TOOL_PAGE), store, no_signal()).await;

    assert_eq!(state.theme, "light");
    assert_eq!(sync.store().get(THEME_KEY).as_deref(), Some("light"));
}

#[tokio::test]
async fn missing_main_is_announced() {
    let source = FileCatalogSource::new("/nonexistent/themes.json");
    let page = Page::parse("<html><body><header>Only</header></body></html>");

    let (sync, state) = start(&source, page, MemoryStore::new(), no_signal()).await;

    assert_eq!(state.audit.missing_landmarks, vec!["main"]);
    let announcement = sync
        .surface()
        .text_by_id(LIVE_REGION_ID)
        .expect("live region");
    assert!(announcement.contains("main"), "got: {announcement}");
}

#[tokio::test]
async fn toggle_clicks_cycle_through_catalog_and_back() {
    let fixture = Fixture::new("cycle");
    let source = FileCatalogSource::new(fixture.write("themes.json", THEMES_JSON));

    let (mut sync, state) = start(&source, Page::parse(TOOL_PAGE), MemoryStore::new(), no_signal()).await;
    let toggle = sync.surface().element_by_id("toggle").expect("toggle");

    let mut seen = Vec::new();
    for _ in 0..sync.catalog().len() {
        assert_eq!(sync.dispatch(ControlEvent::Clicked { node: toggle }), 1);
        seen.push(sync.current_theme().expect("theme marker"));
    }

    assert_eq!(seen, vec!["dark", "sepia", "light"]);
    assert_eq!(sync.current_theme().as_deref(), Some(state.theme.as_str()));
    let chooser = sync.surface().element_by_id("theme").expect("chooser");
    assert_eq!(sync.surface().value(chooser).as_deref(), Some("light"));
}

#[tokio::test]
async fn preferences_persist_across_page_loads() {
    let fixture = Fixture::new("persist");
    let source = FileCatalogSource::new(fixture.write("themes.json", THEMES_JSON));
    let store_path = fixture.path().join("prefs/preferences.toml");

    let store = FileStore::open(&store_path).expect("open store");
    let (mut sync, _) = start(&source, Page::parse(TOOL_PAGE), store, no_signal()).await;
    let bigger = sync.surface().element_by_id("bigger").expect("font button");
    sync.dispatch(ControlEvent::Clicked { node: bigger });
    sync.apply_theme("dark");
    let chooser = sync.surface().element_by_id("theme").expect("chooser");
    assert_eq!(sync.surface().value(chooser).as_deref(), Some("dark"));
    drop(sync);

    let store = FileStore::open(&store_path).expect("reopen store");
    assert_eq!(store.get(FONT_KEY).as_deref(), Some("large"));
    let (sync, state) = start(&source, Page::parse(TOOL_PAGE), store, no_signal()).await;
    assert_eq!(state.theme, "dark");
    let font = sync.surface().element_by_id("font").expect("font chooser");
    assert_eq!(sync.surface().value(font).as_deref(), Some("large"));
}

#[test]
fn consistency_check_over_project_tree() {
    let fixture = Fixture::new("check");
    fixture.write("config/themes.json", THEMES_JSON);
    fixture.write(
        "assets/themes.css",
        "[data-theme=\"dark\"] { --bg: #111; }\n[data-theme=\"sepia\"] { --bg: #f4ecd8; }\n",
    );
    fixture.write(
        "Good.html",
        r#"<select data-theme-select><option value="light"></option><option value="dark"></option><option value="sepia"></option></select>"#,
    );
    fixture.write(
        "Stale.html",
        r#"<select data-theme-select><option value="light"></option><option value="neon"></option></select>"#,
    );
    fixture.write("Plain.html", "<p>no chooser</p>");

    let paths = CheckPaths::under(fixture.path(), "config/themes.json", "assets/themes.css");
    let report = run_check(&paths).expect("check runs");

    assert!(!report.is_consistent());
    let statuses: Vec<(&str, &FileStatus)> = report
        .files
        .iter()
        .map(|outcome| (outcome.file.as_str(), &outcome.status))
        .collect();
    assert_eq!(statuses[0], ("Good.html", &FileStatus::Consistent));
    assert_eq!(statuses[1], ("Plain.html", &FileStatus::Skipped));
    assert!(matches!(statuses[2], ("Stale.html", FileStatus::Mismatched(_))));
}

#[tokio::test]
async fn audit_reads_local_pages_and_applies_threshold() {
    let fixture = Fixture::new("audit");
    let clean = fixture.write("Clean.html", TOOL_PAGE);
    let broken = fixture.write("Broken.html", "<html><body><img src=\"x.png\"></body></html>");
    let pages = vec![
        PageRef::Path(clean),
        PageRef::parse(&broken.to_string_lossy()),
    ];

    let report = run_audit(&pages, &HttpPageFetcher::default(), &StaticScanner, 2)
        .await
        .expect("audit runs");

    assert_eq!(report.pages[1].findings.len(), 3);
    assert!(report.total() >= 3);
    assert!(report.exceeds_threshold());
}

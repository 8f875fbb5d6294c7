//! Preference synchronizer.
//!
//! Owns the resolved theme catalog and keeps the presentation surface, the
//! persistent store, and every bound control consistent with one current
//! theme and font size. Every public operation is total: invalid input is
//! coerced to a default and collaborator failures are logged, never returned.
//!
//! Construction requires a [`ThemeCatalog`], so nothing that depends on the
//! catalog can run before it is resolved. [`start`] is the full startup
//! pipeline.

use crate::catalog::{load_theme_catalog, CatalogSource, ThemeCatalog, DARK_THEME};
use crate::prefs::{FontSize, PreferenceStore, FONT_KEY, THEME_KEY};

mod audit;
mod surface;

pub use audit::{validate_filled, AuditSummary, CORE_LANDMARKS};
pub use surface::{
    ChooserTarget, FixedSignal, FormField, NodeId, PreferenceControl, Surface, SystemSignal,
    ToggleAction, FONT_BUTTON_MARKER, FONT_SELECT_MARKER, THEME_SELECT_MARKER,
    THEME_TOGGLE_MARKER,
};

/// Attribute carrying the active theme on the root and body.
pub const THEME_ATTR: &str = "data-theme";
/// Attribute carrying the active font size on the body.
pub const FONT_ATTR: &str = "data-font-size";
/// DOM id of the shared live region.
pub const LIVE_REGION_ID: &str = "global-aria-live";

/// User interaction with a bound control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
    /// A chooser's selection changed to `value`.
    Changed { node: NodeId, value: String },
    Clicked { node: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Change,
    Click,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Handler {
    ApplyTheme,
    CycleTheme,
    ApplyFontSize,
    FontButton(String),
}

#[derive(Debug, Clone)]
struct Binding {
    node: NodeId,
    trigger: Trigger,
    handler: Handler,
}

/// Effective preferences after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupState {
    pub theme: String,
    pub font_size: FontSize,
    pub audit: AuditSummary,
    /// Whether the page carries any `data-help` element.
    pub help_tips: bool,
}

/// Keeps theme and font-size state synchronized across a surface.
pub struct Synchronizer<S, P> {
    catalog: ThemeCatalog,
    surface: S,
    store: P,
    signal: Box<dyn SystemSignal>,
    bindings: Vec<Binding>,
    live_region: Option<NodeId>,
}

/// Run the startup pipeline: resolve the catalog, then initialize.
pub async fn start<S, P>(
    source: &dyn CatalogSource,
    surface: S,
    store: P,
    signal: Box<dyn SystemSignal>,
) -> (Synchronizer<S, P>, StartupState)
where
    S: Surface,
    P: PreferenceStore,
{
    let catalog = load_theme_catalog(source).await;
    let mut sync = Synchronizer::new(catalog, surface, store, signal);
    let state = sync.initialize();
    (sync, state)
}

impl<S, P> Synchronizer<S, P>
where
    S: Surface,
    P: PreferenceStore,
{
    pub fn new(catalog: ThemeCatalog, surface: S, store: P, signal: Box<dyn SystemSignal>) -> Self {
        Self {
            catalog,
            surface,
            store,
            signal,
            bindings: Vec::new(),
            live_region: None,
        }
    }

    /// Post-catalog startup steps, in order: render theme options, bind
    /// every control, apply the initial theme, apply the stored font size,
    /// audit, attach help tips.
    pub fn initialize(&mut self) -> StartupState {
        self.render_theme_options();
        self.bind_controls();

        let preferred = self.resolve_preferred_theme();
        let theme = self.apply_theme(&preferred);
        let stored_font = self
            .store
            .get(FONT_KEY)
            .unwrap_or_else(|| FontSize::Base.as_str().to_string());
        let font_size = self.apply_font_size(&stored_font);

        let audit = self.startup_audit();
        let help_tips = self.attach_help_tips();
        StartupState {
            theme,
            font_size,
            audit,
            help_tips,
        }
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn into_parts(self) -> (S, P) {
        (self.surface, self.store)
    }

    /// Theme currently marked on the root scope, if any.
    pub fn current_theme(&self) -> Option<String> {
        self.surface
            .root_attr(THEME_ATTR)
            .filter(|value| !value.is_empty())
    }

    /// Stored theme when valid, else the system preference, else the default.
    pub fn resolve_preferred_theme(&self) -> String {
        if let Some(stored) = self.store.get(THEME_KEY) {
            if self.catalog.contains(&stored) {
                return stored;
            }
        }
        if self.signal.prefers_dark() == Some(true) && self.catalog.contains(DARK_THEME) {
            return DARK_THEME.to_string();
        }
        self.catalog.default_id().to_string()
    }

    /// Apply a theme, coercing unknown ids to the catalog default, and bring
    /// every theme control in line with it. Returns the effective id.
    pub fn apply_theme(&mut self, requested: &str) -> String {
        let effective = self.catalog.coerce(requested).to_string();
        self.surface.set_root_attr(THEME_ATTR, &effective);
        self.surface.set_body_attr(THEME_ATTR, &effective);
        self.persist(THEME_KEY, &effective);
        tracing::debug!(requested, theme = %effective, "applied theme");
        self.announce(&format!("Theme set to {effective}"));
        self.sync_theme_controls(&effective);
        effective
    }

    /// Apply a font size, coercing unknown ids to `base`, and sync font
    /// choosers.
    pub fn apply_font_size(&mut self, requested: &str) -> FontSize {
        let effective = FontSize::coerce(requested);
        self.surface.set_body_attr(FONT_ATTR, effective.as_str());
        self.persist(FONT_KEY, effective.as_str());
        tracing::debug!(requested, font_size = %effective, "applied font size");
        self.announce(&format!("Font size set to {effective}"));
        self.sync_font_controls(effective);
        effective
    }

    /// Advance to the next theme in catalog order.
    pub fn cycle_theme(&mut self) -> String {
        let current = self
            .current_theme()
            .unwrap_or_else(|| self.resolve_preferred_theme());
        let next = self.catalog.next_after(&current).to_string();
        self.apply_theme(&next)
    }

    /// Replace every theme chooser's options with the catalog entries.
    pub fn render_theme_options(&mut self) {
        let options: Vec<(&str, &str)> = self
            .catalog
            .entries()
            .iter()
            .map(|entry| (entry.id.as_str(), entry.label.as_str()))
            .collect();
        for control in self.surface.discover_controls() {
            if let PreferenceControl::Chooser {
                node,
                target: ChooserTarget::Theme,
            } = control
            {
                self.surface.set_options(node, &options);
            }
        }
    }

    /// Make every theme chooser and toggle reflect `theme`.
    pub fn sync_theme_controls(&mut self, theme: &str) {
        let label = self.catalog.label(theme).to_string();
        for control in self.surface.discover_controls() {
            match control {
                PreferenceControl::Chooser {
                    node,
                    target: ChooserTarget::Theme,
                } => {
                    if self.surface.value(node).as_deref() != Some(theme) {
                        self.surface.set_value(node, theme);
                    }
                    self.surface.set_attr(
                        node,
                        "aria-label",
                        &format!("Choose color scheme (current: {label})"),
                    );
                }
                PreferenceControl::Toggle {
                    node,
                    action: ToggleAction::CycleTheme,
                } => {
                    self.surface.set_attr(node, "aria-pressed", "false");
                    self.surface.set_attr(
                        node,
                        "aria-label",
                        &format!("Switch theme (current: {label})"),
                    );
                }
                _ => {}
            }
        }
    }

    /// Make every font chooser reflect `size`.
    pub fn sync_font_controls(&mut self, size: FontSize) {
        for control in self.surface.discover_controls() {
            if let PreferenceControl::Chooser {
                node,
                target: ChooserTarget::FontSize,
            } = control
            {
                if self.surface.value(node).as_deref() != Some(size.as_str()) {
                    self.surface.set_value(node, size.as_str());
                }
            }
        }
    }

    /// Bind every discovered control. Binding twice registers handlers twice;
    /// call once per page.
    pub fn bind_controls(&mut self) {
        self.bind_theme_controls();
        self.bind_font_controls();
    }

    /// Bind theme choosers (on change) and theme toggles (on click).
    pub fn bind_theme_controls(&mut self) {
        for control in self.surface.discover_controls() {
            match control {
                PreferenceControl::Chooser {
                    node,
                    target: ChooserTarget::Theme,
                } => self.bind(node, Trigger::Change, Handler::ApplyTheme),
                PreferenceControl::Toggle {
                    node,
                    action: ToggleAction::CycleTheme,
                } => {
                    self.surface.set_attr(node, "aria-pressed", "false");
                    self.bind(node, Trigger::Click, Handler::CycleTheme);
                }
                _ => {}
            }
        }
    }

    /// Bind font choosers (on change) and font buttons (on click).
    pub fn bind_font_controls(&mut self) {
        for control in self.surface.discover_controls() {
            match control {
                PreferenceControl::Chooser {
                    node,
                    target: ChooserTarget::FontSize,
                } => self.bind(node, Trigger::Change, Handler::ApplyFontSize),
                PreferenceControl::Toggle {
                    node,
                    action: ToggleAction::SetFontSize(size),
                } => self.bind(node, Trigger::Click, Handler::FontButton(size)),
                _ => {}
            }
        }
    }

    fn bind(&mut self, node: NodeId, trigger: Trigger, handler: Handler) {
        tracing::debug!(node = node.0, ?trigger, ?handler, "bound control");
        self.bindings.push(Binding {
            node,
            trigger,
            handler,
        });
    }

    /// Deliver a control event to its bound handlers. Returns how many
    /// handlers ran.
    pub fn dispatch(&mut self, event: ControlEvent) -> usize {
        let (node, trigger, value) = match event {
            ControlEvent::Changed { node, value } => {
                self.surface.set_value(node, &value);
                (node, Trigger::Change, value)
            }
            ControlEvent::Clicked { node } => (node, Trigger::Click, String::new()),
        };
        let handlers: Vec<Handler> = self
            .bindings
            .iter()
            .filter(|binding| binding.node == node && binding.trigger == trigger)
            .map(|binding| binding.handler.clone())
            .collect();

        for handler in &handlers {
            match handler {
                Handler::ApplyTheme => {
                    self.apply_theme(&value);
                }
                Handler::CycleTheme => {
                    self.cycle_theme();
                }
                Handler::ApplyFontSize => {
                    self.apply_font_size(&value);
                }
                Handler::FontButton(requested) => {
                    self.apply_font_size(requested);
                }
            }
        }
        handlers.len()
    }

    /// Write `message` to the shared live region, creating it on first use.
    pub fn announce(&mut self, message: &str) {
        let node = self.ensure_live_region();
        self.surface.set_text(node, message);
    }

    fn ensure_live_region(&mut self) -> NodeId {
        if let Some(node) = self.live_region {
            return node;
        }
        let node = match self.surface.element_by_id(LIVE_REGION_ID) {
            Some(existing) => existing,
            None => {
                let node = self.surface.append_element(None, "div");
                self.surface.set_attr(node, "id", LIVE_REGION_ID);
                self.surface.set_attr(node, "class", "hidden");
                self.surface.set_attr(node, "aria-live", "polite");
                self.surface.set_attr(node, "aria-atomic", "true");
                node
            }
        };
        self.live_region = Some(node);
        node
    }

    fn persist(&mut self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            tracing::warn!(key, value, error = %err, "failed to persist preference");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ThemeEntry;
    use crate::page::Page;
    use crate::prefs::MemoryStore;

    const TOOL_PAGE: &str = r#"<html><body>
<header>Tool</header>
<main>
  <select id="theme-a" data-theme-select></select>
  <select id="theme-b" data-theme-select></select>
  <button id="toggle" data-theme-toggle>Theme</button>
  <select id="font" data-font-select>
    <option value="small">S</option><option value="base">M</option><option value="large">L</option>
  </select>
  <select id="font-b" data-font-select>
    <option value="small">S</option><option value="base">M</option><option value="large">L</option>
  </select>
  <button id="bigger" data-font-button="large">A+</button>
  <button id="bogus" data-font-button="huge">A++</button>
</main>
</body></html>"#;

    fn three_themes() -> ThemeCatalog {
        ThemeCatalog::from_entries([
            ThemeEntry::new("light", "Light"),
            ThemeEntry::new("dark", "Dark"),
            ThemeEntry::new("contrast", "Contrast"),
        ])
        .expect("non-empty")
    }

    fn synchronizer(
        catalog: ThemeCatalog,
        store: MemoryStore,
        dark: Option<bool>,
    ) -> Synchronizer<Page, MemoryStore> {
        Synchronizer::new(
            catalog,
            Page::parse(TOOL_PAGE),
            store,
            Box::new(FixedSignal(dark)),
        )
    }

    fn node(sync: &Synchronizer<Page, MemoryStore>, id: &str) -> NodeId {
        sync.surface().element_by_id(id).expect("element present")
    }

    #[test]
    fn unknown_theme_coerces_and_persists_default() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        assert_eq!(sync.apply_theme("neon"), "light");
        assert_eq!(sync.store().get(THEME_KEY).as_deref(), Some("light"));
        assert_eq!(sync.surface().root_attr(THEME_ATTR).as_deref(), Some("light"));
        assert_eq!(sync.surface().body_attr(THEME_ATTR).as_deref(), Some("light"));
    }

    #[test]
    fn unknown_font_size_coerces_to_base() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        assert_eq!(sync.apply_font_size("gigantic"), FontSize::Base);
        assert_eq!(sync.store().get(FONT_KEY).as_deref(), Some("base"));
        assert_eq!(sync.surface().body_attr(FONT_ATTR).as_deref(), Some("base"));
    }

    #[test]
    fn stored_valid_theme_wins() {
        let store = MemoryStore::new().with(THEME_KEY, "dark");
        let sync = synchronizer(three_themes(), store, Some(false));
        assert_eq!(sync.resolve_preferred_theme(), "dark");
    }

    #[test]
    fn system_dark_signal_used_without_stored_theme() {
        let sync = synchronizer(three_themes(), MemoryStore::new(), Some(true));
        assert_eq!(sync.resolve_preferred_theme(), "dark");
        let sync = synchronizer(three_themes(), MemoryStore::new(), None);
        assert_eq!(sync.resolve_preferred_theme(), "light");
    }

    #[test]
    fn invalid_stored_theme_is_ignored() {
        let store = MemoryStore::new().with(THEME_KEY, "neon");
        let mut sync = synchronizer(three_themes(), store, None);
        assert_eq!(sync.resolve_preferred_theme(), "light");
        assert_eq!(sync.apply_theme("neon"), "light");
    }

    #[test]
    fn cycling_catalog_length_times_returns_to_start() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        sync.initialize();
        let start = sync.current_theme().expect("theme applied");
        let visited: Vec<String> = (0..sync.catalog().len()).map(|_| sync.cycle_theme()).collect();
        assert_eq!(visited, vec!["dark", "contrast", "light"]);
        assert_eq!(sync.current_theme().as_deref(), Some(start.as_str()));
    }

    #[test]
    fn cycle_without_marker_starts_from_preference() {
        let store = MemoryStore::new().with(THEME_KEY, "contrast");
        let mut sync = synchronizer(three_themes(), store, None);
        assert_eq!(sync.cycle_theme(), "light");
    }

    #[test]
    fn apply_theme_updates_every_theme_control() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        sync.initialize();
        assert_eq!(sync.apply_theme("contrast"), "contrast");

        for id in ["theme-a", "theme-b"] {
            let chooser = node(&sync, id);
            assert_eq!(sync.surface().value(chooser).as_deref(), Some("contrast"));
            assert_eq!(
                sync.surface().attr(chooser, "aria-label").as_deref(),
                Some("Choose color scheme (current: Contrast)")
            );
        }
        let toggle = node(&sync, "toggle");
        let label = sync.surface().attr(toggle, "aria-label").unwrap_or_default();
        assert!(label.contains("Contrast"), "got: {label}");
        assert_eq!(sync.surface().attr(toggle, "aria-pressed").as_deref(), Some("false"));
    }

    #[test]
    fn apply_theme_syncs_controls_without_prior_startup() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        sync.render_theme_options();
        sync.apply_theme("dark");
        let chooser = node(&sync, "theme-b");
        assert_eq!(sync.surface().value(chooser).as_deref(), Some("dark"));
        let toggle = node(&sync, "toggle");
        assert_eq!(
            sync.surface().attr(toggle, "aria-label").as_deref(),
            Some("Switch theme (current: Dark)")
        );
    }

    #[test]
    fn apply_font_size_updates_every_font_chooser() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        sync.initialize();
        assert_eq!(sync.apply_font_size("large"), FontSize::Large);
        for id in ["font", "font-b"] {
            let chooser = node(&sync, id);
            assert_eq!(sync.surface().value(chooser).as_deref(), Some("large"), "{id}");
        }

        sync.apply_font_size("tiny");
        for id in ["font", "font-b"] {
            let chooser = node(&sync, id);
            assert_eq!(sync.surface().value(chooser).as_deref(), Some("base"), "{id}");
        }
    }

    #[test]
    fn font_chooser_change_applies_and_resyncs_siblings() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        sync.initialize();
        let first = node(&sync, "font");
        let second = node(&sync, "font-b");

        let handled = sync.dispatch(ControlEvent::Changed {
            node: first,
            value: "small".to_string(),
        });
        assert_eq!(handled, 1);
        assert_eq!(sync.surface().body_attr(FONT_ATTR).as_deref(), Some("small"));
        assert_eq!(sync.store().get(FONT_KEY).as_deref(), Some("small"));
        assert_eq!(sync.surface().value(second).as_deref(), Some("small"));

        sync.dispatch(ControlEvent::Changed {
            node: second,
            value: "huge".to_string(),
        });
        assert_eq!(sync.surface().body_attr(FONT_ATTR).as_deref(), Some("base"));
        assert_eq!(sync.store().get(FONT_KEY).as_deref(), Some("base"));
        for chooser in [first, second] {
            assert_eq!(sync.surface().value(chooser).as_deref(), Some("base"));
        }
    }

    #[test]
    fn bind_controls_wires_every_control_kind() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        sync.render_theme_options();
        sync.bind_controls();

        let theme_chooser = node(&sync, "theme-a");
        assert_eq!(
            sync.dispatch(ControlEvent::Changed {
                node: theme_chooser,
                value: "contrast".to_string(),
            }),
            1
        );
        assert_eq!(sync.current_theme().as_deref(), Some("contrast"));

        let toggle = node(&sync, "toggle");
        assert_eq!(sync.dispatch(ControlEvent::Clicked { node: toggle }), 1);
        assert_eq!(sync.current_theme().as_deref(), Some("light"));

        let font_chooser = node(&sync, "font");
        assert_eq!(
            sync.dispatch(ControlEvent::Changed {
                node: font_chooser,
                value: "large".to_string(),
            }),
            1
        );
        assert_eq!(sync.surface().body_attr(FONT_ATTR).as_deref(), Some("large"));

        let button = node(&sync, "bogus");
        assert_eq!(sync.dispatch(ControlEvent::Clicked { node: button }), 1);
        assert_eq!(sync.surface().body_attr(FONT_ATTR).as_deref(), Some("base"));

        // Choosers only react to change events.
        assert_eq!(sync.dispatch(ControlEvent::Clicked { node: theme_chooser }), 0);
    }

    #[test]
    fn chooser_change_keeps_sibling_choosers_in_sync() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        sync.initialize();
        let first = node(&sync, "theme-a");
        let handled = sync.dispatch(ControlEvent::Changed {
            node: first,
            value: "dark".to_string(),
        });
        assert_eq!(handled, 1);
        let second = node(&sync, "theme-b");
        assert_eq!(sync.surface().value(second).as_deref(), Some("dark"));
        assert_eq!(sync.store().get(THEME_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn toggle_click_cycles_theme() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        sync.initialize();
        let toggle = node(&sync, "toggle");
        sync.dispatch(ControlEvent::Clicked { node: toggle });
        assert_eq!(sync.current_theme().as_deref(), Some("dark"));
        let chooser = node(&sync, "theme-a");
        assert_eq!(sync.surface().value(chooser).as_deref(), Some("dark"));
    }

    #[test]
    fn font_buttons_apply_and_resync_choosers() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        sync.initialize();
        let font = node(&sync, "font");
        assert_eq!(sync.surface().value(font).as_deref(), Some("base"));

        sync.dispatch(ControlEvent::Clicked {
            node: node(&sync, "bigger"),
        });
        assert_eq!(sync.surface().value(font).as_deref(), Some("large"));
        assert_eq!(sync.store().get(FONT_KEY).as_deref(), Some("large"));

        sync.dispatch(ControlEvent::Clicked {
            node: node(&sync, "bogus"),
        });
        assert_eq!(sync.surface().value(font).as_deref(), Some("base"));
    }

    #[test]
    fn unbound_controls_ignore_events() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        let toggle = node(&sync, "toggle");
        assert_eq!(sync.dispatch(ControlEvent::Clicked { node: toggle }), 0);
    }

    #[test]
    fn double_binding_runs_handlers_twice() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        sync.initialize();
        sync.bind_theme_controls();
        let toggle = node(&sync, "toggle");
        assert_eq!(sync.dispatch(ControlEvent::Clicked { node: toggle }), 2);
        assert_eq!(sync.current_theme().as_deref(), Some("contrast"));
    }

    #[test]
    fn options_render_from_catalog() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        sync.render_theme_options();
        let chooser = node(&sync, "theme-b");
        assert_eq!(
            sync.surface().option_values(chooser),
            vec!["light", "dark", "contrast"]
        );
    }

    #[test]
    fn live_region_is_created_once_and_overwritten() {
        let mut sync = synchronizer(three_themes(), MemoryStore::new(), None);
        sync.announce("first");
        sync.announce("second");
        let regions = sync.surface().elements_with_attr("aria-live");
        assert_eq!(regions.len(), 1);
        assert_eq!(
            sync.surface().text_by_id(LIVE_REGION_ID).as_deref(),
            Some("second")
        );
    }

    #[test]
    fn existing_live_region_is_reused() {
        let page = Page::parse(r#"<body><main></main><div id="global-aria-live"></div></body>"#);
        let mut sync = Synchronizer::new(
            three_themes(),
            page,
            MemoryStore::new(),
            Box::new(FixedSignal(None)),
        );
        sync.apply_theme("dark");
        assert_eq!(sync.surface().elements_with_attr("id").len(), 1);
        assert_eq!(
            sync.surface().text_by_id(LIVE_REGION_ID).as_deref(),
            Some("Theme set to dark")
        );
    }
}

//! The presentation surface the synchronizer drives.
//!
//! A surface is a minimal element tree: a root scope, a body, attribute and
//! text access, and marker-attribute discovery. [`crate::page::Page`] is the
//! HTML-backed implementation; a browser binding would be another.

/// Handle to one element of a surface. Valid only for the surface that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Marks a theme chooser.
pub const THEME_SELECT_MARKER: &str = "data-theme-select";
/// Marks a button that cycles the theme.
pub const THEME_TOGGLE_MARKER: &str = "data-theme-toggle";
/// Marks a font-size chooser.
pub const FONT_SELECT_MARKER: &str = "data-font-select";
/// Marks a button that applies a fixed font size (the attribute value).
pub const FONT_BUTTON_MARKER: &str = "data-font-button";

/// Which preference a chooser displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChooserTarget {
    Theme,
    FontSize,
}

/// What pressing a toggle does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleAction {
    CycleTheme,
    /// Raw requested size; coerced when applied.
    SetFontSize(String),
}

/// A discovered control bound to one preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceControl {
    /// Multi-option control whose value is the preference.
    Chooser { node: NodeId, target: ChooserTarget },
    /// Stateless trigger.
    Toggle { node: NodeId, action: ToggleAction },
}

impl PreferenceControl {
    pub fn node(&self) -> NodeId {
        match self {
            Self::Chooser { node, .. } | Self::Toggle { node, .. } => *node,
        }
    }

    pub fn is_theme_control(&self) -> bool {
        matches!(
            self,
            Self::Chooser {
                target: ChooserTarget::Theme,
                ..
            } | Self::Toggle {
                action: ToggleAction::CycleTheme,
                ..
            }
        )
    }
}

/// A form field subject to the startup audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub node: NodeId,
    /// `required` on an `input` or `textarea`.
    pub required: bool,
    /// Raw `data-validate-length` value.
    pub length_limit: Option<String>,
    pub value: Option<String>,
}

/// Element-tree operations consumed by the synchronizer.
pub trait Surface {
    fn root_attr(&self, name: &str) -> Option<String>;
    fn set_root_attr(&mut self, name: &str, value: &str);
    /// Returns `false` when the surface has no body.
    fn set_body_attr(&mut self, name: &str, value: &str) -> bool;

    /// Whether any element with this tag exists.
    fn has_element(&self, tag: &str) -> bool;
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
    /// All elements carrying `name`, in document order.
    fn elements_with_attr(&self, name: &str) -> Vec<NodeId>;
    fn tag_name(&self, node: NodeId) -> Option<String>;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    /// Append a new element under `parent`, or under the body when `None`.
    fn append_element(&mut self, parent: Option<NodeId>, tag: &str) -> NodeId;

    fn attr(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attr(&mut self, node: NodeId, name: &str, value: &str);
    fn text(&self, node: NodeId) -> String;
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Current form value, `None` for elements without one.
    fn value(&self, node: NodeId) -> Option<String>;
    fn set_value(&mut self, node: NodeId, value: &str);
    /// Replace a chooser's options with `(value, label)` pairs.
    fn set_options(&mut self, node: NodeId, options: &[(&str, &str)]);

    /// Translate marker attributes into typed controls.
    fn discover_controls(&self) -> Vec<PreferenceControl> {
        let mut controls = Vec::new();
        for node in self.elements_with_attr(THEME_SELECT_MARKER) {
            controls.push(PreferenceControl::Chooser {
                node,
                target: ChooserTarget::Theme,
            });
        }
        for node in self.elements_with_attr(THEME_TOGGLE_MARKER) {
            controls.push(PreferenceControl::Toggle {
                node,
                action: ToggleAction::CycleTheme,
            });
        }
        for node in self.elements_with_attr(FONT_SELECT_MARKER) {
            controls.push(PreferenceControl::Chooser {
                node,
                target: ChooserTarget::FontSize,
            });
        }
        for node in self.elements_with_attr(FONT_BUTTON_MARKER) {
            let size = self.attr(node, FONT_BUTTON_MARKER).unwrap_or_default();
            controls.push(PreferenceControl::Toggle {
                node,
                action: ToggleAction::SetFontSize(size),
            });
        }
        controls
    }

    /// Fields that are `required` or carry a length limit.
    fn form_fields(&self) -> Vec<FormField> {
        let mut nodes = self.elements_with_attr("required");
        nodes.extend(self.elements_with_attr("data-validate-length"));
        nodes.sort();
        nodes.dedup();
        nodes
            .into_iter()
            .map(|node| {
                let tag = self.tag_name(node).unwrap_or_default();
                FormField {
                    node,
                    required: self.attr(node, "required").is_some()
                        && matches!(tag.as_str(), "input" | "textarea"),
                    length_limit: self.attr(node, "data-validate-length"),
                    value: self.value(node),
                }
            })
            .collect()
    }
}

/// Optional system-level appearance signal.
pub trait SystemSignal {
    /// `Some(true)` when the system prefers a dark appearance, `None` when
    /// no signal is available.
    fn prefers_dark(&self) -> Option<bool>;
}

/// A signal with a fixed answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSignal(pub Option<bool>);

impl SystemSignal for FixedSignal {
    fn prefers_dark(&self) -> Option<bool> {
        self.0
    }
}

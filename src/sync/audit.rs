//! Advisory startup checks and help-tip wiring.
//!
//! Nothing here blocks rendering: problems are marked on the page and
//! announced, never returned as errors.

use super::{NodeId, Surface, Synchronizer};
use crate::prefs::PreferenceStore;

/// Structural landmarks every tool page should carry.
pub const CORE_LANDMARKS: [&str; 3] = ["body", "main", "header"];

/// Outcome of [`Synchronizer::startup_audit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditSummary {
    pub missing_landmarks: Vec<&'static str>,
    /// Fields marked `aria-invalid`.
    pub invalid_fields: Vec<NodeId>,
}

/// True when `value` has non-whitespace content.
pub fn validate_filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Parse a `data-validate-length` value as a decimal number. Blank means
/// zero; anything else that is not a finite decimal is ignored.
fn parse_limit(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|limit| limit.is_finite())
}

impl<S, P> Synchronizer<S, P>
where
    S: Surface,
    P: PreferenceStore,
{
    /// Flag missing landmarks and invalid form fields.
    pub fn startup_audit(&mut self) -> AuditSummary {
        let mut summary = AuditSummary::default();
        for landmark in CORE_LANDMARKS {
            if !self.surface.has_element(landmark) {
                summary.missing_landmarks.push(landmark);
            }
        }
        if !summary.missing_landmarks.is_empty() {
            let missing = summary.missing_landmarks.join(", ");
            self.announce(&format!("Warning: missing core landmarks {missing}"));
            tracing::warn!(missing = %missing, "page is missing core landmarks");
        }

        for field in self.surface.form_fields() {
            let value = field.value.unwrap_or_default();
            let mut invalid = false;
            if field.required && !validate_filled(&value) {
                invalid = true;
            }
            if let Some(limit) = field.length_limit.as_deref().and_then(parse_limit) {
                if !value.is_empty() && value.chars().count() as f64 > limit {
                    invalid = true;
                    self.surface.set_attr(
                        field.node,
                        "data-feedback",
                        &format!("At most {limit} characters allowed"),
                    );
                }
            }
            if invalid {
                self.surface.set_attr(field.node, "aria-invalid", "true");
                summary.invalid_fields.push(field.node);
            }
        }
        summary
    }

    /// Wire every `data-help` element to a screen-reader hint. Returns
    /// whether any `data-help` element exists.
    pub fn attach_help_tips(&mut self) -> bool {
        let targets = self.surface.elements_with_attr("data-help");
        let mut counter = 0usize;

        for &node in &targets {
            let raw = self.surface.attr(node, "data-help").unwrap_or_default();
            if !validate_filled(&raw) {
                continue;
            }
            let help_text = raw.trim();
            counter += 1;
            let base = self
                .surface
                .attr(node, "id")
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| "help".to_string());
            let hint_id = format!("{base}-hint-{counter}");

            let hint = match self.surface.element_by_id(&hint_id) {
                Some(existing) => existing,
                None => {
                    let host = self.surface.parent(node);
                    let hint = self.surface.append_element(host, "span");
                    self.surface.set_attr(hint, "id", &hint_id);
                    self.surface.set_attr(hint, "class", "sr-only");
                    hint
                }
            };
            self.surface.set_text(hint, help_text);

            let existing = self
                .surface
                .attr(node, "aria-describedby")
                .unwrap_or_default();
            let mut described_by: Vec<&str> = Vec::new();
            for id in existing.split_whitespace().chain([hint_id.as_str()]) {
                if !described_by.contains(&id) {
                    described_by.push(id);
                }
            }
            self.surface
                .set_attr(node, "aria-describedby", &described_by.join(" "));

            if self
                .surface
                .attr(node, "title")
                .map_or(true, |title| title.is_empty())
            {
                self.surface.set_attr(node, "title", help_text);
            }
        }

        !targets.is_empty()
    }
}

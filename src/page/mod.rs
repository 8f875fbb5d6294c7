//! In-memory page model parsed from HTML.
//!
//! Elements are flattened into an arena in document order. `<option>`
//! elements are folded into their `<select>` so chooser values behave like a
//! browser's: the selected option wins, else the first one.

use std::collections::{BTreeMap, HashMap};

use scraper::{ElementRef, Html};

use crate::sync::{NodeId, Surface};

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectOption {
    value: String,
    label: String,
    selected: bool,
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    /// Form value for `input` and `textarea`.
    value: Option<String>,
    /// Options for `select`.
    options: Vec<SelectOption>,
    parent: Option<NodeId>,
}

impl Element {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            text: String::new(),
            value: None,
            options: Vec::new(),
            parent,
        }
    }
}

/// A parsed HTML page acting as a presentation surface.
#[derive(Debug, Clone)]
pub struct Page {
    nodes: Vec<Element>,
    root: NodeId,
    body: Option<NodeId>,
}

impl Page {
    /// Parse a full HTML document. The parser always synthesizes `html`,
    /// `head`, and `body`.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut nodes: Vec<Element> = Vec::new();
        let mut index = HashMap::new();

        for node in document.root_element().descendants() {
            let Some(element) = ElementRef::wrap(node) else {
                continue;
            };
            let tag = element.value().name().to_ascii_lowercase();
            if tag == "option" || tag == "optgroup" {
                continue;
            }
            let parent = node
                .parent()
                .and_then(|parent| index.get(&parent.id()).copied());

            let mut item = Element::new(&tag, parent);
            for (name, value) in element.value().attrs() {
                item.attrs
                    .insert(name.to_ascii_lowercase(), value.to_string());
            }
            item.text = element.text().collect::<String>();
            match tag.as_str() {
                "input" => item.value = Some(item.attrs.get("value").cloned().unwrap_or_default()),
                "textarea" => item.value = Some(item.text.clone()),
                "select" => item.options = collect_options(element),
                _ => {}
            }

            index.insert(node.id(), NodeId(nodes.len()));
            nodes.push(item);
        }

        if nodes.is_empty() {
            nodes.push(Element::new("html", None));
        }
        let body = nodes
            .iter()
            .position(|element| element.tag == "body")
            .map(NodeId);
        Self {
            nodes,
            root: NodeId(0),
            body,
        }
    }

    pub fn body_attr(&self, name: &str) -> Option<String> {
        self.body.and_then(|body| self.attr(body, name))
    }

    /// Text of the element with DOM id `id`, if present.
    pub fn text_by_id(&self, id: &str) -> Option<String> {
        self.element_by_id(id).map(|node| self.text(node))
    }

    /// Option values of a chooser, in order.
    pub fn option_values(&self, node: NodeId) -> Vec<String> {
        self.get(node)
            .map(|element| {
                element
                    .options
                    .iter()
                    .map(|option| option.value.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(node.0)
    }
}

fn collect_options(select: ElementRef<'_>) -> Vec<SelectOption> {
    let mut options: Vec<SelectOption> = select
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| element.value().name().eq_ignore_ascii_case("option"))
        .map(|option| {
            let label = option
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ");
            let value = option
                .value()
                .attr("value")
                .map(str::to_string)
                .unwrap_or_else(|| label.clone());
            SelectOption {
                value,
                label,
                selected: option.value().attr("selected").is_some(),
            }
        })
        .collect();

    // Only the last `selected` option counts, as in a single-choice select.
    if let Some(last) = options.iter().rposition(|option| option.selected) {
        for (idx, option) in options.iter_mut().enumerate() {
            option.selected = idx == last;
        }
    }
    options
}

impl Surface for Page {
    fn root_attr(&self, name: &str) -> Option<String> {
        self.attr(self.root, name)
    }

    fn set_root_attr(&mut self, name: &str, value: &str) {
        let root = self.root;
        self.set_attr(root, name, value);
    }

    fn set_body_attr(&mut self, name: &str, value: &str) -> bool {
        let Some(body) = self.body else {
            return false;
        };
        self.set_attr(body, name, value);
        true
    }

    fn has_element(&self, tag: &str) -> bool {
        self.nodes
            .iter()
            .any(|element| element.tag.eq_ignore_ascii_case(tag))
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|element| element.attrs.get("id").is_some_and(|value| value == id))
            .map(NodeId)
    }

    fn elements_with_attr(&self, name: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, element)| element.attrs.contains_key(name))
            .map(|(idx, _)| NodeId(idx))
            .collect()
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.get(node).map(|element| element.tag.clone())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|element| element.parent)
    }

    fn append_element(&mut self, parent: Option<NodeId>, tag: &str) -> NodeId {
        let parent = parent.or(self.body).unwrap_or(self.root);
        self.nodes.push(Element::new(tag, Some(parent)));
        NodeId(self.nodes.len() - 1)
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.get(node)
            .and_then(|element| element.attrs.get(name).cloned())
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.get_mut(node) {
            element.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn text(&self, node: NodeId) -> String {
        self.get(node)
            .map(|element| element.text.clone())
            .unwrap_or_default()
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(element) = self.get_mut(node) {
            element.text = text.to_string();
            if element.tag == "textarea" {
                element.value = Some(text.to_string());
            }
        }
    }

    fn value(&self, node: NodeId) -> Option<String> {
        let element = self.get(node)?;
        if element.tag == "select" {
            return element
                .options
                .iter()
                .find(|option| option.selected)
                .or_else(|| element.options.first())
                .map(|option| option.value.clone());
        }
        element.value.clone()
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        let Some(element) = self.get_mut(node) else {
            return;
        };
        if element.tag == "select" {
            let mut matched = false;
            for option in &mut element.options {
                option.selected = !matched && option.value == value;
                matched |= option.selected;
            }
        } else if element.value.is_some() {
            element.value = Some(value.to_string());
        }
    }

    fn set_options(&mut self, node: NodeId, options: &[(&str, &str)]) {
        if let Some(element) = self.get_mut(node) {
            element.options = options
                .iter()
                .map(|(value, label)| SelectOption {
                    value: value.to_string(),
                    label: label.to_string(),
                    selected: false,
                })
                .collect();
        }
    }
}

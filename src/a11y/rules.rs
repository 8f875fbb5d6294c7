//! Built-in WCAG 2 level-A style checks over static HTML.
//!
//! Only errors are reported; notices and warnings are out of scope.

use std::collections::{BTreeMap, BTreeSet};

use scraper::{ElementRef, Html, Selector};

use super::{A11yScanner, Finding};

/// Static rule set run against parsed markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticScanner;

impl A11yScanner for StaticScanner {
    fn scan(&self, html: &str) -> Vec<Finding> {
        let document = Html::parse_document(html);
        let mut findings = Vec::new();
        check_lang(&document, &mut findings);
        check_title(&document, &mut findings);
        check_image_alt(&document, &mut findings);
        check_form_labels(&document, &mut findings);
        check_named(&document, "button", "button-name", &mut findings);
        check_named(&document, "a[href]", "link-name", &mut findings);
        check_duplicate_ids(&document, &mut findings);
        findings
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid rule selector")
}

fn has_text(element: &ElementRef<'_>) -> bool {
    element.text().any(|text| !text.trim().is_empty())
}

fn non_empty_attr(element: &ElementRef<'_>, name: &str) -> bool {
    element
        .value()
        .attr(name)
        .is_some_and(|value| !value.trim().is_empty())
}

fn describe(element: &ElementRef<'_>) -> String {
    match element.value().attr("id") {
        Some(id) => format!("<{} id=\"{id}\">", element.value().name()),
        None => format!("<{}>", element.value().name()),
    }
}

fn check_lang(document: &Html, findings: &mut Vec<Finding>) {
    let root = document.root_element();
    if !non_empty_attr(&root, "lang") {
        findings.push(Finding {
            rule: "html-lang",
            message: "<html> element has no lang attribute".to_string(),
        });
    }
}

fn check_title(document: &Html, findings: &mut Vec<Finding>) {
    let titled = document
        .select(&selector("head title"))
        .any(|title| has_text(&title));
    if !titled {
        findings.push(Finding {
            rule: "document-title",
            message: "document has no non-empty <title>".to_string(),
        });
    }
}

fn check_image_alt(document: &Html, findings: &mut Vec<Finding>) {
    for image in document.select(&selector("img")) {
        if image.value().attr("alt").is_none() {
            findings.push(Finding {
                rule: "image-alt",
                message: format!(
                    "image {} has no alt attribute",
                    image.value().attr("src").unwrap_or("(no src)")
                ),
            });
        }
    }
}

fn check_form_labels(document: &Html, findings: &mut Vec<Finding>) {
    let labelled: BTreeSet<String> = document
        .select(&selector("label[for]"))
        .filter_map(|label| label.value().attr("for"))
        .map(str::to_string)
        .collect();

    for field in document.select(&selector("input, select, textarea")) {
        let kind = field
            .value()
            .attr("type")
            .unwrap_or("text")
            .to_ascii_lowercase();
        if field.value().name() == "input"
            && matches!(kind.as_str(), "hidden" | "submit" | "button" | "reset" | "image")
        {
            continue;
        }
        let named = non_empty_attr(&field, "aria-label")
            || non_empty_attr(&field, "aria-labelledby")
            || non_empty_attr(&field, "title")
            || field
                .value()
                .attr("id")
                .is_some_and(|id| labelled.contains(id))
            || field.ancestors().any(|node| {
                node.value()
                    .as_element()
                    .is_some_and(|element| element.name() == "label")
            });
        if !named {
            findings.push(Finding {
                rule: "form-label",
                message: format!("form control {} has no accessible name", describe(&field)),
            });
        }
    }
}

fn check_named(document: &Html, css: &str, rule: &'static str, findings: &mut Vec<Finding>) {
    let image_alt = selector("img[alt]");
    for element in document.select(&selector(css)) {
        let named = has_text(&element)
            || non_empty_attr(&element, "aria-label")
            || non_empty_attr(&element, "aria-labelledby")
            || non_empty_attr(&element, "title")
            || element
                .select(&image_alt)
                .any(|image| non_empty_attr(&image, "alt"));
        if !named {
            findings.push(Finding {
                rule,
                message: format!("{} has no accessible name", describe(&element)),
            });
        }
    }
}

fn check_duplicate_ids(document: &Html, findings: &mut Vec<Finding>) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for element in document.select(&selector("[id]")) {
        if let Some(id) = element.value().attr("id") {
            *counts.entry(id).or_insert(0) += 1;
        }
    }
    for (id, count) in counts {
        if count > 1 {
            findings.push(Finding {
                rule: "duplicate-id",
                message: format!("id \"{id}\" is used {count} times"),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(html: &str) -> Vec<&'static str> {
        StaticScanner.scan(html).into_iter().map(|f| f.rule).collect()
    }

    const CLEAN: &str = r#"<html lang="en"><head><title>Genres</title></head><body>
        <main>
          <label for="q">Search</label><input id="q">
          <label>Notes <textarea></textarea></label>
          <select aria-label="Theme"><option>light</option></select>
          <input type="hidden" name="token">
          <button>Go</button>
          <button aria-label="Close">x</button>
          <a href="/"><img src="home.png" alt="Home"></a>
          <img src="divider.png" alt="">
        </main></body></html>"#;

    #[test]
    fn clean_page_has_no_findings() {
        assert!(rules(CLEAN).is_empty(), "got: {:?}", StaticScanner.scan(CLEAN));
    }

    #[test]
    fn flags_each_rule() {
        let html = r#"<html><head></head><body>
            <img src="a.png">
            <input id="dup">
            <span id="dup"></span>
            <button></button>
            <a href="/x"></a>
        </body></html>"#;
        assert_eq!(
            rules(html),
            vec![
                "html-lang",
                "document-title",
                "image-alt",
                "form-label",
                "button-name",
                "link-name",
                "duplicate-id"
            ]
        );
    }

    #[test]
    fn anchors_without_href_are_ignored() {
        let html = r#"<html lang="de"><head><title>t</title></head><body><a name="top"></a></body></html>"#;
        assert!(rules(html).is_empty());
    }
}

//! XPath locator handling: parsing model replies and the model-free
//! heuristic scan.

use std::collections::HashSet;

use regex::Regex;
use scraper::{Html, Selector};

/// Returned whenever a flow would otherwise produce zero locators. Both
/// entries match any HTML document, so downstream consumers always have
/// something to anchor on.
pub const FALLBACK_XPATHS: &[&str] = &["//body", "//html"];

/// Upper bound on heuristic results per page.
const MAX_FAST_XPATHS: usize = 50;

/// Extracts XPath expressions from a model reply.
///
/// Models are asked for one locator per line, but replies still arrive
/// decorated: numbered lists, bullets, back-ticked snippets, the odd prose
/// sentence. Decoration is stripped per line and anything that does not look
/// like an XPath is dropped. An empty result becomes [`FALLBACK_XPATHS`].
pub fn parse_model_xpaths(reply: &str) -> Vec<String> {
    let ordinal = Regex::new(r"^\d+\.\s*").expect("ordinal regex is valid");
    let bullet = Regex::new(r"^[-*]\s*").expect("bullet regex is valid");

    let mut xpaths: Vec<String> = Vec::new();
    for line in reply.lines() {
        let line = line.trim();
        let line = ordinal.replace(line, "");
        let line = bullet.replace(&line, "");
        let line = line.trim().trim_matches('`').trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('/') || line.starts_with('.') || line.to_lowercase().contains("xpath") {
            xpaths.push(line.to_string());
        }
    }

    if xpaths.is_empty() {
        return FALLBACK_XPATHS.iter().map(|s| s.to_string()).collect();
    }
    xpaths
}

/// Scans a page for obvious interaction targets without calling a model:
/// form fields, links and headings, in that order. Locators prefer `id`,
/// then `name` (or `href` for links), then the bare tag. Duplicates are
/// dropped, document order is kept.
pub fn heuristic_xpaths(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<String> = Vec::new();

    let fields =
        Selector::parse("input, textarea, select, button").expect("field selector is valid");
    for el in doc.select(&fields) {
        let tag = el.value().name();
        let xpath = attr_locator(tag, "id", el.value().attr("id"))
            .or_else(|| attr_locator(tag, "name", el.value().attr("name")))
            .unwrap_or_else(|| format!("//{tag}"));
        if push_unique(&mut out, &mut seen, xpath) {
            return out;
        }
    }

    let links = Selector::parse("a").expect("link selector is valid");
    for el in doc.select(&links) {
        let by_id = attr_locator("a", "id", el.value().attr("id"));
        let xpath = match by_id {
            Some(x) => x,
            None => {
                let href = el.value().attr("href").unwrap_or("").trim();
                if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
                    continue;
                }
                match attr_locator("a", "href", Some(href)) {
                    Some(x) => x,
                    None => continue,
                }
            }
        };
        if push_unique(&mut out, &mut seen, xpath) {
            return out;
        }
    }

    let headings = Selector::parse("h1, h2, h3, h4, h5, h6").expect("heading selector is valid");
    for el in doc.select(&headings) {
        let tag = el.value().name();
        let xpath = attr_locator(tag, "id", el.value().attr("id"))
            .unwrap_or_else(|| format!("//{tag}"));
        if push_unique(&mut out, &mut seen, xpath) {
            return out;
        }
    }

    out
}

/// Builds `//tag[@attr='value']`, switching quote style when the value
/// itself contains one. XPath 1.0 string literals cannot escape quotes, so a
/// value containing both kinds is unrepresentable and yields `None`.
fn attr_locator(tag: &str, attr: &str, value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    if !value.contains('\'') {
        Some(format!("//{tag}[@{attr}='{value}']"))
    } else if !value.contains('"') {
        Some(format!("//{tag}[@{attr}=\"{value}\"]"))
    } else {
        None
    }
}

/// Appends if unseen; reports whether the cap was reached.
fn push_unique(out: &mut Vec<String>, seen: &mut HashSet<String>, xpath: String) -> bool {
    if seen.insert(xpath.clone()) {
        out.push(xpath);
    }
    out.len() >= MAX_FAST_XPATHS
}

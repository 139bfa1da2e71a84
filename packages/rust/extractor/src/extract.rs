//! Field extraction from a parsed course detail page.

use std::sync::LazyLock;

use coursecrawl_shared::{CourseCrawlError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Node};

use crate::selectors::SelectorTable;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is written unescaped.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Concatenate the configured description sections, attributes stripped.
///
/// Sections absent from the page are skipped; a page with none yields `""`.
pub fn extract_description(doc: &Html, selectors: &SelectorTable) -> String {
    selectors
        .sections
        .iter()
        .filter_map(|sel| doc.select(sel).next())
        .map(|section| {
            let mut html = String::new();
            write_without_attributes(section, &mut html);
            collapse_whitespace(&html)
        })
        .collect()
}

/// Read the value of the row whose label contains the configured text.
///
/// All whitespace is removed from the value (`"English, German"` → `"English,German"`).
pub fn extract_language(doc: &Html, selectors: &SelectorTable) -> Result<String> {
    let needle = selectors.language_label_text.as_str();

    let item = doc
        .select(&selectors.language_item)
        .find(|item| {
            item.select(&selectors.language_label)
                .any(|label| label.text().collect::<String>().contains(needle))
        })
        .ok_or_else(|| CourseCrawlError::extraction(format!("label '{needle}' not found")))?;

    let value = item.select(&selectors.language_value).next().ok_or_else(|| {
        CourseCrawlError::extraction(format!("label '{needle}' has no value element"))
    })?;

    Ok(value
        .text()
        .flat_map(str::chars)
        .filter(|c| !c.is_whitespace())
        .collect())
}

/// Drop line breaks and tabs, then delete every run of two or more whitespace characters.
pub(crate) fn collapse_whitespace(html: &str) -> String {
    static LINE_BREAK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[\n\t\r]").expect("valid regex"));
    static WS_RUN_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[ \t\n\x0B\x0C\r]{2,}").expect("valid regex"));

    let without_breaks = LINE_BREAK_RE.replace_all(html, "");
    WS_RUN_RE.replace_all(&without_breaks, "").into_owned()
}

/// Serialize `el` and its subtree as HTML with every attribute omitted.
pub(crate) fn write_without_attributes(el: ElementRef<'_>, out: &mut String) {
    let name = el.value().name();
    out.push('<');
    out.push_str(name);
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }

    let raw = RAW_TEXT_ELEMENTS.contains(&name);
    for child in el.children() {
        match child.value() {
            Node::Text(text) if raw => out.push_str(text),
            Node::Text(text) => escape_text(text, out),
            Node::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    write_without_attributes(child_el, out);
                }
            }
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

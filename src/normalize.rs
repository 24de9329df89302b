//! Markdown Cell Normalization Module
//!
//! Shared by the table and loose-line parsers:
//! - Extract `[text](url)` / `<a href>` links into display text + URL
//! - Strip bold, italic-underscore and inline code markers
//! - Recognise continuation markers in the company column
//! - Locate `[Apply](url)` links anywhere in a row

use regex::Regex;
use std::sync::OnceLock;

/// Glyphs the README uses in the company column for "same company as above"
const CONTINUATION_MARKERS: &[&str] = &["↳", "⮑", "\"", "〃"];

fn markdown_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // one level of nested brackets in the text and of parentheses in the URL
    RE.get_or_init(|| {
        Regex::new(r"\[((?:[^\[\]]|\[[^\[\]]*\])*)\]\(((?:[^()\s]|\([^()\s]*\))*)\)")
            .expect("valid markdown link regex")
    })
}

fn html_anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
            .expect("valid anchor regex")
    })
}

fn html_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]+>").expect("valid tag regex"))
}

fn apply_link_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\[\s*apply[^\]]*\]\((https?://(?:[^()\s]|\([^()\s]*\))+)\)").expect("valid apply regex")
    })
}

fn apply_anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*href\s*=\s*["'](https?://[^"']+)["'][^>]*>\s*(?:<img[^>]*alt\s*=\s*["']apply["'][^>]*>|apply)"#)
            .expect("valid apply anchor regex")
    })
}

/// Remove `**`, `__` and backtick markers.
pub fn strip_emphasis(text: &str) -> String {
    text.replace("**", "").replace("__", "").replace('`', "")
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn display_text(raw: &str) -> String {
    let without_tags = html_tag_re().replace_all(raw, " ");
    collapse_whitespace(&strip_emphasis(&without_tags))
}

/// Split a cell into display text and link target.
///
/// The first markdown link (or HTML anchor) wins. Without a link the whole
/// cleaned cell is the text and the URL is empty.
pub fn extract_link(cell: &str) -> (String, String) {
    if let Some(caps) = markdown_link_re().captures(cell) {
        let text = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let url = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        return (display_text(text), url.trim().to_string());
    }

    if let Some(caps) = html_anchor_re().captures(cell) {
        let url = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let text = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        return (display_text(text), url.trim().to_string());
    }

    (display_text(cell), String::new())
}

/// Reduce a cell to plain display text: links become their text,
/// HTML tags and emphasis markers are dropped.
pub fn clean_cell(cell: &str) -> String {
    let unlinked = markdown_link_re().replace_all(cell, "$1");
    let unanchored = html_anchor_re().replace_all(&unlinked, "$2");
    display_text(&unanchored)
}

pub fn is_continuation_marker(text: &str) -> bool {
    let trimmed = text.trim();
    CONTINUATION_MARKERS.contains(&trimmed)
}

/// Find an application link labelled "Apply" anywhere in `text`.
pub fn find_apply_link(text: &str) -> Option<String> {
    apply_link_re()
        .captures(text)
        .or_else(|| apply_anchor_re().captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

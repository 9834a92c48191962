//! HTML → representative text.

use scraper::node::Node;
use scraper::{Html, Selector};

use crate::Extraction;

/// Cap on body-text fallback length, in characters.
pub const MAX_BODY_CHARS: usize = 3000;

/// Elements whose text content is never visible.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Extract representative text from an HTML document.
///
/// Prefers a non-empty `og:description`, else all visible text nodes
/// (trimmed, joined with single spaces) capped at [`MAX_BODY_CHARS`].
pub fn extract_from_html(html: &str) -> Extraction {
    let doc = Html::parse_document(html);

    if let Some(description) = og_description(&doc) {
        return Extraction::Meta(description);
    }

    let text = visible_text(&doc);
    if text.is_empty() {
        return Extraction::Failed("no og:description and no visible text".into());
    }

    Extraction::Body(truncate_chars(&text, MAX_BODY_CHARS))
}

fn og_description(doc: &Html) -> Option<String> {
    let sel = Selector::parse(r#"meta[property="og:description"]"#).unwrap();
    doc.select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(String::from)
}

fn visible_text(doc: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in doc.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|el| el.name()))
            .is_some_and(|name| HIDDEN_ELEMENTS.contains(&name));
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

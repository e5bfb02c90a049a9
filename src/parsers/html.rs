//! HTML document driver
//!
//! Only text nodes are rewritten. The parsed document never lives across an
//! `.await`: candidate texts are collected first, resolved, and the document
//! is parsed again to splice the rendered fragments in. Parsing is
//! deterministic, so candidates are matched up by visit order.

use scraper::{ElementRef, Html, Node};

use super::extract::{Extraction, extract};
use super::matcher::{contains_url, standalone_url};
use super::rewrite::{RenderOptions, rewrite_line};
use crate::providers::{Params, ProviderRegistry};

/// Containers whose text is rendered as a block of its own
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "blockquote", "center", "dir", "div", "dl", "fieldset", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "isindex", "menu", "noframes", "noscript", "ol", "p", "pre", "table", "ul",
    "dd", "dt", "frameset", "li", "tbody", "td", "tfoot", "th", "thead", "tr", "button", "del",
    "iframe", "ins", "map", "object", "script",
];

/// Containers whose URLs are never touched
pub const SKIP_ELEMENTS: &[&str] = &["a", "pre", "code", "input", "textarea", "select"];

/// Parents that stand for the top of the document
///
/// `body` is included, so a URL alone in `<body>` renders with the full
/// handler rather than the block handler.
const ROOT_ELEMENTS: &[&str] = &["html", "body"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct TextTarget {
    text: String,
    standalone: bool,
}

/// Rewrite URLs found in the text nodes of `html`
///
/// A text node holding only a URL directly inside a block element goes
/// through the full handler. Other text goes through the block handler, or
/// is kept as is when there is none.
pub async fn parse_html(html: &str, registry: &ProviderRegistry, options: &RenderOptions) -> String {
    let targets = collect_targets(html);
    if targets.is_empty() {
        return html.to_string();
    }

    let mut replacements = Vec::with_capacity(targets.len());
    for target in &targets {
        let handler = if target.standalone {
            Some(&options.handler)
        } else {
            options.block_handler.as_ref()
        };

        let Some(handler) = handler else {
            replacements.push(None);
            continue;
        };

        let escaped = target.text.replace('<', "&lt;").replace('>', "&gt;");
        let rewritten = rewrite_line(&escaped, registry, handler.as_ref(), options).await;
        replacements.push((rewritten != escaped).then_some(rewritten));
    }

    if replacements.iter().all(Option::is_none) {
        return html.to_string();
    }
    replace_targets(html, &replacements)
}

/// URLs found in the text nodes of `html`, outside of skip elements
pub async fn extract_html(html: &str, registry: &ProviderRegistry, params: &Params) -> Extraction {
    let mut parts = Vec::new();
    for target in collect_targets(html) {
        parts.push(extract(&target.text, registry, params).await);
    }

    let mut extraction = Extraction::default();
    extraction.merge_all(parts);
    extraction
}

/// How the input was written, so the output keeps the same outer markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Fragment,
    /// Starts at `<!doctype>` or `<html>`
    Document,
    /// Starts at `<head>`
    Head,
    /// Starts at `<body>`
    Body,
}

impl Shape {
    fn of(html: &str) -> Self {
        let head = html.trim_start().as_bytes();
        if starts_with_ignore_case(head, b"<!doctype") || starts_with_tag(head, b"html") {
            Shape::Document
        } else if starts_with_tag(head, b"head") {
            Shape::Head
        } else if starts_with_tag(head, b"body") {
            Shape::Body
        } else {
            Shape::Fragment
        }
    }
}

fn starts_with_ignore_case(head: &[u8], prefix: &[u8]) -> bool {
    head.get(..prefix.len())
        .is_some_and(|start| start.eq_ignore_ascii_case(prefix))
}

/// `<name` followed by the end of the tag name
fn starts_with_tag(head: &[u8], name: &[u8]) -> bool {
    head.first() == Some(&b'<')
        && starts_with_ignore_case(&head[1..], name)
        && head
            .get(name.len() + 1)
            .is_none_or(|next| next.is_ascii_whitespace() || matches!(next, b'>' | b'/'))
}

fn parse(html: &str) -> Html {
    match Shape::of(html) {
        Shape::Fragment => Html::parse_fragment(html),
        _ => Html::parse_document(html),
    }
}

fn serialize(document: &Html, html: &str) -> String {
    let root = document.root_element();
    match Shape::of(html) {
        Shape::Fragment => root.inner_html(),
        Shape::Document => document.html(),
        Shape::Head => root.inner_html(),
        Shape::Body => root
            .children()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == "body")
            .map_or_else(|| root.inner_html(), |body| body.html()),
    }
}

/// `Some(standalone)` when a text node is eligible for rewriting
fn classify(text: &str, parent: Option<&str>, skipped: bool) -> Option<bool> {
    if skipped || !contains_url(text) {
        return None;
    }
    let standalone = standalone_url(text).is_some()
        && parent.is_none_or(|name| BLOCK_ELEMENTS.contains(&name) || ROOT_ELEMENTS.contains(&name));
    Some(standalone)
}

fn collect_targets(html: &str) -> Vec<TextTarget> {
    let document = parse(html);
    let mut targets = Vec::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let parent = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|element| element.name()));
        let skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| SKIP_ELEMENTS.contains(&element.name()))
        });

        let content: &str = &text.text;
        if let Some(standalone) = classify(content, parent, skipped) {
            targets.push(TextTarget {
                text: content.to_string(),
                standalone,
            });
        }
    }

    targets
}

/// Swap the n-th candidate text node for the parsed n-th replacement
fn replace_targets(html: &str, replacements: &[Option<String>]) -> String {
    let mut document = parse(html);

    let mut ids = Vec::new();
    let mut candidate = 0;
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let parent = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|element| element.name()));
        let skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| SKIP_ELEMENTS.contains(&element.name()))
        });

        if classify(&text.text, parent, skipped).is_none() {
            continue;
        }
        if let Some(Some(replacement)) = replacements.get(candidate) {
            ids.push((node.id(), replacement.as_str()));
        }
        candidate += 1;
    }

    for (id, replacement) in ids {
        let fragment = Html::parse_fragment(replacement);

        for child in fragment.root_element().children() {
            let Some(mut target) = document.tree.get_mut(id) else {
                break;
            };
            let copied = target.insert_before(child.value().clone()).id();

            let mut pending = vec![(child, copied)];
            while let Some((source, dest)) = pending.pop() {
                for grandchild in source.children() {
                    let Some(mut parent) = document.tree.get_mut(dest) else {
                        continue;
                    };
                    let appended = parent.append(grandchild.value().clone()).id();
                    pending.push((grandchild, appended));
                }
            }
        }

        if let Some(mut target) = document.tree.get_mut(id) {
            target.detach();
        }
    }

    serialize(&document, html)
}

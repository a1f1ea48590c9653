//! Portable Text handling: plain-text flattening and HTML rendering.
//!
//! Rich-text fields (author description and summary, work and project
//! descriptions) arrive as arrays of block nodes:
//!
//! ```json
//! [
//!   { "_type": "block", "style": "normal", "markDefs": [],
//!     "children": [ { "_type": "span", "text": "Hello ", "marks": [] },
//!                   { "_type": "span", "text": "world", "marks": ["strong"] } ] },
//!   { "_type": "image", "asset": { "_ref": "…" } }
//! ]
//! ```
//!
//! Only `block` nodes carry text. Any other node type is kept as
//! [`Block::Other`] so flattening can count it (as an empty string) and the
//! renderer can skip it.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type")]
pub enum Block {
    #[serde(rename = "block")]
    Text(TextBlock),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub list_item: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub children: Vec<Span>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub mark_defs: Vec<MarkDef>,
}

impl TextBlock {
    /// Concatenated text of all children, no separator.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| c.text.as_deref())
            .collect()
    }
}

/// An inline child. Non-span inline objects have no `text`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "crate::types::null_as_default")]
    pub marks: Vec<String>,
}

/// Annotation referenced from a span's `marks` by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key", default)]
    pub key: String,
    #[serde(rename = "_type", default)]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// Flatten blocks to plain text.
///
/// Each `block` contributes the concatenation of its span texts; every other
/// node contributes an empty string. The per-node strings are joined with a
/// single space, so `[]` yields `""`.
pub fn plain_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|block| match block {
            Block::Text(text) => text.text(),
            Block::Other => String::new(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// HTML rendering
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bullet,
    Number,
}

impl ListKind {
    fn of(block: &TextBlock) -> Option<Self> {
        match block.list_item.as_deref()? {
            "number" => Some(ListKind::Number),
            _ => Some(ListKind::Bullet),
        }
    }
}

enum Node<'a> {
    Single(&'a TextBlock),
    List(ListKind, Vec<&'a TextBlock>),
}

/// Group consecutive list items of the same kind so they share one list element.
fn group(blocks: &[Block]) -> Vec<Node<'_>> {
    let mut nodes: Vec<Node<'_>> = Vec::new();
    for block in blocks {
        let Block::Text(text) = block else { continue };
        match ListKind::of(text) {
            Some(kind) => match nodes.last_mut() {
                Some(Node::List(current, items)) if *current == kind => items.push(text),
                _ => nodes.push(Node::List(kind, vec![text])),
            },
            None => nodes.push(Node::Single(text)),
        }
    }
    nodes
}

/// Render blocks as HTML. Unknown node types render nothing.
pub fn render(blocks: &[Block]) -> Markup {
    let nodes = group(blocks);
    html! {
        @for node in &nodes {
            @match node {
                Node::Single(block) => {
                    (render_block(block))
                }
                Node::List(ListKind::Bullet, items) => {
                    ul {
                        @for item in items { li { (render_children(item)) } }
                    }
                }
                Node::List(ListKind::Number, items) => {
                    ol {
                        @for item in items { li { (render_children(item)) } }
                    }
                }
            }
        }
    }
}

fn render_block(block: &TextBlock) -> Markup {
    let children = render_children(block);
    match block.style.as_deref().unwrap_or("normal") {
        "h1" => html! { h1 { (children) } },
        "h2" => html! { h2 { (children) } },
        "h3" => html! { h3 { (children) } },
        "h4" => html! { h4 { (children) } },
        "h5" => html! { h5 { (children) } },
        "h6" => html! { h6 { (children) } },
        "blockquote" => html! { blockquote { (children) } },
        _ => html! { p { (children) } },
    }
}

fn render_children(block: &TextBlock) -> Markup {
    html! {
        @for span in &block.children {
            (render_span(span, &block.mark_defs))
        }
    }
}

/// The first mark is the outermost element.
fn render_span(span: &Span, defs: &[MarkDef]) -> Markup {
    let mut inner = html! { (span.text.as_deref().unwrap_or("")) };
    for mark in span.marks.iter().rev() {
        inner = wrap_mark(mark, defs, inner);
    }
    inner
}

/// An anchor target, if it is `http(s)`, `mailto` or site-relative.
/// Anything else (`javascript:`, `data:`, protocol-relative) is dropped.
pub fn safe_href(url: &str) -> Option<&str> {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    let allowed = ["https://", "http://", "mailto:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
        || (url.starts_with('/') && !url.starts_with("//") && !url.starts_with("/\\"));
    allowed.then_some(url)
}

fn wrap_mark(mark: &str, defs: &[MarkDef], inner: Markup) -> Markup {
    match mark {
        "strong" => html! { strong { (inner) } },
        "em" => html! { em { (inner) } },
        "code" => html! { code { (inner) } },
        "underline" => html! { u { (inner) } },
        "strike-through" => html! { s { (inner) } },
        key => match defs.iter().find(|d| d.key == key) {
            Some(MarkDef {
                kind,
                href: Some(href),
                ..
            }) if kind == "link" => match safe_href(href) {
                Some(href) => html! {
                    a href=(href) target="_blank" rel="noopener noreferrer" { (inner) }
                },
                None => inner,
            },
            _ => inner,
        },
    }
}

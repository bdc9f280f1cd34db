//! Heading collection and table-of-contents generation.

use crate::node::{Node, NodeContent, NodeKind, Part, MAX_DEPTH};
use crate::registry::{ElementTag, Registry};
use crate::segment::split_keywords;

/// One heading found in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRecord {
    /// Heading level 1-5.
    pub level: u8,
    /// Anchor id, generated once and cached on the node.
    pub id: String,
    /// Plain-text title.
    pub title: String,
    /// Position in document order (0-based).
    pub index: usize,
}

/// Collect headings in document order, assigning a sequential
/// `heading-N` id to any heading that lacks one.
///
/// Writing the id back onto the node is the one mutation this module
/// performs, and it is idempotent: a second collection over the same tree
/// yields identical ids. The walk is depth-bounded by [`MAX_DEPTH`];
/// anything deeper is ignored rather than recursed into.
pub fn collect(nodes: &mut [Node], registry: &Registry) -> Vec<HeadingRecord> {
    let mut records = Vec::new();
    let mut counter = 0usize;
    for node in nodes.iter_mut() {
        walk(node, registry, &mut records, &mut counter, 0);
    }
    records
}

fn walk(
    node: &mut Node,
    registry: &Registry,
    records: &mut Vec<HeadingRecord>,
    counter: &mut usize,
    depth: usize,
) {
    if depth > MAX_DEPTH {
        return;
    }

    if let Some(level) = heading_level(node, registry) {
        *counter += 1;
        if !node.attrs.contains("id") {
            node.attrs.set("id", format!("heading-{}", counter));
        }
        let id = node.attrs.get("id").unwrap_or_default().to_string();
        records.push(HeadingRecord {
            level,
            id,
            title: node.content.plain_text(),
            index: records.len(),
        });
    }

    match &mut node.content {
        NodeContent::Text(_) => {}
        NodeContent::Child(child) => walk(child, registry, records, counter, depth + 1),
        NodeContent::Parts(parts) => {
            for part in parts {
                if let Part::Node(n) = part {
                    walk(n, registry, records, counter, depth + 1);
                }
            }
        }
    }
}

/// A node counts as a heading if it is a resolved heading node, or an
/// unresolved keyword span whose list contains a heading keyword.
fn heading_level(node: &Node, registry: &Registry) -> Option<u8> {
    match node.kind {
        NodeKind::Heading(level) => Some(level),
        NodeKind::KeywordSpan => {
            let keywords = split_keywords(node.attrs.get("keywords")?);
            keywords.iter().find_map(|kw| match registry.resolve(kw) {
                Some(desc) => match desc.tag {
                    ElementTag::Heading(level) => Some(level),
                    _ => None,
                },
                None => None,
            })
        }
        _ => None,
    }
}

/// Render the TOC as a flat ordered list, one entry per heading in
/// document order, levels exposed as classes.
pub fn render_toc(records: &[HeadingRecord]) -> String {
    if records.is_empty() {
        return "<nav class=\"toc\"></nav>".to_string();
    }

    let mut out = String::with_capacity(records.len() * 64 + 32);
    out.push_str("<nav class=\"toc\">\n<ol>\n");
    for record in records {
        out.push_str(&format!(
            "<li class=\"toc-level-{}\"><a href=\"#{}\">{}</a></li>\n",
            record.level,
            record.id,
            html_escape::encode_text(&record.title)
        ));
    }
    out.push_str("</ol>\n</nav>");
    out
}

//! Node tree produced by the parser and consumed by the HTML renderer.
//!
//! The tree is a closed set of node kinds (no string-keyed dispatch):
//! extending the notation means adding an enum case and a `match` arm,
//! not registering a name. Every node carries its content plus an ordered
//! attribute list; the tree is strictly acyclic and traversal depth is
//! bounded by [`MAX_DEPTH`] at render time.

/// Hard guard on recursive traversal depth, enforced by the renderer and
/// the heading collector.
pub const MAX_DEPTH: usize = 100;

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Text paragraph.
    Paragraph,
    /// Bold span.
    Strong,
    /// Italic span.
    Em,
    /// Generic wrapper (`class` attribute decides box/highlight).
    Div,
    /// Section heading, level 1-5.
    Heading(u8),
    /// Unordered list.
    Ul,
    /// Ordered list.
    Ol,
    /// List item.
    Li,
    /// Collapsible block (`spoiler` attribute for the spoiler variant).
    Details,
    /// Fenced verbatim block.
    Pre,
    /// Inline code span.
    Code,
    /// Image directive.
    Image,
    /// Recovered parse error carrying the original text.
    Error,
    /// Table-of-contents placeholder, expanded at render time.
    Toc,
    /// Ruby annotation (reading stored in the `reading` attribute).
    Ruby,
    /// A span with an unresolved keyword list (stored in the `keywords`
    /// attribute). Nesting-order resolution is deferred to rendering.
    KeywordSpan,
}

impl NodeKind {
    /// Short name for statistics and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Paragraph => "p",
            NodeKind::Strong => "strong",
            NodeKind::Em => "em",
            NodeKind::Div => "div",
            NodeKind::Heading(1) => "h1",
            NodeKind::Heading(2) => "h2",
            NodeKind::Heading(3) => "h3",
            NodeKind::Heading(4) => "h4",
            NodeKind::Heading(_) => "h5",
            NodeKind::Ul => "ul",
            NodeKind::Ol => "ol",
            NodeKind::Li => "li",
            NodeKind::Details => "details",
            NodeKind::Pre => "pre",
            NodeKind::Code => "code",
            NodeKind::Image => "image",
            NodeKind::Error => "error",
            NodeKind::Toc => "toc",
            NodeKind::Ruby => "ruby",
            NodeKind::KeywordSpan => "keyword-span",
        }
    }
}

/// A piece of mixed content: raw text or a nested node.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    Node(Node),
}

/// Node content: raw text, a single child, or an ordered mixed sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Text(String),
    Child(Box<Node>),
    Parts(Vec<Part>),
}

impl NodeContent {
    /// Flatten to plain text, dropping markup. Used for heading titles.
    pub fn plain_text(&self) -> String {
        match self {
            NodeContent::Text(t) => t.clone(),
            NodeContent::Child(node) => node.content.plain_text(),
            NodeContent::Parts(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        Part::Text(t) => out.push_str(t),
                        Part::Node(n) => out.push_str(&n.content.plain_text()),
                    }
                }
                out
            }
        }
    }
}

/// Ordered string-keyed attribute map.
///
/// Insertion order is preserved so rendered attribute output is
/// deterministic. Setting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    entries: Vec<(String, String)>,
}

impl Attrs {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Look up an attribute value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any existing value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single node in the document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub content: NodeContent,
    pub attrs: Attrs,
}

impl Node {
    /// Create a node with raw text content.
    pub fn text(kind: NodeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            content: NodeContent::Text(text.into()),
            attrs: Attrs::new(),
        }
    }

    /// Create a node wrapping a single child.
    pub fn child(kind: NodeKind, child: Node) -> Self {
        Self {
            kind,
            content: NodeContent::Child(Box::new(child)),
            attrs: Attrs::new(),
        }
    }

    /// Create a node with mixed content parts.
    pub fn parts(kind: NodeKind, parts: Vec<Part>) -> Self {
        Self {
            kind,
            content: NodeContent::Parts(parts),
            attrs: Attrs::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }

    /// Build a recovered-error node carrying the original text.
    pub fn recovered_error(raw: impl Into<String>, message: impl Into<String>, line: u32) -> Self {
        Self::text(NodeKind::Error, raw)
            .with_attr("message", message)
            .with_attr("line", line.to_string())
    }
}

/// Statistics derivable from a node list without re-parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Total number of nodes, including nested ones.
    pub node_count: usize,
    /// Number of recovered-error nodes.
    pub error_count: usize,
    /// Per-kind counts in first-seen order.
    pub kind_counts: Vec<(&'static str, usize)>,
}

impl Stats {
    pub fn from_nodes(nodes: &[Node]) -> Self {
        let mut stats = Stats::default();
        for node in nodes {
            stats.count(node);
        }
        stats
    }

    fn count(&mut self, node: &Node) {
        self.node_count += 1;
        if node.kind == NodeKind::Error {
            self.error_count += 1;
        }
        let name = node.kind.as_str();
        if let Some(entry) = self.kind_counts.iter_mut().find(|(k, _)| *k == name) {
            entry.1 += 1;
        } else {
            self.kind_counts.push((name, 1));
        }
        match &node.content {
            NodeContent::Text(_) => {}
            NodeContent::Child(child) => self.count(child),
            NodeContent::Parts(parts) => {
                for part in parts {
                    if let Part::Node(n) = part {
                        self.count(n);
                    }
                }
            }
        }
    }
}

//! Block parser with graceful error recovery.
//!
//! Drives the segmenter and keyword registry into a node tree. Parsing
//! always completes: a structurally invalid construct becomes an error node
//! carrying the original text plus a diagnostic, never a hard failure.

use crate::diagnostics::{Category, Diagnostic, Diagnostics};
use crate::footnote::{FootnoteManager, FootnoteRecord};
use crate::inline::{combination_advisory, parse_inline};
use crate::node::{Node, NodeKind, Part, Stats};
use crate::registry::{ElementTag, Registry};
use crate::segment::{ordered_item, segment, Line, RawBlock};

/// Result of one parse run.
#[derive(Debug)]
pub struct ParseResult {
    /// Top-level nodes in document order (may contain error nodes).
    pub nodes: Vec<Node>,
    /// Footnotes in first-seen source order.
    pub footnotes: Vec<FootnoteRecord>,
    /// Problems recovered during parsing.
    pub diagnostics: Diagnostics,
}

impl ParseResult {
    /// Check if parsing completed without any diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Derive node statistics without re-parsing.
    pub fn stats(&self) -> Stats {
        Stats::from_nodes(&self.nodes)
    }
}

/// Marker-notation parser.
///
/// One parser drives one document conversion at a time; per-document state
/// (footnote numbering, diagnostics) is reset on every `parse` call.
/// Sharing an instance across threads is not supported: the `&mut self`
/// API makes that a compile error rather than a silent hazard. Separate
/// documents can be parsed concurrently with separate instances.
pub struct Parser {
    registry: Registry,
    footnotes: FootnoteManager,
    diagnostics: Diagnostics,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a parser over the built-in keyword table.
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// Create a parser with caller-supplied keyword aliases.
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            footnotes: FootnoteManager::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Parse one document. Never fails; malformed input degrades to error
    /// nodes and diagnostics.
    pub fn parse(&mut self, input: &str) -> ParseResult {
        self.footnotes = FootnoteManager::new();
        self.diagnostics = Diagnostics::new();

        let mut nodes = Vec::with_capacity(16);
        for block in segment(input) {
            if let Some(node) = self.build_block(block) {
                nodes.push(node);
            }
        }

        ParseResult {
            nodes,
            footnotes: std::mem::take(&mut self.footnotes).into_records(),
            diagnostics: std::mem::take(&mut self.diagnostics),
        }
    }

    fn build_block(&mut self, block: RawBlock<'_>) -> Option<Node> {
        match block {
            RawBlock::Paragraph { lines, start_line } => {
                Some(self.build_paragraph(&lines, start_line))
            }
            RawBlock::Marker {
                keywords,
                inline_body,
                body,
                closed,
                start_line,
                raw_open,
            } => self.build_marker(keywords, inline_body, &body, closed, start_line, raw_open),
            RawBlock::List { lines, .. } => Some(self.build_list(&lines)),
            RawBlock::Image {
                directive,
                start_line,
            } => Some(self.build_image(directive, start_line)),
            RawBlock::Fence {
                lang,
                body,
                closed,
                start_line,
            } => Some(self.build_fence(lang, &body, closed, start_line)),
            RawBlock::StrayClose { start_line } => {
                self.diagnostics.push(
                    Diagnostic::warning(
                        Category::MalformedInline,
                        start_line,
                        "closing ;;; without an open marker block",
                    )
                    .with_suggestion("remove the stray line or add an opening ;;;keyword line"),
                );
                None
            }
        }
    }

    fn build_paragraph(&mut self, lines: &[Line<'_>], start_line: u32) -> Node {
        let text = join_lines(lines);
        let parts = parse_inline(
            &text,
            start_line,
            &self.registry,
            &mut self.footnotes,
            &mut self.diagnostics,
        );
        Node::parts(NodeKind::Paragraph, parts)
    }

    fn build_marker(
        &mut self,
        tokens: Vec<String>,
        inline_body: Option<&str>,
        body: &[Line<'_>],
        closed: bool,
        start_line: u32,
        raw_open: &str,
    ) -> Option<Node> {
        if !closed {
            self.diagnostics.push(
                Diagnostic::error(
                    Category::UnclosedMarker,
                    start_line,
                    format!("marker block opened at line {} is never closed", start_line),
                )
                .with_snippet(raw_open)
                .with_suggestion("close the block with a line containing only ;;;"),
            );
            let mut raw = raw_open.to_string();
            for line in body {
                raw.push('\n');
                raw.push_str(line.text);
            }
            return Some(Node::recovered_error(
                raw,
                "unclosed marker block",
                start_line,
            ));
        }

        let (keywords, attrs) = partition_tokens(&tokens);
        if keywords.is_empty() {
            self.diagnostics.push(
                Diagnostic::error(
                    Category::MalformedInline,
                    start_line,
                    "marker block has no keywords",
                )
                .with_snippet(raw_open),
            );
            return Some(Node::recovered_error(
                raw_open,
                "marker block has no keywords",
                start_line,
            ));
        }

        let body_text = match inline_body {
            Some(text) => text.to_string(),
            None => join_lines(body),
        };
        let body_line = if inline_body.is_some() {
            start_line
        } else {
            start_line + 1
        };

        // A single known keyword resolves to a concrete node right here;
        // compound lists stay unresolved until render time.
        if keywords.len() == 1 {
            return Some(match self.registry.resolve(&keywords[0]) {
                Some(desc) => {
                    let tag = desc.tag;
                    self.build_element(tag, &body_text, body_line, &attrs)
                }
                None => {
                    self.diagnostics.push(
                        Diagnostic::error(
                            Category::UnknownKeyword,
                            start_line,
                            format!("unknown keyword: {}", keywords[0]),
                        )
                        .with_snippet(raw_open)
                        .with_suggestion("check the keyword spelling against the keyword list"),
                    );
                    let mut raw = raw_open.to_string();
                    if !body_text.is_empty() {
                        raw.push('\n');
                        raw.push_str(&body_text);
                    }
                    Node::recovered_error(
                        raw,
                        format!("unknown keyword: {}", keywords[0]),
                        start_line,
                    )
                }
            });
        }

        if let Some(advice) = combination_advisory(&self.registry, &keywords, start_line) {
            self.diagnostics.push(advice);
        }

        let parts = parse_inline(
            &body_text,
            body_line,
            &self.registry,
            &mut self.footnotes,
            &mut self.diagnostics,
        );
        let mut node = Node::parts(NodeKind::KeywordSpan, parts)
            .with_attr("keywords", keywords.join(","))
            .with_attr("line", start_line.to_string());
        for (key, value) in attrs {
            node.attrs.set(key, value);
        }
        Some(node)
    }

    /// Build the concrete node for a single resolved keyword.
    fn build_element(
        &mut self,
        tag: ElementTag,
        body_text: &str,
        body_line: u32,
        attrs: &[(String, String)],
    ) -> Node {
        let mut node = if tag == ElementTag::Toc {
            Node::text(NodeKind::Toc, "")
        } else {
            let parts = parse_inline(
                body_text,
                body_line,
                &self.registry,
                &mut self.footnotes,
                &mut self.diagnostics,
            );
            match tag {
                ElementTag::Strong => Node::parts(NodeKind::Strong, parts),
                ElementTag::Em => Node::parts(NodeKind::Em, parts),
                ElementTag::Box => Node::parts(NodeKind::Div, parts).with_attr("class", "box"),
                ElementTag::Highlight => {
                    Node::parts(NodeKind::Div, parts).with_attr("class", "highlight")
                }
                ElementTag::Heading(level) => Node::parts(NodeKind::Heading(level), parts),
                ElementTag::Collapsible { spoiler } => {
                    let node = Node::parts(NodeKind::Details, parts);
                    if spoiler {
                        node.with_attr("spoiler", "true")
                    } else {
                        node
                    }
                }
                ElementTag::Toc => unreachable!("handled above"),
            }
        };
        for (key, value) in attrs {
            node.attrs.set(key.clone(), value.clone());
        }
        node
    }

    fn build_list(&mut self, lines: &[Line<'_>]) -> Node {
        let ordered = ordered_item(lines[0].trimmed()).is_some();

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let trimmed = line.trimmed();
            let item_text = match ordered_item(trimmed) {
                Some(rest) => rest,
                None => trimmed
                    .strip_prefix("- ")
                    .or_else(|| trimmed.strip_prefix("* "))
                    .or_else(|| trimmed.strip_prefix("+ "))
                    .unwrap_or("")
                    .trim_start(),
            };
            let parts = parse_inline(
                item_text,
                line.number,
                &self.registry,
                &mut self.footnotes,
                &mut self.diagnostics,
            );
            items.push(Part::Node(Node::parts(NodeKind::Li, parts)));
        }

        let kind = if ordered { NodeKind::Ol } else { NodeKind::Ul };
        Node::parts(kind, items)
    }

    fn build_image(&mut self, directive: &str, start_line: u32) -> Node {
        let directive = directive.trim();
        let (src, alt) = match directive.split_once('|') {
            Some((src, alt)) => (src.trim(), alt.trim()),
            None => (directive, ""),
        };

        if src.is_empty() {
            self.diagnostics.push(
                Diagnostic::error(
                    Category::MalformedInline,
                    start_line,
                    "image directive has no path",
                )
                .with_snippet(format!("画像:{}", directive))
                .with_suggestion("write 画像:path/to/image.png|alt text"),
            );
            return Node::recovered_error(
                format!("画像:{}", directive),
                "image directive has no path",
                start_line,
            );
        }

        Node::text(NodeKind::Image, "")
            .with_attr("src", src)
            .with_attr("alt", alt)
    }

    fn build_fence(
        &mut self,
        lang: &str,
        body: &[Line<'_>],
        closed: bool,
        start_line: u32,
    ) -> Node {
        if !closed {
            self.diagnostics.push(
                Diagnostic::error(
                    Category::UnclosedMarker,
                    start_line,
                    format!("code fence opened at line {} is never closed", start_line),
                )
                .with_suggestion("close the fence with a ``` line"),
            );
        }

        let node = Node::text(NodeKind::Pre, join_lines(body));
        if lang.is_empty() {
            node
        } else {
            node.with_attr("lang", lang)
        }
    }
}

/// Split marker tokens into keywords and `key=value` attribute pairs.
/// Japanese attribute keys normalize to their canonical names.
pub(crate) fn partition_tokens(tokens: &[String]) -> (Vec<String>, Vec<(String, String)>) {
    let mut keywords = Vec::with_capacity(tokens.len());
    let mut attrs = Vec::new();

    for token in tokens {
        match token.split_once('=') {
            Some((key, value)) => {
                let key = match key {
                    "色" | "color" => "color",
                    "要約" | "summary" => "summary",
                    other => other,
                };
                attrs.push((key.to_string(), value.to_string()));
            }
            None => keywords.push(token.clone()),
        }
    }

    (keywords, attrs)
}

fn join_lines(lines: &[Line<'_>]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(line.text);
    }
    out
}

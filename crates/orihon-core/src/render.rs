//! HTML renderer: per-node-kind dispatch, recursive content rendering with
//! a depth guard, and the whole-document footnote and diagnostic passes.
//!
//! Dispatch is a closed `match` over [`NodeKind`]; extending the notation
//! means adding an arm, not registering a name. After per-node rendering,
//! two whole-document passes run in fixed order: footnote placeholders are
//! resolved first, then the footnote section is appended (references must
//! exist before the section does).

use crate::compound::{normalize_color, render_compound};
use crate::diagnostics::{Category, Diagnostic, Diagnostics};
use crate::footnote::{self, FootnoteRecord};
use crate::node::{Node, NodeContent, NodeKind, Part, MAX_DEPTH};
use crate::registry::Registry;
use crate::segment::split_keywords;
use crate::toc::{render_toc, HeadingRecord};

/// Rendering switches. Both are purely additive: disabled, the output is
/// byte-identical to a plain render.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Prepend a collapsible diagnostics summary to the output.
    pub embed_diagnostics: bool,
    /// Pair the original source with the rendered HTML for dual-view output.
    pub include_source: bool,
}

/// The render orchestrator. Pure apart from the diagnostics it returns;
/// one instance may render any number of documents.
pub struct HtmlRenderer<'r> {
    registry: &'r Registry,
    options: RenderOptions,
}

impl<'r> HtmlRenderer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(registry: &'r Registry, options: RenderOptions) -> Self {
        Self { registry, options }
    }

    /// Render a whole document.
    ///
    /// Returns the HTML plus any render-time diagnostics (currently only
    /// depth-guard hits). `diagnostics` are the parse-time problems, used
    /// when diagnostic embedding is enabled.
    pub fn render_document(
        &self,
        nodes: &[Node],
        headings: &[HeadingRecord],
        footnotes: &[FootnoteRecord],
        diagnostics: &Diagnostics,
        source: &str,
    ) -> (String, Diagnostics) {
        let mut render_diags = Diagnostics::new();

        let mut body = String::with_capacity(source.len() * 2);
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                body.push('\n');
            }
            body.push_str(&self.render_node(node, 0, headings, &mut render_diags));
        }

        // Fixed order: references first, then the section that links back.
        body = footnote::resolve_placeholders(&body, footnotes);
        if !footnotes.is_empty() {
            body.push('\n');
            body.push_str(&footnote::render_section(footnotes));
        }

        if self.options.embed_diagnostics {
            let all: Vec<&Diagnostic> =
                diagnostics.iter().chain(render_diags.iter()).collect();
            if !all.is_empty() {
                body = format!("{}\n{}", embed_diagnostics(&all), body);
            }
        }

        if self.options.include_source {
            body = format!(
                "<div class=\"dual-view\">\n<pre class=\"source\">{}</pre>\n<div class=\"rendered\">\n{}\n</div>\n</div>",
                html_escape::encode_text(source),
                body
            );
        }

        (body, render_diags)
    }

    fn render_node(
        &self,
        node: &Node,
        depth: usize,
        headings: &[HeadingRecord],
        diags: &mut Diagnostics,
    ) -> String {
        if depth > MAX_DEPTH {
            diags.push(Diagnostic::warning(
                Category::RecursionLimitExceeded,
                node.attrs
                    .get("line")
                    .and_then(|l| l.parse().ok())
                    .unwrap_or(0),
                format!("nesting deeper than {} levels is not rendered", MAX_DEPTH),
            ));
            return "<span class=\"render-error\">nesting too deep</span>".to_string();
        }

        match node.kind {
            NodeKind::Paragraph => {
                format!("<p>{}</p>", self.render_content(node, depth, headings, diags))
            }
            NodeKind::Strong => format!(
                "<strong>{}</strong>",
                self.render_content(node, depth, headings, diags)
            ),
            NodeKind::Em => format!(
                "<em>{}</em>",
                self.render_content(node, depth, headings, diags)
            ),
            NodeKind::Div => {
                let class = node.attrs.get("class").unwrap_or("box");
                let inner = self.render_content(node, depth, headings, diags);
                match node.attrs.get("color").and_then(normalize_color) {
                    Some(color) if class == "highlight" => format!(
                        "<div class=\"highlight\" style=\"background-color: {}\">{}</div>",
                        color, inner
                    ),
                    _ => format!("<div class=\"{}\">{}</div>", class, inner),
                }
            }
            NodeKind::Heading(level) => {
                let inner = self.render_content(node, depth, headings, diags);
                match node.attrs.get("id") {
                    Some(id) => format!(
                        "<h{} id=\"{}\">{}</h{}>",
                        level,
                        html_escape::encode_double_quoted_attribute(id),
                        inner,
                        level
                    ),
                    None => format!("<h{}>{}</h{}>", level, inner, level),
                }
            }
            NodeKind::Ul => format!(
                "<ul>\n{}</ul>",
                self.render_list_items(node, depth, headings, diags)
            ),
            NodeKind::Ol => format!(
                "<ol>\n{}</ol>",
                self.render_list_items(node, depth, headings, diags)
            ),
            NodeKind::Li => format!(
                "<li>{}</li>",
                self.render_content(node, depth, headings, diags)
            ),
            NodeKind::Details => {
                let spoiler = node.attrs.get("spoiler").is_some();
                let summary = node
                    .attrs
                    .get("summary")
                    .map(|s| html_escape::encode_text(s).into_owned())
                    .unwrap_or_else(|| {
                        if spoiler { "ネタバレ" } else { "詳細" }.to_string()
                    });
                let inner = self.render_content(node, depth, headings, diags);
                if spoiler {
                    format!(
                        "<details class=\"spoiler\"><summary>{}</summary>{}</details>",
                        summary, inner
                    )
                } else {
                    format!("<details><summary>{}</summary>{}</details>", summary, inner)
                }
            }
            NodeKind::Pre => {
                let code = match &node.content {
                    NodeContent::Text(t) => html_escape::encode_text(t).into_owned(),
                    other => html_escape::encode_text(&other.plain_text()).into_owned(),
                };
                match node.attrs.get("lang") {
                    Some(lang) => format!(
                        "<pre><code class=\"language-{}\">{}</code></pre>",
                        html_escape::encode_double_quoted_attribute(lang),
                        code
                    ),
                    None => format!("<pre><code>{}</code></pre>", code),
                }
            }
            NodeKind::Code => format!(
                "<code>{}</code>",
                html_escape::encode_text(&node.content.plain_text())
            ),
            NodeKind::Image => {
                let src = node.attrs.get("src").unwrap_or("");
                let alt = node.attrs.get("alt").unwrap_or("");
                format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    html_escape::encode_double_quoted_attribute(src),
                    html_escape::encode_double_quoted_attribute(alt)
                )
            }
            NodeKind::Error => {
                let message = node.attrs.get("message").unwrap_or("parse error");
                let line = node.attrs.get("line").unwrap_or("0");
                format!(
                    "<span class=\"parse-error\" data-line=\"{}\" title=\"{}\">{}</span>",
                    html_escape::encode_double_quoted_attribute(line),
                    html_escape::encode_double_quoted_attribute(message),
                    escape_with_breaks(&node.content.plain_text())
                )
            }
            NodeKind::Toc => render_toc(headings),
            NodeKind::Ruby => {
                let reading = node.attrs.get("reading").unwrap_or("");
                format!(
                    "<ruby>{}<rt>{}</rt></ruby>",
                    html_escape::encode_text(&node.content.plain_text()),
                    html_escape::encode_text(reading)
                )
            }
            NodeKind::KeywordSpan => {
                let inner = self.render_content(node, depth, headings, diags);
                let keywords =
                    split_keywords(node.attrs.get("keywords").unwrap_or_default());
                render_compound(self.registry, &keywords, &inner, &node.attrs)
            }
        }
    }

    /// Shared recursive content routine: text is HTML-escaped (newlines
    /// become line breaks), child nodes recurse into the dispatcher, mixed
    /// sequences concatenate each part's own rendering.
    fn render_content(
        &self,
        node: &Node,
        depth: usize,
        headings: &[HeadingRecord],
        diags: &mut Diagnostics,
    ) -> String {
        match &node.content {
            NodeContent::Text(t) => escape_with_breaks(t),
            NodeContent::Child(child) => self.render_node(child, depth + 1, headings, diags),
            NodeContent::Parts(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        Part::Text(t) => out.push_str(&escape_with_breaks(t)),
                        Part::Node(n) => {
                            out.push_str(&self.render_node(n, depth + 1, headings, diags))
                        }
                    }
                }
                out
            }
        }
    }

    fn render_list_items(
        &self,
        node: &Node,
        depth: usize,
        headings: &[HeadingRecord],
        diags: &mut Diagnostics,
    ) -> String {
        let mut out = String::new();
        if let NodeContent::Parts(parts) = &node.content {
            for part in parts {
                if let Part::Node(item) = part {
                    out.push_str(&self.render_node(item, depth + 1, headings, diags));
                    out.push('\n');
                }
            }
        }
        out
    }
}

/// HTML-escape text, turning embedded newlines into `<br>` line breaks.
fn escape_with_breaks(text: &str) -> String {
    html_escape::encode_text(text).replace('\n', "<br>\n")
}

/// Collapsible diagnostics summary prepended when embedding is on.
fn embed_diagnostics(diagnostics: &[&Diagnostic]) -> String {
    let mut out = String::with_capacity(diagnostics.len() * 64 + 96);
    out.push_str("<details class=\"diagnostics\" open>\n<summary>");
    out.push_str(&format!(
        "{} problem(s) found",
        diagnostics.len()
    ));
    out.push_str("</summary>\n<ul>\n");
    for d in diagnostics {
        let class = if d.is_error() {
            "diagnostic-error"
        } else {
            "diagnostic-warning"
        };
        out.push_str(&format!(
            "<li class=\"{}\" data-line=\"{}\">{}</li>\n",
            class,
            d.line,
            html_escape::encode_text(&d.to_string())
        ));
    }
    out.push_str("</ul>\n</details>");
    out
}

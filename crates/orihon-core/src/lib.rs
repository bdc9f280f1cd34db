//! # Orihon Core
//!
//! A marker-notation document engine for non-technical long-form writers.
//!
//! Orihon converts plain text with `;;;keyword` marker blocks, ruby
//! annotations, and `((footnote))` markers into a typed node tree, then
//! deterministically into HTML. Malformed input never aborts a conversion:
//! problems surface as [`Diagnostic`] data and inline error markers.
//!
//! ## Quick Start
//!
//! ```rust
//! use orihon_core::{convert, Config};
//!
//! let input = ";;;見出し1;;; はじめに ;;;\n\n本文です。";
//! let result = convert(input, &Config::default());
//!
//! assert!(result.html.contains("<h1"));
//! assert!(result.diagnostics.is_empty());
//! ```
//!
//! ## Error Recovery
//!
//! ```rust
//! use orihon_core::Parser;
//!
//! let input = ";;;太字\nnever closed";
//! let mut parser = Parser::new();
//! let result = parser.parse(input);
//!
//! // The document still parses; the problem is data, not a panic.
//! assert!(result.diagnostics.has_errors());
//! assert!(!result.nodes.is_empty());
//! ```
//!
//! ## Threading
//!
//! All per-document state lives in the [`Parser`] (and the context objects
//! it owns). Separate documents may be converted concurrently from
//! different threads with separate instances; sharing one mutable instance
//! across threads is not supported.

pub mod checker;
pub mod compound;
pub mod diagnostics;
pub mod footnote;
pub mod inline;
pub mod node;
pub mod parser;
pub mod registry;
pub mod render;
pub mod segment;
pub mod toc;

pub use diagnostics::{Category, Diagnostic, Diagnostics, Severity};
pub use footnote::FootnoteRecord;
pub use node::{Attrs, Node, NodeContent, NodeKind, Part, Stats, MAX_DEPTH};
pub use parser::{ParseResult, Parser};
pub use registry::{ElementTag, KeywordDescriptor, Registry};
pub use render::{HtmlRenderer, RenderOptions};
pub use toc::HeadingRecord;

/// Read-only configuration bag for one conversion.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Template identifier, forwarded untouched to an external
    /// template-rendering collaborator. The engine never selects layouts.
    pub template: Option<String>,
    /// Prepend a collapsible diagnostics summary to the HTML.
    pub embed_diagnostics: bool,
    /// Pair the original source with the rendered HTML (dual view).
    pub include_source: bool,
    /// Extra keyword aliases: `(alias, built-in keyword)`.
    pub keyword_overrides: Vec<(String, String)>,
}

/// Everything one conversion produces.
#[derive(Debug)]
pub struct Conversion {
    /// Final HTML.
    pub html: String,
    /// The node tree, for statistics or further inspection without
    /// re-parsing.
    pub nodes: Vec<Node>,
    /// Headings in document order, ids already written onto the nodes.
    pub headings: Vec<HeadingRecord>,
    /// Footnotes in source order.
    pub footnotes: Vec<FootnoteRecord>,
    /// Parse-time and render-time problems, in that order.
    pub diagnostics: Diagnostics,
    /// The template identifier from the configuration, passed through for
    /// the caller's template collaborator.
    pub template: Option<String>,
}

impl Conversion {
    /// Derive node statistics without re-parsing.
    pub fn stats(&self) -> Stats {
        Stats::from_nodes(&self.nodes)
    }
}

/// Convert one document: parse, collect headings, render.
///
/// All mutable state is scoped to this call; nothing global is touched.
/// The call is synchronous and does no I/O. Callers needing a timeout
/// impose one around the whole call.
pub fn convert(input: &str, config: &Config) -> Conversion {
    let registry = Registry::with_overrides(config.keyword_overrides.clone());

    let mut parser = Parser::with_registry(registry.clone());
    let ParseResult {
        mut nodes,
        footnotes,
        mut diagnostics,
    } = parser.parse(input);

    let headings = toc::collect(&mut nodes, &registry);

    let renderer = HtmlRenderer::with_options(
        &registry,
        RenderOptions {
            embed_diagnostics: config.embed_diagnostics,
            include_source: config.include_source,
        },
    );
    let (html, render_diags) =
        renderer.render_document(&nodes, &headings, &footnotes, &diagnostics, input);
    diagnostics.extend(render_diags);

    Conversion {
        html,
        nodes,
        headings,
        footnotes,
        diagnostics,
        template: config.template.clone(),
    }
}

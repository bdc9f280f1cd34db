//! Compound element renderer: resolves the canonical nesting order for a
//! keyword list and wraps a rendered span with one tag per applied keyword.
//!
//! Wrapping runs innermost-to-outermost over the registry's canonical
//! order, so `太字,イタリック` and `イタリック,太字` produce identical
//! output. Unrecognized keywords fall back to a generic labeled span;
//! content is never silently dropped.

use crate::node::Attrs;
use crate::registry::{ElementTag, Registry};

/// Wrap `inner_html` with one element per keyword, innermost first.
pub fn render_compound(
    registry: &Registry,
    keywords: &[String],
    inner_html: &str,
    attrs: &Attrs,
) -> String {
    let mut html = inner_html.to_string();

    for keyword in registry.canonical_order(keywords) {
        html = match registry.resolve(keyword).map(|d| d.tag) {
            Some(ElementTag::Strong) => format!("<strong>{}</strong>", html),
            Some(ElementTag::Em) => format!("<em>{}</em>", html),
            Some(ElementTag::Box) => format!("<div class=\"box\">{}</div>", html),
            Some(ElementTag::Highlight) => {
                match attrs.get("color").and_then(normalize_color) {
                    Some(color) => format!(
                        "<div class=\"highlight\" style=\"background-color: {}\">{}</div>",
                        color, html
                    ),
                    None => format!("<div class=\"highlight\">{}</div>", html),
                }
            }
            Some(ElementTag::Heading(level)) => match attrs.get("id") {
                Some(id) => format!(
                    "<h{} id=\"{}\">{}</h{}>",
                    level,
                    html_escape::encode_double_quoted_attribute(id),
                    html,
                    level
                ),
                None => format!("<h{}>{}</h{}>", level, html, level),
            },
            Some(ElementTag::Collapsible { spoiler }) => {
                let summary = attrs
                    .get("summary")
                    .map(|s| html_escape::encode_text(s).into_owned())
                    .unwrap_or_else(|| default_summary(spoiler).to_string());
                if spoiler {
                    format!(
                        "<details class=\"spoiler\"><summary>{}</summary>{}</details>",
                        summary, html
                    )
                } else {
                    format!("<details><summary>{}</summary>{}</details>", summary, html)
                }
            }
            // 目次 inside a compound list has no sensible wrapping; it
            // degrades to the labeled-span fallback like an unknown keyword.
            Some(ElementTag::Toc) | None => format!(
                "<span class=\"unknown-keyword\" data-keyword=\"{}\">{}</span>",
                html_escape::encode_double_quoted_attribute(keyword),
                html
            ),
        };
    }

    html
}

fn default_summary(spoiler: bool) -> &'static str {
    if spoiler {
        "ネタバレ"
    } else {
        "詳細"
    }
}

/// Normalize a background color: `#RGB`/`#RRGGBB` hex (lowercased) or a
/// plain ASCII color name (lowercased). Anything else is rejected.
pub fn normalize_color(value: &str) -> Option<String> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if (hex.len() == 3 || hex.len() == 6) && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Some(format!("#{}", hex.to_ascii_lowercase()));
        }
        return None;
    }
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Some(value.to_ascii_lowercase());
    }
    None
}

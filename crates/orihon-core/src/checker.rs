//! Standalone syntax checker: cheap pre-flight validation without a full
//! parse and render.
//!
//! Pattern-matches the same error classes as the parser's recovery path
//! (unclosed markers, malformed inline constructs, unknown keywords) plus
//! document-level heuristics, and shares the [`Diagnostic`] shape so
//! downstream reporting code is common to both.

use crate::diagnostics::{Category, Diagnostic};
use crate::inline::combination_advisory;
use crate::parser::partition_tokens;
use crate::registry::{ElementTag, Registry};
use crate::segment::{split_keywords, split_lines};

/// Check a document against the built-in keyword table.
pub fn check(text: &str) -> Vec<Diagnostic> {
    check_with_registry(text, &Registry::new())
}

/// Check a document with caller-supplied keyword aliases.
pub fn check_with_registry(text: &str, registry: &Registry) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut pending_marker: Option<(u32, String)> = None;
    let mut fence_open: Option<u32> = None;
    let mut last_heading_level: Option<u8> = None;
    let mut seen_ids: Vec<(String, u32)> = Vec::new();

    for line in split_lines(text) {
        let trimmed = line.trimmed();

        if fence_open.is_some() {
            if trimmed == "```" {
                fence_open = None;
            }
            continue;
        }
        if trimmed.starts_with("```") {
            fence_open = Some(line.number);
            continue;
        }

        if trimmed == ";;;" {
            if pending_marker.take().is_none() {
                diagnostics.push(
                    Diagnostic::warning(
                        Category::MalformedInline,
                        line.number,
                        "closing ;;; without an open marker block",
                    )
                    .with_suggestion("remove the stray line or add an opening ;;;keyword line"),
                );
            }
            continue;
        }

        if let Some(after) = trimmed.strip_prefix(";;;") {
            // One-line form closes itself.
            let (token_list, self_closing) = match after.find(";;;") {
                Some(idx) if !after[idx + 3..].trim().is_empty() => (&after[..idx], true),
                Some(idx) => (&after[..idx], false),
                None => (after, false),
            };

            if !self_closing {
                if let Some((open_at, raw)) = pending_marker.replace((line.number, trimmed.to_string()))
                {
                    diagnostics.push(unclosed_marker(open_at, &raw));
                }
            }

            check_keywords(
                registry,
                token_list,
                trimmed,
                line.number,
                &mut last_heading_level,
                &mut seen_ids,
                &mut diagnostics,
            );
            continue;
        }

        // Inside a marker body the lines are content; inline checks still apply.
        check_inline(trimmed, line.number, &mut diagnostics);

        if let Some(directive) = trimmed.strip_prefix("画像:") {
            let src = directive.split('|').next().unwrap_or("").trim();
            if src.is_empty() {
                diagnostics.push(
                    Diagnostic::error(
                        Category::MalformedInline,
                        line.number,
                        "image directive has no path",
                    )
                    .with_snippet(trimmed)
                    .with_suggestion("write 画像:path/to/image.png|alt text"),
                );
            }
        }
    }

    if let Some((open_at, raw)) = pending_marker {
        diagnostics.push(unclosed_marker(open_at, &raw));
    }
    if let Some(open_at) = fence_open {
        diagnostics.push(
            Diagnostic::error(
                Category::UnclosedMarker,
                open_at,
                format!("code fence opened at line {} is never closed", open_at),
            )
            .with_suggestion("close the fence with a ``` line"),
        );
    }

    diagnostics
}

fn unclosed_marker(line: u32, raw: &str) -> Diagnostic {
    Diagnostic::error(
        Category::UnclosedMarker,
        line,
        format!("marker block opened at line {} is never closed", line),
    )
    .with_snippet(raw)
    .with_suggestion("close the block with a line containing only ;;;")
}

#[allow(clippy::too_many_arguments)]
fn check_keywords(
    registry: &Registry,
    token_list: &str,
    raw: &str,
    line: u32,
    last_heading_level: &mut Option<u8>,
    seen_ids: &mut Vec<(String, u32)>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let tokens = split_keywords(token_list);
    let (keywords, attrs) = partition_tokens(&tokens);

    if keywords.is_empty() {
        diagnostics.push(
            Diagnostic::error(Category::MalformedInline, line, "marker block has no keywords")
                .with_snippet(raw),
        );
        return;
    }

    if keywords.len() == 1 && registry.resolve(&keywords[0]).is_none() {
        diagnostics.push(
            Diagnostic::error(
                Category::UnknownKeyword,
                line,
                format!("unknown keyword: {}", keywords[0]),
            )
            .with_snippet(raw)
            .with_suggestion("check the keyword spelling against the keyword list"),
        );
    } else if let Some(advice) = combination_advisory(registry, &keywords, line) {
        diagnostics.push(advice);
    }

    // Document-level heuristics: heading level jumps and duplicate ids.
    let heading = keywords.iter().find_map(|kw| match registry.resolve(kw) {
        Some(desc) => match desc.tag {
            ElementTag::Heading(level) => Some(level),
            _ => None,
        },
        None => None,
    });
    if let Some(level) = heading {
        if let Some(last) = *last_heading_level {
            if level > last + 1 {
                diagnostics.push(Diagnostic::warning(
                    Category::HeadingSkip,
                    line,
                    format!("heading level jumps from {} to {}", last, level),
                ));
            }
        }
        *last_heading_level = Some(level);
    }

    for (key, value) in &attrs {
        if key == "id" {
            if let Some((_, first_line)) = seen_ids.iter().find(|(id, _)| id == value) {
                diagnostics.push(Diagnostic::warning(
                    Category::DuplicateHeadingId,
                    line,
                    format!("id \"{}\" already used at line {}", value, first_line),
                ));
            } else {
                seen_ids.push((value.clone(), line));
            }
        }
    }
}

/// Flag unmatched `((`, `《`, and dangling one-line markers on a single line.
fn check_inline(trimmed: &str, line: u32, diagnostics: &mut Vec<Diagnostic>) {
    let mut rest = trimmed;
    let mut offset = 0usize;
    while let Some(open) = rest.find("((") {
        match rest[open + 2..].find("))") {
            Some(close) => {
                let advance = open + 2 + close + 2;
                offset += advance;
                rest = &rest[advance..];
            }
            None => {
                diagnostics.push(
                    Diagnostic::error(
                        Category::MalformedInline,
                        line,
                        "footnote marker (( is never closed with ))",
                    )
                    .at_column(column_of(trimmed, offset + open))
                    .with_snippet(&trimmed[offset + open..]),
                );
                return;
            }
        }
    }

    let mut rest = trimmed;
    let mut offset = 0usize;
    while let Some(open) = rest.find('《') {
        match rest[open..].find('》') {
            Some(close) => {
                let advance = open + close + '》'.len_utf8();
                offset += advance;
                rest = &rest[advance..];
            }
            None => {
                diagnostics.push(
                    Diagnostic::error(
                        Category::MalformedInline,
                        line,
                        "ruby 《 is never closed with 》",
                    )
                    .at_column(column_of(trimmed, offset + open))
                    .with_snippet(&trimmed[offset + open..]),
                );
                return;
            }
        }
    }
}

fn column_of(line_text: &str, byte_pos: usize) -> u32 {
    line_text[..byte_pos].chars().count() as u32 + 1
}

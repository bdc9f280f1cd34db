//! Inline scanner for paragraph and marker-body text.
//!
//! Recognizes footnote markers `((...))` (registered with the footnote
//! manager and replaced by a numbered placeholder token), ruby annotations
//! (`｜base《reading》` or a trailing kanji run before `《reading》`), and
//! inline compound keyword spans `;;;keywords;;;content;;;` whose keyword
//! list is stored unresolved on the node.
//!
//! Greedy, left-to-right, no backtracking. A structurally invalid construct
//! becomes an error node carrying the original text plus a diagnostic;
//! scanning never fails.

use crate::diagnostics::{Category, Diagnostic, Diagnostics};
use crate::footnote::{placeholder, FootnoteManager};
use crate::node::{Node, NodeKind, Part};
use crate::registry::Registry;
use crate::segment::split_keywords;

/// Parse inline constructs out of `text`. `base_line` is the 1-based source
/// line of the first character; embedded newlines advance it.
pub fn parse_inline(
    text: &str,
    base_line: u32,
    registry: &Registry,
    footnotes: &mut FootnoteManager,
    diagnostics: &mut Diagnostics,
) -> Vec<Part> {
    let mut scanner = InlineScanner {
        text,
        base_line,
        registry,
        footnotes,
        diagnostics,
    };
    scanner.parse()
}

struct InlineScanner<'a, 'ctx> {
    text: &'a str,
    base_line: u32,
    registry: &'ctx Registry,
    footnotes: &'ctx mut FootnoteManager,
    diagnostics: &'ctx mut Diagnostics,
}

impl InlineScanner<'_, '_> {
    fn parse(&mut self) -> Vec<Part> {
        let mut parts: Vec<Part> = Vec::with_capacity(4);
        let mut text_start = 0usize;
        let mut pos = 0usize;

        while pos < self.text.len() {
            let rest = &self.text[pos..];

            if rest.starts_with("((") {
                match rest[2..].find("))") {
                    Some(off) => {
                        let content = &rest[2..2 + off];
                        flush(&mut parts, &self.text[text_start..pos]);
                        let number = self.footnotes.register(content);
                        parts.push(Part::Text(placeholder(number)));
                        pos += 2 + off + 2;
                        text_start = pos;
                        continue;
                    }
                    None => {
                        flush(&mut parts, &self.text[text_start..pos]);
                        self.malformed(pos, "footnote marker (( is never closed with ))");
                        parts.push(self.error_node(pos, "unclosed footnote marker"));
                        return parts;
                    }
                }
            }

            if rest.starts_with(";;;") {
                match self.scan_span(pos) {
                    SpanScan::Parsed { node, next } => {
                        flush(&mut parts, &self.text[text_start..pos]);
                        parts.push(Part::Node(node));
                        pos = next;
                        text_start = pos;
                        continue;
                    }
                    SpanScan::Malformed(message) => {
                        flush(&mut parts, &self.text[text_start..pos]);
                        self.malformed(pos, message);
                        parts.push(self.error_node(pos, "unclosed inline marker"));
                        return parts;
                    }
                }
            }

            let c = match rest.chars().next() {
                Some(c) => c,
                None => break,
            };

            if c == '｜' || c == '|' {
                if let Some((node, next)) = self.scan_piped_ruby(pos, c.len_utf8()) {
                    flush(&mut parts, &self.text[text_start..pos]);
                    parts.push(Part::Node(node));
                    pos = next;
                    text_start = pos;
                    continue;
                }
                // A pipe with no reading after it is ordinary text.
                pos += c.len_utf8();
                continue;
            }

            if c == '《' {
                match self.scan_bare_ruby(&self.text[text_start..pos], pos) {
                    RubyScan::Parsed {
                        base_bytes,
                        node,
                        next,
                    } => {
                        flush(&mut parts, &self.text[text_start..pos - base_bytes]);
                        parts.push(Part::Node(node));
                        pos = next;
                        text_start = pos;
                        continue;
                    }
                    RubyScan::NoBase { raw, next } => {
                        flush(&mut parts, &self.text[text_start..pos]);
                        self.malformed(
                            pos,
                            "ruby reading has no base text (use ｜base《reading》)",
                        );
                        parts.push(Part::Node(Node::recovered_error(
                            raw,
                            "ruby reading has no base text",
                            self.line_at(pos),
                        )));
                        pos = next;
                        text_start = pos;
                        continue;
                    }
                    RubyScan::Unclosed => {
                        flush(&mut parts, &self.text[text_start..pos]);
                        self.malformed(pos, "ruby 《 is never closed with 》");
                        parts.push(self.error_node(pos, "unclosed ruby annotation"));
                        return parts;
                    }
                }
            }

            pos += c.len_utf8();
        }

        flush(&mut parts, &self.text[text_start..]);
        parts
    }

    /// `;;;keywords;;;content;;;` starting at `pos`.
    fn scan_span(&mut self, pos: usize) -> SpanScan {
        let after = &self.text[pos + 3..];
        let kw_end = match after.find(";;;") {
            Some(off) => off,
            None => return SpanScan::Malformed("inline marker ;;; is never closed"),
        };
        let tokens = split_keywords(&after[..kw_end]);
        let (keywords, attrs) = crate::parser::partition_tokens(&tokens);
        if keywords.is_empty() {
            return SpanScan::Malformed("inline marker has no keywords");
        }

        let body_start = kw_end + 3;
        let body_end = match after[body_start..].find(";;;") {
            Some(off) => body_start + off,
            None => return SpanScan::Malformed("inline marker body is never closed with ;;;"),
        };
        let body = after[body_start..body_end].trim();
        let line = self.line_at(pos);

        if let Some(advice) = combination_advisory(self.registry, &keywords, line) {
            self.diagnostics.push(advice);
        }

        let inner = parse_inline(body, line, self.registry, self.footnotes, self.diagnostics);
        let mut node = Node::parts(NodeKind::KeywordSpan, inner)
            .with_attr("keywords", keywords.join(","))
            .with_attr("line", line.to_string());
        for (key, value) in attrs {
            node.attrs.set(key, value);
        }

        SpanScan::Parsed {
            node,
            next: pos + 3 + body_end + 3,
        }
    }

    /// `｜base《reading》` with the pipe at `pos`.
    fn scan_piped_ruby(&self, pos: usize, pipe_len: usize) -> Option<(Node, usize)> {
        let after = &self.text[pos + pipe_len..];
        let open = after.find('《')?;
        let base = &after[..open];
        if base.is_empty() || base.contains('\n') {
            return None;
        }
        let close_off = after[open..].find('》')?;
        let reading = &after[open + '《'.len_utf8()..open + close_off];
        if reading.contains('\n') {
            return None;
        }
        let node = Node::text(NodeKind::Ruby, base).with_attr("reading", reading);
        Some((node, pos + pipe_len + open + close_off + '》'.len_utf8()))
    }

    /// `《reading》` at `pos` with no explicit pipe: the base is the longest
    /// trailing CJK-ideograph run of the pending text.
    fn scan_bare_ruby(&self, pending: &str, pos: usize) -> RubyScan {
        let after = &self.text[pos + '《'.len_utf8()..];
        let close = match after.find('》') {
            Some(off) => off,
            None => return RubyScan::Unclosed,
        };
        let reading = &after[..close];
        let next = pos + '《'.len_utf8() + close + '》'.len_utf8();

        let base_bytes: usize = pending
            .chars()
            .rev()
            .take_while(|&c| is_cjk_ideograph(c))
            .map(|c| c.len_utf8())
            .sum();

        if base_bytes == 0 {
            return RubyScan::NoBase {
                raw: self.text[pos..next].to_string(),
                next,
            };
        }

        let base = &pending[pending.len() - base_bytes..];
        let node = Node::text(NodeKind::Ruby, base).with_attr("reading", reading);
        RubyScan::Parsed {
            base_bytes,
            node,
            next,
        }
    }

    /// Source line of the character at byte offset `pos`.
    fn line_at(&self, pos: usize) -> u32 {
        self.base_line + self.text[..pos].bytes().filter(|&b| b == b'\n').count() as u32
    }

    /// Column (1-based, in characters) within the line holding `pos`.
    fn column_at(&self, pos: usize) -> u32 {
        let line_start = self.text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
        self.text[line_start..pos].chars().count() as u32 + 1
    }

    fn malformed(&mut self, pos: usize, message: &str) {
        self.diagnostics.push(
            Diagnostic::error(Category::MalformedInline, self.line_at(pos), message)
                .at_column(self.column_at(pos))
                .with_snippet(&self.text[pos..]),
        );
    }

    fn error_node(&self, pos: usize, message: &str) -> Part {
        Part::Node(Node::recovered_error(
            &self.text[pos..],
            message,
            self.line_at(pos),
        ))
    }
}

enum SpanScan {
    Parsed { node: Node, next: usize },
    Malformed(&'static str),
}

enum RubyScan {
    Parsed {
        base_bytes: usize,
        node: Node,
        next: usize,
    },
    NoBase {
        raw: String,
        next: usize,
    },
    Unclosed,
}

fn flush(parts: &mut Vec<Part>, text: &str) {
    if !text.is_empty() {
        parts.push(Part::Text(text.to_string()));
    }
}

fn is_cjk_ideograph(c: char) -> bool {
    matches!(c, '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}' | '々' | '〆' | 'ヶ')
}

/// Map a failed combination check onto an advisory diagnostic.
pub(crate) fn combination_advisory(
    registry: &Registry,
    keywords: &[String],
    line: u32,
) -> Option<Diagnostic> {
    match registry.validate_combination(keywords) {
        Ok(()) => None,
        Err(reason) => {
            let category = if reason.starts_with("unknown keyword") {
                Category::UnknownKeyword
            } else {
                Category::InvalidKeywordCombination
            };
            Some(Diagnostic::warning(category, line, reason))
        }
    }
}

//! Block segmenter: splits raw text into ordered logical blocks.
//!
//! A single forward line scan produces [`RawBlock`]s for the parser:
//! paragraph runs, marker blocks, list runs, image directives, and fenced
//! verbatim blocks. Newline scanning uses `memchr` (SIMD on supported
//! platforms); lines borrow directly from the input.
//!
//! An unclosed marker block never swallows the rest of the document: its
//! body is cut at the end of the opening paragraph and the block is flagged
//! `closed: false` so the parser can report it at the start line.

use memchr::memchr;

/// A single input line with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: &'a str,
    pub number: u32,
}

impl<'a> Line<'a> {
    #[inline(always)]
    pub fn is_blank(&self) -> bool {
        self.text.bytes().all(|b| b == b' ' || b == b'\t')
    }

    #[inline(always)]
    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }
}

/// Split input into lines using SIMD-accelerated newline scanning.
/// Handles CRLF; the trailing newline is not part of the line text.
pub fn split_lines(input: &str) -> Vec<Line<'_>> {
    let bytes = input.as_bytes();
    let mut lines = Vec::with_capacity(input.len() / 32 + 1);
    let mut offset = 0;
    let mut number = 1;

    while offset < bytes.len() {
        let end = match memchr(b'\n', &bytes[offset..]) {
            Some(pos) => offset + pos,
            None => bytes.len(),
        };
        let text_end = if end > offset && bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };
        lines.push(Line {
            text: &input[offset..text_end],
            number,
        });
        offset = if end < bytes.len() { end + 1 } else { end };
        number += 1;
    }

    lines
}

/// One logical block of source text.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBlock<'a> {
    /// Consecutive non-marker lines, terminated by a blank line or a new
    /// block start.
    Paragraph {
        lines: Vec<Line<'a>>,
        start_line: u32,
    },
    /// A `;;;keywords` block through to a bare `;;;` close (or the one-line
    /// `;;;keywords;;; body ;;;` form, which carries `inline_body`).
    Marker {
        keywords: Vec<String>,
        /// Body of the one-line form, already stripped of delimiters.
        inline_body: Option<&'a str>,
        body: Vec<Line<'a>>,
        closed: bool,
        start_line: u32,
        /// The raw opening line, carried for error reporting.
        raw_open: &'a str,
    },
    /// Consecutive `-`/`*`/`+`/`N.` lines.
    List {
        lines: Vec<Line<'a>>,
        start_line: u32,
    },
    /// A `画像:path|alt` line.
    Image {
        directive: &'a str,
        start_line: u32,
    },
    /// Triple-backtick fenced block, rendered verbatim.
    Fence {
        lang: &'a str,
        body: Vec<Line<'a>>,
        closed: bool,
        start_line: u32,
    },
    /// A bare `;;;` close with no matching open.
    StrayClose { start_line: u32 },
}

#[inline]
fn is_marker_open(trimmed: &str) -> bool {
    trimmed.starts_with(";;;") && trimmed != ";;;"
}

#[inline]
fn is_marker_close(trimmed: &str) -> bool {
    trimmed == ";;;"
}

#[inline]
fn is_list_line(trimmed: &str) -> bool {
    for bullet in ["- ", "* ", "+ "] {
        if trimmed.starts_with(bullet) {
            return true;
        }
    }
    if trimmed == "-" || trimmed == "*" || trimmed == "+" {
        return true;
    }
    ordered_item(trimmed).is_some()
}

/// Split an ordered-list line `N. text` into its text part.
pub(crate) fn ordered_item(trimmed: &str) -> Option<&str> {
    let digits = trimmed.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &trimmed[digits..];
    let rest = rest.strip_prefix('.')?;
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix(' ').or(Some(rest.trim_start()))
    }
}

/// Split a marker keyword list on commas (ASCII or Japanese) and whitespace.
pub fn split_keywords(list: &str) -> Vec<String> {
    list.split(|c: char| c == ',' || c == '、' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Split raw text into ordered logical blocks.
///
/// The scan is a single forward pass; the in-marker and in-list states are
/// encoded structurally in `scan_marker` and the list loop below.
pub fn segment(input: &str) -> Vec<RawBlock<'_>> {
    let lines = split_lines(input);
    let mut blocks = Vec::with_capacity(16);
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trimmed();

        if line.is_blank() {
            i += 1;
            continue;
        }

        if is_marker_close(trimmed) {
            blocks.push(RawBlock::StrayClose {
                start_line: line.number,
            });
            i += 1;
            continue;
        }

        if is_marker_open(trimmed) {
            i = scan_marker(&lines, i, &mut blocks);
            continue;
        }

        if trimmed.starts_with("```") {
            i = scan_fence(&lines, i, &mut blocks);
            continue;
        }

        if let Some(directive) = trimmed.strip_prefix("画像:") {
            blocks.push(RawBlock::Image {
                directive,
                start_line: line.number,
            });
            i += 1;
            continue;
        }

        if is_list_line(trimmed) {
            let start = i;
            while i < lines.len() && is_list_line(lines[i].trimmed()) {
                i += 1;
            }
            blocks.push(RawBlock::List {
                lines: lines[start..i].to_vec(),
                start_line: lines[start].number,
            });
            continue;
        }

        // Paragraph run: everything up to a blank line or a new block start.
        let start = i;
        while i < lines.len() {
            let t = lines[i].trimmed();
            if lines[i].is_blank()
                || t.starts_with(";;;")
                || t.starts_with("```")
                || t.starts_with("画像:")
                || is_list_line(t)
            {
                break;
            }
            i += 1;
        }
        blocks.push(RawBlock::Paragraph {
            lines: lines[start..i].to_vec(),
            start_line: lines[start].number,
        });
    }

    blocks
}

/// Consume a marker block starting at `open`. Returns the next line index.
fn scan_marker<'a>(lines: &[Line<'a>], open: usize, blocks: &mut Vec<RawBlock<'a>>) -> usize {
    let line = lines[open];
    let trimmed = line.trimmed();
    let after = trimmed.strip_prefix(";;;").unwrap_or(trimmed);

    // One-line form: `;;;keywords;;; body ;;;` (trailing close optional).
    if let Some(idx) = after.find(";;;") {
        let keywords = split_keywords(&after[..idx]);
        let rest = after[idx + 3..].trim();
        if !rest.is_empty() {
            let body = rest.strip_suffix(";;;").map(|s| s.trim_end()).unwrap_or(rest);
            blocks.push(RawBlock::Marker {
                keywords,
                inline_body: Some(body),
                body: Vec::new(),
                closed: true,
                start_line: line.number,
                raw_open: line.text,
            });
            return open + 1;
        }
        // `;;;keywords;;;` opening decoration, multi-line body follows.
        return scan_marker_body(lines, open, keywords, blocks);
    }

    let keywords = split_keywords(after);
    scan_marker_body(lines, open, keywords, blocks)
}

/// Collect a multi-line marker body up to a bare `;;;`.
///
/// Hitting another marker open or EOF first means the block is unclosed:
/// the body is then cut at the end of the opening paragraph (first blank
/// line) so the rest of the document still segments normally.
fn scan_marker_body<'a>(
    lines: &[Line<'a>],
    open: usize,
    keywords: Vec<String>,
    blocks: &mut Vec<RawBlock<'a>>,
) -> usize {
    let line = lines[open];
    let mut j = open + 1;

    while j < lines.len() {
        let t = lines[j].trimmed();
        if is_marker_close(t) {
            blocks.push(RawBlock::Marker {
                keywords,
                inline_body: None,
                body: lines[open + 1..j].to_vec(),
                closed: true,
                start_line: line.number,
                raw_open: line.text,
            });
            return j + 1;
        }
        if is_marker_open(t) {
            break;
        }
        j += 1;
    }

    // Unclosed: degrade to the opening paragraph only.
    let mut k = open + 1;
    while k < lines.len() {
        let t = lines[k].trimmed();
        if lines[k].is_blank() || is_marker_open(t) {
            break;
        }
        k += 1;
    }
    blocks.push(RawBlock::Marker {
        keywords,
        inline_body: None,
        body: lines[open + 1..k].to_vec(),
        closed: false,
        start_line: line.number,
        raw_open: line.text,
    });
    k
}

/// Consume a fenced block starting at `open`. Returns the next line index.
fn scan_fence<'a>(lines: &[Line<'a>], open: usize, blocks: &mut Vec<RawBlock<'a>>) -> usize {
    let line = lines[open];
    let lang = line.trimmed().strip_prefix("```").unwrap_or("").trim();
    let mut j = open + 1;

    while j < lines.len() {
        if lines[j].trimmed() == "```" {
            blocks.push(RawBlock::Fence {
                lang,
                body: lines[open + 1..j].to_vec(),
                closed: true,
                start_line: line.number,
            });
            return j + 1;
        }
        j += 1;
    }

    blocks.push(RawBlock::Fence {
        lang,
        body: lines[open + 1..].to_vec(),
        closed: false,
        start_line: line.number,
    });
    lines.len()
}

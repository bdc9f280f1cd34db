//! Footnote manager: parse-time registration, render-time placeholder
//! resolution, and the end-of-document section.
//!
//! Numbers follow first-seen source order and are monotonic per document,
//! so repeated runs over the same input are stable. The placeholder token
//! `[FOOTNOTE_REF_n]` is the only intrinsic wire format of the engine and
//! is never surfaced to callers: the renderer resolves every token before
//! returning.

/// One registered footnote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootnoteRecord {
    /// 1-based sequence number in source order.
    pub number: usize,
    /// Raw footnote text as written.
    pub content: String,
    /// Anchor id of the in-text reference.
    pub ref_id: String,
    /// Anchor id of the definition in the footnote section.
    pub def_id: String,
}

/// Per-document footnote state. Create one per conversion; reusing an
/// instance across unrelated documents is a caller error.
#[derive(Debug, Default)]
pub struct FootnoteManager {
    records: Vec<FootnoteRecord>,
}

impl FootnoteManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a footnote, returning its sequence number.
    pub fn register(&mut self, content: impl Into<String>) -> usize {
        let number = self.records.len() + 1;
        self.records.push(FootnoteRecord {
            number,
            content: content.into(),
            ref_id: format!("fnref-{}", number),
            def_id: format!("fn-{}", number),
        });
        number
    }

    pub fn records(&self) -> &[FootnoteRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<FootnoteRecord> {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The internal placeholder token for footnote number `n`.
pub fn placeholder(number: usize) -> String {
    format!("[FOOTNOTE_REF_{}]", number)
}

/// Replace every `[FOOTNOTE_REF_n]` token with an anchor-linked superscript.
///
/// Running this again over already-resolved output is a no-op, so numbering
/// cannot drift however many times the pass runs.
pub fn resolve_placeholders(html: &str, records: &[FootnoteRecord]) -> String {
    let mut out = html.to_string();
    for record in records {
        let token = placeholder(record.number);
        let replacement = format!(
            "<sup class=\"footnote-ref\" id=\"{}\"><a href=\"#{}\">{}</a></sup>",
            record.ref_id, record.def_id, record.number
        );
        out = out.replace(&token, &replacement);
    }
    out
}

/// Render the end-of-document footnote section, each entry back-linking to
/// its in-text reference. Appended once, after placeholder resolution.
pub fn render_section(records: &[FootnoteRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(records.len() * 96 + 64);
    out.push_str("<section class=\"footnotes\">\n<hr>\n<ol>\n");
    for record in records {
        out.push_str("<li id=\"");
        out.push_str(&record.def_id);
        out.push_str("\">");
        out.push_str(&html_escape::encode_text(&record.content));
        out.push_str(" <a href=\"#");
        out.push_str(&record.ref_id);
        out.push_str("\" class=\"footnote-backref\">\u{21a9}</a></li>\n");
    }
    out.push_str("</ol>\n</section>");
    out
}

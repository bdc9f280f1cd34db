use std::fmt;

/// Severity of a diagnostic.
///
/// `Error` should block an upstream "safe to publish" decision;
/// `Warning` is informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Categories for the problems the parser and syntax checker report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// A marker block (or fence) was opened but never closed.
    UnclosedMarker,
    /// A keyword that the registry does not know.
    UnknownKeyword,
    /// A malformed inline construct (footnote, ruby, image directive, span).
    MalformedInline,
    /// Two keywords from the same exclusivity group, or similar conflicts.
    InvalidKeywordCombination,
    /// The render-time depth guard fired.
    RecursionLimitExceeded,
    /// Heading levels jump (e.g. 見出し1 followed by 見出し3). Checker heuristic.
    HeadingSkip,
    /// The same heading id appears twice. Checker heuristic.
    DuplicateHeadingId,
}

impl Category {
    /// Short machine-readable name, used by the CLI's JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::UnclosedMarker => "unclosed-marker",
            Category::UnknownKeyword => "unknown-keyword",
            Category::MalformedInline => "malformed-inline",
            Category::InvalidKeywordCombination => "invalid-keyword-combination",
            Category::RecursionLimitExceeded => "recursion-limit-exceeded",
            Category::HeadingSkip => "heading-skip",
            Category::DuplicateHeadingId => "duplicate-heading-id",
        }
    }
}

/// A structured, non-fatal report of a parsing or validation problem.
///
/// Diagnostics are always returned as data, never thrown. Both the parser's
/// recovery path and the standalone syntax checker produce this shape, so
/// downstream reporting code is common to both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: Severity,
    /// 1-based source line.
    pub line: u32,
    /// 1-based character column (1 when only the line is known).
    pub column: u32,
    /// Problem categorization.
    pub category: Category,
    /// Human-readable message.
    pub message: String,
    /// Optional fix-it hint for the writer.
    pub suggestion: Option<String>,
    /// The offending raw text, carried for errors so the writer can find it.
    pub snippet: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic at the given line.
    pub fn error(category: Category, line: u32, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            line,
            column: 1,
            category,
            message: message.into(),
            suggestion: None,
            snippet: None,
        }
    }

    /// Create a warning diagnostic at the given line.
    pub fn warning(category: Category, line: u32, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            line,
            column: 1,
            category,
            message: message.into(),
            suggestion: None,
            snippet: None,
        }
    }

    /// Set the column.
    pub fn at_column(mut self, column: u32) -> Self {
        self.column = column;
        self
    }

    /// Attach a fix-it suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach the offending raw text.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Whether this diagnostic is an error.
    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{}: line {}, col {}: {}",
            sev, self.line, self.column, self.message
        )?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (hint: {})", suggestion)?;
        }
        Ok(())
    }
}

/// An ordered collection of diagnostics from one parse or check run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Check if no diagnostics were collected.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of error-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.is_error()).count()
    }

    /// Check whether any error-severity diagnostic exists.
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.is_error())
    }

    /// Iterate over the diagnostics in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Append everything from another collection.
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// View as a slice.
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(items: Vec<Diagnostic>) -> Self {
        Self { items }
    }
}

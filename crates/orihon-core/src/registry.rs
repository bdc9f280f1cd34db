//! Static keyword registry: keyword → element mapping, canonical nesting
//! order, and exclusivity groups.
//!
//! The registry is a pure function of its inputs; a [`Registry`] value only
//! adds caller-supplied aliases on top of the built-in table.

/// The semantic element a keyword maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementTag {
    Strong,
    Em,
    /// `<div class="box">`.
    Box,
    /// `<div class="highlight">`, optional background color.
    Highlight,
    /// `<h1>`..`<h5>`.
    Heading(u8),
    /// `<details><summary>`, plain or spoiler variant.
    Collapsible { spoiler: bool },
    /// Table-of-contents placeholder.
    Toc,
}

/// Keywords in the same group may not be combined on one span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusivityGroup {
    Heading,
    Collapsible,
}

/// One entry of the keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordDescriptor {
    pub keyword: &'static str,
    pub tag: ElementTag,
    /// Canonical nesting rank: lower wraps closer to the content.
    pub rank: u8,
    pub group: Option<ExclusivityGroup>,
}

/// Built-in keyword table.
///
/// Ranks define the canonical nesting order: a heading wraps outside bold,
/// a collapsible wraps outside a box or highlight.
const KEYWORDS: &[KeywordDescriptor] = &[
    KeywordDescriptor {
        keyword: "太字",
        tag: ElementTag::Strong,
        rank: 10,
        group: None,
    },
    KeywordDescriptor {
        keyword: "イタリック",
        tag: ElementTag::Em,
        rank: 20,
        group: None,
    },
    KeywordDescriptor {
        keyword: "囲み",
        tag: ElementTag::Box,
        rank: 40,
        group: None,
    },
    KeywordDescriptor {
        keyword: "ハイライト",
        tag: ElementTag::Highlight,
        rank: 50,
        group: None,
    },
    KeywordDescriptor {
        keyword: "見出し1",
        tag: ElementTag::Heading(1),
        rank: 80,
        group: Some(ExclusivityGroup::Heading),
    },
    KeywordDescriptor {
        keyword: "見出し2",
        tag: ElementTag::Heading(2),
        rank: 80,
        group: Some(ExclusivityGroup::Heading),
    },
    KeywordDescriptor {
        keyword: "見出し3",
        tag: ElementTag::Heading(3),
        rank: 80,
        group: Some(ExclusivityGroup::Heading),
    },
    KeywordDescriptor {
        keyword: "見出し4",
        tag: ElementTag::Heading(4),
        rank: 80,
        group: Some(ExclusivityGroup::Heading),
    },
    KeywordDescriptor {
        keyword: "見出し5",
        tag: ElementTag::Heading(5),
        rank: 80,
        group: Some(ExclusivityGroup::Heading),
    },
    KeywordDescriptor {
        keyword: "折りたたみ",
        tag: ElementTag::Collapsible { spoiler: false },
        rank: 90,
        group: Some(ExclusivityGroup::Collapsible),
    },
    KeywordDescriptor {
        keyword: "ネタバレ",
        tag: ElementTag::Collapsible { spoiler: true },
        rank: 90,
        group: Some(ExclusivityGroup::Collapsible),
    },
    KeywordDescriptor {
        keyword: "目次",
        tag: ElementTag::Toc,
        rank: 100,
        group: None,
    },
];

/// Keyword resolver with optional caller-supplied aliases.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// alias → built-in keyword.
    overrides: Vec<(String, String)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add alias mappings on top of the built-in table. An alias pointing
    /// at an unknown canonical keyword is simply inert.
    pub fn with_overrides(overrides: Vec<(String, String)>) -> Self {
        Self { overrides }
    }

    /// Resolve a keyword (or alias) to its descriptor.
    pub fn resolve(&self, keyword: &str) -> Option<&'static KeywordDescriptor> {
        if let Some(desc) = KEYWORDS.iter().find(|d| d.keyword == keyword) {
            return Some(desc);
        }
        let canonical = self
            .overrides
            .iter()
            .find(|(alias, _)| alias == keyword)
            .map(|(_, target)| target.as_str())?;
        KEYWORDS.iter().find(|d| d.keyword == canonical)
    }

    /// Order keywords for wrapping: innermost first.
    ///
    /// Known keywords sort by rank (ties by keyword, so output is stable
    /// regardless of input order); unknown keywords sort lexicographically
    /// and wrap outermost. Duplicates collapse to one occurrence.
    pub fn canonical_order<'a>(&self, keywords: &'a [String]) -> Vec<&'a str> {
        let mut known: Vec<(&KeywordDescriptor, &'a str)> = Vec::new();
        let mut unknown: Vec<&'a str> = Vec::new();

        for kw in keywords {
            match self.resolve(kw) {
                Some(desc) => {
                    if !known.iter().any(|(d, _)| d.keyword == desc.keyword) {
                        known.push((desc, kw.as_str()));
                    }
                }
                None => {
                    if !unknown.contains(&kw.as_str()) {
                        unknown.push(kw.as_str());
                    }
                }
            }
        }

        known.sort_by_key(|(d, _)| (d.rank, d.keyword));
        unknown.sort_unstable();

        known
            .into_iter()
            .map(|(_, kw)| kw)
            .chain(unknown)
            .collect()
    }

    /// Pre-render advisory check of a keyword combination.
    ///
    /// Fails on unknown keywords and on two keywords sharing an
    /// exclusivity group (two heading levels, two collapsible variants).
    /// This never blocks rendering; content is never dropped over it.
    pub fn validate_combination(&self, keywords: &[String]) -> Result<(), String> {
        let mut seen_groups: Vec<(ExclusivityGroup, &str)> = Vec::new();

        for kw in keywords {
            match self.resolve(kw) {
                None => return Err(format!("unknown keyword: {}", kw)),
                Some(desc) => {
                    if let Some(group) = desc.group {
                        if let Some((_, first)) =
                            seen_groups.iter().find(|(g, first)| *g == group && *first != desc.keyword)
                        {
                            return Err(format!(
                                "keywords {} and {} cannot be combined",
                                first, desc.keyword
                            ));
                        }
                        seen_groups.push((group, desc.keyword));
                    }
                }
            }
        }

        Ok(())
    }
}

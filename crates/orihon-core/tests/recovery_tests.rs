//! Error recovery, syntax checker, and stability guarantees

use orihon_core::{
    checker, convert, footnote, toc, Category, Config, Diagnostics, HtmlRenderer, Node, NodeKind,
    Parser, Registry, Severity,
};

// ============================================================================
// Unclosed Marker Recovery Tests
// ============================================================================

#[test]
fn test_unclosed_marker_reports_error_at_open_line() {
    let mut parser = Parser::new();
    let result = parser.parse(";;;太字\n閉じ忘れのテキスト");

    assert!(result.diagnostics.has_errors());
    let diag = result.diagnostics.iter().next().unwrap();
    assert_eq!(diag.category, Category::UnclosedMarker);
    assert_eq!(diag.line, 1);
    assert!(diag.suggestion.is_some());
}

#[test]
fn test_unclosed_marker_does_not_swallow_rest_of_document() {
    let input = ";;;太字\n閉じ忘れ\n\n後続の段落です。";
    let result = convert(input, &Config::default());

    assert!(result.diagnostics.has_errors());
    assert!(result.html.contains("<p>後続の段落です。</p>"));
    assert!(result.html.contains("class=\"parse-error\""));
}

#[test]
fn test_error_node_preserves_original_text() {
    let result = convert(";;;太字\n元のテキスト", &Config::default());
    assert!(result.html.contains(";;;太字"));
    assert!(result.html.contains("元のテキスト"));
}

#[test]
fn test_two_unclosed_markers_report_distinct_lines() {
    let input = ";;;太字\n一つ目\n\n間の段落\n\n;;;囲み\n二つ目";
    let result = convert(input, &Config::default());

    let errors: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.category == Category::UnclosedMarker)
        .collect();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].line, 1);
    assert_eq!(errors[1].line, 6);
    assert!(result.html.contains("<p>間の段落</p>"));
}

#[test]
fn test_unknown_keyword_becomes_error_node() {
    let result = convert(";;;ボールド;;; テキスト ;;;", &Config::default());

    assert!(result.diagnostics.has_errors());
    let diag = result.diagnostics.iter().next().unwrap();
    assert_eq!(diag.category, Category::UnknownKeyword);
    assert!(result.html.contains("class=\"parse-error\""));
    assert!(result.html.contains("テキスト"));
}

#[test]
fn test_marker_without_keywords_is_an_error() {
    let result = convert(";;;,\n本文\n;;;", &Config::default());
    assert!(result.diagnostics.has_errors());
    assert!(result.html.contains("class=\"parse-error\""));
}

#[test]
fn test_stray_close_is_a_warning_not_an_error() {
    let result = convert("段落\n\n;;;", &Config::default());
    assert!(!result.diagnostics.has_errors());
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.html, "<p>段落</p>");
}

#[test]
fn test_unclosed_fence_reports_but_renders() {
    let result = convert("```\nlet x = 1;", &Config::default());
    assert!(result.diagnostics.has_errors());
    assert!(result.html.contains("let x = 1;"));
    assert!(result.html.contains("<pre><code>"));
}

#[test]
fn test_unclosed_footnote_marker_recovers() {
    let result = convert("本文((閉じない", &Config::default());
    assert!(result.diagnostics.has_errors());
    let diag = result.diagnostics.iter().next().unwrap();
    assert_eq!(diag.category, Category::MalformedInline);
    assert!(result.html.contains("本文"));
}

#[test]
fn test_bare_ruby_without_base_recovers_and_continues() {
    let result = convert("「《かんじ》」のあと", &Config::default());
    assert!(result.diagnostics.has_errors());
    // The text after the malformed ruby still renders.
    assert!(result.html.contains("のあと"));
}

#[test]
fn test_parse_never_panics_on_fuzzed_delimiters() {
    let inputs = [
        ";;;",
        ";;;;;;",
        ";;;;;;;;;",
        ";;; ;;;",
        "｜《》",
        "《》",
        "((",
        "))",
        "((()))",
        "```",
        "画像:",
        "画像:|",
        ";;;太字;;;;;;",
    ];
    for input in inputs {
        let result = convert(input, &Config::default());
        let _ = result.html;
    }
}

// ============================================================================
// Depth Guard Tests
// ============================================================================

#[test]
fn test_render_depth_guard_bounds_output() {
    let mut node = Node::text(NodeKind::Strong, "深部");
    for _ in 0..150 {
        node = Node::child(NodeKind::Strong, node);
    }

    let registry = Registry::new();
    let renderer = HtmlRenderer::new(&registry);
    let (html, diags) = renderer.render_document(&[node], &[], &[], &Diagnostics::new(), "");

    assert!(html.contains("<span class=\"render-error\">nesting too deep</span>"));
    assert!(!html.contains("深部"));
    assert!(diags
        .iter()
        .any(|d| d.category == Category::RecursionLimitExceeded));
    assert!(diags.iter().all(|d| d.severity == Severity::Warning));
}

// ============================================================================
// Stability Tests
// ============================================================================

#[test]
fn test_heading_collection_is_idempotent() {
    let mut parser = Parser::new();
    let mut result = parser.parse(";;;見出し1;;; 一 ;;;\n\n;;;見出し2;;; 二 ;;;");
    let registry = Registry::new();

    let first = toc::collect(&mut result.nodes, &registry);
    let second = toc::collect(&mut result.nodes, &registry);
    assert_eq!(first, second);
    assert_eq!(first[0].id, "heading-1");
    assert_eq!(first[1].id, "heading-2");
}

#[test]
fn test_footnote_resolution_is_idempotent() {
    let mut parser = Parser::new();
    let result = parser.parse("甲((一つ目))と乙((二つ目))");
    let html = "甲[FOOTNOTE_REF_1]と乙[FOOTNOTE_REF_2]";

    let once = footnote::resolve_placeholders(html, &result.footnotes);
    let twice = footnote::resolve_placeholders(&once, &result.footnotes);
    assert_eq!(once, twice);
    assert!(once.contains("href=\"#fn-1\""));
    assert!(once.contains("href=\"#fn-2\""));
}

#[test]
fn test_conversion_is_deterministic() {
    let input = ";;;目次\n;;;\n\n;;;見出し1;;; 章 ;;;\n\n本文((注))です。\n\n;;;太字,囲み;;; 強調 ;;;";
    let a = convert(input, &Config::default());
    let b = convert(input, &Config::default());
    assert_eq!(a.html, b.html);
    assert_eq!(a.diagnostics.len(), b.diagnostics.len());
}

#[test]
fn test_parser_state_resets_between_documents() {
    let mut parser = Parser::new();
    let first = parser.parse("一((甲))");
    let second = parser.parse("二((乙))");

    assert_eq!(first.footnotes.len(), 1);
    assert_eq!(second.footnotes.len(), 1);
    assert_eq!(second.footnotes[0].number, 1);
}

// ============================================================================
// Syntax Checker Tests
// ============================================================================

#[test]
fn test_check_clean_document() {
    let input = ";;;見出し1;;; 章 ;;;\n\n本文((注))です。\n\n;;;太字;;; 強調 ;;;";
    assert!(checker::check(input).is_empty());
}

#[test]
fn test_check_reports_unclosed_marker() {
    let diags = checker::check(";;;太字\n閉じ忘れ");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].category, Category::UnclosedMarker);
    assert_eq!(diags[0].line, 1);
}

#[test]
fn test_check_reports_unknown_keyword() {
    let diags = checker::check(";;;ボールド;;; 文 ;;;");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].category, Category::UnknownKeyword);
}

#[test]
fn test_check_reports_stray_close_as_warning() {
    let diags = checker::check("段落\n\n;;;");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].severity, Severity::Warning);
}

#[test]
fn test_check_reports_unmatched_footnote_with_column() {
    let diags = checker::check("ここで((切れる");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].category, Category::MalformedInline);
    assert_eq!(diags[0].line, 1);
    assert_eq!(diags[0].column, 4);
}

#[test]
fn test_check_reports_heading_level_skip() {
    let input = ";;;見出し1;;; 章 ;;;\n\n;;;見出し3;;; 飛んだ ;;;";
    let diags = checker::check(input);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].category, Category::HeadingSkip);
    assert_eq!(diags[0].severity, Severity::Warning);
}

#[test]
fn test_check_reports_duplicate_heading_id() {
    let input = ";;;見出し1,id=sec;;; 一 ;;;\n\n;;;見出し2,id=sec;;; 二 ;;;";
    let diags = checker::check(input);
    assert!(diags
        .iter()
        .any(|d| d.category == Category::DuplicateHeadingId));
}

#[test]
fn test_check_ignores_fence_contents() {
    let input = "```\n;;;太字\n((切れてる\n```";
    assert!(checker::check(input).is_empty());
}

#[test]
fn test_check_reports_unclosed_fence() {
    let diags = checker::check("```rust\nlet x = 1;");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].category, Category::UnclosedMarker);
}

#[test]
fn test_check_agrees_with_parser_on_categories() {
    let input = ";;;太字\n閉じ忘れ\n\n;;;ボールド;;; 文 ;;;";
    let checked = checker::check(input);
    let parsed = convert(input, &Config::default());

    let mut check_cats: Vec<_> = checked.iter().map(|d| d.category).collect();
    let mut parse_cats: Vec<_> = parsed.diagnostics.iter().map(|d| d.category).collect();
    check_cats.sort_by_key(|c| c.as_str());
    parse_cats.sort_by_key(|c| c.as_str());
    assert_eq!(check_cats, parse_cats);
}

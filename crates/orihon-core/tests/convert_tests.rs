//! Integration tests for the Orihon conversion pipeline

use orihon_core::{convert, Config, NodeKind, Parser, Registry};
use pretty_assertions::assert_eq;

fn plain(input: &str) -> String {
    convert(input, &Config::default()).html
}

// ============================================================================
// Paragraph Tests
// ============================================================================

#[test]
fn test_plain_paragraph() {
    assert_eq!(plain("こんにちは。"), "<p>こんにちは。</p>");
}

#[test]
fn test_paragraph_line_breaks_become_br() {
    let html = plain("一行目\n二行目");
    assert_eq!(html, "<p>一行目<br>\n二行目</p>");
}

#[test]
fn test_blank_line_separates_paragraphs() {
    let html = plain("最初の段落\n\n次の段落");
    assert_eq!(html, "<p>最初の段落</p>\n<p>次の段落</p>");
}

#[test]
fn test_marker_free_document_is_clean() {
    let result = convert("一行目\n二行目\n\n次の段落", &Config::default());
    assert!(result.diagnostics.is_empty());
    assert_eq!(result.nodes.len(), 2);
    assert!(result.nodes.iter().all(|n| n.kind == NodeKind::Paragraph));
}

#[test]
fn test_html_special_characters_are_escaped() {
    let html = plain("<script>alert(1)</script> & more");
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("&amp;"));
}

// ============================================================================
// Marker Block Tests
// ============================================================================

#[test]
fn test_one_line_bold_marker() {
    let html = plain(";;;太字;;; 太字のテキストです。 ;;;");
    assert_eq!(html, "<strong>太字のテキストです。</strong>");
}

#[test]
fn test_one_line_marker_without_trailing_close() {
    let html = plain(";;;太字;;; テキスト");
    assert_eq!(html, "<strong>テキスト</strong>");
}

#[test]
fn test_multi_line_marker_block() {
    let html = plain(";;;囲み\n中身のテキスト\n;;;");
    assert_eq!(html, "<div class=\"box\">中身のテキスト</div>");
}

#[test]
fn test_italic_marker() {
    let html = plain(";;;イタリック;;; 斜体 ;;;");
    assert_eq!(html, "<em>斜体</em>");
}

#[test]
fn test_heading_marker_gets_generated_id() {
    let html = plain(";;;見出し1;;; はじめに ;;;");
    assert_eq!(html, "<h1 id=\"heading-1\">はじめに</h1>");
}

#[test]
fn test_all_heading_levels() {
    for level in 1..=5u8 {
        let input = format!(";;;見出し{};;; 題 ;;;", level);
        let html = plain(&input);
        assert!(html.starts_with(&format!("<h{} ", level)), "html: {}", html);
    }
}

#[test]
fn test_highlight_with_color_attribute() {
    let html = plain(";;;ハイライト,色=#FFEE00;;; 注目 ;;;");
    assert_eq!(
        html,
        "<div class=\"highlight\" style=\"background-color: #ffee00\">注目</div>"
    );
}

#[test]
fn test_highlight_rejects_suspect_color_value() {
    let html = plain(";;;ハイライト,色=url(evil);;; 注目 ;;;");
    assert_eq!(html, "<div class=\"highlight\">注目</div>");
}

#[test]
fn test_collapsible_with_summary() {
    let html = plain(";;;折りたたみ,要約=補足事項;;;\n詳しい話\n;;;");
    assert_eq!(
        html,
        "<details><summary>補足事項</summary>詳しい話</details>"
    );
}

#[test]
fn test_collapsible_default_summary() {
    let html = plain(";;;折りたたみ;;; 中身 ;;;");
    assert_eq!(html, "<details><summary>詳細</summary>中身</details>");
}

#[test]
fn test_spoiler_variant() {
    let html = plain(";;;ネタバレ;;; 犯人は執事 ;;;");
    assert_eq!(
        html,
        "<details class=\"spoiler\"><summary>ネタバレ</summary>犯人は執事</details>"
    );
}

// ============================================================================
// Compound Keyword Tests
// ============================================================================

#[test]
fn test_compound_keywords_nest_by_canonical_order() {
    let html = plain(";;;太字,囲み;;; 中身 ;;;");
    assert_eq!(html, "<div class=\"box\"><strong>中身</strong></div>");
}

#[test]
fn test_compound_order_is_input_order_independent() {
    let a = plain(";;;太字,囲み;;; 中身 ;;;");
    let b = plain(";;;囲み,太字;;; 中身 ;;;");
    assert_eq!(a, b);
}

#[test]
fn test_compound_emphasis_pair() {
    let a = plain(";;;イタリック,太字;;; 文 ;;;");
    let b = plain(";;;太字,イタリック;;; 文 ;;;");
    assert_eq!(a, "<em><strong>文</strong></em>");
    assert_eq!(a, b);
}

#[test]
fn test_japanese_comma_separates_keywords() {
    let html = plain(";;;太字、囲み;;; 中身 ;;;");
    assert_eq!(html, "<div class=\"box\"><strong>中身</strong></div>");
}

#[test]
fn test_compound_with_heading_feeds_toc() {
    let result = convert(";;;見出し2,囲み;;;\n節の題\n;;;", &Config::default());
    assert_eq!(result.headings.len(), 1);
    assert_eq!(result.headings[0].level, 2);
    assert!(result.html.contains("<h2 id=\"heading-1\">"));
}

#[test]
fn test_unknown_keyword_in_compound_degrades_to_labeled_span() {
    let result = convert(";;;太字,ピンク;;; 文 ;;;", &Config::default());
    assert!(result
        .html
        .contains("<span class=\"unknown-keyword\" data-keyword=\"ピンク\">"));
    assert!(result.html.contains("<strong>文</strong>"));
    // Advisory only: the content still rendered.
    assert!(!result.diagnostics.has_errors());
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn test_conflicting_heading_levels_warn_but_render() {
    let result = convert(";;;見出し1,見出し2;;; 章 ;;;", &Config::default());
    assert!(!result.diagnostics.has_errors());
    assert_eq!(result.diagnostics.len(), 1);
    assert!(result.html.contains("章"));
}

// ============================================================================
// Inline Construct Tests
// ============================================================================

#[test]
fn test_inline_keyword_span() {
    let html = plain("文中の;;;太字;;;強調;;;部分");
    assert_eq!(html, "<p>文中の<strong>強調</strong>部分</p>");
}

#[test]
fn test_piped_ruby() {
    let html = plain("｜漢字《かんじ》を読む");
    assert_eq!(html, "<p><ruby>漢字<rt>かんじ</rt></ruby>を読む</p>");
}

#[test]
fn test_bare_ruby_takes_trailing_ideograph_run() {
    let html = plain("この漢字《かんじ》を読む");
    assert_eq!(html, "<p>この<ruby>漢字<rt>かんじ</rt></ruby>を読む</p>");
}

#[test]
fn test_pipe_without_reading_is_plain_text() {
    let html = plain("A｜Bのまま");
    assert_eq!(html, "<p>A｜Bのまま</p>");
}

// ============================================================================
// Footnote Tests
// ============================================================================

#[test]
fn test_footnote_reference_and_section() {
    let result = convert("本文((注記))です。", &Config::default());
    assert!(result
        .html
        .contains("<sup class=\"footnote-ref\" id=\"fnref-1\"><a href=\"#fn-1\">1</a></sup>"));
    assert!(result.html.contains("<section class=\"footnotes\">"));
    assert!(result.html.contains("<li id=\"fn-1\">注記"));
    assert!(result.html.contains("href=\"#fnref-1\""));
    assert_eq!(result.footnotes.len(), 1);
}

#[test]
fn test_footnotes_number_in_source_order() {
    let result = convert("一((甲))\n\n二((乙))", &Config::default());
    assert_eq!(result.footnotes.len(), 2);
    assert_eq!(result.footnotes[0].content, "甲");
    assert_eq!(result.footnotes[1].content, "乙");
    assert!(result.html.contains("<li id=\"fn-1\">甲"));
    assert!(result.html.contains("<li id=\"fn-2\">乙"));
}

#[test]
fn test_no_placeholder_tokens_survive_rendering() {
    let result = convert("甲((a))と乙((b))と丙((c))", &Config::default());
    assert!(!result.html.contains("FOOTNOTE_REF"));
}

// ============================================================================
// List, Image, and Fence Tests
// ============================================================================

#[test]
fn test_unordered_list() {
    let html = plain("- 一\n- 二");
    assert_eq!(html, "<ul>\n<li>一</li>\n<li>二</li>\n</ul>");
}

#[test]
fn test_ordered_list() {
    let html = plain("1. 一\n2. 二");
    assert_eq!(html, "<ol>\n<li>一</li>\n<li>二</li>\n</ol>");
}

#[test]
fn test_list_items_parse_inline_constructs() {
    let html = plain("- ;;;太字;;;重要;;;な点");
    assert_eq!(html, "<ul>\n<li><strong>重要</strong>な点</li>\n</ul>");
}

#[test]
fn test_image_directive() {
    let html = plain("画像:img/cat.png|猫の写真");
    assert_eq!(html, "<img src=\"img/cat.png\" alt=\"猫の写真\">");
}

#[test]
fn test_image_directive_without_alt() {
    let html = plain("画像:img/cat.png");
    assert_eq!(html, "<img src=\"img/cat.png\" alt=\"\">");
}

#[test]
fn test_code_fence_with_language() {
    let html = plain("```rust\nfn main() {}\n```");
    assert_eq!(
        html,
        "<pre><code class=\"language-rust\">fn main() {}</code></pre>"
    );
}

#[test]
fn test_code_fence_contents_are_verbatim() {
    let html = plain("```\n;;;太字;;; not a marker ;;;\n```");
    assert!(html.contains(";;;太字;;; not a marker ;;;"));
    assert!(!html.contains("<strong>"));
}

// ============================================================================
// Table of Contents Tests
// ============================================================================

#[test]
fn test_toc_lists_headings_in_document_order() {
    let input = ";;;目次\n;;;\n\n;;;見出し1;;; 一章 ;;;\n\n;;;見出し2;;; 一節 ;;;";
    let result = convert(input, &Config::default());
    assert!(result.html.contains("<nav class=\"toc\">"));
    assert!(result
        .html
        .contains("<li class=\"toc-level-1\"><a href=\"#heading-1\">一章</a></li>"));
    assert!(result
        .html
        .contains("<li class=\"toc-level-2\"><a href=\"#heading-2\">一節</a></li>"));
    let one = result.html.find("#heading-1").unwrap();
    let two = result.html.find("#heading-2").unwrap();
    assert!(one < two);
}

#[test]
fn test_toc_without_headings_is_empty_nav() {
    let html = plain(";;;目次\n;;;\n\nただの段落");
    assert!(html.contains("<nav class=\"toc\"></nav>"));
}

#[test]
fn test_explicit_heading_id_is_kept() {
    let html = plain(";;;見出し1,id=intro;;; はじめに ;;;");
    assert_eq!(html, "<h1 id=\"intro\">はじめに</h1>");
}

// ============================================================================
// Registry Tests
// ============================================================================

#[test]
fn test_registry_resolves_builtin_keywords() {
    let registry = Registry::new();
    assert!(registry.resolve("太字").is_some());
    assert!(registry.resolve("見出し3").is_some());
    assert!(registry.resolve("存在しない").is_none());
}

#[test]
fn test_registry_alias_overrides() {
    let registry =
        Registry::with_overrides(vec![("bold".to_string(), "太字".to_string())]);
    let direct = registry.resolve("太字").map(|d| d.tag);
    assert_eq!(registry.resolve("bold").map(|d| d.tag), direct);
}

#[test]
fn test_canonical_order_deduplicates() {
    let registry = Registry::new();
    let keywords = vec!["太字".to_string(), "太字".to_string(), "囲み".to_string()];
    assert_eq!(registry.canonical_order(&keywords), vec!["太字", "囲み"]);
}

#[test]
fn test_validate_combination_rejects_two_heading_levels() {
    let registry = Registry::new();
    let keywords = vec!["見出し1".to_string(), "見出し2".to_string()];
    assert!(registry.validate_combination(&keywords).is_err());
}

#[test]
fn test_validate_combination_allows_duplicate_keyword() {
    let registry = Registry::new();
    let keywords = vec!["見出し1".to_string(), "見出し1".to_string()];
    assert!(registry.validate_combination(&keywords).is_ok());
}

#[test]
fn test_keyword_overrides_flow_through_convert() {
    let config = Config {
        keyword_overrides: vec![("強調".to_string(), "太字".to_string())],
        ..Config::default()
    };
    let result = convert(";;;強調;;; やあ ;;;", &config);
    assert_eq!(result.html, "<strong>やあ</strong>");
    assert!(result.diagnostics.is_empty());
}

// ============================================================================
// Output Option Tests
// ============================================================================

#[test]
fn test_template_is_passed_through_untouched() {
    let config = Config {
        template: Some("letter".to_string()),
        ..Config::default()
    };
    let result = convert("本文", &config);
    assert_eq!(result.template.as_deref(), Some("letter"));
}

#[test]
fn test_embed_diagnostics_is_noop_on_clean_input() {
    let input = ";;;太字;;; 文 ;;;\n\n段落";
    let base = plain(input);
    let embedded = convert(
        input,
        &Config {
            embed_diagnostics: true,
            ..Config::default()
        },
    );
    assert_eq!(embedded.html, base);
}

#[test]
fn test_embed_diagnostics_prepends_summary_on_errors() {
    let result = convert(
        ";;;太字\n閉じ忘れ",
        &Config {
            embed_diagnostics: true,
            ..Config::default()
        },
    );
    assert!(result.html.starts_with("<details class=\"diagnostics\""));
    assert!(result.html.contains("diagnostic-error"));
}

#[test]
fn test_include_source_wraps_dual_view() {
    let result = convert(
        "本文です。",
        &Config {
            include_source: true,
            ..Config::default()
        },
    );
    assert!(result.html.starts_with("<div class=\"dual-view\">"));
    assert!(result.html.contains("<pre class=\"source\">本文です。</pre>"));
    assert!(result.html.contains("<p>本文です。</p>"));
}

// ============================================================================
// Statistics Tests
// ============================================================================

#[test]
fn test_stats_count_nodes_per_kind() {
    let mut parser = Parser::new();
    let result = parser.parse("段落\n\n- 一\n- 二");
    let stats = result.stats();
    assert_eq!(stats.error_count, 0);
    // p, ul, 2x li
    assert_eq!(stats.node_count, 4);
    assert!(stats.kind_counts.contains(&("li", 2)));
}

//! Span list to HTML.
//!
//! Grammars report many overlapping, fine-grained scopes. Rendering keeps
//! one span per byte range, maps each capture to a highlight.js class
//! (dropping those with no class), merges neighbours that end up with the
//! same class, and then sweeps the span boundaries left to right, wrapping
//! every text segment in the innermost open class.
//!
//! `keyword.control.export.js` followed directly by
//! `storage.type.function.js` both become `hljs-keyword`, so
//! `export function` is emitted as a single element.

use crate::{HtmlFormat, Span};
use hcb_theme::class_for_capture;

impl HtmlFormat {
    fn open_tag(&self, class: &str) -> String {
        match self {
            HtmlFormat::ClassNames => format!("<span class=\"{class}\">"),
            HtmlFormat::ClassNamesWithPrefix(prefix) => {
                // Only the first word takes the prefix; the rest are highlight.js modifiers
                format!("<span class=\"{prefix}-{class}\">")
            }
        }
    }
}

/// A span reduced to its highlight class.
#[derive(Debug, Clone, Copy)]
struct ClassSpan {
    start: u32,
    end: u32,
    class: &'static str,
}

/// Keep one span per byte range. A capture with a class beats one without,
/// then the higher pattern index wins, then the later span.
fn dedupe(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by_key(|span| {
        (
            span.start,
            span.end,
            class_for_capture(&span.capture).is_some(),
            span.pattern_index,
        )
    });

    let mut kept: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match kept.last_mut() {
            Some(last) if last.start == span.start && last.end == span.end => *last = span,
            _ => kept.push(span),
        }
    }
    kept
}

/// Map captures to classes and merge touching spans of the same class.
fn classify(spans: Vec<Span>) -> Vec<ClassSpan> {
    let mut merged: Vec<ClassSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        let Some(class) = class_for_capture(&span.capture) else {
            continue;
        };
        if let Some(last) = merged.last_mut()
            && last.class == class
            && span.start <= last.end
        {
            last.end = last.end.max(span.end);
            continue;
        }
        merged.push(ClassSpan {
            start: span.start,
            end: span.end,
            class,
        });
    }
    merged
}

/// Render `source` with `spans` applied.
///
/// Every byte of the source is emitted exactly once, HTML-escaped, inside or
/// outside a span. Trailing newlines are kept.
pub fn spans_to_html(source: &str, spans: Vec<Span>, format: &HtmlFormat) -> String {
    let mut spans = classify(dedupe(spans));
    if spans.is_empty() {
        return html_escape(source);
    }
    // Outer spans before inner ones that start at the same offset
    spans.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| b.end.cmp(&a.end)));

    // (offset, opens, span index); closes sort before opens at the same offset
    let mut boundaries: Vec<(u32, bool, usize)> = spans
        .iter()
        .enumerate()
        .flat_map(|(i, span)| [(span.start, true, i), (span.end, false, i)])
        .collect();
    boundaries.sort_by_key(|&(offset, opens, _)| (offset, opens));

    let mut html = String::with_capacity(source.len() * 2);
    let mut open: Vec<usize> = Vec::new();
    let mut cursor = 0usize;

    for (offset, opens, index) in boundaries {
        let offset = (offset as usize).min(source.len());
        if offset > cursor {
            let class = open.last().map(|&i| spans[i].class);
            push_segment(&mut html, &source[cursor..offset], class, format);
            cursor = offset;
        }
        if opens {
            open.push(index);
        } else if let Some(at) = open.iter().rposition(|&i| i == index) {
            open.remove(at);
        }
    }

    if cursor < source.len() {
        let class = open.last().map(|&i| spans[i].class);
        push_segment(&mut html, &source[cursor..], class, format);
    }
    html
}

fn push_segment(html: &mut String, text: &str, class: Option<&str>, format: &HtmlFormat) {
    let Some(class) = class else {
        html.push_str(&html_escape(text));
        return;
    };
    html.push_str(&format.open_tag(class));
    html.push_str(&html_escape(text));
    html.push_str("</span>");
}

/// Escape text for HTML element content and quoted attribute values.
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: u32, end: u32, capture: &str) -> Span {
        Span {
            start,
            end,
            capture: capture.into(),
            pattern_index: 0,
        }
    }

    fn hljs() -> HtmlFormat {
        HtmlFormat::ClassNamesWithPrefix("hljs".into())
    }

    #[test]
    fn test_simple_highlight() {
        let source = "fn main";
        let spans = vec![span(0, 2, "keyword"), span(3, 7, "entity.name.function")];
        let html = spans_to_html(source, spans, &hljs());
        assert_eq!(
            html,
            "<span class=\"hljs-keyword\">fn</span> <span class=\"hljs-title function_\">main</span>"
        );
    }

    #[test]
    fn test_unprefixed_class_names() {
        let html = spans_to_html("42", vec![span(0, 2, "constant.numeric")], &HtmlFormat::ClassNames);
        assert_eq!(html, "<span class=\"number\">42</span>");
    }

    #[test]
    fn test_adjacent_same_class_coalesce() {
        let source = "export function";
        let spans = vec![
            span(0, 6, "keyword.control.export.js"),
            span(6, 7, "keyword.other"),
            span(7, 15, "storage.type.function.js"),
        ];
        let html = spans_to_html(source, spans, &hljs());
        assert_eq!(html, "<span class=\"hljs-keyword\">export function</span>");
    }

    #[test]
    fn test_non_adjacent_same_class_stay_separate() {
        let source = "if x else";
        let spans = vec![span(0, 2, "keyword"), span(5, 9, "keyword")];
        let html = spans_to_html(source, spans, &hljs());
        assert_eq!(
            html,
            "<span class=\"hljs-keyword\">if</span> x <span class=\"hljs-keyword\">else</span>"
        );
    }

    #[test]
    fn test_overlapping_spans_dedupe() {
        let source = "apiVersion";
        let spans = vec![span(0, 10, "property"), span(0, 10, "variable")];
        let html = spans_to_html(source, spans, &hljs());
        assert!(!html.contains("apiVersionapiVersion"));
        assert_eq!(html.matches("<span").count(), 1);
    }

    #[test]
    fn test_pattern_index_deduplication() {
        let source = "name";
        let spans = vec![
            Span {
                start: 0,
                end: 4,
                capture: "string".into(),
                pattern_index: 1,
            },
            Span {
                start: 0,
                end: 4,
                capture: "property".into(),
                pattern_index: 5,
            },
        ];
        let html = spans_to_html(source, spans, &hljs());
        assert_eq!(html, "<span class=\"hljs-property\">name</span>");
    }

    #[test]
    fn test_styled_span_beats_unstyled() {
        let spans = vec![
            Span {
                start: 0,
                end: 3,
                capture: "comment".into(),
                pattern_index: 0,
            },
            Span {
                start: 0,
                end: 3,
                capture: "spell".into(),
                pattern_index: 9,
            },
        ];
        let html = spans_to_html("// x", spans, &hljs());
        assert_eq!(html, "<span class=\"hljs-comment\">// </span>x");
    }

    #[test]
    fn test_nested_spans() {
        let source = "`a ${b} c`";
        let spans = vec![span(0, 10, "string.template"), span(3, 7, "meta.template.expression")];
        let html = spans_to_html(source, spans, &hljs());
        assert_eq!(
            html,
            "<span class=\"hljs-string\">`a </span><span class=\"hljs-subst\">${b}</span><span class=\"hljs-string\"> c`</span>"
        );
    }

    #[test]
    fn test_html_escape() {
        let html = spans_to_html("<script>", vec![], &hljs());
        assert_eq!(html, "&lt;script&gt;");
        assert_eq!(html_escape("a & 'b' \"c\""), "a &amp; &#39;b&#39; &quot;c&quot;");
    }

    #[test]
    fn test_escape_inside_span() {
        let html = spans_to_html("\"<b>\"", vec![span(0, 5, "string")], &hljs());
        assert_eq!(html, "<span class=\"hljs-string\">&quot;&lt;b&gt;&quot;</span>");
    }

    #[test]
    fn test_unstyled_spans_render_plain() {
        let spans = vec![span(0, 1, "punctuation.section.block.begin.js")];
        assert_eq!(spans_to_html("{}", spans, &hljs()), "{}");
    }

    #[test]
    fn test_trailing_newline_preserved() {
        let source = "x = 1\n\n";
        let html = spans_to_html(source, vec![span(4, 5, "constant.numeric")], &hljs());
        assert_eq!(html, "x = <span class=\"hljs-number\">1</span>\n\n");
    }

    #[test]
    fn test_multibyte_source() {
        let source = "s = \"héllo\"";
        let spans = vec![span(4, source.len() as u32, "string")];
        let html = spans_to_html(source, spans, &hljs());
        assert_eq!(html, "s = <span class=\"hljs-string\">&quot;héllo&quot;</span>");
    }
}

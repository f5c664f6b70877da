//! The editor preview and the published render must agree byte for byte.

use std::sync::Once;

use hcb::{BlockAttributes, BlockEditor, Content, Highlighter, RichText, StaticRenderer, parse_blocks};
use indoc::indoc;

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn preview(hl: &Highlighter, content: &str, language: &str) -> String {
    let mut editor = BlockEditor::new(hl.clone());
    editor.set_content(content);
    editor.set_language(language);
    editor.deselect();
    editor.preview_markup().to_string()
}

#[test]
fn test_live_and_static_agree() {
    init_logging();
    let hl = Highlighter::new();
    let renderer = StaticRenderer::new(hl.clone());

    let cases = [
        ("function hello() {\n\tconsole.log(\"hello world\");\n}\n", "javascript"),
        ("<b>x</b>", "none"),
        ("fn main() { println!(\"{}\", 1 < 2); }", "rust"),
        ("SELECT * FROM t WHERE a <> 'b';", "sql"),
        ("anything", "no-such-language"),
        ("", "python"),
        ("x", ""),
    ];

    for (content, language) in cases {
        let live = preview(&hl, content, language);

        let mut editor = BlockEditor::new(hl.clone());
        editor.set_content(content);
        editor.set_language(language);
        let saved = editor.save();

        let published = renderer.render_post(&saved);
        assert_eq!(published.html, live, "{language}: {content:?}");
        assert!(published.has_block);
    }
}

#[test]
fn test_javascript_example() {
    init_logging();
    let hl = Highlighter::new();
    let html = preview(&hl, "function hello() {}", "javascript");
    assert!(html.starts_with("<pre><code class=\"hljs language-javascript\">"));
    assert!(html.contains("<span class=\"hljs-keyword\">function</span>"));
    assert!(html.ends_with("</code></pre>"));
}

#[test]
fn test_markup_in_none_block_is_escaped() {
    init_logging();
    let renderer = StaticRenderer::default();
    let post = indoc! {r#"
        <!-- wp:dm-hcb/highlighted-code-block {"content":"<b>x</b>"} -->
        <pre><code><b>x</b></code></pre>
        <!-- /wp:dm-hcb/highlighted-code-block -->
    "#};
    let rendered = renderer.render_post(post);
    assert_eq!(rendered.html, "<pre><code>&lt;b&gt;x&lt;/b&gt;</code></pre>\n");
    assert!(!rendered.html.contains("hljs"));
}

#[test]
fn test_rich_text_content_renders_as_text() {
    init_logging();
    let hl = Highlighter::new();
    let rich = Content::RichText(RichText::from_html("<strong>let</strong> a = 1;"));
    let attrs = BlockAttributes::new(rich, "javascript");
    let plain = BlockAttributes::new("let a = 1;", "javascript");
    assert_eq!(
        hcb::render_code_block(&attrs, &hl),
        hcb::render_code_block(&plain, &hl)
    );
}

#[test]
fn test_render_is_deterministic_across_forks() {
    init_logging();
    let hl = Highlighter::new();
    let post = indoc! {r#"
        <p>Intro</p>
        <!-- wp:dm-hcb/highlighted-code-block {"language":"python","content":"def f():\n    return 1\n"} -->
        <pre><code class="hljs language-python">old</code></pre>
        <!-- /wp:dm-hcb/highlighted-code-block -->
        <!-- wp:dm-hcb/highlighted-code-block {"language":"bash","content":"echo $HOME"} -->
        <pre><code class="hljs language-bash">old</code></pre>
        <!-- /wp:dm-hcb/highlighted-code-block -->
    "#};
    assert_eq!(parse_blocks(post).unwrap().len(), 2);

    let first = StaticRenderer::new(hl.fork()).render_post(post);
    let second = StaticRenderer::new(hl.fork()).render_post(post);
    assert_eq!(first, second);
    assert_eq!(first.blocks, 2);
    assert!(first.html.starts_with("<p>Intro</p>\n<pre><code class=\"hljs language-python\">"));
}

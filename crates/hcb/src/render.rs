//! Block body rendering, shared by the editor preview and published output.

use crate::block::{BlockAttributes, has_block, scan_blocks};
use crate::escape::{escape_attr, html_escape};
use crate::highlighter::Highlighter;

/// Render a block's body from its attributes.
///
/// With a language: `<pre><code class="hljs language-<id>">…</code></pre>`,
/// where `<id>` is the stored id as-is. Without one the content is escaped
/// literal text in a bare `<pre><code>`.
pub fn render_code_block(attributes: &BlockAttributes, highlighter: &Highlighter) -> String {
    let text = attributes.content.to_plain_markup();
    if !attributes.has_language() {
        return format!("<pre><code>{}</code></pre>", html_escape(&text));
    }
    let body = highlighter.highlight_html(&text, &attributes.language);
    format!(
        "<pre><code class=\"hljs language-{}\">{body}</code></pre>",
        escape_attr(&attributes.language)
    )
}

/// Result of rendering a post for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPost {
    pub html: String,
    /// Whether the post contains at least one highlighted code block; drives
    /// theme stylesheet enqueueing.
    pub has_block: bool,
    /// Number of blocks rendered.
    pub blocks: usize,
}

/// Publish-time renderer for post content.
#[derive(Debug, Clone, Default)]
pub struct StaticRenderer {
    highlighter: Highlighter,
}

impl StaticRenderer {
    pub fn new(highlighter: Highlighter) -> Self {
        Self { highlighter }
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn render_block(&self, attributes: &BlockAttributes) -> String {
        render_code_block(attributes, &self.highlighter)
    }

    /// Replace every highlighted code block in `content` with its rendered
    /// body. The saved inner HTML is ignored; the attributes are re-rendered.
    ///
    /// Content that is not one of our blocks is copied through. A block with
    /// unreadable attributes renders with the defaults; an unclosed block and
    /// everything after it is left as saved.
    pub fn render_post(&self, content: &str) -> RenderedPost {
        let scan = scan_blocks(content);
        for e in &scan.errors {
            tracing::warn!("{e}");
        }
        let blocks = scan.blocks;

        let mut html = String::with_capacity(content.len());
        let mut cursor = 0;
        for block in &blocks {
            html.push_str(&content[cursor..block.range.start]);
            html.push_str(&self.render_block(&block.attributes));
            cursor = block.range.end;
        }
        html.push_str(&content[cursor..]);

        tracing::debug!(blocks = blocks.len(), "rendered post");
        RenderedPost {
            html,
            has_block: !blocks.is_empty() || has_block(content),
            blocks: blocks.len(),
        }
    }
}

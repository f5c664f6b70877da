//! Block attributes and the persisted block markup.
//!
//! A saved block looks like:
//!
//! ```html
//! <!-- wp:dm-hcb/highlighted-code-block {"language":"javascript","content":"let a;"} -->
//! <pre><code class="hljs language-javascript">…</code></pre>
//! <!-- /wp:dm-hcb/highlighted-code-block -->
//! ```
//!
//! The attributes in the opening comment are the source of truth; the inner
//! HTML is a rendering of them. Attributes equal to their default are left
//! out of the comment, and the JSON is escaped so that it can never terminate
//! the comment early.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use hcb_theme::BLOCK_NAME;

use crate::content::{Content, RichText};
use crate::error::BlockError;
use crate::languages::NONE;

/// Block delimiter comment: `<!-- wp:ns/name {attrs} -->`, `<!-- /wp:ns/name -->`
/// or the void form `<!-- wp:ns/name {attrs} /-->`.
static DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)<!--\s+(?P<closer>/)?wp:(?P<namespace>[a-z][a-z0-9_-]*/)?(?P<name>[a-z][a-z0-9_-]*)\s+(?P<attrs>\{.*?\}\s+)?(?P<void>/)?-->",
    )
    .expect("delimiter pattern is valid")
});

fn default_language() -> String {
    NONE.to_string()
}

fn is_default_language(language: &str) -> bool {
    language == NONE
}

/// The block's persisted attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockAttributes {
    /// Language id as picked by the author, stored verbatim.
    #[serde(default = "default_language", skip_serializing_if = "is_default_language")]
    pub language: String,

    #[serde(default, skip_serializing_if = "Content::is_empty")]
    pub content: Content,

    /// Attributes this block does not interpret (`className`, `anchor`…),
    /// kept so a parse/serialize cycle does not drop them.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for BlockAttributes {
    fn default() -> Self {
        Self {
            language: default_language(),
            content: Content::default(),
            extra: serde_json::Map::new(),
        }
    }
}

impl BlockAttributes {
    pub fn new(content: impl Into<Content>, language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            content: content.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Whether a language other than "none" is set.
    pub fn has_language(&self) -> bool {
        !self.language.is_empty() && self.language != NONE
    }
}

/// A highlighted code block found in post content.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeBlock {
    pub attributes: BlockAttributes,
    /// Byte range of the whole block, delimiters included.
    pub range: Range<usize>,
    /// Byte range of the saved inner HTML.
    pub inner: Range<usize>,
}

/// Serialize attributes as JSON that is safe inside an HTML comment.
pub fn serialize_attributes(attributes: &BlockAttributes) -> String {
    let json = serde_json::to_string(attributes).unwrap_or_else(|_| "{}".to_string());
    escape_for_comment(&json)
}

/// Rewrite `--`, `<`, `>`, `&` and escaped quotes inside JSON strings as
/// `\uXXXX` escapes. Only string tokens are touched.
fn escape_for_comment(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if !in_string {
            in_string = c == '"';
            out.push(c);
            continue;
        }
        if escaped {
            escaped = false;
            if c == '"' {
                out.push_str("u0022");
            } else {
                out.push(c);
            }
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                out.push(c);
            }
            '"' => {
                in_string = false;
                out.push(c);
            }
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                out.push_str("\\u002d\\u002d");
            }
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap rendered inner HTML in the block's delimiter comments.
pub fn serialize_block(attributes: &BlockAttributes, inner_html: &str) -> String {
    let json = serialize_attributes(attributes);
    let attrs = if json == "{}" {
        String::new()
    } else {
        format!("{json} ")
    };
    format!("<!-- wp:{BLOCK_NAME} {attrs}-->\n{inner_html}\n<!-- /wp:{BLOCK_NAME} -->")
}

/// Quick check whether content contains at least one highlighted code block.
pub fn has_block(content: &str) -> bool {
    DELIMITER
        .captures_iter(content)
        .any(|c| c.name("closer").is_none() && is_our_block(&c))
}

fn is_our_block(captures: &regex::Captures<'_>) -> bool {
    let namespace = captures.name("namespace").map_or("core/", |m| m.as_str());
    let name = captures.name("name").map_or("", |m| m.as_str());
    BLOCK_NAME
        .strip_prefix(namespace)
        .is_some_and(|rest| rest == name)
}

/// Every highlighted code block in post content, plus the problems met on
/// the way.
#[derive(Debug, Default)]
pub struct BlockScan {
    pub blocks: Vec<CodeBlock>,
    pub errors: Vec<BlockError>,
}

/// Find every highlighted code block in post content, in document order.
///
/// Other blocks, including ones wrapping ours, are skipped over. Fails on
/// the first malformed block; see [`scan_blocks`] to recover instead.
pub fn parse_blocks(content: &str) -> Result<Vec<CodeBlock>, BlockError> {
    let scan = scan_blocks(content);
    match scan.errors.into_iter().next() {
        Some(error) => Err(error),
        None => Ok(scan.blocks),
    }
}

/// Like [`parse_blocks`], but keeps going past malformed blocks.
///
/// A block whose attributes cannot be read takes the default attributes
/// (its code is then taken from the saved inner HTML). A block that is
/// never closed ends the scan; content from its opener on is not a block.
pub fn scan_blocks(content: &str) -> BlockScan {
    let mut scan = BlockScan::default();
    let mut delimiters = DELIMITER.captures_iter(content);

    while let Some(opener) = delimiters.next() {
        if opener.name("closer").is_some() || !is_our_block(&opener) {
            continue;
        }
        let whole = opener.get(0).map_or(0..0, |m| m.range());
        let offset = whole.start;
        let json = opener.name("attrs").map_or("{}", |m| m.as_str().trim_end());
        let mut attributes = match serde_json::from_str::<BlockAttributes>(json) {
            Ok(attributes) => attributes,
            Err(source) => {
                scan.errors.push(BlockError::InvalidAttributes { offset, source });
                BlockAttributes::default()
            }
        };

        if opener.name("void").is_some() {
            scan.blocks.push(CodeBlock {
                attributes,
                range: whole.clone(),
                inner: whole.end..whole.end,
            });
            continue;
        }

        let Some(closer) = delimiters
            .by_ref()
            .find(|c| c.name("closer").is_some() && is_our_block(c))
        else {
            scan.errors.push(BlockError::Unclosed { offset });
            break;
        };
        let closer = closer.get(0).map_or(0..0, |m| m.range());
        let inner = whole.end..closer.start;

        // Blocks saved without a content attribute keep their code in the inner HTML
        if attributes.content.is_empty() {
            let rich = RichText::from_code_html(&content[inner.clone()]);
            if !rich.text.is_empty() {
                attributes.content = Content::RichText(rich);
            }
        }

        scan.blocks.push(CodeBlock {
            attributes,
            range: whole.start..closer.end,
            inner,
        });
    }

    scan
}

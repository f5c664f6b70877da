//! Highlighted code blocks.
//!
//! This crate provides:
//! - The language catalog behind the block's language picker
//! - A highlighter producing highlight.js-compatible markup that never fails
//! - The block's attributes and their persisted comment markup
//! - Rendering for the editor preview and for published posts, which produce
//!   identical markup for identical attributes
//!
//! # Example
//!
//! ```rust,ignore
//! use hcb::{BlockAttributes, Highlighter, StaticRenderer, render_code_block};
//!
//! let hl = Highlighter::new();
//! let attrs = BlockAttributes::new("function hello() {}", "javascript");
//! let html = render_code_block(&attrs, &hl);
//! // <pre><code class="hljs language-javascript"><span class="hljs-keyword">function</span> ...
//!
//! let post = StaticRenderer::new(hl).render_post(&saved_post_content);
//! if post.has_block {
//!     // link the theme stylesheet
//! }
//! ```

pub mod block;
pub mod content;
pub mod editor;
mod error;
pub mod escape;
mod highlighter;
pub mod languages;
mod provider;
mod render;

pub use block::{
    BLOCK_NAME, BlockAttributes, BlockScan, CodeBlock, has_block, parse_blocks, scan_blocks,
    serialize_attributes, serialize_block,
};
pub use content::{Content, Format, RichText};
pub use editor::{BlockEditor, EditorView, LivePreview, SelectionState};
pub use error::{BlockError, EngineFailure};
pub use highlighter::Highlighter;
pub use languages::{FALLBACK, LanguageCatalog, LanguageDef, LanguageOption, NONE};
pub use provider::SyntectProvider;
pub use render::{RenderedPost, StaticRenderer, render_code_block};

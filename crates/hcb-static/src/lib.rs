//! Highlight code blocks in already rendered HTML.
//!
//! Pages rendered before highlighting was enabled (or exported by other
//! tools) carry code as `<pre><code class="language-x">`. This crate rewrites
//! those blocks into the same markup the block renderer produces, so one
//! theme stylesheet styles both.
//!
//! # How it works
//!
//! 1. **HTML Transformation**: lol_html streams through each document,
//!    collecting the text of every language-tagged code block and replacing
//!    it with highlighted markup. Blocks already carrying `hljs` are skipped.
//!
//! 2. **Directory processing**: [`Processor`] walks a directory tree and
//!    transforms `.html` files in parallel, either in place or into a copy.

mod html;
mod processor;

pub use html::{TransformError, TransformResult, transform_html};
pub use processor::{ProcessError, ProcessOptions, Processor, ProcessorStats};

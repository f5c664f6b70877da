//! Syntax highlighting core for highlighted code blocks.
//!
//! This crate turns source text into highlight.js-compatible HTML. It knows
//! nothing about WordPress blocks or language catalogs; it only knows how to
//! ask a grammar for spans and how to render spans.
//!
//! # Architecture
//!
//! The highlighting system is built around two key traits:
//!
//! - [`Grammar`]: parses text into spans
//! - [`GrammarProvider`]: looks grammars up by language name
//!
//! [`SyncHighlighter`] ties a provider to an output format. Parsing is always
//! synchronous and grammars are immutable once built, so a highlighter can be
//! shared across threads when its provider can.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hcb_highlight::{Grammar, GrammarProvider, HighlightError, Span, SyncHighlighter};
//!
//! struct MyGrammar;
//! impl Grammar for MyGrammar {
//!     fn parse(&self, text: &str) -> Result<Vec<Span>, HighlightError> {
//!         Ok(vec![])
//!     }
//! }
//!
//! struct MyProvider { grammar: MyGrammar }
//! impl GrammarProvider for MyProvider {
//!     type Grammar = MyGrammar;
//!     fn get(&self, language: &str) -> Option<&Self::Grammar> {
//!         (language == "mine").then_some(&self.grammar)
//!     }
//! }
//!
//! let highlighter = SyncHighlighter::new(MyProvider { grammar: MyGrammar });
//! let html = highlighter.highlight("mine", "fn main() {}")?;
//! // Output: <span class="hljs-keyword">fn</span> <span class="hljs-title function_">main</span>() {}
//! ```
//!
//! # HTML Output Formats
//!
//! - **`ClassNamesWithPrefix(prefix)`** (default, prefix `hljs`): `<span class="hljs-keyword">`,
//!   styled by any stock highlight.js theme
//! - **`ClassNames`**: bare `<span class="keyword">`

mod render;
mod types;

#[cfg(feature = "syntect")]
pub mod syntect;

pub use render::{html_escape, spans_to_html};
pub use types::{HighlightError, Span};

#[cfg(feature = "syntect")]
pub use self::syntect::SyntectGrammar;

/// A parsed language definition producing highlight spans.
pub trait Grammar {
    /// Parse text and return spans.
    ///
    /// Spans may overlap and need not be sorted; rendering takes care of both.
    fn parse(&self, text: &str) -> Result<Vec<Span>, HighlightError>;
}

/// Provides grammars for languages.
pub trait GrammarProvider {
    /// The grammar type this provider returns.
    type Grammar: Grammar;

    /// Get a grammar for a language.
    ///
    /// Returns `None` if the language is not supported.
    fn get(&self, language: &str) -> Option<&Self::Grammar>;
}

/// How highlight classes are written into the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlFormat {
    /// `<span class="keyword">`
    ClassNames,
    /// `<span class="{prefix}-keyword">`; with `hljs` this matches stock
    /// highlight.js themes.
    ClassNamesWithPrefix(String),
}

impl Default for HtmlFormat {
    fn default() -> Self {
        Self::ClassNamesWithPrefix("hljs".to_string())
    }
}

/// Synchronous highlighter: a grammar provider plus an output format.
///
/// # Example
///
/// ```rust,ignore
/// let highlighter = SyncHighlighter::new(provider);
/// let html = highlighter.highlight("rust", "fn main() {}")?;
/// ```
pub struct SyncHighlighter<P: GrammarProvider> {
    provider: P,
    format: HtmlFormat,
}

impl<P: GrammarProvider> SyncHighlighter<P> {
    /// Highlighter emitting `hljs-` prefixed classes.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            format: HtmlFormat::default(),
        }
    }

    /// Parse `source` with the grammar for `language` and return raw spans.
    pub fn highlight_spans(&self, language: &str, source: &str) -> Result<Vec<Span>, HighlightError> {
        let grammar = self
            .provider
            .get(language)
            .ok_or_else(|| HighlightError::UnsupportedLanguage(language.into()))?;
        grammar.parse(source)
    }

    /// Highlight source code and return HTML.
    pub fn highlight(&self, language: &str, source: &str) -> Result<String, HighlightError> {
        let spans = self.highlight_spans(language, source)?;
        Ok(spans_to_html(source, spans, &self.format))
    }
}

impl<P: GrammarProvider + Clone> Clone for SyncHighlighter<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            format: self.format.clone(),
        }
    }
}

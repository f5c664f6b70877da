//! The highlight transform: code text + language id → highlighted markup.
//!
//! # Failure policy
//!
//! Highlighting is best-effort. Rendering a post must never fail because a
//! grammar choked on a snippet, so every engine failure is logged and the
//! snippet is shown as-is. [`Highlighter::try_highlight`] exposes the
//! underlying `Result` for diagnostics.
//!
//! # Thread Safety
//!
//! The grammar tables are loaded once and shared read-only via `Arc`; cloning
//! (or [`fork`](Highlighter::fork)ing) a highlighter is cheap and the clone
//! can move to another thread.
//!
//! ```rust,ignore
//! use hcb::Highlighter;
//! use rayon::prelude::*;
//!
//! let hl = Highlighter::new();
//! let results: Vec<_> = snippets
//!     .par_iter()
//!     .map_init(|| hl.fork(), |hl, (code, lang)| hl.highlight(code, lang))
//!     .collect();
//! ```

use std::sync::Arc;

use hcb_highlight::SyncHighlighter;

use crate::error::EngineFailure;
use crate::escape::html_escape;
use crate::languages::{LanguageCatalog, LanguageOption, NONE};
use crate::provider::SyntectProvider;

/// High-level highlighter producing highlight.js-compatible HTML.
#[derive(Clone)]
pub struct Highlighter {
    engine: Arc<SyncHighlighter<SyntectProvider>>,
    catalog: Arc<LanguageCatalog>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("languages", &self.catalog.len())
            .finish()
    }
}

impl Highlighter {
    /// Create a highlighter over the bundled syntaxes.
    pub fn new() -> Self {
        Self::with_provider(SyntectProvider::new())
    }

    /// Create a highlighter over a specific provider.
    pub fn with_provider(provider: SyntectProvider) -> Self {
        let catalog = LanguageCatalog::from_available(provider.available());
        Self {
            engine: Arc::new(SyncHighlighter::new(provider)),
            catalog: Arc::new(catalog),
        }
    }

    /// Fork this highlighter for use on another thread.
    ///
    /// The fork shares grammar tables with the original.
    pub fn fork(&self) -> Self {
        self.clone()
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    /// Picker options, "None" first.
    pub fn list_languages(&self) -> Vec<LanguageOption> {
        self.catalog.list_languages()
    }

    /// Resolve a stored id to the id the engine will highlight with.
    pub fn resolve(&self, language: &str) -> &'static str {
        self.catalog.resolve(language)
    }

    /// Highlight `text` as `language`.
    ///
    /// - `language == "none"` or empty `text`: returns `text` unchanged
    ///   (literal text, not markup).
    /// - Otherwise: highlighted HTML for the resolved language (unknown ids
    ///   highlight as plain text, which escapes it).
    /// - Engine failure: returns `text` unchanged.
    ///
    /// The same input always produces the same output.
    pub fn highlight(&self, text: &str, language: &str) -> String {
        if language == NONE || text.is_empty() {
            return text.to_string();
        }
        let resolved = self.resolve(language);
        match self.try_highlight(text, resolved) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("{e}; showing snippet unhighlighted");
                text.to_string()
            }
        }
    }

    /// Like [`highlight`](Self::highlight), but always returns HTML that is
    /// safe to place inside `<code>`: every path that would return the
    /// literal text returns it escaped instead.
    pub fn highlight_html(&self, text: &str, language: &str) -> String {
        if language == NONE || text.is_empty() {
            return html_escape(text);
        }
        let resolved = self.resolve(language);
        match self.try_highlight(text, resolved) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("{e}; showing snippet unhighlighted");
                html_escape(text)
            }
        }
    }

    /// Run the engine for an already resolved language.
    pub fn try_highlight(&self, text: &str, language: &str) -> Result<String, EngineFailure> {
        self.engine
            .highlight(language, text)
            .map_err(|source| EngineFailure {
                language: language.to_string(),
                source,
            })
    }
}

/// A highlighted region of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Byte offset where the span starts (inclusive).
    pub start: u32,
    /// Byte offset where the span ends (exclusive).
    pub end: u32,
    /// Scope or capture name, e.g. `keyword.control.js`.
    pub capture: String,
    /// Tie-breaker when two spans cover the same range: the higher index wins.
    pub pattern_index: u32,
}

/// Why highlighting could not produce spans.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HighlightError {
    /// No grammar is registered for the language.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// The grammar failed while parsing.
    #[error("{language} grammar failed: {message}")]
    Engine { language: String, message: String },
}

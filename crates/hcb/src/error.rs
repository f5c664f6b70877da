use hcb_highlight::HighlightError;

/// The highlighting engine could not highlight a snippet.
///
/// This never escapes [`crate::Highlighter::highlight`]; it is absorbed there
/// and the snippet is shown unhighlighted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to highlight {language}: {source}")]
pub struct EngineFailure {
    pub language: String,
    #[source]
    pub source: HighlightError,
}

/// Persisted block markup could not be understood.
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error("block opened at byte {offset} is never closed")]
    Unclosed { offset: usize },

    #[error("invalid block attributes at byte {offset}: {source}")]
    InvalidAttributes {
        offset: usize,
        #[source]
        source: serde_json::Error,
    },
}

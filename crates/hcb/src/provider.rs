//! Grammar provider backed by syntect's bundled syntaxes.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use hcb_highlight::{GrammarProvider, SyntectGrammar};
use syntect::parsing::SyntaxSet;

use crate::languages::{LANGUAGES, normalize_language};

static DEFAULT_SYNTAXES: LazyLock<Arc<SyntaxSet>> =
    LazyLock::new(|| Arc::new(SyntaxSet::load_defaults_newlines()));

/// A provider holding one grammar per catalog language the syntax set covers.
///
/// Grammars are built eagerly: a syntect grammar is only an index into the
/// shared syntax set, so there is nothing to gain from laziness.
#[derive(Clone)]
pub struct SyntectProvider {
    grammars: HashMap<&'static str, SyntectGrammar>,
}

impl Default for SyntectProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntectProvider {
    /// Create a provider over syntect's default syntaxes (loaded once per process).
    pub fn new() -> Self {
        Self::with_syntaxes(DEFAULT_SYNTAXES.clone())
    }

    /// Create a provider over a custom syntax set.
    pub fn with_syntaxes(syntaxes: Arc<SyntaxSet>) -> Self {
        let mut grammars = HashMap::new();
        for def in LANGUAGES {
            match SyntectGrammar::by_name(syntaxes.clone(), def.syntax) {
                Some(grammar) => {
                    grammars.insert(def.id, grammar);
                }
                None => tracing::debug!(language = def.id, syntax = def.syntax, "syntax not bundled"),
            }
        }
        Self { grammars }
    }

    /// Canonical ids of every language with a grammar.
    pub fn available(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.grammars.keys().copied()
    }
}

impl GrammarProvider for SyntectProvider {
    type Grammar = SyntectGrammar;

    fn get(&self, language: &str) -> Option<&Self::Grammar> {
        let def = normalize_language(language)?;
        self.grammars.get(def.id)
    }
}

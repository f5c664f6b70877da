//! Grammar implementation backed by syntect's TextMate/Sublime syntaxes.
//!
//! syntect reports scope stack operations per line. We replay them into a
//! [`ScopeStack`] and, for every text region between two operations, emit a
//! span for the innermost scope that maps to a styled slot. Regions whose
//! whole stack is unstyled (plain identifiers, punctuation) produce no span.

use crate::{Grammar, HighlightError, Span};
use ::syntect::parsing::{ParseState, Scope, ScopeStack, SyntaxReference, SyntaxSet};
use ::syntect::util::LinesWithEndings;
use hcb_theme::{ThemeSlot, capture_to_slot};
use std::collections::HashMap;
use std::sync::Arc;

/// A single syntax out of a shared [`SyntaxSet`].
#[derive(Clone)]
pub struct SyntectGrammar {
    syntaxes: Arc<SyntaxSet>,
    index: usize,
}

impl SyntectGrammar {
    /// Look up a syntax by its exact name (e.g. `"JavaScript"`, `"Plain Text"`).
    pub fn by_name(syntaxes: Arc<SyntaxSet>, name: &str) -> Option<Self> {
        let index = syntaxes.syntaxes().iter().position(|s| s.name == name)?;
        Some(Self { syntaxes, index })
    }

    fn syntax(&self) -> &SyntaxReference {
        &self.syntaxes.syntaxes()[self.index]
    }

    /// The syntax's display name.
    pub fn name(&self) -> &str {
        &self.syntax().name
    }
}

impl std::fmt::Debug for SyntectGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntectGrammar")
            .field("name", &self.name())
            .finish()
    }
}

impl Grammar for SyntectGrammar {
    fn parse(&self, text: &str) -> Result<Vec<Span>, HighlightError> {
        let engine_error = |message: String| HighlightError::Engine {
            language: self.name().to_string(),
            message,
        };

        let mut state = ParseState::new(self.syntax());
        let mut stack = ScopeStack::new();
        let mut styled = StyledScopes::default();
        let mut spans = Vec::new();
        let mut line_start = 0usize;

        for line in LinesWithEndings::from(text) {
            let ops = state
                .parse_line(line, &self.syntaxes)
                .map_err(|e| engine_error(e.to_string()))?;

            // The line ending is never part of a span
            let content_len = line.trim_end_matches(['\n', '\r']).len();
            let mut pos = 0usize;
            for (op_pos, op) in ops {
                let op_pos = op_pos.min(line.len());
                if op_pos > pos {
                    let end = op_pos.min(content_len);
                    if end > pos {
                        styled.push_region(&stack, line_start + pos, line_start + end, &mut spans);
                    }
                    pos = op_pos;
                }
                stack.apply(&op).map_err(|e| engine_error(format!("{e:?}")))?;
            }
            if pos < content_len {
                styled.push_region(&stack, line_start + pos, line_start + content_len, &mut spans);
            }

            line_start += line.len();
        }

        Ok(spans)
    }
}

/// Memoizes scope → capture name lookups for one parse.
#[derive(Default)]
struct StyledScopes {
    names: HashMap<Scope, Option<String>>,
}

impl StyledScopes {
    fn capture_for(&mut self, scope: Scope) -> Option<&str> {
        self.names
            .entry(scope)
            .or_insert_with(|| {
                let name = scope.build_string();
                (capture_to_slot(&name) != ThemeSlot::None).then_some(name)
            })
            .as_deref()
    }

    fn push_region(&mut self, stack: &ScopeStack, start: usize, end: usize, spans: &mut Vec<Span>) {
        let scopes = stack.as_slice();
        for (depth, scope) in scopes.iter().enumerate().rev() {
            if let Some(capture) = self.capture_for(*scope) {
                spans.push(Span {
                    start: start as u32,
                    end: end as u32,
                    capture: capture.to_string(),
                    pattern_index: depth as u32,
                });
                return;
            }
        }
    }
}

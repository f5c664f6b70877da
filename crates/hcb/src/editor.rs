//! Editor-side state: the block being edited and its live preview.
//!
//! The editor shows a plain text input while the block is selected and the
//! highlighted preview otherwise. Edits persist into the attributes as they
//! happen; selecting or deselecting the block never touches them.

use crate::block::{BlockAttributes, serialize_block};
use crate::content::Content;
use crate::highlighter::Highlighter;
use crate::languages::{LanguageOption, NONE};
use crate::render::render_code_block;

/// Placeholder shown in an empty code input.
pub const PLACEHOLDER: &str = "Write code here…";

/// Memoized preview rendering.
///
/// The preview is recomputed only when the content text or the language
/// changed since the last render.
#[derive(Debug, Clone)]
pub struct LivePreview {
    highlighter: Highlighter,
    memo: Option<((String, String), String)>,
    recomputations: usize,
}

impl LivePreview {
    pub fn new(highlighter: Highlighter) -> Self {
        Self {
            highlighter,
            memo: None,
            recomputations: 0,
        }
    }

    /// Render the preview body for `attributes`.
    pub fn render(&mut self, attributes: &BlockAttributes) -> &str {
        let key = (
            attributes.content.to_plain_markup(),
            attributes.language.clone(),
        );
        let stale = self.memo.as_ref().is_none_or(|(cached, _)| *cached != key);
        if stale {
            tracing::debug!(language = %key.1, "preview memo miss");
            self.recomputations += 1;
            let markup = render_code_block(attributes, &self.highlighter);
            self.memo = Some((key, markup));
        }
        self.memo.as_ref().map_or("", |(_, markup)| markup.as_str())
    }

    /// How many times the preview has actually been rendered.
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Selected,
    Deselected,
}

/// What the editor displays for the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorView {
    /// Raw text input with the current code.
    Input {
        text: String,
        placeholder: &'static str,
    },
    /// Highlighted preview markup.
    Preview { markup: String },
}

/// A block instance open in the editor.
#[derive(Debug, Clone)]
pub struct BlockEditor {
    attributes: BlockAttributes,
    state: SelectionState,
    preview: LivePreview,
}

impl BlockEditor {
    /// A freshly inserted block: default attributes, selected.
    pub fn new(highlighter: Highlighter) -> Self {
        Self {
            attributes: BlockAttributes::default(),
            state: SelectionState::Selected,
            preview: LivePreview::new(highlighter),
        }
    }

    /// An existing block opened from saved attributes, not selected.
    pub fn with_attributes(highlighter: Highlighter, attributes: BlockAttributes) -> Self {
        Self {
            attributes,
            state: SelectionState::Deselected,
            preview: LivePreview::new(highlighter),
        }
    }

    pub fn select(&mut self) {
        self.state = SelectionState::Selected;
    }

    pub fn deselect(&mut self) {
        self.state = SelectionState::Deselected;
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn is_selected(&self) -> bool {
        self.state == SelectionState::Selected
    }

    pub fn set_content(&mut self, content: impl Into<Content>) {
        self.attributes.content = content.into();
    }

    /// Store the picked language verbatim. Clearing the picker stores "none".
    pub fn set_language(&mut self, language: &str) {
        self.attributes.language = if language.is_empty() {
            NONE.to_string()
        } else {
            language.to_string()
        };
    }

    /// Options for the language picker.
    pub fn language_options(&self) -> Vec<LanguageOption> {
        self.preview.highlighter.list_languages()
    }

    pub fn attributes(&self) -> &BlockAttributes {
        &self.attributes
    }

    pub fn view(&mut self) -> EditorView {
        match self.state {
            SelectionState::Selected => EditorView::Input {
                text: self.attributes.content.to_plain_markup(),
                placeholder: PLACEHOLDER,
            },
            SelectionState::Deselected => EditorView::Preview {
                markup: self.preview_markup().to_string(),
            },
        }
    }

    pub fn preview_markup(&mut self) -> &str {
        self.preview.render(&self.attributes)
    }

    pub fn recomputations(&self) -> usize {
        self.preview.recomputations()
    }

    /// Serialize the block as persisted in post content.
    pub fn save(&mut self) -> String {
        let body = self.preview.render(&self.attributes).to_string();
        serialize_block(&self.attributes, &body)
    }
}

//! The `content` attribute: plain code text or a rich-text value.

use std::cell::RefCell;
use std::rc::Rc;

use lol_html::html_content::{Element, EndTag, TextChunk};
use lol_html::{RewriteStrSettings, doc_text, element, rewrite_str};
use serde::{Deserialize, Serialize};

use crate::escape::{decode_entities, html_escape};

/// Inline formats a rich-text value may carry.
const FORMAT_TAGS: &[&str] = &[
    "strong", "b", "em", "i", "code", "kbd", "mark", "s", "sub", "sup", "u",
];

/// An inline format applied to a range of characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Format {
    /// Character (not byte) index where the format starts.
    pub start: usize,
    /// Character index where the format ends (exclusive).
    pub end: usize,
    /// Element name, e.g. `strong`.
    pub tag: String,
}

/// Text with inline formatting, as produced by rich-text editing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichText {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub formats: Vec<Format>,
}

impl RichText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            formats: Vec::new(),
        }
    }

    /// Parse an HTML fragment: known inline tags become formats, `<br>`
    /// becomes a newline, other tags and comments are dropped and
    /// references decoded.
    pub fn from_html(html: &str) -> Self {
        collect(html, false)
    }

    /// Like [`from_html`](Self::from_html), but reads only the first
    /// `<code>` element of the fragment, as saved inside `<pre>`.
    pub fn from_code_html(html: &str) -> Self {
        collect(html, true)
    }

    /// Serialize to an HTML string.
    ///
    /// With `preserve_white_space` the text's whitespace is kept verbatim;
    /// otherwise newlines become `<br>` elements.
    pub fn to_html_string(&self, preserve_white_space: bool) -> String {
        let chars: Vec<char> = self.text.chars().collect();
        let mut formats: Vec<&Format> = self
            .formats
            .iter()
            .filter(|f| f.start < f.end && f.end <= chars.len())
            .collect();
        formats.sort_by_key(|f| (f.start, std::cmp::Reverse(f.end)));

        let mut boundaries: Vec<usize> = formats.iter().flat_map(|f| [f.start, f.end]).collect();
        boundaries.push(0);
        boundaries.push(chars.len());
        boundaries.sort_unstable();
        boundaries.dedup();

        let mut html = String::with_capacity(self.text.len());
        let mut stack: Vec<&Format> = Vec::new();

        for window in boundaries.windows(2) {
            let (from, to) = (window[0], window[1]);
            let active: Vec<&Format> = formats
                .iter()
                .copied()
                .filter(|f| f.start <= from && to <= f.end)
                .collect();

            // Close everything above the longest still-active prefix
            let keep = stack
                .iter()
                .zip(&active)
                .take_while(|(a, b)| std::ptr::eq(**a, **b))
                .count();
            while stack.len() > keep {
                if let Some(f) = stack.pop() {
                    html.push_str(&format!("</{}>", f.tag));
                }
            }
            for f in &active[keep..] {
                html.push_str(&format!("<{}>", f.tag));
                stack.push(*f);
            }

            let segment: String = chars[from..to].iter().collect();
            let escaped = html_escape(&segment);
            if preserve_white_space {
                html.push_str(&escaped);
            } else {
                html.push_str(&escaped.replace('\n', "<br>"));
            }
        }
        while let Some(f) = stack.pop() {
            html.push_str(&format!("</{}>", f.tag));
        }

        html
    }
}

#[derive(Default)]
struct Collector {
    /// Only text inside the first `<code>` counts.
    scoped: bool,
    collecting: bool,
    done: bool,
    /// Raw text of the current text node; entities may span chunks.
    pending: String,
    text: String,
    chars: usize,
    formats: Vec<Format>,
}

impl Collector {
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let decoded = decode_entities(&std::mem::take(&mut self.pending));
        self.chars += decoded.chars().count();
        self.text.push_str(&decoded);
    }

    fn finish_code(&mut self) {
        self.flush();
        self.collecting = false;
        self.done = true;
    }
}

fn collect(html: &str, scoped: bool) -> RichText {
    let state = Rc::new(RefCell::new(Collector {
        scoped,
        collecting: !scoped,
        ..Collector::default()
    }));

    let on_element = {
        let state = state.clone();
        element!("*", move |el: &mut Element<'_, '_>| {
            let name = el.tag_name();
            let mut st = state.borrow_mut();
            st.flush();

            if st.scoped && !st.collecting {
                if st.done || name != "code" {
                    return Ok(());
                }
                st.collecting = true;
                match el.end_tag_handlers() {
                    Some(handlers) => {
                        let state = state.clone();
                        handlers.push(Box::new(move |_end: &mut EndTag<'_>| {
                            state.borrow_mut().finish_code();
                            Ok(())
                        }));
                    }
                    None => st.finish_code(),
                }
                return Ok(());
            }

            if name == "br" {
                st.text.push('\n');
                st.chars += 1;
            } else if FORMAT_TAGS.contains(&name.as_str()) {
                let start = st.chars;
                if let Some(handlers) = el.end_tag_handlers() {
                    let state = state.clone();
                    handlers.push(Box::new(move |_end: &mut EndTag<'_>| {
                        let mut st = state.borrow_mut();
                        st.flush();
                        if st.collecting && start < st.chars {
                            let end = st.chars;
                            st.formats.push(Format {
                                start,
                                end,
                                tag: name,
                            });
                        }
                        Ok(())
                    }));
                }
            }
            Ok(())
        })
    };

    let on_text = {
        let state = state.clone();
        doc_text!(move |chunk: &mut TextChunk<'_>| {
            let mut st = state.borrow_mut();
            if st.collecting {
                st.pending.push_str(chunk.as_str());
            }
            if chunk.last_in_text_node() {
                st.flush();
            }
            Ok(())
        })
    };

    let settings = RewriteStrSettings {
        element_content_handlers: vec![on_element],
        document_content_handlers: vec![on_text],
        ..RewriteStrSettings::new()
    };
    if let Err(e) = rewrite_str(html, settings) {
        tracing::debug!("stopped reading inline markup early: {e}");
    }

    let mut st = state.borrow_mut();
    st.flush();
    let mut formats = std::mem::take(&mut st.formats);
    formats.sort_by_key(|f| (f.start, std::cmp::Reverse(f.end)));
    RichText {
        text: std::mem::take(&mut st.text),
        formats,
    }
}

/// The `content` attribute.
///
/// Stored as a JSON string for plain code, or an object for rich text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    PlainText(String),
    RichText(RichText),
}

impl Default for Content {
    fn default() -> Self {
        Content::PlainText(String::new())
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::PlainText(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::PlainText(text)
    }
}

impl Content {
    /// Resolve the content to the code text fed to the highlighter.
    ///
    /// Rich-text formats are dropped: highlighting replaces any inline
    /// formatting, and the text inside a code block is never markup.
    pub fn to_plain_markup(&self) -> String {
        match self {
            Content::PlainText(text) => text.clone(),
            Content::RichText(rich) => rich.text.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Content::PlainText(text) => text.is_empty(),
            Content::RichText(rich) => rich.text.is_empty(),
        }
    }
}

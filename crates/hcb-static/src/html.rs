//! Streaming rewrite of one HTML document.

use std::cell::RefCell;
use std::rc::Rc;

use hcb::Highlighter;
use hcb::escape::decode_entities;
use lol_html::html_content::{ContentType, Element, EndTag, TextChunk};
use lol_html::{RewriteStrSettings, element, rewrite_str, text};

const CODE_SELECTOR: &str = "pre > code[class*='language-']";
const NESTED_SELECTOR: &str = "pre > code[class*='language-'] *";

/// What a transform did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransformResult {
    /// Code blocks that were highlighted.
    pub blocks_highlighted: usize,
    /// Language-tagged code blocks left alone (already highlighted or "none").
    pub blocks_skipped: usize,
    /// Language ids with no grammar; their blocks were escaped as plain text.
    pub unsupported_languages: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("failed to rewrite HTML: {0}")]
    Rewrite(#[from] lol_html::errors::RewritingError),
}

#[derive(Default)]
struct State {
    /// Language of the code element being collected, if any.
    active: Option<String>,
    buffer: String,
    result: TransformResult,
}

/// The language named by a `language-<id>` token of a class attribute.
fn language_from_class(class: &str) -> Option<&str> {
    class
        .split_ascii_whitespace()
        .find_map(|token| token.strip_prefix("language-"))
        .filter(|lang| !lang.is_empty())
}

/// Highlight every `<pre><code class="language-…">` block in `html`.
///
/// Blocks whose class already contains `hljs` and `language-none` blocks
/// are left untouched. Markup nested inside a code element is dropped and
/// its text highlighted along with the rest.
pub fn transform_html(
    html: &str,
    highlighter: &Highlighter,
) -> Result<(String, TransformResult), TransformError> {
    let state = Rc::new(RefCell::new(State::default()));

    let on_code = {
        let state = state.clone();
        let highlighter = highlighter.clone();
        element!(CODE_SELECTOR, move |el: &mut Element<'_, '_>| {
            let class = el.get_attribute("class").unwrap_or_default();
            let language = language_from_class(&class).map(str::to_string);
            let already = class.split_ascii_whitespace().any(|c| c == "hljs");

            let Some(language) = language.filter(|l| l != hcb::NONE && !already) else {
                state.borrow_mut().result.blocks_skipped += 1;
                return Ok(());
            };

            el.set_attribute("class", &format!("hljs {class}"))?;
            {
                let mut st = state.borrow_mut();
                st.active = Some(language);
                st.buffer.clear();
            }

            let state = state.clone();
            let highlighter = highlighter.clone();
            if let Some(handlers) = el.end_tag_handlers() {
                handlers.push(Box::new(move |end: &mut EndTag<'_>| {
                    let mut st = state.borrow_mut();
                    let language = st.active.take().unwrap_or_default();
                    let code = decode_entities(&std::mem::take(&mut st.buffer));
                    if !highlighter.catalog().is_supported(&language)
                        && !st.result.unsupported_languages.contains(&language)
                    {
                        st.result.unsupported_languages.push(language.clone());
                    }
                    let highlighted = highlighter.highlight_html(&code, &language);
                    end.before(&highlighted, ContentType::Html);
                    st.result.blocks_highlighted += 1;
                    Ok(())
                }));
            }
            Ok(())
        })
    };

    let on_nested = {
        let state = state.clone();
        element!(NESTED_SELECTOR, move |el: &mut Element<'_, '_>| {
            if state.borrow().active.is_some() {
                el.remove_and_keep_content();
            }
            Ok(())
        })
    };

    let on_text = {
        let state = state.clone();
        text!(CODE_SELECTOR, move |chunk: &mut TextChunk<'_>| {
            let mut st = state.borrow_mut();
            if st.active.is_some() {
                st.buffer.push_str(chunk.as_str());
                chunk.remove();
            }
            Ok(())
        })
    };

    let output = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![on_code, on_nested, on_text],
            ..RewriteStrSettings::new()
        },
    )?;

    let result = std::mem::take(&mut state.borrow_mut().result);
    Ok((output, result))
}

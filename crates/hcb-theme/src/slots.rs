//! Highlight slot definitions - single source of truth.
//!
//! This module maps the large vocabulary of scope names produced by grammars
//! (TextMate scopes such as `keyword.control.js` or `entity.name.function.rust`,
//! and tree-sitter style capture names such as `function.method`) to a small
//! set of theme slots.
//!
//! # Architecture
//!
//! The highlighting system has three layers:
//!
//! 1. **Scope names** - The broad vocabulary emitted by grammars
//!    (e.g., `storage.type.function.js`, `constant.numeric.integer.decimal`)
//!
//! 2. **Theme slots** - A fixed set of color categories that stylesheets target
//!    (e.g., `keyword`, `title function_`, `string`, `comment`)
//!
//! 3. **CSS classes** - The highlight.js class vocabulary, so every stock
//!    highlight.js theme stylesheet styles our output unchanged
//!
//! Multiple scopes map to the same slot. For example:
//! - `keyword.control.conditional`, `storage.modifier`, `storage.type.function` → `keyword`
//! - `entity.name.function`, `variable.function`, `function.call` → `title function_`
//!
//! Adjacent spans that map to the same slot are coalesced into a single HTML element.

/// The theme slots - the fixed set of categories highlight.js themes define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeSlot {
    Keyword,
    BuiltIn,
    Type,
    Function,
    /// Class, struct and trait names at their definition site
    Class,
    Params,
    String,
    /// Escape sequences inside strings
    Escape,
    Regexp,
    Comment,
    Number,
    /// `true`, `false`, `null` and friends
    Literal,
    Constant,
    Variable,
    /// `this`, `self`, `super`
    VariableLanguage,
    Operator,
    Property,
    /// Attribute names (HTML attributes, JSON keys)
    Attr,
    /// Tag names in markup languages
    Name,
    /// Preprocessor directives, annotations
    Meta,
    Symbol,
    /// Interpolated code inside strings
    Subst,
    /// Markup: headings
    Section,
    /// Markup: list markers
    Bullet,
    /// Markup: block quotes
    Quote,
    /// Markup: inline and fenced code
    Code,
    /// Markup: bold text
    Strong,
    /// Markup: italic text
    Emphasis,
    /// Markup: links/URLs
    Link,
    /// Diff additions
    Addition,
    /// Diff deletions
    Deletion,
    SelectorClass,
    SelectorId,
    /// No styling (punctuation, generic `meta.*` and `source.*` scopes)
    None,
}

impl ThemeSlot {
    /// Every slot that produces a class, in declaration order.
    pub const STYLED: &'static [ThemeSlot] = &[
        ThemeSlot::Keyword,
        ThemeSlot::BuiltIn,
        ThemeSlot::Type,
        ThemeSlot::Function,
        ThemeSlot::Class,
        ThemeSlot::Params,
        ThemeSlot::String,
        ThemeSlot::Escape,
        ThemeSlot::Regexp,
        ThemeSlot::Comment,
        ThemeSlot::Number,
        ThemeSlot::Literal,
        ThemeSlot::Constant,
        ThemeSlot::Variable,
        ThemeSlot::VariableLanguage,
        ThemeSlot::Operator,
        ThemeSlot::Property,
        ThemeSlot::Attr,
        ThemeSlot::Name,
        ThemeSlot::Meta,
        ThemeSlot::Symbol,
        ThemeSlot::Subst,
        ThemeSlot::Section,
        ThemeSlot::Bullet,
        ThemeSlot::Quote,
        ThemeSlot::Code,
        ThemeSlot::Strong,
        ThemeSlot::Emphasis,
        ThemeSlot::Link,
        ThemeSlot::Addition,
        ThemeSlot::Deletion,
        ThemeSlot::SelectorClass,
        ThemeSlot::SelectorId,
    ];

    /// Get the highlight.js class name for this slot.
    ///
    /// Multi-word names follow the highlight.js convention: only the first
    /// word takes the `hljs-` prefix, the trailing underscore words are
    /// scope modifiers (`title function_` becomes `hljs-title function_`).
    ///
    /// Returns None for slots that produce no styling.
    pub fn class_name(self) -> Option<&'static str> {
        match self {
            ThemeSlot::Keyword => Some("keyword"),
            ThemeSlot::BuiltIn => Some("built_in"),
            ThemeSlot::Type => Some("type"),
            ThemeSlot::Function => Some("title function_"),
            ThemeSlot::Class => Some("title class_"),
            ThemeSlot::Params => Some("params"),
            ThemeSlot::String => Some("string"),
            ThemeSlot::Escape => Some("char escape_"),
            ThemeSlot::Regexp => Some("regexp"),
            ThemeSlot::Comment => Some("comment"),
            ThemeSlot::Number => Some("number"),
            ThemeSlot::Literal => Some("literal"),
            ThemeSlot::Constant => Some("variable constant_"),
            ThemeSlot::Variable => Some("variable"),
            ThemeSlot::VariableLanguage => Some("variable language_"),
            ThemeSlot::Operator => Some("operator"),
            ThemeSlot::Property => Some("property"),
            ThemeSlot::Attr => Some("attr"),
            ThemeSlot::Name => Some("name"),
            ThemeSlot::Meta => Some("meta"),
            ThemeSlot::Symbol => Some("symbol"),
            ThemeSlot::Subst => Some("subst"),
            ThemeSlot::Section => Some("section"),
            ThemeSlot::Bullet => Some("bullet"),
            ThemeSlot::Quote => Some("quote"),
            ThemeSlot::Code => Some("code"),
            ThemeSlot::Strong => Some("strong"),
            ThemeSlot::Emphasis => Some("emphasis"),
            ThemeSlot::Link => Some("link"),
            ThemeSlot::Addition => Some("addition"),
            ThemeSlot::Deletion => Some("deletion"),
            ThemeSlot::SelectorClass => Some("selector-class"),
            ThemeSlot::SelectorId => Some("selector-id"),
            ThemeSlot::None => None,
        }
    }
}

/// Scope prefixes, most specific first. A prefix matches a whole scope or
/// a scope continuing with `.` (so `string` matches `string.quoted` but not
/// `stringify`).
const SCOPE_PREFIXES: &[(&str, ThemeSlot)] = &[
    // Comments
    ("comment", ThemeSlot::Comment),
    // Strings
    ("string.regexp", ThemeSlot::Regexp),
    ("string.regex", ThemeSlot::Regexp),
    ("string.escape", ThemeSlot::Escape),
    ("string.special.symbol", ThemeSlot::Symbol),
    ("string", ThemeSlot::String),
    ("character", ThemeSlot::String),
    ("escape", ThemeSlot::Escape),
    // Constants
    ("constant.character.escape", ThemeSlot::Escape),
    ("constant.character", ThemeSlot::String),
    ("constant.numeric", ThemeSlot::Number),
    ("constant.language", ThemeSlot::Literal),
    ("constant.builtin", ThemeSlot::Literal),
    ("constant.other.symbol", ThemeSlot::Symbol),
    ("constant", ThemeSlot::Constant),
    ("number", ThemeSlot::Number),
    ("float", ThemeSlot::Number),
    ("boolean", ThemeSlot::Literal),
    // Keywords (operators spelled as words are keywords)
    ("keyword.operator.new", ThemeSlot::Keyword),
    ("keyword.operator.word", ThemeSlot::Keyword),
    ("keyword.operator.logical.python", ThemeSlot::Keyword),
    ("keyword.operator.expression", ThemeSlot::Keyword),
    ("keyword.operator", ThemeSlot::Operator),
    ("keyword", ThemeSlot::Keyword),
    ("operator", ThemeSlot::Operator),
    ("include", ThemeSlot::Keyword),
    ("conditional", ThemeSlot::Keyword),
    ("repeat", ThemeSlot::Keyword),
    ("exception", ThemeSlot::Keyword),
    ("storage.type.function", ThemeSlot::Keyword),
    ("storage.type.class", ThemeSlot::Keyword),
    ("storage.type.struct", ThemeSlot::Keyword),
    ("storage.type.enum", ThemeSlot::Keyword),
    ("storage.type.trait", ThemeSlot::Keyword),
    ("storage.type.impl", ThemeSlot::Keyword),
    ("storage.type.module", ThemeSlot::Keyword),
    // Named types; every other storage.type is a declaring keyword (`let`, `var`, `def`)
    ("storage.type.primitive", ThemeSlot::Type),
    ("storage.type.numeric", ThemeSlot::Type),
    ("storage.type.builtin", ThemeSlot::Type),
    ("storage.type.string", ThemeSlot::Type),
    ("storage.type", ThemeSlot::Keyword),
    ("storage", ThemeSlot::Keyword),
    // Functions
    ("entity.name.function", ThemeSlot::Function),
    ("variable.function", ThemeSlot::Function),
    ("support.function", ThemeSlot::BuiltIn),
    ("function.builtin", ThemeSlot::BuiltIn),
    ("function.macro", ThemeSlot::Meta),
    ("function", ThemeSlot::Function),
    ("method", ThemeSlot::Function),
    // Types and classes
    ("entity.name.class", ThemeSlot::Class),
    ("entity.name.type", ThemeSlot::Class),
    ("entity.name.struct", ThemeSlot::Class),
    ("entity.name.enum", ThemeSlot::Class),
    ("entity.name.trait", ThemeSlot::Class),
    ("entity.name.impl", ThemeSlot::Class),
    ("entity.other.inherited-class", ThemeSlot::Class),
    ("constructor", ThemeSlot::Class),
    ("support.type.property-name", ThemeSlot::Attr),
    ("support.type", ThemeSlot::Type),
    ("support.class", ThemeSlot::BuiltIn),
    ("support.constant", ThemeSlot::BuiltIn),
    ("type.builtin", ThemeSlot::BuiltIn),
    ("type", ThemeSlot::Type),
    // Markup languages
    ("entity.name.tag", ThemeSlot::Name),
    ("entity.name.section", ThemeSlot::Section),
    ("entity.other.attribute-name.class", ThemeSlot::SelectorClass),
    ("entity.other.attribute-name.id", ThemeSlot::SelectorId),
    ("entity.other.attribute-name", ThemeSlot::Attr),
    ("tag.attribute", ThemeSlot::Attr),
    ("tag", ThemeSlot::Name),
    ("attribute", ThemeSlot::Attr),
    // Variables
    ("variable.parameter", ThemeSlot::Params),
    ("variable.language", ThemeSlot::VariableLanguage),
    ("variable.builtin", ThemeSlot::VariableLanguage),
    ("variable.other.constant", ThemeSlot::Constant),
    ("variable.other.property", ThemeSlot::Property),
    ("variable.other.member", ThemeSlot::Property),
    ("variable.member", ThemeSlot::Property),
    ("variable.other", ThemeSlot::None),
    ("variable", ThemeSlot::Variable),
    ("parameter", ThemeSlot::Params),
    ("property", ThemeSlot::Property),
    ("field", ThemeSlot::Property),
    // Meta regions worth styling as a whole
    ("meta.preprocessor", ThemeSlot::Meta),
    ("meta.annotation", ThemeSlot::Meta),
    ("meta.attribute", ThemeSlot::Meta),
    ("meta.interpolation", ThemeSlot::Subst),
    ("meta.template.expression", ThemeSlot::Subst),
    ("meta.embedded.line", ThemeSlot::Subst),
    ("preproc", ThemeSlot::Meta),
    ("macro", ThemeSlot::Meta),
    ("label", ThemeSlot::Symbol),
    ("embedded", ThemeSlot::Subst),
    // Markup
    ("markup.heading", ThemeSlot::Section),
    ("text.title", ThemeSlot::Section),
    ("markup.bold", ThemeSlot::Strong),
    ("text.strong", ThemeSlot::Strong),
    ("markup.italic", ThemeSlot::Emphasis),
    ("text.emphasis", ThemeSlot::Emphasis),
    ("markup.underline.link", ThemeSlot::Link),
    ("markup.link", ThemeSlot::Link),
    ("text.uri", ThemeSlot::Link),
    ("markup.raw", ThemeSlot::Code),
    ("text.literal", ThemeSlot::Code),
    ("markup.quote", ThemeSlot::Quote),
    ("punctuation.definition.list", ThemeSlot::Bullet),
    ("markup.inserted", ThemeSlot::Addition),
    ("diff.addition", ThemeSlot::Addition),
    ("diff.plus", ThemeSlot::Addition),
    ("markup.deleted", ThemeSlot::Deletion),
    ("diff.deletion", ThemeSlot::Deletion),
    ("diff.minus", ThemeSlot::Deletion),
];

fn scope_has_prefix(scope: &str, prefix: &str) -> bool {
    match scope.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

/// Map any scope or capture name to its theme slot.
///
/// This handles both vocabularies grammars emit:
/// - TextMate scopes (`keyword.control.flow.rust`, `string.quoted.double.json`)
/// - Tree-sitter captures, with or without a leading `@` (`@function.method`)
///
/// Anything unrecognised, including all punctuation, maps to [`ThemeSlot::None`].
pub fn capture_to_slot(capture: &str) -> ThemeSlot {
    let capture = capture.strip_prefix('@').unwrap_or(capture);

    SCOPE_PREFIXES
        .iter()
        .find(|(prefix, _)| scope_has_prefix(capture, prefix))
        .map(|(_, slot)| *slot)
        .unwrap_or(ThemeSlot::None)
}

/// Get the highlight.js class name for a capture, or None when it is unstyled.
pub fn class_for_capture(capture: &str) -> Option<&'static str> {
    capture_to_slot(capture).class_name()
}

//! The language catalog offered in the block's language picker.
//!
//! Ids follow highlight.js naming (`javascript`, `cpp`, `xml`…) because that
//! is what existing blocks store in their `language` attribute and what the
//! `language-<id>` class on saved markup carries.

use serde::Serialize;

/// Id stored when the author picked no language.
pub const NONE: &str = "none";

/// Id every unknown or unavailable language resolves to.
pub const FALLBACK: &str = "plaintext";

/// One language known to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageDef {
    /// Canonical id.
    pub id: &'static str,
    /// Label shown in the picker.
    pub name: &'static str,
    /// syntect syntax name implementing the language.
    pub syntax: &'static str,
    /// Other ids that resolve to this language.
    pub aliases: &'static [&'static str],
}

macro_rules! lang {
    ($id:literal, $name:literal, $syntax:literal $(, $alias:literal)* $(,)?) => {
        LanguageDef {
            id: $id,
            name: $name,
            syntax: $syntax,
            aliases: &[$($alias),*],
        }
    };
}

/// All languages, ordered by id.
pub const LANGUAGES: &[LanguageDef] = &[
    lang!("actionscript", "ActionScript", "ActionScript", "as"),
    lang!("applescript", "AppleScript", "AppleScript", "osascript"),
    lang!("bash", "Bash", "Bourne Again Shell (bash)", "sh", "shell", "zsh"),
    lang!("c", "C", "C", "h"),
    lang!("clojure", "Clojure", "Clojure", "clj", "edn"),
    lang!("cpp", "C++", "C++", "cc", "c++", "h++", "hpp", "hh", "hxx", "cxx"),
    lang!("csharp", "C#", "C#", "cs", "c#"),
    lang!("css", "CSS", "CSS"),
    lang!("d", "D", "D", "dlang"),
    lang!("delphi", "Delphi", "Pascal", "dpr", "dfm", "pas", "pascal"),
    lang!("diff", "Diff", "Diff", "patch"),
    lang!("dos", "Batch file (DOS)", "Batch File", "bat", "cmd", "batch"),
    lang!("erlang", "Erlang", "Erlang", "erl"),
    lang!("go", "Go", "Go", "golang"),
    lang!("graphviz", "Graphviz", "Graphviz (DOT)", "dot", "gv"),
    lang!("groovy", "Groovy", "Groovy"),
    lang!("haskell", "Haskell", "Haskell", "hs"),
    lang!("java", "Java", "Java", "jsp"),
    lang!("javascript", "JavaScript", "JavaScript", "js", "jsx", "mjs", "cjs"),
    lang!("json", "JSON", "JSON", "jsonc"),
    lang!("latex", "TeX", "LaTeX", "tex"),
    lang!("lisp", "Lisp", "Lisp", "commonlisp", "cl"),
    lang!("lua", "Lua", "Lua"),
    lang!("makefile", "Makefile", "Makefile", "mk", "mak", "make"),
    lang!("markdown", "Markdown", "Markdown", "md", "mkdown", "mkd"),
    lang!("matlab", "Matlab", "MATLAB"),
    lang!("objectivec", "Objective-C", "Objective-C", "mm", "objc", "obj-c", "objective-c"),
    lang!("ocaml", "OCaml", "OCaml", "ml"),
    lang!("perl", "Perl", "Perl", "pl", "pm"),
    lang!("php", "PHP", "PHP"),
    lang!("plaintext", "Plain text", "Plain Text", "text", "txt", "plain"),
    lang!("properties", ".properties", "Java Properties"),
    lang!("python", "Python", "Python", "py", "py3", "python3", "gyp", "ipython"),
    lang!("r", "R", "R", "rlang"),
    lang!("ruby", "Ruby", "Ruby", "rb", "gemspec", "podspec", "thor", "irb"),
    lang!("rust", "Rust", "Rust", "rs"),
    lang!("scala", "Scala", "Scala"),
    lang!("sql", "SQL", "SQL", "mysql", "postgresql", "postgres", "sqlite"),
    lang!("tcl", "Tcl", "Tcl", "tk"),
    lang!("xml", "HTML, XML", "XML", "html", "htm", "xhtml", "rss", "atom", "xsl", "svg", "plist"),
    lang!("yaml", "YAML", "YAML", "yml"),
];

/// Find a language by canonical id or alias.
///
/// Matching ignores surrounding whitespace and ASCII case.
pub fn normalize_language(language: &str) -> Option<&'static LanguageDef> {
    let language = language.trim().to_ascii_lowercase();
    LANGUAGES
        .iter()
        .find(|def| def.id == language || def.aliases.contains(&language.as_str()))
}

/// An entry of the language picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageOption {
    #[serde(rename = "value")]
    pub id: &'static str,
    #[serde(rename = "label")]
    pub display_name: &'static str,
}

/// The languages the highlighting engine can actually highlight.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    available: Vec<&'static LanguageDef>,
}

impl LanguageCatalog {
    /// Build a catalog from the ids the engine has grammars for.
    ///
    /// Ids absent from [`LANGUAGES`] are ignored.
    pub fn from_available<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let ids: Vec<&str> = ids.into_iter().collect();
        let available = LANGUAGES
            .iter()
            .filter(|def| ids.contains(&def.id))
            .collect();
        Self { available }
    }

    /// Picker options: "None" first, then every available language.
    pub fn list_languages(&self) -> Vec<LanguageOption> {
        std::iter::once(LanguageOption {
            id: NONE,
            display_name: "None",
        })
        .chain(self.available.iter().map(|def| LanguageOption {
            id: def.id,
            display_name: def.name,
        }))
        .collect()
    }

    fn lookup(&self, language: &str) -> Option<&'static LanguageDef> {
        let def = normalize_language(language)?;
        self.available.iter().any(|d| d.id == def.id).then_some(def)
    }

    /// Whether `language` (id or alias) maps to an available grammar.
    pub fn is_supported(&self, language: &str) -> bool {
        self.lookup(language).is_some()
    }

    /// Resolve a stored id to the canonical id to highlight with.
    ///
    /// `"none"` and anything unknown or unavailable resolve to [`FALLBACK`].
    /// The stored value itself is never rewritten.
    pub fn resolve(&self, language: &str) -> &'static str {
        match self.lookup(language) {
            Some(def) => def.id,
            None => {
                tracing::debug!(language, "falling back to {FALLBACK}");
                FALLBACK
            }
        }
    }

    pub fn len(&self) -> usize {
        self.available.len()
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty()
    }
}

//! Which page contexts link the selected theme stylesheet.

use crate::catalog::ThemeCatalog;

/// Block whose presence on a page triggers frontend stylesheet loading.
pub const BLOCK_NAME: &str = "dm-hcb/highlighted-code-block";

/// A place where the theme stylesheet may be linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetContext {
    /// Public page render.
    Frontend,
    /// Block asset loading (frontend and editor iframe).
    BlockAssets,
    /// The block editor, so authors preview the theme while editing.
    BlockEditor,
}

impl AssetContext {
    /// Stylesheet handle, also used for the link element's id.
    pub fn handle(self) -> &'static str {
        match self {
            AssetContext::Frontend => "dm-hcb-highlight-theme",
            AssetContext::BlockAssets => "dm-hcb-highlight-theme-block",
            AssetContext::BlockEditor => "dm-hcb-highlight-theme-editor",
        }
    }

    pub fn dependencies(self) -> &'static [&'static str] {
        match self {
            AssetContext::BlockEditor => &["editor-css"],
            AssetContext::Frontend | AssetContext::BlockAssets => &[],
        }
    }

    /// Editor previews always link the theme; other contexts only when the
    /// page actually contains a highlighted code block.
    fn requires_block(self) -> bool {
        !matches!(self, AssetContext::BlockEditor)
    }
}

/// A stylesheet to link into a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetLink {
    pub handle: &'static str,
    pub href: String,
    pub version: u64,
    pub dependencies: &'static [&'static str],
}

impl StylesheetLink {
    /// URL including the version query string.
    pub fn src(&self) -> String {
        let sep = if self.href.contains('?') { '&' } else { '?' };
        format!("{}{sep}ver={}", self.href, self.version)
    }

    pub fn to_html(&self) -> String {
        format!(
            "<link rel='stylesheet' id='{}-css' href='{}' media='all' />",
            self.handle,
            escape_attr(&self.src())
        )
    }
}

/// Resolve the stylesheet link for the selected theme in a given context.
///
/// Returns None when no theme is selected, when the context needs the block
/// and the page has none, or when the selected theme's file is gone.
pub fn theme_stylesheet(
    catalog: &ThemeCatalog,
    selected: &str,
    context: AssetContext,
    page_has_block: bool,
) -> Option<StylesheetLink> {
    if selected.is_empty() {
        return None;
    }
    if context.requires_block() && !page_has_block {
        return None;
    }

    match catalog.stylesheet(selected) {
        Ok(Some(sheet)) => Some(StylesheetLink {
            handle: context.handle(),
            href: sheet.url,
            version: sheet.version,
            dependencies: context.dependencies(),
        }),
        Ok(None) => {
            tracing::debug!(theme = selected, "selected theme has no stylesheet on disk");
            None
        }
        Err(e) => {
            tracing::warn!(theme = selected, "not linking theme stylesheet: {e}");
            None
        }
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&#039;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::THEMES_SUBDIR;

    fn catalog() -> (tempfile::TempDir, ThemeCatalog) {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(THEMES_SUBDIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("github.css"), "").unwrap();
        std::fs::write(dir.join("github.min.css"), "").unwrap();
        let catalog = ThemeCatalog::new(root.path(), "https://example.com/p");
        (root, catalog)
    }

    #[test]
    fn test_nothing_selected_links_nothing() {
        let (_root, catalog) = catalog();
        for context in [
            AssetContext::Frontend,
            AssetContext::BlockAssets,
            AssetContext::BlockEditor,
        ] {
            assert!(theme_stylesheet(&catalog, "", context, true).is_none());
        }
    }

    #[test]
    fn test_frontend_requires_block() {
        let (_root, catalog) = catalog();
        assert!(theme_stylesheet(&catalog, "github", AssetContext::Frontend, false).is_none());
        assert!(theme_stylesheet(&catalog, "github", AssetContext::BlockAssets, false).is_none());

        let link = theme_stylesheet(&catalog, "github", AssetContext::Frontend, true).unwrap();
        assert_eq!(link.handle, "dm-hcb-highlight-theme");
        assert_eq!(
            link.href,
            "https://example.com/p/assets/build/themes/github.min.css"
        );
        assert!(link.dependencies.is_empty());
    }

    #[test]
    fn test_editor_always_links() {
        let (_root, catalog) = catalog();
        let link = theme_stylesheet(&catalog, "github", AssetContext::BlockEditor, false).unwrap();
        assert_eq!(link.handle, "dm-hcb-highlight-theme-editor");
        assert_eq!(link.dependencies, &["editor-css"]);
    }

    #[test]
    fn test_stale_selection_links_nothing() {
        let (_root, catalog) = catalog();
        assert!(theme_stylesheet(&catalog, "removed", AssetContext::BlockEditor, true).is_none());
        assert!(theme_stylesheet(&catalog, "../x", AssetContext::BlockEditor, true).is_none());
    }

    #[test]
    fn test_link_html() {
        let link = StylesheetLink {
            handle: "dm-hcb-highlight-theme-block",
            href: "https://example.com/a.css".into(),
            version: 42,
            dependencies: &[],
        };
        assert_eq!(
            link.to_html(),
            "<link rel='stylesheet' id='dm-hcb-highlight-theme-block-css' href='https://example.com/a.css?ver=42' media='all' />"
        );
    }
}

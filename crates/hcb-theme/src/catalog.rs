//! Discovery of highlight theme stylesheets shipped with the plugin.
//!
//! Themes are plain highlight.js CSS files dropped into
//! `<plugin dir>/assets/build/themes`. The directory is rescanned on every
//! call; there is no cache to invalidate when files are added or removed.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Location of theme stylesheets, relative to the plugin root (and plugin URL).
pub const THEMES_SUBDIR: &str = "assets/build/themes";

/// One selectable theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeEntry {
    /// File name with `.min.css` / `.css` stripped.
    pub slug: String,
    /// Display name; the slug, as nothing better is known about the file.
    pub name: String,
    /// Public URL of the stylesheet.
    pub url: String,
    /// File name on disk.
    pub file: String,
}

/// A theme stylesheet resolved on disk, ready to be linked from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeStylesheet {
    pub slug: String,
    pub file: String,
    pub path: PathBuf,
    pub url: String,
    /// Modification time in seconds since the epoch, used as a cache buster.
    pub version: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid theme slug: {0:?}")]
    InvalidSlug(String),

    #[error("failed to read theme stylesheet: {0}")]
    Io(#[from] io::Error),
}

/// Theme stylesheets available under a plugin directory.
#[derive(Debug, Clone)]
pub struct ThemeCatalog {
    plugin_dir: PathBuf,
    plugin_url: String,
}

impl ThemeCatalog {
    pub fn new(plugin_dir: impl Into<PathBuf>, plugin_url: impl Into<String>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            plugin_url: plugin_url.into(),
        }
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.plugin_dir.join(THEMES_SUBDIR)
    }

    /// Public URL for a file in the themes directory.
    pub fn theme_url(&self, file: &str) -> String {
        format!(
            "{}/{THEMES_SUBDIR}/{file}",
            self.plugin_url.trim_end_matches('/')
        )
    }

    /// List the available themes, one entry per slug, sorted by slug.
    ///
    /// When both `x.css` and `x.min.css` exist, the entry points at the
    /// minified file. A missing or unreadable directory yields no themes.
    pub fn list_themes(&self) -> Vec<ThemeEntry> {
        let dir = self.themes_dir();
        let entries = match fs_err::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "themes directory does not exist");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("{e}");
                return Vec::new();
            }
        };

        let mut themes: Vec<ThemeEntry> = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), "skipping unreadable theme entry: {e}");
                    continue;
                }
            };
            let Ok(file) = entry.file_name().into_string() else {
                continue;
            };
            if !entry.path().is_file() {
                continue;
            }
            let Some(slug) = slug_for_file(&file) else {
                continue;
            };

            let candidate = ThemeEntry {
                slug: slug.to_string(),
                name: slug.to_string(),
                url: self.theme_url(&file),
                file,
            };
            match themes.iter_mut().find(|t| t.slug == candidate.slug) {
                Some(existing) => {
                    if is_minified(&candidate.file) && !is_minified(&existing.file) {
                        *existing = candidate;
                    }
                }
                None => themes.push(candidate),
            }
        }

        themes.sort_by(|a, b| a.slug.cmp(&b.slug));
        tracing::debug!(count = themes.len(), dir = %dir.display(), "scanned themes");
        themes
    }

    /// Whether `slug` is one of the listed themes.
    pub fn contains(&self, slug: &str) -> bool {
        self.list_themes().iter().any(|t| t.slug == slug)
    }

    /// Resolve a slug to its stylesheet, preferring the minified file.
    ///
    /// Returns `Ok(None)` when neither `<slug>.min.css` nor `<slug>.css` exists.
    pub fn stylesheet(&self, slug: &str) -> Result<Option<ThemeStylesheet>, CatalogError> {
        if !is_safe_slug(slug) {
            return Err(CatalogError::InvalidSlug(slug.to_string()));
        }

        let dir = self.themes_dir();
        for file in [format!("{slug}.min.css"), format!("{slug}.css")] {
            let path = dir.join(&file);
            if !path.is_file() {
                continue;
            }
            let version = modified_secs(&path)?;
            return Ok(Some(ThemeStylesheet {
                slug: slug.to_string(),
                url: self.theme_url(&file),
                file,
                path,
                version,
            }));
        }
        Ok(None)
    }

    /// Read the bytes of a listed stylesheet by file name.
    ///
    /// Only files that appear in [`Self::list_themes`] (or their unminified
    /// sibling) are served; anything else is `Ok(None)`.
    pub fn read_stylesheet(&self, file: &str) -> Result<Option<Vec<u8>>, CatalogError> {
        let Some(slug) = slug_for_file(file) else {
            return Ok(None);
        };
        if !is_safe_slug(slug) || file.contains(['/', '\\']) {
            return Ok(None);
        }
        let path = self.themes_dir().join(file);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(fs_err::read(path)?))
    }
}

fn is_minified(file: &str) -> bool {
    file.to_ascii_lowercase().ends_with(".min.css")
}

/// Derive a slug from a stylesheet file name, or None when it is not a stylesheet.
pub fn slug_for_file(file: &str) -> Option<&str> {
    let lower = file.to_ascii_lowercase();
    let slug = if lower.ends_with(".min.css") {
        &file[..file.len() - ".min.css".len()]
    } else if lower.ends_with(".css") {
        &file[..file.len() - ".css".len()]
    } else {
        return None;
    };
    (!slug.is_empty()).then_some(slug)
}

fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains(['/', '\\', '\0'])
        && !slug.contains("..")
}

fn modified_secs(path: &Path) -> io::Result<u64> {
    let modified = fs_err::metadata(path)?.modified()?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn catalog_with(files: &[&str]) -> (tempfile::TempDir, ThemeCatalog) {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(THEMES_SUBDIR);
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), ".hljs { color: red }").unwrap();
        }
        let catalog = ThemeCatalog::new(root.path(), "https://example.com/plugin/");
        (root, catalog)
    }

    #[test]
    fn test_missing_dir_lists_nothing() {
        let root = tempfile::tempdir().unwrap();
        let catalog = ThemeCatalog::new(root.path(), "https://example.com");
        assert!(catalog.list_themes().is_empty());
    }

    #[test]
    fn test_min_and_plain_collapse_to_one_entry() {
        let (_root, catalog) = catalog_with(&["github.css", "github.min.css"]);
        let themes = catalog.list_themes();
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].slug, "github");
        assert_eq!(themes[0].name, "github");
        assert_eq!(themes[0].file, "github.min.css");
        assert_eq!(
            themes[0].url,
            "https://example.com/plugin/assets/build/themes/github.min.css"
        );
    }

    #[test]
    fn test_non_css_files_and_dirs_ignored() {
        let (root, catalog) = catalog_with(&["monokai.CSS", "README.md", ".css"]);
        fs::create_dir(root.path().join(THEMES_SUBDIR).join("nested.css")).unwrap();
        let slugs: Vec<_> = catalog.list_themes().into_iter().map(|t| t.slug).collect();
        assert_eq!(slugs, vec!["monokai"]);
    }

    #[test]
    fn test_sorted_by_slug() {
        let (_root, catalog) = catalog_with(&["zenburn.css", "a11y-dark.min.css", "github.css"]);
        let slugs: Vec<_> = catalog.list_themes().into_iter().map(|t| t.slug).collect();
        assert_eq!(slugs, vec!["a11y-dark", "github", "zenburn"]);
    }

    #[test]
    fn test_stylesheet_prefers_minified() {
        let (_root, catalog) = catalog_with(&["github.css", "github.min.css", "nord.css"]);

        let github = catalog.stylesheet("github").unwrap().unwrap();
        assert_eq!(github.file, "github.min.css");
        assert!(github.version > 0);

        let nord = catalog.stylesheet("nord").unwrap().unwrap();
        assert_eq!(nord.file, "nord.css");

        assert!(catalog.stylesheet("missing").unwrap().is_none());
    }

    #[test]
    fn test_stylesheet_rejects_traversal() {
        let (_root, catalog) = catalog_with(&["github.css"]);
        assert!(matches!(
            catalog.stylesheet("../secrets"),
            Err(CatalogError::InvalidSlug(_))
        ));
        assert!(catalog.read_stylesheet("../github.css").unwrap().is_none());
    }

    #[test]
    fn test_read_stylesheet() {
        let (_root, catalog) = catalog_with(&["github.min.css"]);
        let bytes = catalog.read_stylesheet("github.min.css").unwrap().unwrap();
        assert_eq!(bytes, b".hljs { color: red }");
        assert!(catalog.read_stylesheet("github.css").unwrap().is_none());
        assert!(catalog.read_stylesheet("notes.txt").unwrap().is_none());
    }

    #[test]
    fn test_entry_serializes_like_admin_payload() {
        let (_root, catalog) = catalog_with(&["nord.css"]);
        let json = serde_json::to_value(&catalog.list_themes()[0]).unwrap();
        assert_eq!(json["slug"], "nord");
        assert_eq!(json["file"], "nord.css");
    }
}

//! The selected highlight theme.

use hcb_theme::{ThemeCatalog, ThemeEntry};

use crate::caller::{Caller, Capability};
use crate::nonce::NonceManager;
use crate::sanitize::sanitize_text_field;
use crate::store::{OptionStore, StoreError};

/// Option holding the selected theme slug.
pub const OPTION_NAME: &str = "dm_hcb_selected_theme";

/// Action nonces for the settings page are minted for.
pub const NONCE_ACTION: &str = "hcb_admin_nonce";

/// Why a theme selection was refused.
#[derive(Debug, thiserror::Error)]
pub enum SaveThemeError {
    #[error("Forbidden")]
    Authorization,

    #[error("Invalid nonce")]
    Validation,

    #[error("Theme not available")]
    NotFound(String),

    #[error("{0}")]
    Storage(#[from] StoreError),
}

impl SaveThemeError {
    /// HTTP status the error is reported with.
    pub fn status(&self) -> u16 {
        match self {
            SaveThemeError::Authorization => 403,
            SaveThemeError::Validation | SaveThemeError::NotFound(_) => 400,
            SaveThemeError::Storage(_) => 500,
        }
    }
}

/// Reads and writes the theme selection.
#[derive(Debug, Clone)]
pub struct ThemeSettings<S> {
    store: S,
    catalog: ThemeCatalog,
    nonces: NonceManager,
}

impl<S: OptionStore> ThemeSettings<S> {
    pub fn new(store: S, catalog: ThemeCatalog, nonces: NonceManager) -> Self {
        Self {
            store,
            catalog,
            nonces,
        }
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    pub fn themes(&self) -> Vec<ThemeEntry> {
        self.catalog.list_themes()
    }

    /// The selected theme slug, `""` when none is selected.
    ///
    /// A store that cannot be read counts as no selection.
    pub fn selected(&self) -> String {
        match self.store.get(OPTION_NAME) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("cannot read {OPTION_NAME}: {e}");
                String::new()
            }
        }
    }

    /// Mint a nonce authorizing `caller` to save a selection.
    pub fn create_nonce(&self, caller: &Caller) -> String {
        self.nonces.create(NONCE_ACTION, caller.user_id)
    }

    /// Save a theme selection on behalf of `caller`.
    ///
    /// `""` clears the selection. Any other slug must name a theme present
    /// in the catalog right now. On error the previous selection is kept.
    pub fn save(&self, caller: &Caller, nonce: &str, slug: &str) -> Result<String, SaveThemeError> {
        if !caller.can(Capability::ManageOptions) {
            return Err(SaveThemeError::Authorization);
        }

        let nonce = sanitize_text_field(nonce);
        if self.nonces.verify(&nonce, NONCE_ACTION, caller.user_id).is_none() {
            return Err(SaveThemeError::Validation);
        }

        let slug = sanitize_text_field(slug);
        if !slug.is_empty() && !self.catalog.contains(&slug) {
            return Err(SaveThemeError::NotFound(slug));
        }

        self.store.update(OPTION_NAME, &slug)?;
        tracing::info!(theme = %slug, user = caller.user_id, "saved theme selection");
        Ok(slug)
    }

    /// Clear the selection without a request context, e.g. from the command line.
    pub fn clear(&self) -> Result<(), SaveThemeError> {
        self.store.update(OPTION_NAME, "")?;
        Ok(())
    }

    /// Select a theme without a request context, e.g. from the command line.
    pub fn set(&self, slug: &str) -> Result<(), SaveThemeError> {
        if !slug.is_empty() && !self.catalog.contains(slug) {
            return Err(SaveThemeError::NotFound(slug.to_string()));
        }
        self.store.update(OPTION_NAME, slug)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::MemoryOptionStore;
    use std::sync::Arc;

    pub(crate) fn theme_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let themes = dir.path().join(hcb_theme::THEMES_SUBDIR);
        fs_err::create_dir_all(&themes).unwrap();
        for file in ["github.css", "github.min.css", "monokai.css"] {
            fs_err::write(themes.join(file), ".hljs{}").unwrap();
        }
        dir
    }

    pub(crate) fn settings(dir: &tempfile::TempDir) -> ThemeSettings<Arc<MemoryOptionStore>> {
        ThemeSettings::new(
            Arc::new(MemoryOptionStore::new()),
            ThemeCatalog::new(dir.path(), "https://example.com/wp-content/plugins/hcb/"),
            NonceManager::new("test salt"),
        )
    }

    #[test]
    fn test_selected_defaults_to_empty() {
        let dir = theme_dir();
        assert_eq!(settings(&dir).selected(), "");
    }

    #[test]
    fn test_save_listed_slug() {
        let dir = theme_dir();
        let settings = settings(&dir);
        let admin = Caller::admin(1);
        let nonce = settings.create_nonce(&admin);
        assert_eq!(settings.save(&admin, &nonce, "monokai").unwrap(), "monokai");
        assert_eq!(settings.selected(), "monokai");
    }

    #[test]
    fn test_save_empty_clears() {
        let dir = theme_dir();
        let settings = settings(&dir);
        let admin = Caller::admin(1);
        let nonce = settings.create_nonce(&admin);
        settings.save(&admin, &nonce, "github").unwrap();
        settings.save(&admin, &nonce, "").unwrap();
        assert_eq!(settings.selected(), "");
    }

    #[test]
    fn test_save_unknown_slug_keeps_previous() {
        let dir = theme_dir();
        let settings = settings(&dir);
        let admin = Caller::admin(1);
        let nonce = settings.create_nonce(&admin);
        settings.save(&admin, &nonce, "github").unwrap();

        let err = settings.save(&admin, &nonce, "nonexistent-slug").unwrap_err();
        assert!(matches!(err, SaveThemeError::NotFound(ref s) if s == "nonexistent-slug"));
        assert_eq!(err.status(), 400);
        assert_eq!(settings.selected(), "github");
    }

    #[test]
    fn test_save_requires_capability() {
        let dir = theme_dir();
        let settings = settings(&dir);
        let anon = Caller::anonymous();
        let nonce = settings.create_nonce(&anon);
        let err = settings.save(&anon, &nonce, "github").unwrap_err();
        assert!(matches!(err, SaveThemeError::Authorization));
        assert_eq!(err.status(), 403);
        assert_eq!(settings.selected(), "");
    }

    #[test]
    fn test_save_requires_valid_nonce() {
        let dir = theme_dir();
        let settings = settings(&dir);
        let admin = Caller::admin(1);
        let other_user_nonce = settings.create_nonce(&Caller::admin(2));
        for nonce in ["", "0123456789", other_user_nonce.as_str()] {
            let err = settings.save(&admin, nonce, "").unwrap_err();
            assert!(matches!(err, SaveThemeError::Validation), "{nonce:?}");
        }
    }

    #[test]
    fn test_save_sanitizes_slug() {
        let dir = theme_dir();
        let settings = settings(&dir);
        let admin = Caller::admin(1);
        let nonce = settings.create_nonce(&admin);
        assert_eq!(settings.save(&admin, &nonce, " <i>github</i>\n").unwrap(), "github");
    }

    #[test]
    fn test_set_and_clear() {
        let dir = theme_dir();
        let settings = settings(&dir);
        settings.set("github").unwrap();
        assert_eq!(settings.selected(), "github");
        assert!(matches!(settings.set("nope"), Err(SaveThemeError::NotFound(_))));
        settings.clear().unwrap();
        assert_eq!(settings.selected(), "");
    }
}

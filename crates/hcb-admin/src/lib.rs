//! Theme selection for highlighted code blocks.
//!
//! Site administrators pick one highlight theme for the whole site. The choice
//! lives in a single option (`dm_hcb_selected_theme`) and is changed through
//! an AJAX endpoint guarded by a capability check and a nonce.
//!
//! ```rust,ignore
//! use hcb_admin::{Caller, JsonFileOptionStore, NonceManager, ThemeSettings, handle_ajax};
//! use hcb_theme::ThemeCatalog;
//!
//! let settings = ThemeSettings::new(
//!     JsonFileOptionStore::new("hcb-options.json"),
//!     ThemeCatalog::new(".", "https://example.com/wp-content/plugins/hcb/"),
//!     NonceManager::new(&salt),
//! );
//! let response = handle_ajax(&settings, &Caller::admin(1), body);
//! ```

mod ajax;
mod bootstrap;
mod caller;
mod nonce;
mod sanitize;
mod settings;
mod store;

pub use ajax::{AJAX_ACTION, AjaxResponse, handle_ajax};
pub use bootstrap::{
    AdminBootstrap, MENU_SLUG, MOUNT_ID, PREVIEW_CODE, PREVIEW_LANGUAGE, PREVIEW_LINK_ID,
    admin_page,
};
pub use caller::{Caller, Capability};
pub use nonce::{NonceAge, NonceManager, TICK_SECONDS, secrets_match};
pub use sanitize::sanitize_text_field;
pub use settings::{NONCE_ACTION, OPTION_NAME, SaveThemeError, ThemeSettings};
pub use store::{JsonFileOptionStore, MemoryOptionStore, OptionStore, StoreError};

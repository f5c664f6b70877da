//! The theme settings page and the data its script starts from.

use hcb::{BlockAttributes, Highlighter, render_code_block};
use hcb_theme::{AssetContext, ThemeEntry, theme_stylesheet};
use serde::Serialize;

use crate::caller::{Caller, Capability};
use crate::settings::{OPTION_NAME, SaveThemeError, ThemeSettings};
use crate::store::OptionStore;

/// Slug of the settings page under Appearance.
pub const MENU_SLUG: &str = "hcb-settings";

/// Element the settings app mounts into.
pub const MOUNT_ID: &str = "hcb-admin-app";

/// Id of the `<link>` carrying the previewed theme.
pub const PREVIEW_LINK_ID: &str = "hcb-preview-theme";

/// Snippet shown in the settings page preview.
pub const PREVIEW_CODE: &str = "function hello() {\n\tconsole.log(\"hello world\");\n}\n";
pub const PREVIEW_LANGUAGE: &str = "javascript";

/// Initial state handed to the settings script as `window.HCB_ADMIN`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminBootstrap {
    pub themes: Vec<ThemeEntry>,
    pub selected: String,
    pub ajax_url: String,
    pub nonce: String,
    pub option_name: &'static str,
}

impl AdminBootstrap {
    pub fn new<S: OptionStore>(settings: &ThemeSettings<S>, caller: &Caller, ajax_url: &str) -> Self {
        Self {
            themes: settings.themes(),
            selected: settings.selected(),
            ajax_url: ajax_url.to_string(),
            nonce: settings.create_nonce(caller),
            option_name: OPTION_NAME,
        }
    }

    /// `var HCB_ADMIN = {...};`, safe to place inside a `<script>` element.
    pub fn localize_script(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("var HCB_ADMIN = {};", json.replace("</", "<\\/"))
    }
}

/// Render the settings page for `caller`.
///
/// The page carries the bootstrap script, the selected theme's stylesheet
/// under the preview link id, the app mount point and a sample block.
pub fn admin_page<S: OptionStore>(
    settings: &ThemeSettings<S>,
    highlighter: &Highlighter,
    caller: &Caller,
    ajax_url: &str,
) -> Result<String, SaveThemeError> {
    if !caller.can(Capability::EditThemeOptions) {
        return Err(SaveThemeError::Authorization);
    }

    let bootstrap = AdminBootstrap::new(settings, caller, ajax_url);
    let preview_link = theme_stylesheet(
        settings.catalog(),
        &bootstrap.selected,
        AssetContext::BlockEditor,
        true,
    )
    .map(|link| {
        format!(
            "<link rel=\"stylesheet\" id=\"{PREVIEW_LINK_ID}\" href=\"{}\" media=\"all\" />\n",
            hcb::escape::escape_attr(&link.src())
        )
    })
    .unwrap_or_default();
    let sample = render_code_block(
        &BlockAttributes::new(PREVIEW_CODE, PREVIEW_LANGUAGE),
        highlighter,
    );

    Ok(format!(
        concat!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n",
            "<title>Syntax Highlight Theme</title>\n",
            "{preview_link}",
            "<script>{script}</script>\n",
            "</head>\n<body>\n<div class=\"wrap\">\n",
            "<h1>Syntax Highlight Theme</h1>\n",
            "<div id=\"{mount}\"></div>\n",
            "<div class=\"hcb-preview\">{sample}</div>\n",
            "</div>\n</body>\n</html>\n"
        ),
        preview_link = preview_link,
        script = bootstrap.localize_script(),
        mount = MOUNT_ID,
        sample = sample,
    ))
}

//! The `admin-ajax.php` endpoint the settings page saves through.

use serde_json::json;

use crate::caller::Caller;
use crate::settings::ThemeSettings;
use crate::store::OptionStore;

/// Action name posted by the settings page.
pub const AJAX_ACTION: &str = "hcb_save_theme";

/// A JSON response in the `{success, data}` envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct AjaxResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl AjaxResponse {
    pub fn success(data: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: json!({ "success": true, "data": data }),
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "success": false, "data": { "message": message } }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.body["success"] == json!(true)
    }

    pub fn to_json(&self) -> String {
        self.body.to_string()
    }
}

/// Handle a form-encoded AJAX POST body.
pub fn handle_ajax<S: OptionStore>(
    settings: &ThemeSettings<S>,
    caller: &Caller,
    body: &[u8],
) -> AjaxResponse {
    let mut action = None;
    let mut theme = String::new();
    let mut nonce = String::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "action" => action = Some(value.into_owned()),
            "theme" => theme = value.into_owned(),
            "nonce" => nonce = value.into_owned(),
            _ => {}
        }
    }

    if action.as_deref() != Some(AJAX_ACTION) {
        tracing::debug!(?action, "unknown ajax action");
        return AjaxResponse::error(400, "Unknown action");
    }

    match settings.save(caller, &nonce, &theme) {
        Ok(selected) => AjaxResponse::success(json!({ "selected": selected })),
        Err(e) => {
            tracing::debug!("theme save refused: {e}");
            AjaxResponse::error(e.status(), &e.to_string())
        }
    }
}

//! Local admin server: the settings page, its AJAX endpoint, theme
//! stylesheets and a preview renderer.

use hcb::{BlockAttributes, Content, Highlighter, render_code_block};
use hcb_admin::{
    Caller, MENU_SLUG, OptionStore, SaveThemeError, ThemeSettings, admin_page, handle_ajax,
    secrets_match,
};
use hcb_theme::{AssetContext, CatalogError, THEMES_SUBDIR, theme_stylesheet};
use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tiny_http::{Header, Method, Request, Response, Server};

const AJAX_PATH: &str = "/wp-admin/admin-ajax.php";
const SETTINGS_PATH: &str = "/wp-admin/themes.php";
const RENDER_PATH: &str = "/render";
const MAX_BODY: u64 = 1024 * 1024;

/// Everything a request handler needs.
pub struct ServerState<S> {
    pub settings: ThemeSettings<S>,
    pub highlighter: Highlighter,
    pub admin_token: Option<String>,
}

/// A response before it is handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    fn json(status: u16, value: &impl Serialize) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
        Self::new(status, "application/json; charset=UTF-8", body)
    }

    fn text(status: u16, text: &str) -> Self {
        Self::new(status, "text/plain; charset=UTF-8", text)
    }

    fn not_found() -> Self {
        Self::text(404, "Not Found")
    }
}

#[derive(Debug, Deserialize)]
struct RenderRequest {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Serialize)]
struct RenderResponse {
    markup: String,
    /// Theme stylesheet the editor would link, if a theme is selected.
    stylesheet: Option<String>,
}

impl<S: OptionStore> ServerState<S> {
    /// Identify the caller from an `Authorization` header value.
    pub fn caller(&self, authorization: Option<&str>) -> Caller {
        let token = authorization.and_then(|v| v.strip_prefix("Bearer ")).map(str::trim);
        match (&self.admin_token, token) {
            (Some(expected), Some(given)) if !expected.is_empty() && secrets_match(given, expected) => {
                Caller::admin(1)
            }
            _ => Caller::anonymous(),
        }
    }

    /// Route one request.
    pub fn route(&self, method: &Method, url: &str, authorization: Option<&str>, body: &[u8]) -> Reply {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        let caller = self.caller(authorization);

        match (method, path) {
            (Method::Post, AJAX_PATH) => {
                let response = handle_ajax(&self.settings, &caller, body);
                Reply::new(
                    response.status,
                    "application/json; charset=UTF-8",
                    response.to_json(),
                )
            }
            (Method::Get, SETTINGS_PATH) => self.settings_page(&caller, query),
            (Method::Post, RENDER_PATH) => self.render(body),
            (Method::Get, _) => match path
                .strip_prefix('/')
                .and_then(|p| p.strip_prefix(THEMES_SUBDIR))
                .and_then(|p| p.strip_prefix('/'))
            {
                Some(file) => self.stylesheet(file),
                None => Reply::not_found(),
            },
            _ => Reply::not_found(),
        }
    }

    fn settings_page(&self, caller: &Caller, query: &str) -> Reply {
        let page = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "page")
            .map(|(_, value)| value.into_owned());
        if page.as_deref() != Some(MENU_SLUG) {
            return Reply::not_found();
        }

        match admin_page(&self.settings, &self.highlighter, caller, AJAX_PATH) {
            Ok(html) => Reply::new(200, "text/html; charset=UTF-8", html),
            Err(SaveThemeError::Authorization) => Reply::text(403, "Forbidden"),
            Err(e) => Reply::text(500, &e.to_string()),
        }
    }

    fn stylesheet(&self, file: &str) -> Reply {
        match self.settings.catalog().read_stylesheet(file) {
            Ok(Some(bytes)) => Reply::new(200, "text/css; charset=UTF-8", bytes),
            Ok(None) | Err(CatalogError::InvalidSlug(_)) => Reply::not_found(),
            Err(e) => {
                tracing::warn!(file, "cannot serve stylesheet: {e}");
                Reply::text(500, "Internal Server Error")
            }
        }
    }

    fn render(&self, body: &[u8]) -> Reply {
        let request: RenderRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => return Reply::json(400, &serde_json::json!({ "error": e.to_string() })),
        };
        let mut attributes = BlockAttributes::new(request.content, hcb::NONE);
        if let Some(language) = request.language.filter(|l| !l.is_empty()) {
            attributes.language = language;
        }

        let stylesheet = theme_stylesheet(
            self.settings.catalog(),
            &self.settings.selected(),
            AssetContext::BlockEditor,
            true,
        )
        .map(|link| link.src());

        Reply::json(
            200,
            &RenderResponse {
                markup: render_code_block(&attributes, &self.highlighter),
                stylesheet,
            },
        )
    }
}

fn respond(request: Request, reply: Reply) {
    let mut response = Response::from_data(reply.body).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes()) {
        response = response.with_header(header);
    }
    if let Err(e) = request.respond(response) {
        tracing::warn!("failed to send response: {e}");
    }
}

/// Serve until the process is stopped.
pub fn serve<S: OptionStore>(state: &ServerState<S>, address: &str, port: u16) -> Result<()> {
    let server = Server::http((address, port))
        .map_err(|e| miette::miette!("failed to bind {address}:{port}: {e}"))?;

    tracing::info!(address, port, "admin server listening");
    eprintln!(
        "{} Serving on {}",
        "hcb".green().bold(),
        format!("http://{address}:{port}{SETTINGS_PATH}?page={MENU_SLUG}").cyan()
    );
    if state.admin_token.is_none() {
        eprintln!(
            "  {} No admin_token configured; every request is anonymous",
            "Note:".yellow()
        );
    }

    for mut request in server.incoming_requests() {
        let mut body = Vec::new();
        if let Err(e) = request
            .as_reader()
            .take(MAX_BODY)
            .read_to_end(&mut body)
            .into_diagnostic()
        {
            tracing::warn!("failed to read request body: {e}");
            respond(request, Reply::text(400, "Bad Request"));
            continue;
        }
        let authorization = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Authorization"))
            .map(|h| h.value.as_str().to_string());

        let reply = state.route(request.method(), request.url(), authorization.as_deref(), &body);
        tracing::debug!(method = %request.method(), url = request.url(), status = reply.status, "request");
        respond(request, reply);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hcb_admin::{MemoryOptionStore, NonceManager};
    use hcb_theme::ThemeCatalog;
    use std::sync::Arc;

    fn state(dir: &tempfile::TempDir) -> ServerState<Arc<MemoryOptionStore>> {
        let themes = dir.path().join(THEMES_SUBDIR);
        fs_err::create_dir_all(&themes).unwrap();
        fs_err::write(themes.join("github.min.css"), ".hljs{color:#24292e}").unwrap();

        ServerState {
            settings: ThemeSettings::new(
                Arc::new(MemoryOptionStore::new()),
                ThemeCatalog::new(dir.path(), "http://127.0.0.1:8080/"),
                NonceManager::new("salt"),
            ),
            highlighter: Highlighter::new(),
            admin_token: Some("secret".to_string()),
        }
    }

    fn json(reply: &Reply) -> serde_json::Value {
        serde_json::from_slice(&reply.body).unwrap()
    }

    #[test]
    fn test_caller_from_bearer_token() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        assert_eq!(state.caller(Some("Bearer secret")), Caller::admin(1));
        assert_eq!(state.caller(Some("Bearer nope")), Caller::anonymous());
        assert_eq!(state.caller(Some("Bearer secre")), Caller::anonymous());
        assert_eq!(state.caller(Some("Bearer secret2")), Caller::anonymous());
        assert_eq!(state.caller(Some("secret")), Caller::anonymous());
        assert_eq!(state.caller(None), Caller::anonymous());
    }

    #[test]
    fn test_ajax_save() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        let nonce = state.settings.create_nonce(&Caller::admin(1));
        let body = format!("action=hcb_save_theme&theme=github&nonce={nonce}");

        let reply = state.route(&Method::Post, AJAX_PATH, Some("Bearer secret"), body.as_bytes());
        assert_eq!(reply.status, 200);
        assert_eq!(json(&reply)["data"]["selected"], "github");
        assert_eq!(state.settings.selected(), "github");

        let reply = state.route(&Method::Post, AJAX_PATH, None, body.as_bytes());
        assert_eq!(reply.status, 403);
    }

    #[test]
    fn test_settings_page_requires_admin() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        let url = "/wp-admin/themes.php?page=hcb-settings";

        let reply = state.route(&Method::Get, url, Some("Bearer secret"), b"");
        assert_eq!(reply.status, 200);
        assert!(String::from_utf8(reply.body).unwrap().contains("hcb-admin-app"));

        assert_eq!(state.route(&Method::Get, url, None, b"").status, 403);
        assert_eq!(
            state
                .route(&Method::Get, "/wp-admin/themes.php?page=other", Some("Bearer secret"), b"")
                .status,
            404
        );
    }

    #[test]
    fn test_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        let reply = state.route(&Method::Get, "/assets/build/themes/github.min.css", None, b"");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "text/css; charset=UTF-8");
        assert_eq!(reply.body, b".hljs{color:#24292e}");

        let reply = state.route(&Method::Get, "/assets/build/themes/../../../hcb.toml", None, b"");
        assert_eq!(reply.status, 404);
        let reply = state.route(&Method::Get, "/assets/build/themes/missing.css", None, b"");
        assert_eq!(reply.status, 404);
    }

    #[test]
    fn test_render() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        let body = br#"{"content":"<b>x</b>","language":"none"}"#;
        let reply = state.route(&Method::Post, RENDER_PATH, None, body);
        assert_eq!(reply.status, 200);
        let value = json(&reply);
        assert_eq!(value["markup"], "<pre><code>&lt;b&gt;x&lt;/b&gt;</code></pre>");
        assert!(value["stylesheet"].is_null());

        state.settings.set("github").unwrap();
        let body = br#"{"content":"let a = 1;","language":"javascript"}"#;
        let value = json(&state.route(&Method::Post, RENDER_PATH, None, body));
        assert_eq!(
            value["markup"],
            render_code_block(&BlockAttributes::new("let a = 1;", "javascript"), &state.highlighter)
        );
        assert!(
            value["stylesheet"]
                .as_str()
                .unwrap()
                .starts_with("http://127.0.0.1:8080/assets/build/themes/github.min.css?ver=")
        );

        assert_eq!(state.route(&Method::Post, RENDER_PATH, None, b"not json").status, 400);
    }

    #[test]
    fn test_unknown_route() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        assert_eq!(state.route(&Method::Get, "/", None, b"").status, 404);
        assert_eq!(state.route(&Method::Delete, AJAX_PATH, None, b"").status, 404);
    }
}

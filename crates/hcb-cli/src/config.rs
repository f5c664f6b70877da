//! `hcb.toml` configuration.

use camino::{Utf8Path, Utf8PathBuf};
use hcb_admin::{JsonFileOptionStore, NonceManager, ThemeSettings};
use hcb_theme::ThemeCatalog;
use miette::{Context, IntoDiagnostic, Result};
use serde::Deserialize;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG: &str = "hcb.toml";

/// Site configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Plugin root; themes live in `<plugin_dir>/assets/build/themes`.
    pub plugin_dir: Utf8PathBuf,
    /// Public URL of the plugin root.
    pub plugin_url: String,
    /// JSON file holding site options.
    pub options_file: Utf8PathBuf,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Bearer token identifying the administrator. Without one, every
    /// request is anonymous.
    pub admin_token: Option<String>,
    /// Secret nonces are derived from. A random one is used when unset.
    pub nonce_salt: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plugin_dir: Utf8PathBuf::from("."),
            plugin_url: "http://127.0.0.1:8080/".to_string(),
            options_file: Utf8PathBuf::from("hcb-options.json"),
            server: ServerConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            admin_token: None,
            nonce_salt: None,
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist, then apply environment overrides.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs_err::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to read {path}"))?;
            Self::parse(&content).wrap_err_with(|| format!("failed to parse {path}"))?
        } else {
            tracing::debug!(%path, "no config file, using defaults");
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).into_diagnostic()
    }

    /// Apply `HCB_ADMIN_TOKEN` and `HCB_NONCE_SALT`.
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var("HCB_ADMIN_TOKEN").filter(|v| !v.is_empty()) {
            self.server.admin_token = Some(token);
        }
        if let Some(salt) = var("HCB_NONCE_SALT").filter(|v| !v.is_empty()) {
            self.server.nonce_salt = Some(salt);
        }
    }

    pub fn catalog(&self) -> ThemeCatalog {
        ThemeCatalog::new(self.plugin_dir.as_std_path(), self.plugin_url.clone())
    }

    /// Nonce manager keyed by `nonce_salt`, or by a per-process random key.
    pub fn nonces(&self) -> NonceManager {
        match &self.server.nonce_salt {
            Some(salt) => NonceManager::new(salt),
            None => NonceManager::random(),
        }
    }

    pub fn settings(&self) -> ThemeSettings<JsonFileOptionStore> {
        ThemeSettings::new(
            JsonFileOptionStore::new(self.options_file.as_std_path()),
            self.catalog(),
            self.nonces(),
        )
    }

    /// Settings for the admin server, the only place nonces are handed out.
    pub fn serve_settings(&self) -> ThemeSettings<JsonFileOptionStore> {
        if self.server.nonce_salt.is_none() {
            tracing::warn!("no nonce_salt configured; nonces will not survive a restart");
        }
        self.settings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.options_file, "hcb-options.json");
    }

    #[test]
    fn test_parse_full() {
        let config = Config::parse(indoc! {r#"
            plugin_dir = "/srv/wp-content/plugins/hcb"
            plugin_url = "https://example.com/wp-content/plugins/hcb/"
            options_file = "/var/lib/hcb/options.json"

            [server]
            address = "0.0.0.0"
            port = 9000
            admin_token = "secret"
        "#})
        .unwrap();
        assert_eq!(config.plugin_dir, "/srv/wp-content/plugins/hcb");
        assert_eq!(config.server.address, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.admin_token.as_deref(), Some("secret"));
        assert_eq!(config.server.nonce_salt, None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(Config::parse("plugin_path = \".\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|name| match name {
            "HCB_ADMIN_TOKEN" => Some("from-env".to_string()),
            "HCB_NONCE_SALT" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.server.admin_token.as_deref(), Some("from-env"));
        assert_eq!(config.server.nonce_salt, None);
    }

    /// Run `f` and return what it logged.
    fn logged(f: impl FnOnce()) -> String {
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Capture(Arc<Mutex<Vec<u8>>>);
        impl std::io::Write for Capture {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_missing_salt_warns_only_when_serving() {
        let config = Config::default();
        assert!(logged(|| drop(config.settings())).is_empty());
        assert!(logged(|| drop(config.serve_settings())).contains("no nonce_salt configured"));

        let mut salted = Config::default();
        salted.server.nonce_salt = Some("pepper".to_string());
        assert!(logged(|| drop(salted.serve_settings())).is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("hcb.toml")).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.plugin_dir, ".");
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("hcb.toml")).unwrap();
        fs_err::write(&path, "plugin_url = \"https://cdn.example.com/\"\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.plugin_url, "https://cdn.example.com/");
        assert_eq!(
            config.catalog().theme_url("github.css"),
            "https://cdn.example.com/assets/build/themes/github.css"
        );
    }
}

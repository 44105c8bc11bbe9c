use std::{fs, path::Path, time::Duration};

use thiserror::Error;
use tracing::warn;
use url::Url;

pub const SETTINGS_FILE: &str = "storefront.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub asset_base_url: String,
    pub request_timeout: Duration,
    pub refetch_on_reconciliation_failure: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".into(),
            asset_base_url: "http://localhost:3000".into(),
            request_timeout: Duration::from_secs(10),
            refetch_on_reconciliation_failure: false,
        }
    }
}

impl ClientSettings {
    /// Points the client at another api host. Images are then served from
    /// that host's origin as well.
    pub fn with_api_base_url(mut self, raw: &str) -> Result<Self, SettingsError> {
        let url = parse_http_url("api_base_url", raw)?;
        self.asset_base_url = url.origin().ascii_serialization();
        self.api_base_url = trim_url(&url);
        Ok(self)
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{key} is not a valid http(s) url: '{value}'")]
    InvalidUrl { key: &'static str, value: String },
    #[error("{key} must be a positive number of milliseconds, got '{value}'")]
    InvalidTimeout { key: &'static str, value: String },
    #[error("{key} must be true or false, got '{value}'")]
    InvalidFlag { key: &'static str, value: String },
}

pub fn load_settings() -> Result<ClientSettings, SettingsError> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// Builds settings from defaults, then `path` (if readable), then the
/// environment as seen through `env`. Later sources win.
pub fn load_settings_from<F>(path: &Path, env: F) -> Result<ClientSettings, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = ClientSettings::default();
    let mut api_url = None;
    let mut asset_url = None;
    let mut timeout_ms = None;
    let mut refetch = None;

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<toml::Table>(&raw) {
            Ok(table) => {
                api_url = table_string(&table, "api_base_url");
                asset_url = table_string(&table, "asset_base_url");
                timeout_ms = table_string(&table, "request_timeout_ms");
                refetch = table_string(&table, "refetch_on_reconciliation_failure");
            }
            Err(err) => warn!(path = %path.display(), "ignoring unreadable settings file: {err}"),
        }
    }

    for key in ["STOREFRONT_API_URL", "APP__API_BASE_URL"] {
        if let Some(v) = env(key) {
            api_url = Some(v);
        }
    }
    for key in ["STOREFRONT_ASSET_URL", "APP__ASSET_BASE_URL"] {
        if let Some(v) = env(key) {
            asset_url = Some(v);
        }
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        timeout_ms = Some(v);
    }
    if let Some(v) = env("APP__REFETCH_ON_RECONCILIATION_FAILURE") {
        refetch = Some(v);
    }

    if let Some(raw) = api_url {
        let url = parse_http_url("api_base_url", &raw)?;
        // without an explicit asset base, images are served from the api host
        if asset_url.is_none() {
            settings.asset_base_url = url.origin().ascii_serialization();
        }
        settings.api_base_url = trim_url(&url);
    }
    if let Some(raw) = asset_url {
        settings.asset_base_url = trim_url(&parse_http_url("asset_base_url", &raw)?);
    }
    if let Some(raw) = timeout_ms {
        settings.request_timeout = parse_timeout(&raw)?;
    }
    if let Some(raw) = refetch {
        settings.refetch_on_reconciliation_failure = parse_flag(&raw)?;
    }

    Ok(settings)
}

fn table_string(table: &toml::Table, key: &str) -> Option<String> {
    match table.get(key)? {
        toml::Value::String(v) => Some(v.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_http_url(key: &'static str, raw: &str) -> Result<Url, SettingsError> {
    let invalid = || SettingsError::InvalidUrl {
        key,
        value: raw.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(url)
}

fn trim_url(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_string()
}

fn parse_timeout(raw: &str) -> Result<Duration, SettingsError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(SettingsError::InvalidTimeout {
            key: "request_timeout_ms",
            value: raw.to_string(),
        }),
    }
}

fn parse_flag(raw: &str) -> Result<bool, SettingsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(SettingsError::InvalidFlag {
            key: "refetch_on_reconciliation_failure",
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

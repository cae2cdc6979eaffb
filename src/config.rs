//! Configuration Management
//!
//! Settings are layered: an optional JSON file under the user config
//! directory, then environment variables (a local `.env` is honored by the
//! binary), then command-line flags.

use crate::coolify::client::CoolifyClient;
use crate::coolify::version::ApiVersion;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_API_URL: &str = "API_URL";
pub const ENV_API_TOKEN: &str = "API_TOKEN";
pub const ENV_API_VERSION: &str = "API_VERSION";
pub const ENV_CACHE_TTL: &str = "CACHE_TTL_SECONDS";
pub const ENV_HTTP_TIMEOUT: &str = "HTTP_TIMEOUT_SECONDS";
pub const ENV_DEBUG: &str = "DEBUG_COOLIFY";

/// Client settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Coolify base URL, with or without a trailing `/api/...`
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    /// Initial API version, e.g. `v4` or `4`
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub cache_ttl_secs: Option<u64>,
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
    /// Log request failures with (sanitized) response bodies
    #[serde(default)]
    pub debug: bool,
}

impl Settings {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("coolify-client").join("config.json"))
    }

    /// Load the config file, falling back to defaults when absent or invalid
    pub fn load_file() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config file {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// File settings overlaid with the process environment
    pub fn load() -> Self {
        Self::load_file().merge_lookup(|key| std::env::var(key).ok())
    }

    /// Settings read only from `lookup`, which stands in for the environment
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().merge_lookup(lookup)
    }

    /// Overlay values found through `lookup`. Unparseable numbers are ignored.
    pub fn merge_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_API_URL) {
            self.api_url = Some(url);
        }
        if let Some(token) = non_empty(ENV_API_TOKEN) {
            self.api_token = Some(token);
        }
        if let Some(version) = non_empty(ENV_API_VERSION) {
            self.api_version = Some(version);
        }
        if let Some(ttl) = non_empty(ENV_CACHE_TTL).and_then(|v| parse_positive(&v)) {
            self.cache_ttl_secs = Some(ttl);
        }
        if let Some(timeout) = non_empty(ENV_HTTP_TIMEOUT).and_then(|v| parse_positive(&v)) {
            self.http_timeout_secs = Some(timeout);
        }
        if let Some(debug) = non_empty(ENV_DEBUG) {
            self.debug = parse_flag(&debug);
        }
        self
    }

    /// Sanitized base URL; errors when unset
    pub fn base_url(&self) -> Result<String> {
        let raw = self
            .api_url
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .context("API_URL must be set")?;
        let sanitized = sanitize_base_url(raw);
        let parsed = url::Url::parse(&sanitized)
            .with_context(|| format!("API_URL is not a valid URL: {}", sanitized))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("API_URL must use http or https");
        }
        Ok(sanitized)
    }

    pub fn token(&self) -> Result<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .context("API_TOKEN must be set")
    }

    pub fn resolved_api_version(&self) -> Option<ApiVersion> {
        self.api_version.as_deref().and_then(ApiVersion::parse)
    }

    /// Build a client from these settings
    pub fn build_client(&self) -> Result<CoolifyClient> {
        let base_url = self.base_url()?;
        let token = self.token()?;

        let mut builder = CoolifyClient::builder(&base_url, token).debug(self.debug);
        if let Some(version) = self.resolved_api_version() {
            builder = builder.api_version(version.as_str());
        }
        if let Some(ttl) = self.cache_ttl_secs {
            builder = builder.cache_ttl(Duration::from_secs(ttl));
        }
        if let Some(timeout) = self.http_timeout_secs {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        builder.build().context("Failed to create Coolify client")
    }
}

fn parse_positive(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok().filter(|v| *v > 0)
}

fn parse_flag(raw: &str) -> bool {
    let raw = raw.trim();
    raw == "1" || raw.eq_ignore_ascii_case("true")
}

/// Reduce a user-supplied URL to the instance root.
///
/// `https://host/api/v4/` and `https://host/api` both become `https://host`.
pub fn sanitize_base_url(raw: &str) -> String {
    let mut url = raw.trim().trim_end_matches('/').to_string();

    if let Some(idx) = url.to_ascii_lowercase().find("/api/") {
        url.truncate(idx);
    }
    if url.to_ascii_lowercase().ends_with("/api") {
        url.truncate(url.len() - "/api".len());
    }

    url.trim_end_matches('/').to_string()
}

//! Coolify Client
//!
//! Main client for the Coolify API, combining the HTTP transport, the
//! API-version fallback executor and the response cache.

use super::cache::{Cacheable, ResponseCache, DEFAULT_CACHE_TTL};
use super::error::{ApiError, Result};
use super::http::{ApiRequest, CoolifyHttpClient, DEFAULT_HTTP_TIMEOUT};
use super::pagination::{decode_page, Listing};
use super::types::Page;
use super::version::{
    candidate_versions, parse_versions, ApiVersion, DEFAULT_FALLBACK_VERSIONS,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Main Coolify client
///
/// Cloning is cheap; clones share the connection pool, the cache and the
/// pinned API version.
#[derive(Clone)]
pub struct CoolifyClient {
    base_url: String,
    token: String,
    http: CoolifyHttpClient,
    pinned: Arc<RwLock<ApiVersion>>,
    fallback_versions: Arc<[ApiVersion]>,
    cache: Option<Arc<ResponseCache>>,
    cache_ttl: Duration,
}

/// Builder for [`CoolifyClient`]
pub struct ClientBuilder {
    base_url: String,
    token: String,
    api_version: Option<ApiVersion>,
    fallback_versions: Vec<ApiVersion>,
    timeout: Duration,
    http_client: Option<reqwest::Client>,
    cache: Option<Arc<ResponseCache>>,
    use_cache: bool,
    cache_ttl: Duration,
    debug: bool,
}

impl ClientBuilder {
    fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            token: token.to_string(),
            api_version: None,
            fallback_versions: parse_versions(DEFAULT_FALLBACK_VERSIONS),
            timeout: DEFAULT_HTTP_TIMEOUT,
            http_client: None,
            cache: None,
            use_cache: true,
            cache_ttl: DEFAULT_CACHE_TTL,
            debug: false,
        }
    }

    /// Initial API version; blank input keeps the default
    pub fn api_version(mut self, version: &str) -> Self {
        if let Some(version) = ApiVersion::parse(version) {
            self.api_version = Some(version);
        }
        self
    }

    /// Versions probed, in order, after the pinned one
    pub fn fallback_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fallback_versions = parse_versions(versions);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }

    /// Use a preconfigured reqwest client; `timeout` is then ignored
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// TTL for cached reads; zero keeps the default
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        if !ttl.is_zero() {
            self.cache_ttl = ttl;
        }
        self
    }

    /// Share an existing cache, e.g. between clients for different tokens
    pub fn cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self.use_cache = true;
        self
    }

    /// Disable caching; every read hits the network
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self.use_cache = false;
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn build(self) -> Result<CoolifyClient> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidConfig(format!("base URL {:?}: {}", self.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidConfig(format!(
                "base URL must be http or https, got {}",
                parsed.scheme()
            )));
        }
        if self.token.trim().is_empty() {
            return Err(ApiError::InvalidConfig("API token is empty".to_string()));
        }

        let http = match self.http_client {
            Some(client) => CoolifyHttpClient::from_client(client, self.debug),
            None => CoolifyHttpClient::new(self.timeout, self.debug)?,
        };

        let cache = if self.use_cache {
            Some(
                self.cache
                    .unwrap_or_else(|| Arc::new(ResponseCache::new(self.cache_ttl))),
            )
        } else {
            None
        };

        Ok(CoolifyClient {
            base_url: self.base_url,
            token: self.token,
            http,
            pinned: Arc::new(RwLock::new(self.api_version.unwrap_or_default())),
            fallback_versions: self.fallback_versions.into(),
            cache,
            cache_ttl: self.cache_ttl,
        })
    }
}

impl CoolifyClient {
    pub fn builder(base_url: &str, token: &str) -> ClientBuilder {
        ClientBuilder::new(base_url, token)
    }

    /// Create a client with default settings
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Self::builder(base_url, token).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The version the next request will try first
    pub fn api_version(&self) -> ApiVersion {
        self.pinned
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn cache(&self) -> Option<&Arc<ResponseCache>> {
        self.cache.as_ref()
    }

    fn pin_version(&self, version: &ApiVersion) {
        let mut pinned = self.pinned.write().unwrap_or_else(PoisonError::into_inner);
        if *pinned != *version {
            tracing::info!("Pinning Coolify API version {} (was {})", version, *pinned);
            *pinned = version.clone();
        }
    }

    /// Versions to try for the next request, pinned version first
    pub fn versions_to_try(&self) -> Vec<ApiVersion> {
        candidate_versions(&self.api_version(), &self.fallback_versions)
    }

    /// Build a versioned API URL: `<base>/api/<version>/<path>`
    pub fn api_url(&self, version: &ApiVersion, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/api/{}/{}", self.base_url, version, path)
    }

    // =========================================================================
    // Version-fallback executor
    // =========================================================================

    /// Execute one logical request, probing older API versions on 404.
    ///
    /// The first 2xx pins its version for later calls. A not-found moves on
    /// to the next candidate unless it was the last one, in which case it is
    /// returned. Every other error stops the probe and is returned as is.
    pub async fn request_with_fallback(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<String> {
        let versions = self.versions_to_try();
        let last = versions.len().saturating_sub(1);

        for (idx, version) in versions.iter().enumerate() {
            let request = ApiRequest {
                method: method.clone(),
                url: self.api_url(version, path),
                query,
                body,
            };

            match self.http.send(&request, &self.token).await {
                Ok(response) => {
                    self.pin_version(version);
                    return Ok(response);
                }
                Err(err) if err.is_not_found() && idx < last => {
                    tracing::debug!(
                        "Received 404 with API version {}, trying {}",
                        version,
                        versions[idx + 1]
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Err(ApiError::InvalidConfig(
            "no API versions configured".to_string(),
        ))
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        self.request_with_fallback(Method::GET, path, query, None)
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<String> {
        self.request_with_fallback(Method::DELETE, path, &[], None)
            .await
    }

    /// GET and decode a JSON object
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let body = self.get(path, query).await?;
        Ok(serde_json::from_str(&body)?)
    }

    // =========================================================================
    // Cache helpers
    // =========================================================================

    pub(crate) fn cached<T: Cacheable>(&self, key: &str) -> Option<Arc<T>> {
        let cache = self.cache.as_ref()?;
        let value = cache.get(key)?;
        let hit = T::from_cached(value);
        if hit.is_some() {
            tracing::debug!("Cache hit: {}", key);
        }
        hit
    }

    pub(crate) fn store<T: Cacheable>(&self, key: String, value: Arc<T>) {
        if let Some(cache) = &self.cache {
            cache.set(key, T::into_cached(value), self.cache_ttl);
        }
    }

    pub(crate) fn invalidate(&self, keys: &[String], prefixes: &[&str]) {
        let Some(cache) = &self.cache else {
            return;
        };
        for prefix in prefixes {
            cache.delete_prefix(prefix);
        }
        for key in keys {
            cache.delete(key);
        }
        tracing::debug!("Invalidated cache keys {:?} and prefixes {:?}", keys, prefixes);
    }

    /// Cached list read: `page`/`per_page` are sent only when positive
    pub(crate) async fn list_page<T>(
        &self,
        path: &str,
        cache_key: String,
        page: u32,
        per_page: u32,
    ) -> Result<Listing<T>>
    where
        T: DeserializeOwned,
        Page<T>: Cacheable,
    {
        if let Some(cached) = self.cached::<Page<T>>(&cache_key) {
            return Ok(Listing::new(cached, per_page, page));
        }

        let query = page_query(page, per_page);
        let body = self.get(path, &query).await?;
        let mut decoded: Page<T> = decode_page(&body)?;

        if decoded.pagination.per_page == 0 && per_page > 0 {
            decoded.pagination.per_page = per_page;
        }

        let decoded = Arc::new(decoded);
        self.store(cache_key, decoded.clone());
        Ok(Listing::new(decoded, per_page, page))
    }

    /// Cached single-object read
    pub(crate) async fn get_detail<T>(&self, path: &str, cache_key: String) -> Result<Arc<T>>
    where
        T: DeserializeOwned + Cacheable,
    {
        if let Some(cached) = self.cached::<T>(&cache_key) {
            return Ok(cached);
        }

        let detail: Arc<T> = Arc::new(self.get_json(path, &[]).await?);
        self.store(cache_key, detail.clone());
        Ok(detail)
    }
}

/// Query parameters for a paginated list
pub(crate) fn page_query(page: u32, per_page: u32) -> Vec<(&'static str, String)> {
    let mut query = Vec::with_capacity(2);
    if page > 0 {
        query.push(("page", page.to_string()));
    }
    if per_page > 0 {
        query.push(("per_page", per_page.to_string()));
    }
    query
}

/// Percent-encode a path segment such as a resource uuid
pub(crate) fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

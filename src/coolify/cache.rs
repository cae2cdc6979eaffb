//! Response cache
//!
//! An in-memory key/value store with per-entry expiry. Expiry is lazy: an
//! expired entry is reported as absent by [`TtlCache::get`] but stays in the
//! map until the key is written or deleted. List queries share key prefixes
//! so a mutation can evict a whole family with [`TtlCache::delete_prefix`].

use super::types::{Application, ApplicationDetail, Database, Deployment, Environment, Page};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;

/// Default time-to-live for cached responses
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe TTL cache. Reads share the lock, writes take it exclusively.
pub struct TtlCache<V> {
    default_ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a live entry. Expired entries are treated as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Store `value` under `key`, replacing any previous entry.
    /// A zero `ttl` falls back to the cache's default TTL.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.into(), entry);
    }

    pub fn delete(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }

    /// Remove every entry whose key starts with `prefix`
    pub fn delete_prefix(&self, prefix: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|key, _| !key.starts_with(prefix));
    }

    /// Number of stored entries, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

/// The response shapes the client caches. Values are shared, never copied.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Applications(Arc<Page<Application>>),
    ApplicationDetail(Arc<ApplicationDetail>),
    Deployments(Arc<Page<Deployment>>),
    Deployment(Arc<Deployment>),
    Environments(Arc<Page<Environment>>),
    Databases(Arc<Page<Database>>),
    Database(Arc<Database>),
}

/// Cache used by the client
pub type ResponseCache = TtlCache<CachedValue>;

/// Conversion between a concrete response type and its [`CachedValue`] slot
pub trait Cacheable: Sized {
    fn into_cached(value: Arc<Self>) -> CachedValue;
    fn from_cached(value: CachedValue) -> Option<Arc<Self>>;
}

macro_rules! cacheable {
    ($ty:ty => $variant:ident) => {
        impl Cacheable for $ty {
            fn into_cached(value: Arc<Self>) -> CachedValue {
                CachedValue::$variant(value)
            }

            fn from_cached(value: CachedValue) -> Option<Arc<Self>> {
                match value {
                    CachedValue::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

cacheable!(Page<Application> => Applications);
cacheable!(ApplicationDetail => ApplicationDetail);
cacheable!(Page<Deployment> => Deployments);
cacheable!(Deployment => Deployment);
cacheable!(Page<Environment> => Environments);
cacheable!(Page<Database> => Databases);
cacheable!(Database => Database);

/// Cache key layout. List keys end in `page:per_page` under a shared prefix.
pub mod keys {
    pub const APPS_LIST: &str = "apps:list:";
    pub const DEPLOYMENTS_LIST: &str = "deployments:list:";
    pub const ENVIRONMENTS_LIST: &str = "environments:list:";
    pub const DATABASES_LIST: &str = "databases:list:";

    pub fn list(prefix: &str, page: u32, per_page: u32) -> String {
        format!("{}{}:{}", prefix, page, per_page)
    }

    pub fn app_detail(uuid: &str) -> String {
        format!("apps:detail:{}", uuid)
    }

    pub fn app_deployments_prefix(uuid: &str) -> String {
        format!("deployments:app:{}:", uuid)
    }

    pub fn deployment_detail(uuid: &str) -> String {
        format!("deployments:detail:{}", uuid)
    }

    pub fn database_detail(uuid: &str) -> String {
        format!("databases:detail:{}", uuid)
    }
}

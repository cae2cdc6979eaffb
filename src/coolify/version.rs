//! API version handling
//!
//! Coolify mounts its REST API under `/api/<version>/`. The live version is
//! not always known up front, so the client keeps an ordered list of
//! candidates and probes them when a route comes back as not found.

use std::fmt;

/// Version used when nothing else is configured
pub const DEFAULT_API_VERSION: &str = "v4";

/// Fallback sequence probed after the pinned version
pub const DEFAULT_FALLBACK_VERSIONS: &[&str] = &["v4", "v3", "v2", "v1"];

/// A normalized API version segment, always carrying the `v` prefix
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiVersion(String);

impl ApiVersion {
    /// Normalize user input into a version segment.
    ///
    /// `" 3 "`, `"/v3"` and `"v3"` all become `v3`. Returns `None` for empty input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_start_matches('/').trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('v') {
            Some(Self(trimmed.to_string()))
        } else {
            Some(Self(format!("v{}", trimmed)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self(DEFAULT_API_VERSION.to_string())
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, de-duplicated list of versions to try: `primary` first, then
/// `fallbacks` in their given order.
pub fn candidate_versions(primary: &ApiVersion, fallbacks: &[ApiVersion]) -> Vec<ApiVersion> {
    let mut list: Vec<ApiVersion> = Vec::with_capacity(fallbacks.len() + 1);
    for version in std::iter::once(primary).chain(fallbacks.iter()) {
        if !list.contains(version) {
            list.push(version.clone());
        }
    }
    list
}

/// Parse a list of raw version strings, dropping empty entries
pub fn parse_versions<I, S>(raw: I) -> Vec<ApiVersion>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|v| ApiVersion::parse(v.as_ref()))
        .collect()
}

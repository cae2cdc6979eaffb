//! Pagination reconciliation
//!
//! Coolify has shipped several list response shapes over time:
//!
//! - `{"data": [...], "pagination": {...}}`
//! - `{"data": [...], "meta": {"pagination": {...}}}` or `meta` carrying the
//!   page fields directly
//! - `{"items": [...]}` and `{"applications": [...]}` on older releases
//! - Laravel-style `current_page`/`last_page` at the top level
//! - a bare `[...]` with no envelope at all
//!
//! [`decode_page`] folds all of these into a [`Page`], and [`derive_page`]
//! turns whatever pagination survived into a usable `(current, total)` pair.

use super::error::Result;
use super::types::{de, Page, PageShape, Pagination};
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(default, deserialize_with = "de::null_default")]
    pagination: Pagination,
    #[serde(flatten)]
    inline: Pagination,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    #[serde(default, deserialize_with = "de::null_default")]
    data: Vec<T>,
    #[serde(default, deserialize_with = "de::null_default")]
    items: Vec<T>,
    #[serde(default, deserialize_with = "de::null_default")]
    applications: Vec<T>,
    #[serde(default, deserialize_with = "de::null_default")]
    pagination: Pagination,
    #[serde(default, deserialize_with = "de::null_default")]
    meta: Meta,
    #[serde(flatten)]
    top_level: Pagination,
}

impl<T> Envelope<T> {
    /// First non-empty item list, in order of preference
    fn into_items(self) -> Vec<T> {
        [self.data, self.items, self.applications]
            .into_iter()
            .find(|list| !list.is_empty())
            .unwrap_or_default()
    }

    /// First non-empty pagination block, in order of preference
    fn page_info(&self) -> Pagination {
        [
            self.meta.pagination,
            self.meta.inline,
            self.pagination,
            self.top_level,
        ]
        .into_iter()
        .find(|p| !p.is_empty())
        .unwrap_or_default()
    }
}

/// Decode a list response body into a [`Page`].
///
/// Objects are read as an envelope first. An envelope that yields neither
/// items nor pagination falls through to the bare-array parse, so an
/// unrecognized object (an error message, `{"data": []}`) is a decode
/// failure rather than an empty page.
pub fn decode_page<T: DeserializeOwned>(body: &str) -> Result<Page<T>> {
    let value: Value = serde_json::from_str(body)?;

    if value.is_object() {
        let envelope: Envelope<T> = serde_json::from_value(value.clone())?;
        let pagination = envelope.page_info();
        let items = envelope.into_items();
        if !items.is_empty() || !pagination.is_empty() {
            return Ok(Page {
                items,
                pagination,
                shape: PageShape::Envelope,
            });
        }
    }

    // Bare array, or an error naming the expected sequence
    let items: Vec<T> = serde_json::from_value(value)?;
    Ok(Page {
        items,
        pagination: Pagination::default(),
        shape: PageShape::BareArray,
    })
}

/// Reconcile server pagination with what was actually fetched.
///
/// Returns `(current_page, total_pages)`:
/// 1. current is the server's page when it reported one, else `requested_page`
/// 2. total is the server's last page; else `ceil(total / per_page)`; else
///    `current + 1` when a full page came back; else `current`
pub fn derive_page(
    info: Pagination,
    fetched_count: usize,
    per_page: u32,
    requested_page: u32,
) -> (u32, u32) {
    let current = if info.current_page >= 1 {
        info.current_page
    } else {
        requested_page
    };

    let mut total = info.last_page;
    if total == 0 && info.total > 0 && per_page > 0 {
        total = info.total.div_ceil(per_page);
    }
    if total == 0 {
        total = if per_page > 0 && fetched_count == per_page as usize {
            current.saturating_add(1)
        } else {
            current
        };
    }
    (current, total)
}

/// One page of a list operation, with navigation numbers already derived
#[derive(Debug, Clone)]
pub struct Listing<T> {
    page: Arc<Page<T>>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl<T> Listing<T> {
    pub fn new(page: Arc<Page<T>>, per_page: u32, requested_page: u32) -> Self {
        let (current_page, total_pages) =
            derive_page(page.page_info(), page.results().len(), per_page, requested_page);
        Self {
            page,
            current_page,
            total_pages,
        }
    }

    pub fn items(&self) -> &[T] {
        self.page.results()
    }

    pub fn pagination(&self) -> Pagination {
        self.page.page_info()
    }

    /// The underlying page, shared with the cache
    pub fn page(&self) -> &Arc<Page<T>> {
        &self.page
    }

    pub fn is_empty(&self) -> bool {
        self.page.results().is_empty()
    }
}

impl<T: Serialize> Serialize for Listing<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Listing", 3)?;
        state.serialize_field("items", self.items())?;
        state.serialize_field("current_page", &self.current_page)?;
        state.serialize_field("total_pages", &self.total_pages)?;
        state.end()
    }
}

//! Coolify API interaction module
//!
//! This module provides the core functionality for talking to a Coolify
//! instance: the HTTP transport, API-version fallback, response caching and
//! pagination reconciliation, plus per-resource operations.
//!
//! # Module Structure
//!
//! - [`client`] - Main client, builder and version-fallback executor
//! - [`http`] - HTTP utilities for REST API calls
//! - [`version`] - API version normalization and candidate ordering
//! - [`cache`] - TTL response cache with prefix invalidation
//! - [`pagination`] - Envelope decoding and page-number derivation
//! - [`types`] - Wire types
//! - [`error`] - Error taxonomy
//!
//! Resource operations live in `applications`, `deployments`,
//! `environments` and `databases` as `impl CoolifyClient` blocks.
//!
//! # Example
//!
//! ```ignore
//! use coolify_client::coolify::client::CoolifyClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = CoolifyClient::new("https://coolify.example.com", "token")?;
//!     let apps = client.list_applications(1, 5).await?;
//!     println!("page {} of {}", apps.current_page, apps.total_pages);
//!     Ok(())
//! }
//! ```

mod applications;
pub mod cache;
pub mod client;
mod databases;
mod deployments;
mod environments;
pub mod error;
pub mod http;
pub mod pagination;
pub mod types;
pub mod version;

//! Client library for the Coolify deployment-management API.
//!
//! The [`CoolifyClient`] survives API version drift by probing older
//! versions on 404 and pinning the first one that answers, caches reads for
//! a short TTL, and reconciles the several list shapes Coolify has served.

pub mod config;
pub mod coolify;

pub use coolify::cache::{CachedValue, ResponseCache, TtlCache};
pub use coolify::client::{ClientBuilder, CoolifyClient};
pub use coolify::error::{format_api_error, ApiError};
pub use coolify::pagination::{decode_page, derive_page, Listing};
pub use coolify::types::{
    ActionMessage, Application, ApplicationDetail, Database, Deployment, Environment,
    EnvironmentVariable, Page, PageShape, Pagination, StartDeployment,
};
pub use coolify::version::ApiVersion;

//! Coolify Environments
//!
//! Environments are read-only through the API; there are no lifecycle actions.

use super::cache::keys;
use super::client::CoolifyClient;
use super::error::Result;
use super::pagination::Listing;
use super::types::Environment;

impl CoolifyClient {
    pub async fn list_environments(&self, page: u32, per_page: u32) -> Result<Listing<Environment>> {
        self.list_page(
            "/environments",
            keys::list(keys::ENVIRONMENTS_LIST, page, per_page),
            page,
            per_page,
        )
        .await
    }
}

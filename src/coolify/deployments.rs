//! Coolify Deployments

use super::cache::keys;
use super::client::{segment, CoolifyClient};
use super::error::Result;
use super::pagination::Listing;
use super::types::Deployment;
use std::sync::Arc;

impl CoolifyClient {
    /// List deployments across all applications
    pub async fn list_deployments(&self, page: u32, per_page: u32) -> Result<Listing<Deployment>> {
        self.list_page(
            "/deployments",
            keys::list(keys::DEPLOYMENTS_LIST, page, per_page),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_deployment(&self, uuid: &str) -> Result<Arc<Deployment>> {
        self.get_detail(
            &format!("/deployments/{}", segment(uuid)),
            keys::deployment_detail(uuid),
        )
        .await
    }
}

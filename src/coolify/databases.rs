//! Coolify Databases
//!
//! Listing, inspection and lifecycle actions for standalone databases.

use super::cache::keys;
use super::client::{segment, CoolifyClient};
use super::error::Result;
use super::pagination::Listing;
use super::types::{ActionMessage, Database};
use std::sync::Arc;

impl CoolifyClient {
    pub async fn list_databases(&self, page: u32, per_page: u32) -> Result<Listing<Database>> {
        self.list_page(
            "/databases",
            keys::list(keys::DATABASES_LIST, page, per_page),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_database(&self, uuid: &str) -> Result<Arc<Database>> {
        self.get_detail(
            &format!("/databases/{}", segment(uuid)),
            keys::database_detail(uuid),
        )
        .await
    }

    pub async fn start_database(&self, uuid: &str) -> Result<ActionMessage> {
        self.database_action(uuid, "start").await
    }

    pub async fn stop_database(&self, uuid: &str) -> Result<ActionMessage> {
        self.database_action(uuid, "stop").await
    }

    pub async fn restart_database(&self, uuid: &str) -> Result<ActionMessage> {
        self.database_action(uuid, "restart").await
    }

    pub async fn delete_database(&self, uuid: &str) -> Result<()> {
        self.delete(&format!("/databases/{}", segment(uuid)))
            .await?;
        self.invalidate_database(uuid);
        Ok(())
    }

    async fn database_action(&self, uuid: &str, action: &str) -> Result<ActionMessage> {
        let result = self
            .get_json(&format!("/databases/{}/{}", segment(uuid), action), &[])
            .await?;
        self.invalidate_database(uuid);
        Ok(result)
    }

    fn invalidate_database(&self, uuid: &str) {
        self.invalidate(&[keys::database_detail(uuid)], &[keys::DATABASES_LIST]);
    }
}

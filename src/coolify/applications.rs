//! Coolify Applications
//!
//! Listing, inspection and lifecycle actions for applications.

use super::cache::keys;
use super::client::{segment, CoolifyClient};
use super::error::Result;
use super::pagination::{decode_page, Listing};
use super::types::{
    ActionMessage, Application, ApplicationDetail, ApplicationLogs, Deployment,
    EnvironmentVariable, StartDeployment,
};
use std::sync::Arc;

impl CoolifyClient {
    /// List applications, one page at a time
    pub async fn list_applications(&self, page: u32, per_page: u32) -> Result<Listing<Application>> {
        self.list_page(
            "/applications",
            keys::list(keys::APPS_LIST, page, per_page),
            page,
            per_page,
        )
        .await
    }

    pub async fn get_application(&self, uuid: &str) -> Result<Arc<ApplicationDetail>> {
        self.get_detail(
            &format!("/applications/{}", segment(uuid)),
            keys::app_detail(uuid),
        )
        .await
    }

    pub async fn delete_application(&self, uuid: &str) -> Result<()> {
        self.delete(&format!("/applications/{}", segment(uuid)))
            .await?;
        self.invalidate_application(uuid, false);
        Ok(())
    }

    /// Queue a deployment of the application
    pub async fn start_application(
        &self,
        uuid: &str,
        force: bool,
        instant_deploy: bool,
    ) -> Result<StartDeployment> {
        let mut query = Vec::new();
        if force {
            query.push(("force", "true".to_string()));
        }
        if instant_deploy {
            query.push(("instant_deploy", "true".to_string()));
        }

        let result = self
            .get_json(&format!("/applications/{}/start", segment(uuid)), &query)
            .await?;
        self.invalidate_application(uuid, true);
        Ok(result)
    }

    pub async fn stop_application(&self, uuid: &str) -> Result<ActionMessage> {
        let result = self
            .get_json(&format!("/applications/{}/stop", segment(uuid)), &[])
            .await?;
        self.invalidate_application(uuid, false);
        Ok(result)
    }

    pub async fn restart_application(&self, uuid: &str) -> Result<StartDeployment> {
        let result = self
            .get_json(&format!("/applications/{}/restart", segment(uuid)), &[])
            .await?;
        self.invalidate_application(uuid, true);
        Ok(result)
    }

    /// Fetch application logs. `None` requests every available line.
    pub async fn get_application_logs(&self, uuid: &str, lines: Option<i64>) -> Result<String> {
        let query = [("lines", lines.unwrap_or(-1).to_string())];
        let logs: ApplicationLogs = self
            .get_json(&format!("/applications/{}/logs", segment(uuid)), &query)
            .await?;
        Ok(logs.logs)
    }

    pub async fn get_application_envs(&self, uuid: &str) -> Result<Vec<EnvironmentVariable>> {
        let body = self
            .get(&format!("/applications/{}/envs", segment(uuid)), &[])
            .await?;
        Ok(decode_page::<EnvironmentVariable>(&body)?.items)
    }

    /// Deployments of a single application
    pub async fn list_application_deployments(
        &self,
        uuid: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Listing<Deployment>> {
        self.list_page(
            &format!("/applications/{}/deployments", segment(uuid)),
            keys::list(&keys::app_deployments_prefix(uuid), page, per_page),
            page,
            per_page,
        )
        .await
    }

    fn invalidate_application(&self, uuid: &str, deployed: bool) {
        let detail = [keys::app_detail(uuid)];
        if deployed {
            let app_deployments = keys::app_deployments_prefix(uuid);
            self.invalidate(
                &detail,
                &[keys::APPS_LIST, keys::DEPLOYMENTS_LIST, app_deployments.as_str()],
            );
        } else {
            self.invalidate(&detail, &[keys::APPS_LIST]);
        }
    }
}

use crate::auth::TokenManager;
use crate::error::ApiError;
use crate::http::read_envelope;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};
use vspc_core::model::{Alarm, BackupResourceUsage, CompanyUsage, Job, JobKind, VirtualMachine};

pub const COMPANY_USAGE_PATH: &str = "/organizations/companies/usage";
pub const BACKUP_RESOURCES_USAGE_PATH: &str = "/organizations/companies/sites/backupResources/usage";
pub const VIRTUAL_MACHINES_PATH: &str = "/protectedWorkloads/virtualMachines";
pub const ACTIVE_ALARMS_PATH: &str = "/alarms/active";

/// Authenticated reads against the portal API.
#[derive(Clone)]
pub struct PortalClient {
    http: Client,
    tokens: Arc<TokenManager>,
}

impl PortalClient {
    pub fn new(http: Client, tokens: Arc<TokenManager>) -> Self {
        Self { http, tokens }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let session = self.tokens.ensure_valid_session().await?;
        debug!(path, "Fetching");
        let response = self
            .http
            .get(format!("{}{path}", session.base_url))
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(ApiError::Network)?;
        let items = read_envelope::<T>(response, path).await?;
        debug!(path, count = items.len(), "Fetched");
        Ok(items)
    }

    async fn get_jobs(&self, kind: JobKind) -> Result<Vec<Job>, ApiError> {
        let mut jobs: Vec<Job> = self.get_data(kind.path()).await?;
        for job in &mut jobs {
            job.kind = kind;
        }
        Ok(jobs)
    }

    /// Backup server, agent and Microsoft 365 jobs, requested together. Any
    /// failing list fails the whole fetch.
    pub async fn fetch_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let (servers, agents, vb365) = tokio::try_join!(
            self.get_jobs(JobKind::BackupServer),
            self.get_jobs(JobKind::BackupAgent),
            self.get_jobs(JobKind::Vb365),
        )?;
        info!(
            servers = servers.len(),
            agents = agents.len(),
            vb365 = vb365.len(),
            "Fetched job lists"
        );
        Ok(servers.into_iter().chain(agents).chain(vb365).collect())
    }

    pub async fn fetch_company_usage(&self) -> Result<Vec<CompanyUsage>, ApiError> {
        self.get_data(COMPANY_USAGE_PATH).await
    }

    pub async fn fetch_backup_resources_usage(
        &self,
    ) -> Result<Vec<BackupResourceUsage>, ApiError> {
        self.get_data(BACKUP_RESOURCES_USAGE_PATH).await
    }

    pub async fn fetch_virtual_machines(&self) -> Result<Vec<VirtualMachine>, ApiError> {
        self.get_data(VIRTUAL_MACHINES_PATH).await
    }

    pub async fn fetch_active_alarms(&self) -> Result<Vec<Alarm>, ApiError> {
        self.get_data(ACTIVE_ALARMS_PATH).await
    }
}

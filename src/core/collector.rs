//! Optional client for the external collector service. A single snapshot
//! fetch per tenant, used only to prime an empty tenant cache; any
//! failure is reported upward and the caller falls back to seed data.

use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::time::Duration;

use super::store::types::{
    AgentRecord, ProcessRecord, ScheduleEntryRecord, TeamRecord, WorkspaceRecord,
};

#[derive(Debug, Default, Deserialize)]
pub struct CollectorSnapshot {
    #[serde(default)]
    pub agents: Vec<AgentRecord>,
    #[serde(default)]
    pub teams: Vec<TeamRecord>,
    #[serde(default)]
    pub workspaces: Vec<WorkspaceRecord>,
    #[serde(default)]
    pub processes: Vec<ProcessRecord>,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntryRecord>,
}

impl CollectorSnapshot {
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
            && self.teams.is_empty()
            && self.workspaces.is_empty()
            && self.processes.is_empty()
            && self.schedule.is_empty()
    }
}

pub struct CollectorClient {
    base_url: String,
    client: reqwest::Client,
}

impl CollectorClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_snapshot(&self, tenant: &str) -> Result<CollectorSnapshot> {
        let url = format!("{}/api/snapshot", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("tenant", tenant)])
            .send()
            .await
            .map_err(|e| anyhow!("collector request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("collector returned HTTP {}", status));
        }

        let snapshot: CollectorSnapshot = response
            .json()
            .await
            .map_err(|e| anyhow!("collector snapshot did not parse: {}", e))?;
        Ok(snapshot)
    }

    /// Cheap reachability probe for /api/health and `doctor`.
    pub async fn ping(&self) -> bool {
        let url = format!("{}/api/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

//! Read-side data providers. Every listing walks the same chain: the
//! relational store when it is configured and answers, then the tenant
//! document cache, then the static seed arrays. Priming an empty tenant
//! cache tries one collector snapshot before falling back to the seed
//! arrays, and only while the tenant's collection is empty.

use anyhow::Result;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::collector::CollectorClient;
use super::docstore::{DocStore, collections};
use super::seed;
use super::store::Store;
use super::store::types::{
    AgentRecord, CortexEntryRecord, ProcessRecord, ScheduleEntryRecord, TeamRecord,
    WorkspaceRecord,
};

fn fall_back<T>(entity: &str, result: Result<Vec<T>>, seed: Vec<T>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!("{} query failed, serving seed data: {}", entity, e);
            seed
        }
    }
}

/// Parse a tenant's cached collection. `None` means the cache has no
/// usable answer (unconfigured, unreadable, empty, or malformed) and
/// the caller should serve seed data instead.
async fn cached_rows<T: DeserializeOwned>(
    docs: Option<&DocStore>,
    tenant: &str,
    collection: &str,
) -> Option<Vec<T>> {
    let raw = match docs?.list(tenant, collection).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("{} cache read failed for '{}': {}", collection, tenant, e);
            return None;
        }
    };
    if raw.is_empty() {
        return None;
    }
    let mut rows = Vec::with_capacity(raw.len());
    for value in raw {
        match serde_json::from_value(value) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!("{} cache document unreadable for '{}': {}", collection, tenant, e);
                return None;
            }
        }
    }
    Some(rows)
}

pub async fn list_agents(
    store: Option<&Store>,
    docs: Option<&DocStore>,
    tenant: &str,
) -> Vec<AgentRecord> {
    if let Some(store) = store {
        return fall_back("agents", store.list_agents().await, seed::agents());
    }
    if let Some(mut rows) = cached_rows::<AgentRecord>(docs, tenant, collections::AGENTS).await {
        rows.sort_by_key(|a| a.id);
        return rows;
    }
    seed::agents()
}

pub async fn list_teams(
    store: Option<&Store>,
    docs: Option<&DocStore>,
    tenant: &str,
) -> Vec<TeamRecord> {
    if let Some(store) = store {
        return fall_back("teams", store.list_teams().await, seed::teams());
    }
    if let Some(mut rows) = cached_rows::<TeamRecord>(docs, tenant, collections::TEAMS).await {
        rows.sort_by_key(|t| t.id);
        return rows;
    }
    seed::teams()
}

pub async fn list_workspaces(
    store: Option<&Store>,
    docs: Option<&DocStore>,
    tenant: &str,
) -> Vec<WorkspaceRecord> {
    if let Some(store) = store {
        return fall_back(
            "workspaces",
            store.list_workspaces().await,
            seed::workspaces(),
        );
    }
    if let Some(mut rows) =
        cached_rows::<WorkspaceRecord>(docs, tenant, collections::WORKSPACES).await
    {
        rows.sort_by_key(|w| w.id);
        return rows;
    }
    seed::workspaces()
}

pub async fn list_processes(
    store: Option<&Store>,
    docs: Option<&DocStore>,
    tenant: &str,
) -> Vec<ProcessRecord> {
    if let Some(store) = store {
        return fall_back("processes", store.list_processes().await, seed::processes());
    }
    if let Some(mut rows) = cached_rows::<ProcessRecord>(docs, tenant, collections::PROCESSES).await
    {
        rows.sort_by_key(|p| p.id);
        return rows;
    }
    seed::processes()
}

pub async fn list_schedule_entries(
    store: Option<&Store>,
    docs: Option<&DocStore>,
    tenant: &str,
) -> Vec<ScheduleEntryRecord> {
    if let Some(store) = store {
        return fall_back(
            "schedule",
            store.list_schedule_entries().await,
            seed::schedule_entries(),
        );
    }
    if let Some(mut rows) =
        cached_rows::<ScheduleEntryRecord>(docs, tenant, collections::SCHEDULE).await
    {
        rows.sort_by_key(|e| e.id);
        return rows;
    }
    seed::schedule_entries()
}

pub async fn list_cortex_entries(store: Option<&Store>) -> Vec<CortexEntryRecord> {
    match store {
        Some(store) => fall_back(
            "cortex",
            store.list_cortex_entries().await,
            seed::cortex_entries(),
        ),
        None => seed::cortex_entries(),
    }
}

/// In-memory equivalent of the running-window join, used for cached and
/// seed data alike.
fn running_filter(
    entries: &[ScheduleEntryRecord],
    processes: Vec<ProcessRecord>,
    hour: i64,
) -> Vec<ProcessRecord> {
    let windows: Vec<i64> = entries
        .iter()
        .filter(|e| e.start_hour <= hour && hour < e.end_hour)
        .filter_map(|e| e.process_id)
        .collect();
    processes
        .into_iter()
        .filter(|p| windows.contains(&p.id))
        .collect()
}

pub async fn running_processes_at(
    store: Option<&Store>,
    docs: Option<&DocStore>,
    tenant: &str,
    hour: i64,
) -> Vec<ProcessRecord> {
    if let Some(store) = store {
        let entries = seed::schedule_entries();
        let fallback = running_filter(&entries, seed::processes(), hour);
        return fall_back(
            "processes.running",
            store.running_processes_at(hour).await,
            fallback,
        );
    }
    let entries = list_schedule_entries(None, docs, tenant).await;
    let processes = list_processes(None, docs, tenant).await;
    running_filter(&entries, processes, hour)
}

/// Where a tenant's cache contents came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    AlreadyPopulated,
    Collector,
    Seed,
}

/// Prime a tenant's cache if it is empty: one collector snapshot
/// attempt, then the seed arrays. Insert-if-absent throughout, so a
/// concurrent or repeated call cannot duplicate or overwrite documents.
pub async fn ensure_tenant_cache(
    docs: &DocStore,
    collector: Option<&CollectorClient>,
    tenant: &str,
) -> Result<CacheSource> {
    if !docs.is_empty(tenant, collections::AGENTS).await? {
        return Ok(CacheSource::AlreadyPopulated);
    }

    if let Some(collector) = collector {
        match collector.fetch_snapshot(tenant).await {
            Ok(snapshot) if !snapshot.is_empty() => {
                for agent in &snapshot.agents {
                    docs.insert_if_absent(
                        tenant,
                        collections::AGENTS,
                        &agent.id.to_string(),
                        &serde_json::to_value(agent)?,
                    )
                    .await?;
                }
                for team in &snapshot.teams {
                    docs.insert_if_absent(
                        tenant,
                        collections::TEAMS,
                        &team.id.to_string(),
                        &serde_json::to_value(team)?,
                    )
                    .await?;
                }
                for workspace in &snapshot.workspaces {
                    docs.insert_if_absent(
                        tenant,
                        collections::WORKSPACES,
                        &workspace.id.to_string(),
                        &serde_json::to_value(workspace)?,
                    )
                    .await?;
                }
                for process in &snapshot.processes {
                    docs.insert_if_absent(
                        tenant,
                        collections::PROCESSES,
                        &process.id.to_string(),
                        &serde_json::to_value(process)?,
                    )
                    .await?;
                }
                for entry in &snapshot.schedule {
                    docs.insert_if_absent(
                        tenant,
                        collections::SCHEDULE,
                        &entry.id.to_string(),
                        &serde_json::to_value(entry)?,
                    )
                    .await?;
                }
                debug!("tenant '{}' cache primed from collector", tenant);
                return Ok(CacheSource::Collector);
            }
            Ok(_) => debug!("collector returned an empty snapshot for '{}'", tenant),
            Err(e) => warn!("collector sync failed for '{}': {}", tenant, e),
        }
    }

    for agent in seed::agents() {
        docs.insert_if_absent(
            tenant,
            collections::AGENTS,
            &agent.id.to_string(),
            &serde_json::to_value(&agent)?,
        )
        .await?;
    }
    for team in seed::teams() {
        docs.insert_if_absent(
            tenant,
            collections::TEAMS,
            &team.id.to_string(),
            &serde_json::to_value(&team)?,
        )
        .await?;
    }
    for workspace in seed::workspaces() {
        docs.insert_if_absent(
            tenant,
            collections::WORKSPACES,
            &workspace.id.to_string(),
            &serde_json::to_value(&workspace)?,
        )
        .await?;
    }
    for process in seed::processes() {
        docs.insert_if_absent(
            tenant,
            collections::PROCESSES,
            &process.id.to_string(),
            &serde_json::to_value(&process)?,
        )
        .await?;
    }
    for entry in seed::schedule_entries() {
        docs.insert_if_absent(
            tenant,
            collections::SCHEDULE,
            &entry.id.to_string(),
            &serde_json::to_value(&entry)?,
        )
        .await?;
    }
    debug!("tenant '{}' cache primed from seed data", tenant);
    Ok(CacheSource::Seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_store_serves_seed_agents() {
        let agents = list_agents(None, None, "default").await;
        assert_eq!(agents, seed::agents());
    }

    #[tokio::test]
    async fn configured_store_wins_over_seed() {
        let store = Store::open_in_memory().unwrap();
        store
            .create_agent(
                "solo",
                "",
                crate::core::store::types::AgentStatus::Active,
                None,
            )
            .await
            .unwrap();
        let agents = list_agents(Some(&store), None, "default").await;
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "solo");
    }

    #[tokio::test]
    async fn empty_store_returns_empty_not_seed() {
        // An empty table is a real answer, not a failure.
        let store = Store::open_in_memory().unwrap();
        assert!(list_agents(Some(&store), None, "default").await.is_empty());
    }

    #[tokio::test]
    async fn seed_running_matches_window_filter() {
        // Seed entry "benchmark block" covers [9, 13).
        let at_noon = running_processes_at(None, None, "default", 12).await;
        assert!(at_noon.iter().any(|p| p.name == "benchmark-replay"));
        let at_night = running_processes_at(None, None, "default", 2).await;
        assert!(!at_night.iter().any(|p| p.name == "benchmark-replay"));
    }

    #[tokio::test]
    async fn storeless_reads_serve_the_tenant_cache() {
        let docs = DocStore::open_in_memory().unwrap();
        let ghost = serde_json::json!({
            "id": 7,
            "name": "ghost",
            "role": "scout",
            "status": "idle",
            "team_id": null,
            "created_at": "2026-01-01 00:00:00",
            "updated_at": "2026-01-01 00:00:00",
        });
        docs.insert_if_absent("acme", collections::AGENTS, "7", &ghost)
            .await
            .unwrap();

        let agents = list_agents(None, Some(&docs), "acme").await;
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "ghost");

        // A tenant with nothing cached still gets seed data.
        let fresh = list_agents(None, Some(&docs), "globex").await;
        assert_eq!(fresh, seed::agents());
    }

    #[tokio::test]
    async fn cached_running_uses_the_cached_schedule() {
        let docs = DocStore::open_in_memory().unwrap();
        ensure_tenant_cache(&docs, None, "acme").await.unwrap();
        // Cache mirrors the seed arrays, so the benchmark window holds.
        let at_noon = running_processes_at(None, Some(&docs), "acme", 12).await;
        assert!(at_noon.iter().any(|p| p.name == "benchmark-replay"));
        let at_night = running_processes_at(None, Some(&docs), "acme", 2).await;
        assert!(!at_night.iter().any(|p| p.name == "benchmark-replay"));
    }

    #[tokio::test]
    async fn malformed_cache_documents_fall_back_to_seed() {
        let docs = DocStore::open_in_memory().unwrap();
        docs.insert_if_absent("acme", collections::AGENTS, "1", &serde_json::json!({"id": "x"}))
            .await
            .unwrap();
        let agents = list_agents(None, Some(&docs), "acme").await;
        assert_eq!(agents, seed::agents());
    }

    #[tokio::test]
    async fn ensure_tenant_cache_seeds_once() {
        let docs = DocStore::open_in_memory().unwrap();
        let first = ensure_tenant_cache(&docs, None, "acme").await.unwrap();
        assert_eq!(first, CacheSource::Seed);
        let second = ensure_tenant_cache(&docs, None, "acme").await.unwrap();
        assert_eq!(second, CacheSource::AlreadyPopulated);

        let agents = docs.list("acme", collections::AGENTS).await.unwrap();
        assert_eq!(agents.len(), seed::agents().len());
    }

    #[tokio::test]
    async fn tenant_caches_seed_independently() {
        let docs = DocStore::open_in_memory().unwrap();
        ensure_tenant_cache(&docs, None, "acme").await.unwrap();
        let other = ensure_tenant_cache(&docs, None, "globex").await.unwrap();
        assert_eq!(other, CacheSource::Seed);
    }
}

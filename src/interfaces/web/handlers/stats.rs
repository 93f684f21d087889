use axum::{Extension, Json, extract::State};
use chrono::Timelike;
use std::collections::BTreeMap;

use super::super::AppState;
use crate::core::provider;
use crate::core::session::SessionClaims;

/// Aggregate dashboard numbers. Also the point where a tenant's cache
/// gets primed on first sight, so the overview reflects whichever chain
/// link answered (collector, seed, or an already-populated cache).
pub async fn overview(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Json<serde_json::Value> {
    let mut cache_source = "disabled";
    if let Some(docs) = &state.docs {
        match provider::ensure_tenant_cache(docs, state.collector.as_deref(), &claims.tenant).await
        {
            Ok(provider::CacheSource::AlreadyPopulated) => cache_source = "cache",
            Ok(provider::CacheSource::Collector) => cache_source = "collector",
            Ok(provider::CacheSource::Seed) => cache_source = "seed",
            Err(e) => {
                tracing::warn!("tenant cache priming failed for '{}': {}", claims.tenant, e);
                cache_source = "error";
            }
        }
    }

    let store = state.store.as_deref();
    let docs = state.docs.as_deref();
    let tenant = claims.tenant.as_str();
    let agents = provider::list_agents(store, docs, tenant).await;
    let teams = provider::list_teams(store, docs, tenant).await;
    let workspaces = provider::list_workspaces(store, docs, tenant).await;
    let processes = provider::list_processes(store, docs, tenant).await;
    let cortex = provider::list_cortex_entries(store).await;

    let mut agents_by_status: BTreeMap<&'static str, i64> = BTreeMap::new();
    for agent in &agents {
        *agents_by_status.entry(agent.status.as_str()).or_insert(0) += 1;
    }

    let hour = chrono::Local::now().hour() as i64;
    let running = provider::running_processes_at(store, docs, tenant, hour).await;

    Json(serde_json::json!({
        "tenant": claims.tenant,
        "cache_source": cache_source,
        "counts": {
            "agents": agents.len(),
            "teams": teams.len(),
            "workspaces": workspaces.len(),
            "processes": processes.len(),
            "cortex_entries": cortex.len(),
            "running_processes": running.len(),
        },
        "agents_by_status": agents_by_status,
    }))
}

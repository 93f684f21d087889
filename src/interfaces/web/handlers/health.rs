use axum::{Json, extract::State};

use super::super::AppState;

/// Unauthenticated liveness probe. Reports each subsystem's state but
/// never fails the request itself.
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = match &state.store {
        Some(store) => match store.count_agents_by_status().await {
            Ok(_) => "ok",
            Err(_) => "error",
        },
        None => "disabled",
    };

    let docstore = match &state.docs {
        Some(docs) => match docs.is_empty("default", crate::core::docstore::collections::AGENTS).await {
            Ok(_) => "ok",
            Err(_) => "error",
        },
        None => "disabled",
    };

    let collector = match &state.collector {
        Some(client) => {
            if client.ping().await {
                "ok"
            } else {
                "unreachable"
            }
        }
        None => "disabled",
    };

    Json(serde_json::json!({
        "status": "ok",
        "database": database,
        "docstore": docstore,
        "collector": collector,
        "standalone_mode": state.standalone_mode,
        "runtime": {
            "uptime_secs": state.started_at.elapsed().as_secs(),
            "rate_limited_keys": state.limiter.tracked_keys().await,
            "log_subscribers": state.log_tx.receiver_count(),
        },
    }))
}

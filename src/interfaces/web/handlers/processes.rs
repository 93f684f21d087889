use axum::{
    Extension, Json,
    extract::{Query, State},
};
use chrono::Timelike;
use serde::Deserialize;

use super::super::AppState;
use super::{audit, require_admin};
use crate::core::error::ApiError;
use crate::core::provider;
use crate::core::session::SessionClaims;
use crate::core::store::types::ProcessStatus;

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Json<serde_json::Value> {
    let processes = provider::list_processes(
        state.store.as_deref(),
        state.docs.as_deref(),
        &claims.tenant,
    )
    .await;
    Json(serde_json::json!({ "processes": processes }))
}

#[derive(Deserialize)]
pub struct RunningQuery {
    /// Frozen evaluation hour; defaults to the current local hour.
    hour: Option<i64>,
}

pub async fn running(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Query(query): Query<RunningQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let hour = match query.hour {
        Some(hour) if !(0..24).contains(&hour) => {
            return Err(ApiError::BadRequest(format!(
                "hour must be in 0..=23, got {}",
                hour
            )));
        }
        Some(hour) => hour,
        None => chrono::Local::now().hour() as i64,
    };
    let processes = provider::running_processes_at(
        state.store.as_deref(),
        state.docs.as_deref(),
        &claims.tenant,
        hour,
    )
    .await;
    Ok(Json(serde_json::json!({ "hour": hour, "processes": processes })))
}

#[derive(Deserialize)]
pub struct CreateProcessRequest {
    name: String,
    #[serde(default)]
    description: String,
    agent_id: Option<i64>,
    workspace_id: Option<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<CreateProcessRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    let store = state.store_required()?;
    let process = store
        .create_process(
            name,
            payload.description.trim(),
            payload.agent_id,
            payload.workspace_id,
        )
        .await
        .map_err(ApiError::from_store)?;
    audit(&state, &claims, "processes.create", &process.name).await;
    Ok(Json(serde_json::json!({ "success": true, "process": process })))
}

#[derive(Deserialize)]
pub struct UpdateProcessStatusRequest {
    id: i64,
    status: String,
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<UpdateProcessStatusRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    let status = ProcessStatus::parse(&payload.status).ok_or_else(|| {
        ApiError::BadRequest(format!("unknown process status '{}'", payload.status))
    })?;
    let store = state.store_required()?;
    if !store.update_process_status(payload.id, status).await? {
        return Err(ApiError::NotFound(format!(
            "process {} not found",
            payload.id
        )));
    }
    audit(
        &state,
        &claims,
        "processes.updateStatus",
        &format!("{} -> {}", payload.id, status.as_str()),
    )
    .await;
    Ok(Json(serde_json::json!({ "success": true })))
}

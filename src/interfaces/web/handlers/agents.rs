use axum::{
    Extension, Json,
    extract::State,
};
use serde::Deserialize;

use super::super::AppState;
use super::{audit, require_admin};
use crate::core::error::ApiError;
use crate::core::provider;
use crate::core::session::SessionClaims;
use crate::core::store::types::AgentStatus;

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Json<serde_json::Value> {
    let agents = provider::list_agents(
        state.store.as_deref(),
        state.docs.as_deref(),
        &claims.tenant,
    )
    .await;
    Json(serde_json::json!({ "agents": agents }))
}

pub async fn teams(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Json<serde_json::Value> {
    let teams = provider::list_teams(
        state.store.as_deref(),
        state.docs.as_deref(),
        &claims.tenant,
    )
    .await;
    Json(serde_json::json!({ "teams": teams }))
}

#[derive(Deserialize)]
pub struct CreateAgentRequest {
    name: String,
    #[serde(default)]
    role: String,
    status: Option<String>,
    team_id: Option<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<CreateAgentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    let status = match payload.status.as_deref() {
        Some(raw) => AgentStatus::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown agent status '{}'", raw)))?,
        None => AgentStatus::Idle,
    };

    let store = state.store_required()?;
    let agent = store
        .create_agent(name, payload.role.trim(), status, payload.team_id)
        .await
        .map_err(ApiError::from_store)?;
    audit(&state, &claims, "agents.create", &agent.name).await;
    Ok(Json(serde_json::json!({ "success": true, "agent": agent })))
}

#[derive(Deserialize)]
pub struct UpdateAgentStatusRequest {
    id: i64,
    status: String,
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<UpdateAgentStatusRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    let status = AgentStatus::parse(&payload.status).ok_or_else(|| {
        ApiError::BadRequest(format!("unknown agent status '{}'", payload.status))
    })?;

    let store = state.store_required()?;
    if !store.update_agent_status(payload.id, status).await? {
        return Err(ApiError::NotFound(format!("agent {} not found", payload.id)));
    }
    audit(
        &state,
        &claims,
        "agents.updateStatus",
        &format!("{} -> {}", payload.id, status.as_str()),
    )
    .await;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct DeleteAgentRequest {
    id: i64,
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<DeleteAgentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    let store = state.store_required()?;
    if !store.delete_agent(payload.id).await? {
        return Err(ApiError::NotFound(format!("agent {} not found", payload.id)));
    }
    audit(&state, &claims, "agents.delete", &payload.id.to_string()).await;
    Ok(Json(serde_json::json!({ "success": true })))
}

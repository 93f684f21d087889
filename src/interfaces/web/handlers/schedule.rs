use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use super::super::AppState;
use super::{audit, require_admin};
use crate::core::error::ApiError;
use crate::core::provider;
use crate::core::session::SessionClaims;

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Json<serde_json::Value> {
    let entries = provider::list_schedule_entries(
        state.store.as_deref(),
        state.docs.as_deref(),
        &claims.tenant,
    )
    .await;
    Json(serde_json::json!({ "entries": entries }))
}

#[derive(Deserialize)]
pub struct CreateScheduleRequest {
    title: String,
    day_of_week: i64,
    start_hour: i64,
    end_hour: i64,
    agent_id: Option<i64>,
    process_id: Option<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<CreateScheduleRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    let title = payload.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }
    if !(0..=6).contains(&payload.day_of_week) {
        return Err(ApiError::BadRequest(
            "day_of_week must be in 0..=6".to_string(),
        ));
    }
    // Half-open window within one day; overnight wrap is not supported.
    if !(0..24).contains(&payload.start_hour)
        || !(1..=24).contains(&payload.end_hour)
        || payload.start_hour >= payload.end_hour
    {
        return Err(ApiError::BadRequest(
            "window must satisfy 0 <= start_hour < end_hour <= 24".to_string(),
        ));
    }

    let store = state.store_required()?;
    let id = store
        .create_schedule_entry(
            title,
            payload.day_of_week,
            payload.start_hour,
            payload.end_hour,
            payload.agent_id,
            payload.process_id,
        )
        .await
        .map_err(ApiError::from_store)?;
    audit(&state, &claims, "schedule.create", title).await;
    Ok(Json(serde_json::json!({ "success": true, "id": id })))
}

#[derive(Deserialize)]
pub struct DeleteScheduleRequest {
    id: i64,
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<DeleteScheduleRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    let store = state.store_required()?;
    if !store.delete_schedule_entry(payload.id).await? {
        return Err(ApiError::NotFound(format!(
            "schedule entry {} not found",
            payload.id
        )));
    }
    audit(&state, &claims, "schedule.delete", &payload.id.to_string()).await;
    Ok(Json(serde_json::json!({ "success": true })))
}

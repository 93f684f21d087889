use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use super::super::AppState;
use crate::core::docstore::collections;
use crate::core::error::ApiError;
use crate::core::provider;
use crate::core::session::SessionClaims;

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Json<serde_json::Value> {
    let workspaces = provider::list_workspaces(
        state.store.as_deref(),
        state.docs.as_deref(),
        &claims.tenant,
    )
    .await;
    Json(serde_json::json!({ "workspaces": workspaces }))
}

/// Per-tenant dashboard layout document. The browser keeps its own copy
/// in localStorage; this is the cross-device variant.
pub async fn layout(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let layout = match &state.docs {
        Some(docs) => docs
            .get(&claims.tenant, collections::LAYOUTS, "default")
            .await
            .unwrap_or(None),
        None => None,
    };
    Ok(Json(serde_json::json!({ "layout": layout })))
}

#[derive(Deserialize)]
pub struct SaveLayoutRequest {
    layout: serde_json::Value,
}

pub async fn save_layout(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<SaveLayoutRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !payload.layout.is_object() && !payload.layout.is_array() {
        return Err(ApiError::BadRequest(
            "layout must be a JSON object or array".to_string(),
        ));
    }
    let Some(docs) = &state.docs else {
        // Layout still lives in the browser; the cache is optional.
        return Ok(Json(serde_json::json!({ "success": true, "persisted": false })));
    };
    docs.put(&claims.tenant, collections::LAYOUTS, "default", &payload.layout)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "persisted": true })))
}

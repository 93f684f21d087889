use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use super::super::AppState;
use super::audit;
use crate::core::error::ApiError;
use crate::core::provider;
use crate::core::session::SessionClaims;

pub async fn list(State(state): State<AppState>) -> Json<serde_json::Value> {
    let entries = provider::list_cortex_entries(state.store.as_deref()).await;
    Json(serde_json::json!({ "entries": entries }))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(q) = query.q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty()) else {
        return Err(ApiError::BadRequest("query parameter q is required".to_string()));
    };

    let entries = match &state.store {
        Some(store) => match store.search_cortex_entries(&q).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("cortex search failed, filtering seed data: {}", e);
                seed_search(&q)
            }
        },
        None => seed_search(&q),
    };
    Ok(Json(serde_json::json!({ "query": q, "entries": entries })))
}

fn seed_search(q: &str) -> Vec<crate::core::store::types::CortexEntryRecord> {
    let needle = q.to_lowercase();
    crate::core::seed::cortex_entries()
        .into_iter()
        .filter(|e| {
            e.title.to_lowercase().contains(&needle)
                || e.content.to_lowercase().contains(&needle)
                || e.category.to_lowercase().contains(&needle)
                || e.tags.to_lowercase().contains(&needle)
        })
        .collect()
}

#[derive(Deserialize)]
pub struct CreateCortexRequest {
    title: String,
    content: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tags: String,
}

/// Knowledge-base writes are open to any authenticated user.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<CreateCortexRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let title = payload.title.trim();
    let content = payload.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(ApiError::BadRequest(
            "title and content are required".to_string(),
        ));
    }
    let category = if payload.category.trim().is_empty() {
        "general"
    } else {
        payload.category.trim()
    };

    let store = state.store_required()?;
    let id = store
        .create_cortex_entry(title, content, category, payload.tags.trim())
        .await?;
    audit(&state, &claims, "cortex.create", title).await;
    Ok(Json(serde_json::json!({ "success": true, "id": id })))
}

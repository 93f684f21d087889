use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::time::Duration;

use super::super::AppState;
use super::{audit, require_admin};
use crate::core::error::ApiError;
use crate::core::session::SessionClaims;
use crate::core::store::types::ConnectionStatus;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    let store = state.store_required()?;
    let connections: Vec<serde_json::Value> = store
        .list_connections()
        .await?
        .iter()
        .map(|c| c.to_public_json())
        .collect();
    Ok(Json(serde_json::json!({ "connections": connections })))
}

#[derive(Deserialize)]
pub struct CreateConnectionRequest {
    name: String,
    engine: String,
    host: String,
    port: i64,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    database_name: String,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<CreateConnectionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    let name = payload.name.trim();
    let host = payload.host.trim();
    if name.is_empty() || payload.engine.trim().is_empty() || host.is_empty() {
        return Err(ApiError::BadRequest(
            "name, engine, and host are required".to_string(),
        ));
    }
    if !(1..=65535).contains(&payload.port) {
        return Err(ApiError::BadRequest("port must be in 1..=65535".to_string()));
    }

    let password_enc = if payload.password.is_empty() {
        String::new()
    } else {
        state.vault.encrypt(&payload.password)?
    };

    let store = state.store_required()?;
    let connection = store
        .create_connection(
            name,
            payload.engine.trim(),
            host,
            payload.port,
            payload.username.trim(),
            &password_enc,
            payload.database_name.trim(),
        )
        .await
        .map_err(ApiError::from_store)?;
    audit(&state, &claims, "connections.create", name).await;
    Ok(Json(
        serde_json::json!({ "success": true, "connection": connection.to_public_json() }),
    ))
}

#[derive(Deserialize)]
pub struct UpdateConnectionRequest {
    id: i64,
    name: String,
    engine: String,
    host: String,
    port: i64,
    #[serde(default)]
    username: String,
    /// Omitted or empty keeps the stored password.
    password: Option<String>,
    #[serde(default)]
    database_name: String,
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<UpdateConnectionRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    if payload.name.trim().is_empty()
        || payload.engine.trim().is_empty()
        || payload.host.trim().is_empty()
    {
        return Err(ApiError::BadRequest(
            "name, engine, and host are required".to_string(),
        ));
    }
    if !(1..=65535).contains(&payload.port) {
        return Err(ApiError::BadRequest("port must be in 1..=65535".to_string()));
    }

    let password_enc = match payload.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => Some(state.vault.encrypt(password)?),
        None => None,
    };

    let store = state.store_required()?;
    let updated = store
        .update_connection(
            payload.id,
            payload.name.trim(),
            payload.engine.trim(),
            payload.host.trim(),
            payload.port,
            payload.username.trim(),
            password_enc.as_deref(),
            payload.database_name.trim(),
        )
        .await
        .map_err(ApiError::from_store)?;
    if !updated {
        return Err(ApiError::NotFound(format!(
            "connection {} not found",
            payload.id
        )));
    }
    audit(&state, &claims, "connections.update", payload.name.trim()).await;
    Ok(Json(serde_json::json!({ "success": true })))
}

#[derive(Deserialize)]
pub struct ConnectionIdRequest {
    id: i64,
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<ConnectionIdRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    let store = state.store_required()?;
    if !store.delete_connection(payload.id).await? {
        return Err(ApiError::NotFound(format!(
            "connection {} not found",
            payload.id
        )));
    }
    audit(
        &state,
        &claims,
        "connections.delete",
        &payload.id.to_string(),
    )
    .await;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// TCP-level reachability test. Updates the record's status and appends
/// to the append-only log either way.
pub async fn test(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<ConnectionIdRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    let store = state.store_required()?;
    let connection = store
        .get_connection(payload.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("connection {} not found", payload.id)))?;

    let addr = format!("{}:{}", connection.host, connection.port);
    let (status, outcome, detail) = match tokio::time::timeout(
        CONNECT_TIMEOUT,
        tokio::net::TcpStream::connect(&addr),
    )
    .await
    {
        Ok(Ok(_)) => (ConnectionStatus::Ok, "ok", format!("connected to {}", addr)),
        Ok(Err(e)) => (
            ConnectionStatus::Failed,
            "failed",
            format!("connect to {} failed: {}", addr, e),
        ),
        Err(_) => (
            ConnectionStatus::Failed,
            "failed",
            format!("connect to {} timed out", addr),
        ),
    };

    store.set_connection_status(connection.id, status).await?;
    store
        .append_connection_log(connection.id, "test", outcome, &detail)
        .await?;
    audit(&state, &claims, "connections.test", &connection.name).await;

    let refreshed = store
        .get_connection(connection.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("connection vanished during test".to_string()))?;
    Ok(Json(serde_json::json!({
        "success": status == ConnectionStatus::Ok,
        "connection": refreshed.to_public_json(),
        "detail": detail,
    })))
}

#[derive(Deserialize)]
pub struct LogsQuery {
    connection_id: Option<i64>,
}

pub async fn logs(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&claims)?;
    let store = state.store_required()?;
    let logs = store.list_connection_logs(query.connection_id).await?;
    Ok(Json(serde_json::json!({ "logs": logs })))
}

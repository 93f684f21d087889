use anyhow::Context;
use axum::{
    Extension, Json,
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::net::SocketAddr;

use super::super::AppState;
use crate::core::error::ApiError;
use crate::core::session::{
    CSRF_COOKIE, SESSION_COOKIE, SESSION_TTL_SECS, SessionClaims, generate_csrf_token,
    verify_demo_credentials,
};

fn session_cookies(token: &str, csrf: &str) -> [String; 2] {
    [
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE, token, SESSION_TTL_SECS
        ),
        format!(
            "{}={}; Path=/; SameSite=Lax; Max-Age={}",
            CSRF_COOKIE, csrf, SESSION_TTL_SECS
        ),
    ]
}

fn cleared_cookies() -> [String; 2] {
    [
        format!(
            "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
            SESSION_COOKIE
        ),
        format!("{}=; Path=/; SameSite=Lax; Max-Age=0", CSRF_COOKIE),
    ]
}

fn with_cookies(mut response: Response, cookies: [String; 2]) -> Result<Response, ApiError> {
    for cookie in cookies {
        let value = cookie
            .parse()
            .context("cookie header value failed to build")?;
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}

/// Rate-limit bucket for a client: the peer address, unless a proxy
/// put the original client in `x-forwarded-for`.
fn client_key(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.ip().to_string())
}

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

/// Standalone demo login. Success sets the session + CSRF cookies;
/// any failure sets nothing.
pub async fn test_login(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if !state.limiter.check(&client_key(&headers, peer)).await {
        return Err(ApiError::TooManyRequests(
            "too many login attempts, retry later".to_string(),
        ));
    }
    if !state.standalone_mode {
        return Err(ApiError::Forbidden(
            "standalone login is disabled; use the OAuth flow".to_string(),
        ));
    }
    if !verify_demo_credentials(&payload.username, &payload.password) {
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }

    let token = state
        .keys
        .issue(&payload.username, "admin", "default")
        .map_err(|e| ApiError::Internal(e.into()))?;
    let csrf = generate_csrf_token();

    let body = Json(serde_json::json!({
        "success": true,
        "user": { "username": payload.username, "role": "admin", "tenant": "default" },
        "csrf_token": csrf,
    }));
    with_cookies(
        (StatusCode::OK, body).into_response(),
        session_cookies(&token, &csrf),
    )
}

/// Clears the session unconditionally, authenticated or not.
pub async fn logout() -> Result<Response, ApiError> {
    let body = Json(serde_json::json!({ "success": true }));
    with_cookies((StatusCode::OK, body).into_response(), cleared_cookies())
}

pub async fn session_info(
    Extension(claims): Extension<SessionClaims>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "subject": claims.sub,
        "role": claims.role,
        "tenant": claims.tenant,
        "expires_at": claims.exp,
    }))
}

#[derive(Deserialize)]
pub struct OAuthCallbackQuery {
    code: Option<String>,
    #[allow(dead_code)]
    state: Option<String>,
}

#[derive(Deserialize)]
struct TokenExchangeResponse {
    access_token: Option<String>,
    email: Option<String>,
    name: Option<String>,
    role: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Exchanges an authorization code at the configured OAuth server and
/// turns the result into a session cookie.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Response, ApiError> {
    let Some(oauth_url) = state.oauth_server_url.as_deref() else {
        return Err(ApiError::BadRequest(
            "OAuth server is not configured".to_string(),
        ));
    };
    let Some(code) = query.code.filter(|c| !c.trim().is_empty()) else {
        return Err(ApiError::BadRequest(
            "missing authorization code".to_string(),
        ));
    };

    let params = [
        ("code", code.as_str()),
        ("grant_type", "authorization_code"),
    ];
    let response = reqwest::Client::new()
        .post(format!("{}/token", oauth_url.trim_end_matches('/')))
        .form(&params)
        .send()
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("token exchange failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Unauthorized(format!(
            "token exchange rejected (HTTP {})",
            status
        )));
    }

    let exchange: TokenExchangeResponse = response
        .json()
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("token response did not parse: {}", e)))?;

    if let Some(error) = exchange.error {
        let detail = exchange.error_description.unwrap_or_default();
        return Err(ApiError::Unauthorized(format!(
            "OAuth error: {} {}",
            error, detail
        )));
    }
    if exchange.access_token.is_none() {
        return Err(ApiError::Unauthorized(
            "no access token in exchange response".to_string(),
        ));
    }

    let email = exchange
        .email
        .unwrap_or_else(|| "operator@cockpit.local".to_string());
    let name = exchange.name.unwrap_or_else(|| email.clone());
    let role = exchange.role.unwrap_or_else(|| "member".to_string());

    // Best-effort profile record; login proceeds without the store.
    if let Some(store) = &state.store {
        if let Err(e) = store.upsert_user(&email, &name, &role).await {
            tracing::warn!("user upsert failed for '{}': {}", email, e);
        }
    }

    let token = state
        .keys
        .issue(&email, &role, "default")
        .map_err(|e| ApiError::Internal(e.into()))?;
    let csrf = generate_csrf_token();
    with_cookies(
        Redirect::to("/").into_response(),
        session_cookies(&token, &csrf),
    )
}

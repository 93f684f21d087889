use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::core::error::ApiError;
use crate::core::session::{CSRF_COOKIE, SESSION_COOKIE, SessionError};

pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    for pair in header.split(';') {
        let pair = pair.trim();
        if let Some(value) = pair.strip_prefix(name) {
            if let Some(value) = value.strip_prefix('=') {
                return Some(value.to_string());
            }
        }
    }
    None
}

enum TokenSource {
    Cookie,
    Bearer,
}

/// Session middleware: accepts the session cookie or a bearer token,
/// validates signature and expiry, and attaches the claims to the
/// request. Cookie-authenticated mutations must also pass the
/// double-submit CSRF check; bearer clients are exempt.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let headers = req.headers();

    let (raw_token, source) = match headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
    {
        Some(bearer) => (Some(bearer.to_string()), TokenSource::Bearer),
        None => (cookie_value(headers, SESSION_COOKIE), TokenSource::Cookie),
    };

    let Some(raw_token) = raw_token else {
        return ApiError::Unauthorized("missing session cookie or bearer token".to_string())
            .into_response();
    };

    let claims = match state.keys.verify(&raw_token) {
        Ok(claims) => claims,
        Err(SessionError::Expired) => {
            return ApiError::Unauthorized("session expired".to_string()).into_response();
        }
        Err(SessionError::Invalid(_)) => {
            return ApiError::Unauthorized("invalid session token".to_string()).into_response();
        }
    };

    if matches!(source, TokenSource::Cookie) && req.method() != Method::GET {
        let cookie_token = cookie_value(req.headers(), CSRF_COOKIE);
        let header_token = req
            .headers()
            .get("x-csrf-token")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        match (cookie_token, header_token) {
            (Some(a), Some(b)) if a == b => {}
            _ => {
                return ApiError::Forbidden("csrf token missing or mismatched".to_string())
                    .into_response();
            }
        }
    }

    req.extensions_mut().insert(claims);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::SessionClaims;
    use crate::interfaces::web::test_support::{bearer_for, test_state};
    use axum::http::StatusCode;
    use axum::{Extension, Json, Router, middleware, routing::get};
    use tower::util::ServiceExt;

    fn protected_app(state: AppState) -> Router {
        Router::new()
            .route(
                "/api/trpc/ping",
                get(|Extension(claims): Extension<SessionClaims>| async move {
                    Json(serde_json::json!({ "sub": claims.sub }))
                })
                .post(|| async { Json(serde_json::json!({ "ok": true })) }),
            )
            .layer(middleware::from_fn_with_state(
                state.clone(),
                super::require_auth,
            ))
            .with_state(state)
    }

    async fn status_for(app: Router, method: Method, headers: Vec<(&str, String)>) -> StatusCode {
        let mut builder = Request::builder().method(method).uri("/api/trpc/ping");
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        let req = builder.body(Body::empty()).expect("request builds");
        app.oneshot(req).await.expect("oneshot").status()
    }

    #[test]
    fn cookie_value_parses_multi_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            "a=1; cockpit_session=tok; b=2".parse().unwrap(),
        );
        assert_eq!(
            cookie_value(&headers, SESSION_COOKIE),
            Some("tok".to_string())
        );
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[tokio::test]
    async fn missing_credentials_are_unauthorized() {
        let app = protected_app(test_state());
        assert_eq!(
            status_for(app, Method::GET, vec![]).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn valid_bearer_token_is_accepted() {
        let state = test_state();
        let bearer = bearer_for(&state, "member");
        let app = protected_app(state);
        assert_eq!(
            status_for(app, Method::GET, vec![("authorization", bearer)]).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn garbage_token_is_unauthorized() {
        let state = test_state();
        let app = protected_app(state);
        assert_eq!(
            status_for(
                app,
                Method::GET,
                vec![("authorization", "Bearer not-a-jwt".to_string())]
            )
            .await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn cookie_session_works_for_reads() {
        let state = test_state();
        let token = state.keys.issue("demo", "admin", "default").unwrap();
        let app = protected_app(state);
        let cookie = format!("{}={}", SESSION_COOKIE, token);
        assert_eq!(
            status_for(app, Method::GET, vec![("cookie", cookie)]).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn cookie_mutation_without_csrf_is_forbidden() {
        let state = test_state();
        let token = state.keys.issue("demo", "admin", "default").unwrap();
        let app = protected_app(state);
        let cookie = format!("{}={}", SESSION_COOKIE, token);
        assert_eq!(
            status_for(app, Method::POST, vec![("cookie", cookie)]).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn cookie_mutation_with_matching_csrf_passes() {
        let state = test_state();
        let token = state.keys.issue("demo", "admin", "default").unwrap();
        let app = protected_app(state);
        let cookie = format!("{}={}; {}=csrf123", SESSION_COOKIE, token, CSRF_COOKIE);
        assert_eq!(
            status_for(
                app,
                Method::POST,
                vec![("cookie", cookie), ("x-csrf-token", "csrf123".to_string())]
            )
            .await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn bearer_mutation_skips_csrf() {
        let state = test_state();
        let bearer = bearer_for(&state, "admin");
        let app = protected_app(state);
        assert_eq!(
            status_for(app, Method::POST, vec![("authorization", bearer)]).await,
            StatusCode::OK
        );
    }
}

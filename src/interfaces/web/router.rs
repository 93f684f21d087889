use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::auth::require_auth;
use super::handlers;
use super::{AppState, sse_logs_endpoint, static_handler};

async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; \
             img-src 'self' data:; connect-src 'self'",
        ),
    );
    response
}

pub(crate) fn build_router(state: AppState) -> Router {
    // Everything except login, logout, health, and the OAuth callback
    // sits behind the session middleware.
    let protected = Router::new()
        .route("/api/trpc/auth.session", get(handlers::auth::session_info))
        .route("/api/trpc/agents.list", get(handlers::agents::list))
        .route("/api/trpc/agents.teams", get(handlers::agents::teams))
        .route("/api/trpc/agents.create", post(handlers::agents::create))
        .route(
            "/api/trpc/agents.updateStatus",
            post(handlers::agents::update_status),
        )
        .route("/api/trpc/agents.delete", post(handlers::agents::delete))
        .route(
            "/api/trpc/connections.list",
            get(handlers::connections::list),
        )
        .route(
            "/api/trpc/connections.create",
            post(handlers::connections::create),
        )
        .route(
            "/api/trpc/connections.update",
            post(handlers::connections::update),
        )
        .route(
            "/api/trpc/connections.delete",
            post(handlers::connections::delete),
        )
        .route(
            "/api/trpc/connections.test",
            post(handlers::connections::test),
        )
        .route(
            "/api/trpc/connections.logs",
            get(handlers::connections::logs),
        )
        .route("/api/trpc/processes.list", get(handlers::processes::list))
        .route(
            "/api/trpc/processes.running",
            get(handlers::processes::running),
        )
        .route(
            "/api/trpc/processes.create",
            post(handlers::processes::create),
        )
        .route(
            "/api/trpc/processes.updateStatus",
            post(handlers::processes::update_status),
        )
        .route("/api/trpc/workspaces.list", get(handlers::workspaces::list))
        .route(
            "/api/trpc/workspaces.layout",
            get(handlers::workspaces::layout),
        )
        .route(
            "/api/trpc/workspaces.saveLayout",
            post(handlers::workspaces::save_layout),
        )
        .route("/api/trpc/cortex.list", get(handlers::cortex::list))
        .route("/api/trpc/cortex.search", get(handlers::cortex::search))
        .route("/api/trpc/cortex.create", post(handlers::cortex::create))
        .route("/api/trpc/stats.overview", get(handlers::stats::overview))
        .route("/api/trpc/schedule.list", get(handlers::schedule::list))
        .route(
            "/api/trpc/schedule.create",
            post(handlers::schedule::create),
        )
        .route(
            "/api/trpc/schedule.delete",
            post(handlers::schedule::delete),
        )
        .route("/api/logs", get(sse_logs_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/trpc/auth.testLogin", post(handlers::auth::test_login))
        .route("/api/trpc/auth.logout", post(handlers::auth::logout))
        .route("/api/health", get(handlers::health::health))
        .route("/api/oauth/callback", get(handlers::auth::oauth_callback))
        .merge(protected)
        .fallback(static_handler)
        .layer(middleware::from_fn(security_headers))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

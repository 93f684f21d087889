pub(crate) mod auth;
mod handlers;
mod router;

use anyhow::Result;
use axum::extract::State;
use axum::response::sse::{Event, Sse};
use include_dir::{Dir, include_dir};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tokio_stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;

use crate::config::Config;
use crate::core::collector::CollectorClient;
use crate::core::docstore::DocStore;
use crate::core::error::ApiError;
use crate::core::ratelimit::{LOGIN_MAX_ATTEMPTS, LOGIN_WINDOW, RateLimiter};
use crate::core::session::{SessionClaims, SessionKeys};
use crate::core::store::Store;
use crate::core::vault::PasswordVault;

static FRONTEND_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/frontend/dist");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Option<Arc<Store>>,
    pub(crate) docs: Option<Arc<DocStore>>,
    pub(crate) collector: Option<Arc<CollectorClient>>,
    pub(crate) keys: Arc<SessionKeys>,
    pub(crate) vault: Arc<PasswordVault>,
    pub(crate) limiter: Arc<RateLimiter>,
    pub(crate) log_tx: tokio::sync::broadcast::Sender<String>,
    pub(crate) standalone_mode: bool,
    pub(crate) oauth_server_url: Option<String>,
    pub(crate) started_at: Instant,
}

impl AppState {
    pub(crate) fn from_config(
        config: &Config,
        log_tx: tokio::sync::broadcast::Sender<String>,
    ) -> Result<Self> {
        let store = match &config.database_url {
            Some(path) => Some(Arc::new(Store::open(path)?)),
            None => None,
        };
        let docs = match &config.docstore_url {
            Some(path) => Some(Arc::new(DocStore::open(path)?)),
            None => None,
        };
        let collector = config
            .collector_base_url
            .as_deref()
            .map(|url| Arc::new(CollectorClient::new(url)));
        let keys = match &config.jwt_secret {
            Some(secret) => Arc::new(SessionKeys::new(secret.as_bytes())),
            None => Arc::new(SessionKeys::random()),
        };
        let vault = Arc::new(PasswordVault::new(config.jwt_secret.as_deref()));

        Ok(Self {
            store,
            docs,
            collector,
            keys,
            vault,
            limiter: Arc::new(RateLimiter::new(LOGIN_MAX_ATTEMPTS, LOGIN_WINDOW)),
            log_tx,
            standalone_mode: config.standalone_mode,
            oauth_server_url: config.oauth_server_url.clone(),
            started_at: Instant::now(),
        })
    }

    /// The relational store, or BAD_REQUEST for write paths that need one.
    pub(crate) fn store_required(&self) -> Result<&Arc<Store>, ApiError> {
        self.store
            .as_ref()
            .ok_or_else(|| ApiError::BadRequest("database is not configured".to_string()))
    }
}

pub async fn serve(config: Config, log_tx: tokio::sync::broadcast::Sender<String>) -> Result<()> {
    let state = AppState::from_config(&config, log_tx)?;
    state.limiter.spawn_sweeper();

    let app = router::build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("cockpit API running at http://{addr}");
    // ConnectInfo feeds the per-client login rate limiter.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;
    Ok(())
}

// --- SSE log stream (admin only, used by the router) ---

pub(crate) async fn sse_logs_endpoint(
    State(state): State<AppState>,
    claims: axum::Extension<SessionClaims>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    if !claims.is_admin() {
        return Err(ApiError::Forbidden("admin role required".to_string()));
    }
    let receiver = state.log_tx.subscribe();
    let stream = BroadcastStream::new(receiver).map(|msg| match msg {
        Ok(line) => Ok(Event::default().data(line)),
        Err(_) => Ok(Event::default().data("log stream lagged")),
    });
    Ok(Sse::new(stream))
}

// --- Embedded dashboard ---

pub(crate) async fn static_handler(uri: axum::http::Uri) -> impl axum::response::IntoResponse {
    use axum::response::IntoResponse;

    let mut path = uri.path().trim_start_matches('/');
    if path.is_empty() {
        path = "index.html";
    }

    match FRONTEND_DIR.get_file(path) {
        Some(file) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(axum::http::header::CONTENT_TYPE, mime.as_ref())],
                file.contents(),
            )
                .into_response()
        }
        // Client-side routes resolve to the SPA shell.
        None => match FRONTEND_DIR.get_file("index.html") {
            Some(file) => (
                [(axum::http::header::CONTENT_TYPE, "text/html")],
                file.contents(),
            )
                .into_response(),
            None => (axum::http::StatusCode::NOT_FOUND, "404 Not Found").into_response(),
        },
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// State with in-memory stores, standalone mode on, fixed secret.
    pub(crate) fn test_state() -> AppState {
        let (log_tx, _) = tokio::sync::broadcast::channel(16);
        AppState {
            store: Some(Arc::new(Store::open_in_memory().expect("store"))),
            docs: Some(Arc::new(DocStore::open_in_memory().expect("docstore"))),
            collector: None,
            keys: Arc::new(SessionKeys::new(b"test-secret")),
            vault: Arc::new(PasswordVault::new(Some("test-secret"))),
            limiter: Arc::new(RateLimiter::new(LOGIN_MAX_ATTEMPTS, LOGIN_WINDOW)),
            log_tx,
            standalone_mode: true,
            oauth_server_url: None,
            started_at: Instant::now(),
        }
    }

    /// State with no relational store, to exercise seed fallback.
    pub(crate) fn storeless_state() -> AppState {
        let mut state = test_state();
        state.store = None;
        state
    }

    pub(crate) fn bearer_for(state: &AppState, role: &str) -> String {
        let token = state
            .keys
            .issue("tester", role, "default")
            .expect("token issues");
        format!("Bearer {}", token)
    }
}

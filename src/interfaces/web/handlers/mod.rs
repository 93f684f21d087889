pub(crate) mod agents;
pub(crate) mod auth;
pub(crate) mod connections;
pub(crate) mod cortex;
pub(crate) mod health;
pub(crate) mod processes;
pub(crate) mod schedule;
pub(crate) mod stats;
pub(crate) mod workspaces;

use super::AppState;
use crate::core::docstore::collections;
use crate::core::error::ApiError;
use crate::core::session::SessionClaims;

pub(crate) fn require_admin(claims: &SessionClaims) -> Result<(), ApiError> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden("admin role required".to_string()))
    }
}

/// Best-effort audit trail write into the tenant cache. Mutations never
/// fail because the audit write did.
pub(crate) async fn audit(state: &AppState, claims: &SessionClaims, action: &str, detail: &str) {
    let Some(docs) = &state.docs else {
        return;
    };
    let body = serde_json::json!({
        "action": action,
        "actor": claims.sub,
        "detail": detail,
        "at": chrono::Utc::now().to_rfc3339(),
    });
    let id = uuid::Uuid::new_v4().to_string();
    if let Err(e) = docs.put(&claims.tenant, collections::AUDIT, &id, &body).await {
        tracing::warn!("audit write failed for '{}': {}", action, e);
    }
}

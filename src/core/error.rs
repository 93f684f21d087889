//! RPC error surface. Validation and authorization failures map to the
//! structured codes the dashboard understands; anything infrastructural
//! is logged and collapsed into INTERNAL_SERVER_ERROR.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    TooManyRequests(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::TooManyRequests(_) => "TOO_MANY_REQUESTS",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Map store failures for write paths: constraint violations (a
    /// dangling foreign key, a duplicate unique column) are the
    /// caller's fault and surface as BAD_REQUEST; everything else
    /// stays internal.
    pub fn from_store(err: anyhow::Error) -> Self {
        if let Some(rusqlite::Error::SqliteFailure(e, _)) = err.downcast_ref::<rusqlite::Error>() {
            if e.code == rusqlite::ErrorCode::ConstraintViolation {
                return ApiError::BadRequest(
                    "request references a missing row or conflicts with an existing one"
                        .to_string(),
                );
            }
        }
        ApiError::Internal(err)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(e) => {
                tracing::error!("internal error: {:#}", e);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (
            self.status(),
            Json(serde_json::json!({
                "error": { "code": self.code(), "message": message }
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_statuses() {
        let cases = [
            (ApiError::BadRequest("x".into()), 400, "BAD_REQUEST"),
            (ApiError::Unauthorized("x".into()), 401, "UNAUTHORIZED"),
            (ApiError::Forbidden("x".into()), 403, "FORBIDDEN"),
            (ApiError::NotFound("x".into()), 404, "NOT_FOUND"),
            (
                ApiError::TooManyRequests("x".into()),
                429,
                "TOO_MANY_REQUESTS",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status().as_u16(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[tokio::test]
    async fn constraint_violations_map_to_bad_request() {
        use crate::core::store::{Store, types::AgentStatus};

        let store = Store::open_in_memory().unwrap();
        let err = store
            .create_agent("ghost", "scout", AgentStatus::Idle, Some(999))
            .await
            .expect_err("dangling team must be rejected");
        let api = ApiError::from_store(err);
        assert_eq!(api.code(), "BAD_REQUEST");
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);

        let api = ApiError::from_store(anyhow::anyhow!("disk on fire"));
        assert_eq!(api.code(), "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn internal_error_hides_detail() {
        let err = ApiError::Internal(anyhow::anyhow!("db path /secret/location broke"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

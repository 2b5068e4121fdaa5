use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::warn;

use crate::{api_state::ApiState, envelope::response_timestamp};

/// Process is up; says nothing about the store.
pub async fn live() -> impl IntoResponse {
    Json(json!({ "status": "ok", "timestamp": response_timestamp() }))
}

/// 200 once the store answers a trivial query, 503 otherwise.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    let (code, db_check, reason) = match state.db.is_ready().await {
        Ok(()) => (StatusCode::OK, "ok", None),
        Err(err) => {
            warn!(error = %err, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "fail", Some(err.to_string()))
        }
    };

    let status = if code.is_success() { "ok" } else { "error" };
    (
        code,
        Json(json!({
            "status": status,
            "checks": { "db": db_check },
            "reason": reason,
            "timestamp": response_timestamp(),
        })),
    )
}

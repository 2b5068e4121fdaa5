use axum::{response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;

use crate::envelope::{response_timestamp, Envelope};

pub const ENDPOINTS: [&str; 6] = [
    "GET /api/hello",
    "GET /api/messages",
    "POST /api/messages",
    "POST /api/vote",
    "GET /api/live",
    "GET /api/ready",
];

#[derive(Serialize, Debug)]
pub struct ApiInfo {
    pub version: &'static str,
    pub endpoints: &'static [&'static str],
}

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Mini Feedback Board API is running!",
        "timestamp": response_timestamp(),
    }))
}

pub async fn hello() -> impl IntoResponse {
    Json(Envelope::success(
        "Hello from the Mini Feedback Board API!",
        ApiInfo {
            version: env!("CARGO_PKG_VERSION"),
            endpoints: &ENDPOINTS,
        },
    ))
}

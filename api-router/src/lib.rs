use std::any::Any;

use api_state::ApiState;
use axum::{
    extract::FromRef,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use error::ApiError;
use routes::{
    info::{hello, root},
    messages::{create_message, list_messages},
    probes::{live, ready},
    vote::vote,
};
use tower_http::catch_panic::CatchPanicLayer;

pub mod api_state;
pub mod envelope;
pub mod error;
mod routes;

/// The feedback board API under `/api`, plus the banner at `/`.
pub fn board_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    let api = Router::new()
        .route("/hello", get(hello))
        .route("/messages", get(list_messages).post(create_message))
        .route("/vote", post(vote))
        .route("/live", get(live))
        .route("/ready", get(ready));

    Router::new()
        .route("/", get(root))
        .nest("/api", api)
        .layer(CatchPanicLayer::custom(panic_response))
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    ApiError::InternalError("handler panicked".to_string()).into_response()
}

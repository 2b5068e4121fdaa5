use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use common::storage::types::message::{Message, NewMessage};
use serde::Serialize;
use tracing::debug;

use crate::{api_state::ApiState, envelope::Envelope, error::ApiError};

#[derive(Serialize, Debug)]
pub struct MessageList {
    pub messages: Vec<Message>,
    pub count: usize,
}

#[derive(Serialize, Debug)]
pub struct CreatedMessage {
    pub message: Message,
}

pub async fn list_messages(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let messages = Message::list_newest_first(&state.db)
        .await
        .map_err(|err| ApiError::from(err).with_context("Failed to fetch messages"))?;

    let count = messages.len();
    debug!(count, "Listing messages");

    Ok(Json(Envelope::success(
        "Messages retrieved successfully",
        MessageList { messages, count },
    )))
}

pub async fn create_message(
    State(state): State<ApiState>,
    payload: Result<Json<NewMessage>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;

    let message = Message::create(input, &state.db)
        .await
        .map_err(|err| ApiError::from(err).with_context("Failed to create message"))?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(
            "Message created successfully",
            CreatedMessage { message },
        )),
    ))
}

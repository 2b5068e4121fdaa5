use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use common::storage::types::message::{Message, VoteRequest};

use crate::{api_state::ApiState, envelope::Envelope, error::ApiError};

pub async fn vote(
    State(state): State<ApiState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;

    let outcome = Message::vote(&request, &state.db)
        .await
        .map_err(|err| ApiError::from(err).with_context("Failed to update vote"))?;

    Ok(Json(Envelope::success(
        format!("{} recorded successfully", outcome.vote_type),
        outcome,
    )))
}

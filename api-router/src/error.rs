use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::AppError;
use serde::Serialize;
use thiserror::Error;

use crate::envelope::{response_timestamp, ErrorEnvelope, Status};

const GENERIC_STORE_FAILURE: &str = "Database operation failed";

#[derive(Error, Debug, Serialize, Clone)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalError(String),

    #[error("Validation failed")]
    ValidationError(Vec<String>),

    #[error("Message not found")]
    NotFound(String),

    #[error("{context}")]
    StoreError { context: String, detail: String },
}

impl ApiError {
    /// Names the operation a store failure belongs to; other variants pass through.
    #[must_use]
    pub fn with_context(self, context: &str) -> Self {
        match self {
            Self::StoreError { detail, .. } => Self::StoreError {
                context: context.to_string(),
                detail,
            },
            other => other,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Database(err) => Self::StoreError {
                context: GENERIC_STORE_FAILURE.to_string(),
                detail: err.to_string(),
            },
            AppError::NotFound(msg) => Self::NotFound(msg),
            AppError::Validation(errors) => Self::ValidationError(errors),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                Self::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationError(vec![rejection.body_text()])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, errors, error) = match self {
            Self::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, None, None),
            Self::ValidationError(errors) => (StatusCode::BAD_REQUEST, Some(errors), None),
            Self::NotFound(detail) => (StatusCode::NOT_FOUND, None, Some(detail)),
            Self::StoreError { detail, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, None, Some(detail))
            }
        };

        let body = ErrorEnvelope {
            message,
            status: Status::Error,
            errors,
            error,
            timestamp: response_timestamp(),
        };

        (status, Json(body)).into_response()
    }
}

use thiserror::Error;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] surrealdb::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

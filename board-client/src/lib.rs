//! Typed client for the feedback board API and the view state driven by it.

pub mod api;
pub mod error;
pub mod view;

pub use api::FeedbackApi;
pub use error::ClientError;

/// Where the board API is served when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api/";

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Non-2xx answer; `message` is the server envelope's `message` field.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid API base URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::Decode(_) | Self::Url(_) => None,
        }
    }
}

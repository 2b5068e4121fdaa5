use chrono::{SecondsFormat, Utc};
use serde::Serialize;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Uniform `{message, status, data, timestamp}` body returned on success.
#[derive(Serialize, Debug)]
pub struct Envelope<T> {
    pub message: String,
    pub status: Status,
    pub data: T,
    pub timestamp: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            status: Status::Success,
            data,
            timestamp: response_timestamp(),
        }
    }
}

/// Error counterpart of [`Envelope`]: `errors` lists validation failures,
/// `error` carries a single diagnostic string.
#[derive(Serialize, Debug)]
pub struct ErrorEnvelope {
    pub message: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

/// RFC 3339 UTC with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`.
pub fn response_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

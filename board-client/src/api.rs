use common::storage::types::message::{Message, NewMessage, VoteOutcome, VoteRequest, VoteType};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};
use url::Url;

use crate::{error::ClientError, DEFAULT_API_BASE_URL};

const FALLBACK_ERROR: &str = "An error occurred";

/// Success envelope as sent by the board API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub status: String,
    pub data: T,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageList {
    pub messages: Vec<Message>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedMessage {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FeedbackApi {
    http: Client,
    base_url: Url,
}

impl FeedbackApi {
    /// `base_url` points at the `/api` prefix; a trailing slash is added if missing.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn with_default_base_url() -> Result<Self, ClientError> {
        Self::new(DEFAULT_API_BASE_URL)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get_messages(&self) -> Result<ApiResponse<MessageList>, ClientError> {
        let url = self.base_url.join("messages")?;
        self.send(self.http.get(url)).await
    }

    pub async fn create_message(
        &self,
        input: &NewMessage,
    ) -> Result<ApiResponse<CreatedMessage>, ClientError> {
        let url = self.base_url.join("messages")?;
        self.send(self.http.post(url).json(input)).await
    }

    pub async fn vote(
        &self,
        message_id: &str,
        vote_type: VoteType,
    ) -> Result<ApiResponse<VoteOutcome>, ClientError> {
        let url = self.base_url.join("vote")?;
        let body = VoteRequest::new(message_id, vote_type);
        self.send(self.http.post(url).json(&body)).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ClientError> {
        let response = request.send().await.inspect_err(|err| {
            warn!(error = %err, "API request failed");
        })?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = bytes.len(), "API response received");

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| FALLBACK_ERROR.to_string());
            warn!(status = status.as_u16(), %message, "API request rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

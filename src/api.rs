//! HTTP client for the council backend.
//!
//! Covers the REST surface (health, conversation list/detail/create) and the
//! streaming message endpoint, which returns decoded [`CouncilEvent`]s as an
//! async stream. All requests carry the configured bearer token.

use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::stream::{self, Stream};
use futures_util::StreamExt;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::config::Config;
use crate::sse::{CouncilEvent, FrameDecoder};
use crate::transcript::{ConversationDetail, ConversationMeta};

/// Error type for backend client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed at the transport level
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Server returned a non-success status
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
}

/// Body of the streaming message request.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// A pinned stream of decoded council events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<CouncilEvent, ApiError>> + Send>>;

/// Client for the council backend API.
pub struct CouncilClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl CouncilClient {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Check if the backend is reachable and healthy.
    pub async fn health_check(&self) -> Result<bool, ApiError> {
        let response = self.request(Method::GET, "/api/health").send().await?;
        Ok(response.status().is_success())
    }

    /// Fetch conversation metadata for the sidebar, newest first.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationMeta>, ApiError> {
        let response = self
            .request(Method::GET, "/api/conversations")
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Create a new empty conversation; the server assigns the id.
    pub async fn create_conversation(&self) -> Result<ConversationDetail, ApiError> {
        let response = self
            .request(Method::POST, "/api/conversations")
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Fetch a full conversation transcript.
    pub async fn get_conversation(&self, id: &str) -> Result<ConversationDetail, ApiError> {
        let response = self
            .request(Method::GET, &format!("/api/conversations/{}", id))
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Send a message and stream back the three-phase council events.
    ///
    /// A non-success status before streaming starts is a terminal
    /// [`ApiError::Server`]. Once the stream is open, malformed frames are
    /// dropped inside the decoder and transport errors surface as stream
    /// items; the connection is never retried.
    pub async fn stream_message(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> Result<EventStream, ApiError> {
        let path = format!("/api/conversations/{}/message/stream", conversation_id);
        let body = SendMessageRequest {
            content: content.to_string(),
        };

        let response = self
            .request(Method::POST, &path)
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let bytes_stream = response.bytes_stream();

        // Reassemble frames from arbitrarily chunked bytes. `pending` holds
        // frames already decoded from the current chunk so each poll yields
        // exactly one item, in delivery order.
        let events = stream::unfold(
            (bytes_stream, FrameDecoder::new(), VecDeque::new(), false),
            |(mut bytes_stream, mut decoder, mut pending, mut ended)| async move {
                loop {
                    if let Some(event) = pending.pop_front() {
                        return Some((Ok(event), (bytes_stream, decoder, pending, ended)));
                    }
                    if ended {
                        return None;
                    }
                    match bytes_stream.next().await {
                        Some(Ok(chunk)) => {
                            pending.extend(decoder.feed(&chunk));
                        }
                        Some(Err(e)) => {
                            error!(err = %e, "transport failure mid-stream");
                            decoder.reset();
                            ended = true;
                            return Some((
                                Err(ApiError::Http(e)),
                                (bytes_stream, decoder, pending, ended),
                            ));
                        }
                        None => {
                            // End of stream: the residual is one final
                            // candidate line, decoded at most once.
                            pending.extend(decoder.finish());
                            ended = true;
                        }
                    }
                }
            },
        );

        Ok(Box::pin(events))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(ApiError::Server { status, message })
}

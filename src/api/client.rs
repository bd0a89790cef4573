use crate::api::models::{ChatRequest, ChatResponse, HealthStatus};
use reqwest::{Client as HttpClient, StatusCode};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Shown in place of a reply whenever the backend cannot answer.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("query is empty")]
    EmptyQuery,
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(StatusCode),
    #[error("malformed response body: {0}")]
    Body(#[source] serde_json::Error),
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("no usable chat endpoint configured")]
    NotConfigured,
}

/// Sends one query and yields the reply text.
pub trait ChatTransport {
    fn send(&self, query: &str) -> impl Future<Output = Result<String, TransportError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    http: HttpClient,
    endpoint: Url,
}

impl ChatClient {
    pub fn new(endpoint: Url, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sibling of the chat path, ignoring a trailing slash on the endpoint.
    pub fn health_url(&self) -> Result<Url, TransportError> {
        let mut base = self.endpoint.clone();
        let trimmed = base.path().trim_end_matches('/').to_string();
        base.set_path(&trimmed);
        Ok(base.join("health")?)
    }

    /// `GET /health` next to the chat endpoint.
    pub async fn health(&self) -> Result<HealthStatus, TransportError> {
        let url = self.health_url()?;
        let resp = self.http.get(url).send().await?;
        // The backend answers 503 with a JSON body when its agent is down.
        let status = resp.status();
        let bytes = resp.bytes().await?;
        match serde_json::from_slice::<HealthStatus>(&bytes) {
            Ok(health) => Ok(health),
            Err(_) if !status.is_success() => Err(TransportError::Status(status)),
            Err(e) => Err(TransportError::Body(e)),
        }
    }
}

impl ChatTransport for ChatClient {
    async fn send(&self, query: &str) -> Result<String, TransportError> {
        if query.trim().is_empty() {
            return Err(TransportError::EmptyQuery);
        }
        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&ChatRequest { query })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status()));
        }
        let bytes = resp.bytes().await?;
        let body: ChatResponse = serde_json::from_slice(&bytes).map_err(TransportError::Body)?;
        Ok(body.response)
    }
}

/// Collapses a transport outcome into the text shown to the user.
pub fn reply_text(outcome: Result<String, TransportError>) -> String {
    match outcome {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Assistant request failed: {e}");
            FALLBACK_REPLY.to_string()
        }
    }
}

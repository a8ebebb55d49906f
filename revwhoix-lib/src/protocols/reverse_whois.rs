//! Reverse WHOIS API transport.
//!
//! This module sends search requests to the WhoisXML reverse WHOIS API over
//! HTTPS and turns the answer into a `SearchResponse`. It knows nothing about
//! pagination; that lives in the searcher.

use crate::error::RevWhoixError;
use crate::types::{SearchConfig, SearchRequest, SearchResponse};
use reqwest::StatusCode;
use std::time::Duration;

/// Something that can deliver one search request and return the API's answer.
///
/// The HTTP client is the production implementation; tests substitute
/// scripted transports.
#[allow(async_fn_in_trait)]
pub trait SearchTransport {
    async fn send(&self, request: &SearchRequest) -> Result<SearchResponse, RevWhoixError>;
}

/// HTTP client for the reverse WHOIS API.
#[derive(Clone)]
pub struct ReverseWhoisClient {
    /// HTTP client carrying the User-Agent and timeout
    http_client: reqwest::Client,
    /// POST target
    endpoint: String,
    /// Request timeout, kept for error reporting
    timeout: Duration,
}

impl ReverseWhoisClient {
    /// Create a client with default settings.
    pub fn new() -> Result<Self, RevWhoixError> {
        Self::with_config(&SearchConfig::default())
    }

    /// Create a client using the endpoint, timeout and User-Agent from `config`.
    pub fn with_config(config: &SearchConfig) -> Result<Self, RevWhoixError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                RevWhoixError::network_with_source(
                    "Failed to create reverse WHOIS HTTP client",
                    e.to_string(),
                )
            })?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            timeout: config.timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> RevWhoixError {
        if err.is_timeout() {
            RevWhoixError::timeout("reverse WHOIS request", self.timeout)
        } else {
            RevWhoixError::from(err)
        }
    }
}

impl SearchTransport for ReverseWhoisClient {
    async fn send(&self, request: &SearchRequest) -> Result<SearchResponse, RevWhoixError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            mode = %request.mode,
            cursor = ?request.search_after,
            "sending reverse WHOIS request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if status != StatusCode::OK {
            let message = api_error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });
            return Err(RevWhoixError::http_status(status.as_u16(), message));
        }

        parse_search_response(&body)
    }
}

/// Parse a 200 OK body into a search response.
///
/// The API occasionally answers 200 with an error document; its message is
/// surfaced instead of a bare serde error when present.
pub fn parse_search_response(body: &str) -> Result<SearchResponse, RevWhoixError> {
    serde_json::from_str::<SearchResponse>(body).map_err(|e| match api_error_message(body) {
        Some(message) => RevWhoixError::parse(format!("API returned an error: {}", message)),
        None => RevWhoixError::from(e),
    })
}

/// Extract the human-readable message from an API error document.
///
/// Error bodies look like `{"code": 403, "messages": "Access restricted..."}`;
/// `messages` is sometimes an array.
fn api_error_message(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let messages = json.get("messages").or_else(|| json.get("message"))?;

    match messages {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(|item| item.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
        _ => None,
    }
}

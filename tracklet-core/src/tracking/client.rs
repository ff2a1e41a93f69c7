//! Async HTTP client for the event ingestion API
//!
//! Every call to [`AsyncEventClient::track`] issues exactly one
//! `POST {base_url}/api/sdk/events`. Nothing is buffered or retried; failures
//! go straight back to the caller.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

use super::events::TrackEvent;

/// Path of the ingestion route, relative to the base URL
pub const EVENTS_PATH: &str = "/api/sdk/events";

/// Async HTTP client for the ingestion endpoint
///
/// Cheap to share: wrap it in an `Arc` and call `track` from as many tasks as
/// needed. The only state is the immutable configuration and the connection
/// pool inside `reqwest`.
#[derive(Debug)]
pub struct AsyncEventClient {
    http_client: reqwest::Client,
    base_url: String,
    endpoint: Url,
    default_subject_id: Option<String>,
}

impl AsyncEventClient {
    /// Create a new event client from configuration
    ///
    /// Returns [`Error::Config`] if the base URL or secret is missing or
    /// unusable. No network I/O happens here.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.normalized_base_url()?.to_string();
        let endpoint = config.endpoint()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, config.auth_header()?);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
            endpoint,
            default_subject_id: config.default_subject_id,
        })
    }

    /// Send one event to the ingestion endpoint
    ///
    /// Succeeds on any status below 400 without reading the response body.
    /// Fails with [`Error::Transport`] if no complete response arrived and
    /// with [`Error::Delivery`] (status and raw body) if the server rejected it.
    pub async fn track(&self, event: &TrackEvent) -> Result<()> {
        if event.event.is_empty() {
            return Err(Error::InvalidEvent(
                "event name must not be empty".to_string(),
            ));
        }

        let body = serde_json::to_vec(&event.to_body(self.default_subject_id.as_deref()))?;

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .body(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = response.status();

        if status.as_u16() < 400 {
            tracing::debug!(
                event = %event.event,
                status = status.as_u16(),
                "Event delivered"
            );
            Ok(())
        } else {
            // A body cut short means the response never fully arrived
            let body = response.text().await.map_err(Error::Transport)?;
            tracing::debug!(
                event = %event.event,
                status = status.as_u16(),
                "Event rejected by ingestion endpoint"
            );
            Err(Error::Delivery {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Normalized base URL (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL events are posted to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Subject used when an event names none
    pub fn default_subject_id(&self) -> Option<&str> {
        self.default_subject_id.as_deref()
    }
}

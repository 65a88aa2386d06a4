//! HTTP client for the remote document service.
//!
//! Values live under `{base}/values/{key}` wrapped as `{"value": ...}`;
//! events live under `{base}/events`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{RemoteStore, StoreError};
use crate::models::{Event, EventPatch, NewEvent};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Serialize, Deserialize)]
struct ValueEnvelope {
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: String,
}

/// API client for the document service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn value_url(&self, key: &str) -> String {
        format!("{}/values/{}", self.base_url, key)
    }

    fn events_url(&self) -> String {
        format!("{}/events", self.base_url)
    }

    fn event_url(&self, id: &str) -> String {
        format!("{}/events/{}", self.base_url, id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, StoreError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(StoreError::from_status(status, &body))
        }
    }

    /// Send a request, retrying with exponential backoff while rate limited.
    /// Returns `Ok(None)` for 404 so callers can map it to "missing".
    async fn send<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<Option<Response>, StoreError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut builder = self.request(method.clone(), url);
            if let Some(body) = body {
                builder = builder.json(body);
            }
            let response = builder.send().await?;

            match response.status() {
                StatusCode::NOT_FOUND => return Ok(None),
                StatusCode::TOO_MANY_REQUESTS => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(StoreError::RateLimited);
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
                _ => return Self::check_response(response).await.map(Some),
            }
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, StoreError> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| StoreError::InvalidResponse(format!("{}: {}", url, e)))
    }

    /// Send and require the target to exist.
    async fn send_existing<B: Serialize + Sync + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<Response, StoreError> {
        self.send(method, url, body)
            .await?
            .ok_or_else(|| StoreError::NotFound(url.to_string()))
    }
}

#[async_trait]
impl RemoteStore for ApiClient {
    async fn load_value(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let url = self.value_url(key);
        let Some(response) = self.send::<()>(Method::GET, &url, None).await? else {
            debug!(key, "Remote value missing");
            return Ok(None);
        };
        let envelope: ValueEnvelope = Self::parse(response, &url).await?;
        Ok(match envelope.value {
            Value::Null => None,
            value => Some(value),
        })
    }

    async fn save_value(&self, key: &str, value: Option<Value>) -> Result<(), StoreError> {
        let url = self.value_url(key);
        let envelope = ValueEnvelope {
            value: value.unwrap_or(Value::Null),
        };
        self.send(Method::PUT, &url, Some(&envelope)).await?;
        Ok(())
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let url = self.events_url();
        match self.send::<()>(Method::GET, &url, None).await? {
            Some(response) => Self::parse(response, &url).await,
            None => Ok(Vec::new()),
        }
    }

    async fn add_event(&self, event: &NewEvent) -> Result<String, StoreError> {
        let url = self.events_url();
        let response = self.send_existing(Method::POST, &url, Some(event)).await?;
        let created: CreatedResponse = Self::parse(response, &url).await?;
        Ok(created.id)
    }

    async fn update_event(&self, id: &str, patch: &EventPatch) -> Result<(), StoreError> {
        let url = self.event_url(id);
        self.send_existing(Method::PATCH, &url, Some(patch)).await?;
        Ok(())
    }

    async fn delete_event(&self, id: &str) -> Result<(), StoreError> {
        let url = self.event_url(id);
        // Deleting something already gone is not an error
        self.send::<()>(Method::DELETE, &url, None).await?;
        Ok(())
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>, StoreError> {
        let url = self.event_url(id);
        match self.send::<()>(Method::GET, &url, None).await? {
            Some(response) => {
                let mut event: Event = Self::parse(response, &url).await?;
                if event.id.is_empty() {
                    event.id = id.to_string();
                }
                Ok(Some(event))
            }
            None => Ok(None),
        }
    }
}

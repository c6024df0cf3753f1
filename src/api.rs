// API client module: a small blocking HTTP client that posts JSON to the
// n8n webhooks. One client talks to one webhook URL.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::{SearchConfig, UploadConfig};
use crate::model::{normalize_results, SearchHit, SearchRequest, UploadRequest, UploadResult};

/// Everything that can go wrong between sending a request and holding a
/// decoded response. Each variant renders as one readable line.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("webhook {url} returned {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
    #[error("failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Blocking client bound to a single webhook endpoint.
#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
    url: String,
}

impl WebhookClient {
    /// Builds a client for `url` whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, WebhookError> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| WebhookError::Request {
                url: url.clone(),
                source,
            })?;
        Ok(WebhookClient { client, url })
    }

    pub fn for_search(config: &SearchConfig) -> Result<Self, WebhookError> {
        Self::new(config.webhook_url.clone(), config.timeout)
    }

    pub fn for_upload(config: &UploadConfig) -> Result<Self, WebhookError> {
        Self::new(config.webhook_url.clone(), config.timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends the whole batch in one call and decodes the upload summary.
    pub fn upload(&self, request: &UploadRequest) -> Result<UploadResult, WebhookError> {
        tracing::debug!(
            url = %self.url,
            files = request.files.len(),
            namespace = %request.namespace,
            "posting upload batch"
        );
        self.post_json(request)
    }

    /// Runs one query and returns the hits in the order the webhook sent them.
    pub fn search(&self, query: &str, namespace: &str) -> Result<Vec<SearchHit>, WebhookError> {
        tracing::debug!(url = %self.url, %query, %namespace, "posting search query");
        let raw: Value = self.post_json(&SearchRequest { query, namespace })?;
        Ok(normalize_results(raw)
            .iter()
            .map(SearchHit::from_value)
            .collect())
    }

    fn post_json<B, T>(&self, body: &B) -> Result<T, WebhookError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let res = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(body)
            .send()
            .map_err(|source| self.request_error(source))?;
        let res = self.check_status(res)?;
        let bytes = res.bytes().map_err(|source| self.request_error(source))?;
        tracing::debug!(url = %self.url, bytes = bytes.len(), "webhook responded");
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn check_status(&self, res: Response) -> Result<Response, WebhookError> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        let body = res.text().unwrap_or_else(|_| "<body unavailable>".into());
        tracing::debug!(url = %self.url, %status, "webhook rejected request");
        Err(WebhookError::Status {
            url: self.url.clone(),
            status,
            body,
        })
    }

    fn request_error(&self, source: reqwest::Error) -> WebhookError {
        WebhookError::Request {
            url: self.url.clone(),
            source,
        }
    }
}

//! reqwest-backed Copper client with bounded retry.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use copper_core::CopperConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::ApiError;

const MAX_DELAY: Duration = Duration::from_secs(30);

/// Authenticated client for `{base_url}/{entity}[/{id}][/search]`.
#[derive(Debug, Clone)]
pub struct CopperClient {
    base_url: String,
    http: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl CopperClient {
    /// Build a client from config. Fails fast when credentials are missing.
    pub fn new(config: &CopperConfig) -> Result<Self, ApiError> {
        let credentials = config.credentials()?;
        url::Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("invalid base url {}: {e}", config.base_url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(header_name("x-pw-accesstoken"), header_value(&credentials.api_key)?);
        headers.insert(header_name("x-pw-application"), header_value(&config.application)?);
        headers.insert(header_name("x-pw-useremail"), header_value(&credentials.user_email)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, &[], None).await
    }

    /// Send a request, retrying 429 and 5xx up to `max_retries` times.
    ///
    /// An empty 2xx body yields `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut attempt: u32 = 0;

        loop {
            let mut req = self.http.request(method.clone(), &url);
            if !query.is_empty() {
                req = req.query(query);
            }
            if let Some(body) = body {
                req = req.json(body);
            }

            debug!(method = %method, url = %url, attempt, "Copper request");
            let resp = req.send().await?;
            let status = resp.status();

            if status.is_success() {
                let text = resp.text().await?;
                if text.trim().is_empty() {
                    return Ok(Value::Null);
                }
                return serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()));
            }

            let retry_after = retry_after_secs(resp.headers());
            let text = resp.text().await.unwrap_or_default();
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

            if retryable && attempt < self.max_retries {
                let delay = retry_after
                    .map(Duration::from_secs)
                    .unwrap_or_else(|| self.backoff(attempt))
                    .min(MAX_DELAY);
                warn!(
                    method = %method,
                    url = %url,
                    %status,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Copper request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            let err = ApiError::from_status(status, path, retry_after, &text);
            if retryable {
                error!(method = %method, url = %url, %status, attempts = attempt + 1, "Copper request gave up");
            } else {
                warn!(method = %method, url = %url, %status, body = %text, "Copper request rejected");
            }
            return Err(err);
        }
    }

    /// Exponential delay from the configured base, with up to 100ms of jitter.
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.retry_delay.saturating_mul(2u32.saturating_pow(attempt));
        // Jitter without rand: nanosecond fraction of the current time
        let jitter_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos()
            % 100;
        base + Duration::from_millis(jitter_ms as u64)
    }
}

fn header_name(name: &'static str) -> HeaderName {
    HeaderName::from_static(name)
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::Config(format!("invalid header value: {e}")))
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

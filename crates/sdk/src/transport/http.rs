//! HTTP transport layer for the Ledgerlink SDK.

use crate::auth::TokenManager;
use crate::config::{parse_retry_after, ClientConfig, Credentials};
use crate::error::{LedgerError, LedgerResult};
use crate::request::ApiRequest;
use reqwest::{header, Client, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Header identifying the integration partner to the upstream API.
pub const PARTNER_ID_HEADER: &str = "x-partner-id";

/// Resolve `path` against the base URL. Leading slashes are ignored so the
/// base URL's own path prefix is kept.
pub(crate) fn build_url(base_url: &url::Url, path: &str) -> LedgerResult<url::Url> {
    Ok(base_url.join(path.trim_start_matches('/'))?)
}

/// Path as reported in errors and logs.
pub(crate) fn display_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// HTTP transport for making authenticated API requests.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
    tokens: Arc<TokenManager>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>, credentials: Credentials) -> LedgerResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if let Some(ref partner_id) = config.partner_id {
            headers.insert(
                header::HeaderName::from_static(PARTNER_ID_HEADER),
                header::HeaderValue::from_str(partner_id)
                    .map_err(|_| LedgerError::Config("Invalid partner ID format".to_string()))?,
            );
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| LedgerError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let tokens = Arc::new(TokenManager::new(
            client.clone(),
            config.clone(),
            credentials,
        ));

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    /// Token cache backing this transport.
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Build a URL for the given path.
    fn build_url(&self, path: &str) -> LedgerResult<url::Url> {
        build_url(&self.config.base_url, path)
    }

    fn request_headers(&self, token: &str, extra: &[(String, String)]) -> LedgerResult<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| LedgerError::Config("Invalid access token format".to_string()))?,
        );

        for (name, value) in extra {
            let name = header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| LedgerError::InvalidInput(format!("Invalid header name: {}", name)))?;
            if name == header::AUTHORIZATION {
                warn!("Ignoring caller-supplied Authorization header");
                continue;
            }
            let value = header::HeaderValue::from_str(value).map_err(|_| {
                LedgerError::InvalidInput(format!("Invalid value for header {}", name))
            })?;
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// Execute a request, authenticating first and retrying transient failures.
    ///
    /// Performs at most `max_retries + 1` attempts. Returns the decoded JSON
    /// body on success.
    pub async fn execute(&self, request: &ApiRequest) -> LedgerResult<Value> {
        let url = self.build_url(&request.path)?;
        let path = display_path(&request.path);
        let method = request.method.as_str();

        let token = self.tokens.ensure_token().await?;
        let headers = self.request_headers(&token, &request.headers)?;

        let retry_config = &self.config.retry_config;
        let mut attempt = 0;

        loop {
            let mut builder = self
                .client
                .request(request.method.clone(), url.clone())
                .headers(headers.clone());
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(ref body) = request.body {
                builder = builder.json(body);
            }

            debug!(method, path = %path, attempt, "Sending request");

            let (error, retry_after) = match builder.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return decode_body(response, method, &path).await;
                    }

                    let retry_after = retry_after_header(response.headers());
                    let body = match response.text().await {
                        Ok(body) => body,
                        Err(e) => {
                            warn!(method, path = %path, status = status.as_u16(), error = %e, "Failed to read error body");
                            String::new()
                        }
                    };

                    (
                        LedgerError::from_response(status.as_u16(), &body, method, &path),
                        retry_after,
                    )
                }
                // No response at all: connect, DNS, timeout.
                Err(e) => (LedgerError::from_transport(&e, method, &path), None),
            };

            let retryable = error.is_retryable(retry_config);
            if !retryable || attempt >= retry_config.max_retries {
                return Err(error);
            }

            let delay = retry_config.delay_for(attempt, retry_after);
            warn!(
                method,
                path = %path,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Server-requested delay from a `Retry-After` header, in whole seconds.
fn retry_after_header(headers: &header::HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after)
}

/// Decode a success body: empty means `null`, non-JSON text is kept as a string.
async fn decode_body(response: Response, method: &str, path: &str) -> LedgerResult<Value> {
    let text = response
        .text()
        .await
        .map_err(|e| LedgerError::from_transport(&e, method, path))?;

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Value::String(text)),
    }
}

//! Main client for the Ledgerlink SDK.

use crate::config::{ClientConfig, Credentials, RetryConfig, DEFAULT_AUTH_PATH};
use crate::error::{LedgerError, LedgerResult};
use crate::request::ApiRequest;
use crate::transport::HttpTransport;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main client for interacting with the Ledgerlink API.
///
/// Clones share one token cache.
#[derive(Clone)]
pub struct LedgerClient {
    config: Arc<ClientConfig>,
    http: HttpTransport,
}

impl LedgerClient {
    /// Create a new client builder.
    pub fn builder() -> LedgerClientBuilder {
        LedgerClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig, credentials: Credentials) -> LedgerResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone(), credentials)?;

        Ok(Self { config, http })
    }

    /// Active configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a request against the upstream API.
    pub async fn execute(&self, request: &ApiRequest) -> LedgerResult<Value> {
        self.http.execute(request).await
    }

    /// Return a valid bearer token, authenticating if the cached one expired.
    pub async fn ensure_token(&self) -> LedgerResult<String> {
        self.http.tokens().ensure_token().await
    }

    /// Expiry of the cached token, if any.
    pub async fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.http.tokens().token_expiry().await
    }
}

/// Builder for creating a LedgerClient.
pub struct LedgerClientBuilder {
    base_url: Option<String>,
    credentials: Option<Credentials>,
    auth_path: String,
    partner_id: Option<String>,
    timeout: Duration,
    token_safety_margin: Duration,
    retry_config: RetryConfig,
}

impl LedgerClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            credentials: None,
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            partner_id: None,
            timeout: Duration::from_secs(30),
            token_safety_margin: Duration::from_secs(60),
            retry_config: RetryConfig::default(),
        }
    }

    /// Set the base URL of the upstream API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the account credentials.
    pub fn credentials(mut self, username: impl Into<String>, access_key: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, access_key));
        self
    }

    /// Set the token endpoint path.
    pub fn auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = path.into();
        self
    }

    /// Set the partner identifier header value.
    pub fn partner_id(mut self, id: impl Into<String>) -> Self {
        self.partner_id = Some(id.into());
        self
    }

    /// Set the per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how long before expiry a token stops being reused.
    pub fn token_safety_margin(mut self, margin: Duration) -> Self {
        self.token_safety_margin = margin;
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> LedgerResult<LedgerClient> {
        let base_url_str = self
            .base_url
            .ok_or_else(|| LedgerError::Config("base_url is required".to_string()))?;
        let credentials = self
            .credentials
            .ok_or_else(|| LedgerError::Config("credentials are required".to_string()))?;

        if credentials.username.is_empty() || credentials.access_key.is_empty() {
            return Err(LedgerError::Config(
                "username and access key must not be empty".to_string(),
            ));
        }

        let mut config = ClientConfig::new(Url::parse(&base_url_str)?);
        config.auth_path = self.auth_path;
        config.partner_id = self.partner_id;
        config.timeout = self.timeout;
        config.token_safety_margin = self.token_safety_margin;
        config.retry_config = self.retry_config;

        LedgerClient::from_config(config, credentials)
    }
}

impl Default for LedgerClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Configuration types for the Ledgerlink SDK.

use std::fmt;
use std::time::Duration;
use url::Url;

/// Default upstream endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.ledgerlink.io/v1/";

/// Default path of the token-issuing endpoint, relative to the base URL.
pub const DEFAULT_AUTH_PATH: &str = "token";

/// Configuration for the Ledgerlink client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the upstream API.
    pub base_url: Url,
    /// Token endpoint, relative to `base_url`.
    pub auth_path: String,
    /// Partner identifier sent as `X-Partner-Id` on every request.
    pub partner_id: Option<String>,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Tokens are treated as expired this long before their reported expiry.
    pub token_safety_margin: Duration,
    /// Retry configuration.
    pub retry_config: RetryConfig,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL.
    ///
    /// A trailing slash is added to the base path so relative resource paths
    /// resolve beneath it.
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            base_url,
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            partner_id: None,
            timeout: Duration::from_secs(30),
            token_safety_margin: Duration::from_secs(60),
            retry_config: RetryConfig::default(),
        }
    }
}

/// Account credentials exchanged for a bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub access_key: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            access_key: access_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("access_key", &"<redacted>")
            .finish()
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Backoff multiplier.
    pub backoff_multiplier: f64,
    /// HTTP status codes to retry on.
    pub retry_on_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1000),
            backoff_multiplier: 2.0,
            retry_on_status_codes: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// Create a configuration with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate backoff duration for a given attempt.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let backoff_ms = self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(backoff_ms as u64)
    }

    /// Delay before the retry following `attempt`.
    ///
    /// A server-provided `Retry-After` wins over the exponential schedule,
    /// whatever the status code that carried it.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.backoff_for_attempt(attempt))
    }

    /// Check if a status code should trigger a retry.
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status_codes.contains(&status)
    }
}

/// Parse a `Retry-After` header value given in whole seconds.
///
/// HTTP-date values are not supported and yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule() {
        let config = RetryConfig::default();

        assert_eq!(config.backoff_for_attempt(0), Duration::from_millis(1000));
        assert_eq!(config.backoff_for_attempt(1), Duration::from_millis(2000));
        assert_eq!(config.backoff_for_attempt(2), Duration::from_millis(4000));
    }

    #[test]
    fn test_retry_after_overrides_schedule() {
        let config = RetryConfig::default();

        assert_eq!(
            config.delay_for(0, Some(Duration::from_secs(5))),
            Duration::from_millis(5000)
        );
        assert_eq!(
            config.delay_for(2, Some(Duration::from_secs(5))),
            Duration::from_millis(5000)
        );
        assert_eq!(config.delay_for(1, None), Duration::from_millis(2000));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_retry_after(" 12 "), Some(Duration::from_secs(12)));
        assert_eq!(parse_retry_after("0"), Some(Duration::ZERO));
        assert_eq!(parse_retry_after("soon"), None);
        assert_eq!(parse_retry_after("-3"), None);
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn test_should_retry_status() {
        let config = RetryConfig::default();

        for status in [429, 500, 502, 503, 504] {
            assert!(config.should_retry_status(status), "{status} should retry");
        }
        for status in [400, 401, 403, 404, 409, 501] {
            assert!(!config.should_retry_status(status), "{status} should not retry");
        }
    }

    #[test]
    fn test_client_config_defaults() {
        let url = Url::parse("https://example.com/").unwrap();
        let config = ClientConfig::new(url.clone());

        assert_eq!(config.base_url, url);
        assert_eq!(config.auth_path, "token");
        assert!(config.partner_id.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.token_safety_margin, Duration::from_secs(60));
        assert_eq!(config.retry_config.max_retries, 3);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = ClientConfig::new(Url::parse("https://api.example.com/v1").unwrap());
        assert_eq!(config.base_url.as_str(), "https://api.example.com/v1/");
    }

    #[test]
    fn test_retry_config_no_retry() {
        let config = RetryConfig::no_retry();

        assert_eq!(config.max_retries, 0);
        assert_eq!(config.initial_backoff, Duration::from_millis(1000));
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let credentials = Credentials::new("acme", "super-secret");
        let rendered = format!("{:?}", credentials);

        assert!(rendered.contains("acme"));
        assert!(!rendered.contains("super-secret"));
    }
}

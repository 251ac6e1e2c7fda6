// Server configuration: TOML file, environment overrides, secrets

use anyhow::{Context, Result};
use ledgerlink_sdk::{Credentials, LedgerClient, RetryConfig, DEFAULT_AUTH_PATH, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_BASE_URL: &str = "LEDGERLINK_BASE_URL";
pub const ENV_PARTNER_ID: &str = "LEDGERLINK_PARTNER_ID";
pub const ENV_USERNAME: &str = "LEDGERLINK_USERNAME";
pub const ENV_ACCESS_KEY: &str = "LEDGERLINK_ACCESS_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct McpConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_auth_path")]
    pub auth_path: String,

    #[serde(default)]
    pub partner_id: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Expose only read-only tools
    #[serde(default)]
    pub read_only: bool,

    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_auth_path() -> String {
    DEFAULT_AUTH_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_path: default_auth_path(),
            partner_id: None,
            timeout_secs: default_timeout_secs(),
            read_only: false,
            retry: RetrySettings::default(),
        }
    }
}

impl McpConfig {
    /// Load from `config_path`, falling back to defaults when the file is absent.
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::info!(path = %config_path.display(), "Configuration file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read configuration file {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {}", config_path.display()))
    }

    /// Apply `LEDGERLINK_BASE_URL` and `LEDGERLINK_PARTNER_ID` from `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = base_url;
        }
        if let Some(partner_id) = lookup(ENV_PARTNER_ID).filter(|v| !v.is_empty()) {
            self.partner_id = Some(partner_id);
        }
        self
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.retry.max_retries,
            initial_backoff: Duration::from_millis(self.retry.initial_backoff_ms),
            ..Default::default()
        }
    }

    /// Build the upstream client for `credentials`.
    pub fn client(&self, credentials: Credentials) -> Result<LedgerClient> {
        let mut builder = LedgerClient::builder()
            .base_url(&self.base_url)
            .credentials(credentials.username, credentials.access_key)
            .auth_path(&self.auth_path)
            .timeout(Duration::from_secs(self.timeout_secs))
            .retry_config(self.retry_config());
        if let Some(partner_id) = &self.partner_id {
            builder = builder.partner_id(partner_id);
        }

        builder.build().context("Failed to build Ledgerlink client")
    }
}

/// Read the account credentials. Both variables are required.
pub fn credentials_from_env(lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
    let username = lookup(ENV_USERNAME)
        .filter(|v| !v.is_empty())
        .with_context(|| format!("{} environment variable is required", ENV_USERNAME))?;
    let access_key = lookup(ENV_ACCESS_KEY)
        .filter(|v| !v.is_empty())
        .with_context(|| format!("{} environment variable is required", ENV_ACCESS_KEY))?;

    Ok(Credentials::new(username, access_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = McpConfig::load(&dir.path().join("ledgerlink.toml")).unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.auth_path, "token");
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.read_only);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.initial_backoff_ms, 1000);
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
base_url = "https://sandbox.ledgerlink.io/v1"
partner_id = "partner-7"
read_only = true

[retry]
max_retries = 5
"#
        )
        .unwrap();

        let config = McpConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url, "https://sandbox.ledgerlink.io/v1");
        assert_eq!(config.partner_id.as_deref(), Some("partner-7"));
        assert!(config.read_only);
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.initial_backoff_ms, 1000);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "access_key = \"should-not-live-here\"").unwrap();

        let err = McpConfig::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown field `access_key`"));
    }

    #[test]
    fn test_env_overrides_file() {
        let config = McpConfig {
            partner_id: Some("from-file".to_string()),
            ..Default::default()
        }
        .with_env_overrides(env(&[
            (ENV_BASE_URL, "http://localhost:8080/v1/"),
            (ENV_PARTNER_ID, "from-env"),
        ]));

        assert_eq!(config.base_url, "http://localhost:8080/v1/");
        assert_eq!(config.partner_id.as_deref(), Some("from-env"));

        let config = McpConfig::default().with_env_overrides(env(&[(ENV_BASE_URL, "")]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_credentials_required() {
        let err = credentials_from_env(env(&[(ENV_USERNAME, "acme")])).unwrap_err();
        assert!(err.to_string().contains(ENV_ACCESS_KEY));

        let err = credentials_from_env(env(&[(ENV_ACCESS_KEY, "key")])).unwrap_err();
        assert!(err.to_string().contains(ENV_USERNAME));

        let credentials =
            credentials_from_env(env(&[(ENV_USERNAME, "acme"), (ENV_ACCESS_KEY, "key")])).unwrap();
        assert_eq!(credentials, Credentials::new("acme", "key"));
    }

    #[test]
    fn test_client_from_config() {
        let config = McpConfig {
            base_url: "http://localhost:8080/v1".to_string(),
            partner_id: Some("partner-7".to_string()),
            timeout_secs: 5,
            retry: RetrySettings {
                max_retries: 1,
                initial_backoff_ms: 10,
            },
            ..Default::default()
        };

        let client = config.client(Credentials::new("acme", "key")).unwrap();
        let active = client.config();
        assert_eq!(active.base_url.as_str(), "http://localhost:8080/v1/");
        assert_eq!(active.partner_id.as_deref(), Some("partner-7"));
        assert_eq!(active.timeout, Duration::from_secs(5));
        assert_eq!(active.retry_config.max_retries, 1);
        assert_eq!(active.retry_config.initial_backoff, Duration::from_millis(10));
    }

    #[test]
    fn test_bad_base_url() {
        let config = McpConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.client(Credentials::new("acme", "key")).is_err());
    }
}

//! Error types for the Ledgerlink SDK.

use crate::config::RetryConfig;
use reqwest::StatusCode;
use serde::Deserialize;

/// Result type for SDK operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error types that can occur when using the Ledgerlink SDK.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A request to the upstream API failed, either at the transport level
    /// (`status` is `None`) or with a non-success status.
    #[error("{message}")]
    Api {
        message: String,
        status: Option<u16>,
        method: String,
        path: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl LedgerError {
    /// Upstream HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Method of the failing request.
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Api { method, .. } => Some(method),
            _ => None,
        }
    }

    /// Path of the failing request.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Api { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Whether `policy` allows another attempt after this error. Failures
    /// without a response are always retryable.
    pub fn is_retryable(&self, policy: &RetryConfig) -> bool {
        match self {
            Self::Api { status: None, .. } => true,
            Self::Api {
                status: Some(status),
                ..
            } => policy.should_retry_status(*status),
            _ => false,
        }
    }

    /// Create an API error from a status code and response body.
    pub fn from_response(
        status: u16,
        body: &str,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Request failed");

        Self::Api {
            message: format_error_message(Some(status), Some(body), reason),
            status: Some(status),
            method: method.into(),
            path: path.into(),
        }
    }

    /// Create an API error for a request that never got a response.
    pub fn from_transport(
        error: &reqwest::Error,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        let status = error.status().map(|s| s.as_u16());
        Self::Api {
            message: format_error_message(status, None, &error.to_string()),
            status,
            method: method.into(),
            path: path.into(),
        }
    }
}

/// Known upstream error payloads, in matching priority order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UpstreamErrorBody {
    /// `{ "Status": "TooManyRequests", "Message": "..." }`
    RateLimited {
        #[serde(rename = "Status")]
        status: String,
        #[serde(rename = "Message")]
        message: String,
    },
    /// `{ "Status": 400, "Errors": [{ "Code", "Message", "Detail" }] }`
    Validation {
        #[serde(rename = "Status")]
        #[allow(dead_code)]
        status: i64,
        #[serde(rename = "Errors")]
        errors: Vec<UpstreamErrorItem>,
    },
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorItem {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message")]
    message: String,
    #[serde(rename = "Detail", default)]
    detail: Option<String>,
}

impl UpstreamErrorItem {
    fn render(&self) -> String {
        match self.detail.as_deref() {
            Some(detail) if !detail.is_empty() => {
                format!("{}: {} - {}", self.code, self.message, detail)
            }
            _ => format!("{}: {}", self.code, self.message),
        }
    }
}

/// Turn an upstream failure into one human-readable message.
///
/// Tries, in order: no body, the rate-limit shape, the error-list shape, and
/// finally the raw body.
pub fn format_error_message(status: Option<u16>, body: Option<&str>, transport_message: &str) -> String {
    let status_label = status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let no_body = || format!("HTTP {}: {}", status_label, transport_message);

    let body = match body {
        Some(body) if !body.trim().is_empty() => body,
        _ => return no_body(),
    };

    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return body.to_string(),
    };

    match &value {
        serde_json::Value::Null => return no_body(),
        serde_json::Value::String(s) if s.is_empty() => return no_body(),
        _ => {}
    }

    match serde_json::from_value::<UpstreamErrorBody>(value.clone()) {
        Ok(UpstreamErrorBody::RateLimited { status, message }) => {
            format!("{}: {}", status, message)
        }
        Ok(UpstreamErrorBody::Validation { errors, .. }) if !errors.is_empty() => errors
            .iter()
            .map(UpstreamErrorItem::render)
            .collect::<Vec<_>>()
            .join("; "),
        _ => value.to_string(),
    }
}

//! Bearer token acquisition and caching.

use crate::config::{ClientConfig, Credentials};
use crate::error::{LedgerError, LedgerResult};
use crate::transport::http::{build_url, display_path};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A bearer token together with the instant it stops being accepted upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    /// Whether the token may still be handed out at `now`, keeping `margin`
    /// in reserve before `expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expires_at
            .checked_sub_signed(margin)
            .is_some_and(|limit| now < limit)
    }
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    access_key: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Owns the cached token for one set of credentials.
///
/// The cache lock is held while a refresh is in flight, so callers racing an
/// expired token wait for a single authentication request.
pub struct TokenManager {
    client: Client,
    config: Arc<ClientConfig>,
    credentials: Credentials,
    cached: Mutex<Option<SessionToken>>,
}

impl TokenManager {
    pub fn new(client: Client, config: Arc<ClientConfig>, credentials: Credentials) -> Self {
        Self {
            client,
            config,
            credentials,
            cached: Mutex::new(None),
        }
    }

    fn safety_margin(&self) -> Duration {
        Duration::from_std(self.config.token_safety_margin).unwrap_or(Duration::MAX)
    }

    /// Return a currently-valid bearer token, authenticating if needed.
    pub async fn ensure_token(&self) -> LedgerResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_valid_at(Utc::now(), self.safety_margin()) {
                return Ok(token.value.clone());
            }
            debug!(expires_at = %token.expires_at, "Cached token is inside the safety margin");
        }

        let token = self.authenticate().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Expiry of the cached token, if one has been issued.
    pub async fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.cached.lock().await.as_ref().map(|t| t.expires_at)
    }

    async fn authenticate(&self) -> LedgerResult<SessionToken> {
        let url = build_url(&self.config.base_url, &self.config.auth_path)?;
        let path = display_path(&self.config.auth_path);
        debug!(url = %url, "Requesting access token");

        let issued_at = Utc::now();
        let response = self
            .client
            .post(url)
            .json(&TokenRequest {
                username: &self.credentials.username,
                access_key: &self.credentials.access_key,
            })
            .send()
            .await
            .map_err(|e| LedgerError::from_transport(&e, "POST", &path))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LedgerError::from_transport(&e, "POST", &path))?;

        if !status.is_success() {
            return Err(LedgerError::from_response(status.as_u16(), &body, "POST", path));
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        let lifetime = Duration::try_seconds(token.expires_in).ok_or_else(|| {
            LedgerError::InvalidInput(format!("token lifetime out of range: {}", token.expires_in))
        })?;

        info!(
            expires_in = token.expires_in,
            token_type = token.token_type.as_deref().unwrap_or("bearer"),
            scope = token.scope.as_deref().unwrap_or(""),
            "Obtained access token"
        );

        let expires_at = match issued_at.checked_add_signed(lifetime) {
            Some(expires_at) => expires_at,
            None if token.expires_in > 0 => {
                warn!(expires_in = token.expires_in, "Token lifetime past the representable range, clamping");
                DateTime::<Utc>::MAX_UTC
            }
            None => issued_at,
        };

        Ok(SessionToken {
            value: token.access_token,
            expires_at,
        })
    }

    #[cfg(test)]
    pub(crate) async fn set_cached(&self, token: SessionToken) {
        *self.cached.lock().await = Some(token);
    }
}

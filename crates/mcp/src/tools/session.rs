// Session tool

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{input_schema_for, Tool, ToolTier};
use anyhow::Result;
use ledgerlink_sdk::LedgerClient;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AuthenticateArgs {}

/// Checks that the configured credentials are accepted.
///
/// Reuses the cached session when it is still valid. The token itself is
/// never included in the result.
pub struct AuthenticateTool {
    client: LedgerClient,
}

impl AuthenticateTool {
    pub fn new(client: &LedgerClient) -> Self {
        Self {
            client: client.clone(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for AuthenticateTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "authenticate".to_string(),
            description: "Verify the configured credentials and report when the session expires"
                .to_string(),
            input_schema: input_schema_for::<AuthenticateArgs>(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        if !arguments.is_null() {
            if let Err(e) = serde_json::from_value::<AuthenticateArgs>(arguments) {
                return Ok(CallToolResult::error(format!(
                    "Invalid arguments for authenticate: {}",
                    e
                )));
            }
        }

        if let Err(e) = self.client.ensure_token().await {
            tracing::warn!(status = ?e.status(), error = %e, "Authentication failed");
            return Ok(CallToolResult::error(e.to_string()));
        }

        let expires_at = self.client.token_expiry().await.map(|t| t.to_rfc3339());
        let body = json!({
            "authenticated": true,
            "base_url": self.client.config().base_url.as_str(),
            "expires_at": expires_at,
        });
        Ok(CallToolResult::text(serde_json::to_string_pretty(&body)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LedgerClient {
        LedgerClient::builder()
            .base_url(server.uri())
            .credentials("acme", "secret-key")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_reports_expiry_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-very-secret",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tool = AuthenticateTool::new(&client_for(&server));
        let result = tool.execute(json!({})).await.unwrap();

        assert_eq!(result.is_error, None);
        let text = result.text_content();
        assert!(!text.contains("tok-very-secret"));
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["authenticated"], true);
        assert!(body["expires_at"].is_string());

        // Second call reuses the cached session.
        let result = tool.execute(Value::Null).await.unwrap();
        assert_eq!(result.is_error, None);
    }

    #[tokio::test]
    async fn test_authenticate_failure_is_error_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "Status": "Unauthorized",
                "Message": "Invalid access key"
            })))
            .mount(&server)
            .await;

        let result = AuthenticateTool::new(&client_for(&server))
            .execute(json!({}))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.text_content(), "Error: Unauthorized: Invalid access key");
    }

    #[tokio::test]
    async fn test_authenticate_rejects_arguments() {
        let client = LedgerClient::builder()
            .base_url("http://127.0.0.1:9")
            .credentials("acme", "key")
            .build()
            .unwrap();

        let result = AuthenticateTool::new(&client)
            .execute(json!({"force": true}))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert!(result.text_content().contains("unknown field `force`"));
    }
}

// Webhook subscription tools

use crate::tools::command::{resource, to_body, ApiTool};
use crate::tools::ToolTier;
use ledgerlink_sdk::{ApiRequest, LedgerClient};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const WEBHOOKS: &str = "/webhooks";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListWebhooksArgs {}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct WebhookIdArgs {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateWebhookArgs {
    /// HTTPS endpoint that receives event deliveries
    pub url: String,
    /// Event names, e.g. invoice.created, invoice.paid, customer.updated
    pub events: Vec<String>,
    /// Shared secret used to sign deliveries
    pub secret: Option<String>,
    #[serde(skip_serializing)]
    pub idempotency_key: Option<String>,
}

pub fn tools(client: &LedgerClient) -> Vec<ApiTool> {
    vec![
        ApiTool::new(
            client,
            "list_webhooks",
            "List webhook subscriptions",
            ToolTier::Tier0,
            |_: ListWebhooksArgs| Ok(ApiRequest::get(WEBHOOKS)),
        ),
        ApiTool::new(
            client,
            "get_webhook",
            "Get a webhook subscription",
            ToolTier::Tier0,
            |args: WebhookIdArgs| Ok(ApiRequest::get(resource(WEBHOOKS, &args.id)?)),
        ),
        ApiTool::new(
            client,
            "create_webhook",
            "Subscribe an endpoint to ledger events",
            ToolTier::Tier1,
            |args: CreateWebhookArgs| {
                if args.events.is_empty() {
                    anyhow::bail!("events must name at least one event");
                }
                Ok(ApiRequest::post(WEBHOOKS)
                    .body(to_body(&args)?)
                    .idempotency_key(args.idempotency_key))
            },
        ),
        ApiTool::new(
            client,
            "delete_webhook",
            "Remove a webhook subscription",
            ToolTier::Tier2,
            |args: WebhookIdArgs| Ok(ApiRequest::delete(resource(WEBHOOKS, &args.id)?)),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{client, find};
    use serde_json::json;

    #[test]
    fn test_create_webhook() {
        let tools = tools(&client());
        let request = find(&tools, "create_webhook")
            .request_for(json!({
                "url": "https://hooks.example.com/ledger",
                "events": ["invoice.created", "invoice.paid"]
            }))
            .unwrap();

        assert_eq!(
            request.body,
            Some(json!({
                "Url": "https://hooks.example.com/ledger",
                "Events": ["invoice.created", "invoice.paid"]
            }))
        );
    }

    #[test]
    fn test_create_webhook_needs_events() {
        let tools = tools(&client());
        let err = find(&tools, "create_webhook")
            .request_for(json!({"url": "https://hooks.example.com/ledger", "events": []}))
            .unwrap_err();

        assert_eq!(err.to_string(), "events must name at least one event");
    }

    #[test]
    fn test_list_webhooks_accepts_missing_arguments() {
        let tools = tools(&client());
        let request = find(&tools, "list_webhooks")
            .request_for(serde_json::Value::Null)
            .unwrap();

        assert_eq!(request.path, "/webhooks");
    }
}

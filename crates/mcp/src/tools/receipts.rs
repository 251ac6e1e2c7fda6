// Customer receipt tools

use crate::tools::command::{resource, to_body, to_query, ApiTool};
use crate::tools::ToolTier;
use ledgerlink_sdk::{ApiRequest, LedgerClient};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const RECEIPTS: &str = "/receipts";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListReceiptsArgs {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub customer_code: Option<String>,
    /// Received on or after this date (YYYY-MM-DD)
    pub from_date: Option<String>,
    /// Received on or before this date (YYYY-MM-DD)
    pub to_date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReceiptIdArgs {
    pub id: String,
}

/// Part of a receipt settled against one invoice.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Allocation {
    pub invoice_number: String,
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateReceiptArgs {
    pub customer_code: String,
    /// Date the money arrived (YYYY-MM-DD)
    pub date: String,
    pub amount: f64,
    pub bank_account_code: String,
    pub reference: Option<String>,
    /// Invoices this receipt pays; any remainder stays on account
    pub allocations: Option<Vec<Allocation>>,
    /// Key that makes a retried create a no-op upstream
    #[serde(skip_serializing)]
    pub idempotency_key: Option<String>,
}

pub fn tools(client: &LedgerClient) -> Vec<ApiTool> {
    vec![
        ApiTool::new(
            client,
            "list_receipts",
            "List money received from customers",
            ToolTier::Tier0,
            |args: ListReceiptsArgs| Ok(ApiRequest::get(RECEIPTS).query(to_query(&args)?)),
        ),
        ApiTool::new(
            client,
            "get_receipt",
            "Get a customer receipt and its invoice allocations",
            ToolTier::Tier0,
            |args: ReceiptIdArgs| Ok(ApiRequest::get(resource(RECEIPTS, &args.id)?)),
        ),
        ApiTool::new(
            client,
            "create_receipt",
            "Record money received from a customer, optionally allocated to invoices. Supply idempotency_key to make retries safe",
            ToolTier::Tier1,
            |args: CreateReceiptArgs| {
                Ok(ApiRequest::post(RECEIPTS)
                    .body(to_body(&args)?)
                    .idempotency_key(args.idempotency_key))
            },
        ),
        ApiTool::new(
            client,
            "delete_receipt",
            "Delete a customer receipt and release its allocations",
            ToolTier::Tier2,
            |args: ReceiptIdArgs| Ok(ApiRequest::delete(resource(RECEIPTS, &args.id)?)),
        ),
    ]
}

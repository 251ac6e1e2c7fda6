// Customer tools

use crate::tools::command::{resource, to_body, to_query, ApiTool};
use crate::tools::ToolTier;
use ledgerlink_sdk::{ApiRequest, LedgerClient};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const CUSTOMERS: &str = "/customers";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListCustomersArgs {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Results per page (maximum 100)
    pub page_size: Option<u32>,
    /// Filter on customer code, name or email
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CustomerCodeArgs {
    /// Customer code
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Address {
    pub line1: String,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postcode: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    pub country: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCustomerArgs {
    /// Unique customer code
    pub code: String,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    /// Days until invoices fall due
    pub payment_terms_days: Option<u32>,
    /// ISO 4217 currency code
    pub currency: Option<String>,
    /// Key that makes a retried create a no-op upstream
    #[serde(skip_serializing)]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCustomerArgs {
    /// Code of the customer to update
    #[serde(skip_serializing)]
    pub code: String,
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub payment_terms_days: Option<u32>,
    pub currency: Option<String>,
}

pub fn tools(client: &LedgerClient) -> Vec<ApiTool> {
    vec![
        ApiTool::new(
            client,
            "list_customers",
            "List customers, optionally filtered by code, name or email",
            ToolTier::Tier0,
            |args: ListCustomersArgs| Ok(ApiRequest::get(CUSTOMERS).query(to_query(&args)?)),
        ),
        ApiTool::new(
            client,
            "get_customer",
            "Get a single customer by code, including contact and balance details",
            ToolTier::Tier0,
            |args: CustomerCodeArgs| Ok(ApiRequest::get(resource(CUSTOMERS, &args.code)?)),
        ),
        ApiTool::new(
            client,
            "create_customer",
            "Create a customer. Supply idempotency_key to make retries safe",
            ToolTier::Tier1,
            |args: CreateCustomerArgs| {
                Ok(ApiRequest::post(CUSTOMERS)
                    .body(to_body(&args)?)
                    .idempotency_key(args.idempotency_key))
            },
        ),
        ApiTool::new(
            client,
            "update_customer",
            "Update fields of an existing customer; omitted fields are left unchanged",
            ToolTier::Tier1,
            |args: UpdateCustomerArgs| {
                Ok(ApiRequest::put(resource(CUSTOMERS, &args.code)?).body(to_body(&args)?))
            },
        ),
        ApiTool::new(
            client,
            "delete_customer",
            "Delete a customer that has no transactions",
            ToolTier::Tier2,
            |args: CustomerCodeArgs| Ok(ApiRequest::delete(resource(CUSTOMERS, &args.code)?)),
        ),
    ]
}

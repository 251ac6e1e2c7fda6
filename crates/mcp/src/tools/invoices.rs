// Sales invoice and invoice payment tools

use crate::tools::command::{resource, to_body, to_query, ApiTool};
use crate::tools::ToolTier;
use ledgerlink_sdk::{ApiRequest, LedgerClient};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const INVOICES: &str = "/invoices";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Void,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListInvoicesArgs {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Results per page (maximum 100)
    pub page_size: Option<u32>,
    /// Only invoices for this customer
    pub customer_code: Option<String>,
    pub status: Option<InvoiceStatus>,
    /// Issued on or after this date (YYYY-MM-DD)
    pub from_date: Option<String>,
    /// Issued on or before this date (YYYY-MM-DD)
    pub to_date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct InvoiceNumberArgs {
    /// Invoice number
    pub number: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct InvoiceLine {
    /// Catalogue product, if the line sells one
    pub product_code: Option<String>,
    pub description: String,
    pub quantity: f64,
    /// Price per unit, excluding tax
    pub unit_price: f64,
    /// Tax rate code, e.g. STANDARD, ZERO, EXEMPT
    pub vat_rate: Option<String>,
    /// Nominal ledger code; defaults to the product's sales code
    pub nominal_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateInvoiceArgs {
    pub customer_code: String,
    /// Issue date (YYYY-MM-DD)
    pub issue_date: String,
    /// Due date (YYYY-MM-DD); defaults to the customer's payment terms
    pub due_date: Option<String>,
    /// Customer reference, e.g. a purchase order number
    pub reference: Option<String>,
    /// ISO 4217 currency code; defaults to the customer's currency
    pub currency: Option<String>,
    pub lines: Vec<InvoiceLine>,
    pub notes: Option<String>,
    /// Key that makes a retried create a no-op upstream
    #[serde(skip_serializing)]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateInvoiceArgs {
    /// Number of the draft invoice to update
    #[serde(skip_serializing)]
    pub number: String,
    pub due_date: Option<String>,
    pub reference: Option<String>,
    /// Replaces every existing line when given
    pub lines: Option<Vec<InvoiceLine>>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EmailInvoiceArgs {
    #[serde(skip_serializing)]
    pub number: String,
    /// Recipient; defaults to the customer's email address
    pub recipient_email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AddInvoicePaymentArgs {
    /// Invoice being paid
    #[serde(skip_serializing)]
    pub number: String,
    pub amount: f64,
    /// Payment date (YYYY-MM-DD)
    pub date: String,
    /// Bank account receiving the money
    pub bank_account_code: Option<String>,
    /// e.g. BACS, CARD, CASH, CHEQUE
    pub method: Option<String>,
    pub reference: Option<String>,
    /// Key that makes a retried payment a no-op upstream
    #[serde(skip_serializing)]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct InvoicePaymentArgs {
    pub number: String,
    pub payment_id: String,
}

fn payments(number: &str) -> anyhow::Result<String> {
    Ok(format!("{}/payments", resource(INVOICES, number)?))
}

pub fn tools(client: &LedgerClient) -> Vec<ApiTool> {
    vec![
        ApiTool::new(
            client,
            "list_invoices",
            "List sales invoices, filtered by customer, status or issue date range",
            ToolTier::Tier0,
            |args: ListInvoicesArgs| Ok(ApiRequest::get(INVOICES).query(to_query(&args)?)),
        ),
        ApiTool::new(
            client,
            "get_invoice",
            "Get a sales invoice with its lines and totals",
            ToolTier::Tier0,
            |args: InvoiceNumberArgs| Ok(ApiRequest::get(resource(INVOICES, &args.number)?)),
        ),
        ApiTool::new(
            client,
            "create_invoice",
            "Create a sales invoice for a customer. Supply idempotency_key to make retries safe",
            ToolTier::Tier1,
            |args: CreateInvoiceArgs| {
                Ok(ApiRequest::post(INVOICES)
                    .body(to_body(&args)?)
                    .idempotency_key(args.idempotency_key))
            },
        ),
        ApiTool::new(
            client,
            "update_invoice",
            "Update a draft sales invoice; omitted fields are left unchanged",
            ToolTier::Tier1,
            |args: UpdateInvoiceArgs| {
                Ok(ApiRequest::put(resource(INVOICES, &args.number)?).body(to_body(&args)?))
            },
        ),
        ApiTool::new(
            client,
            "delete_invoice",
            "Delete a sales invoice that has no payments",
            ToolTier::Tier2,
            |args: InvoiceNumberArgs| Ok(ApiRequest::delete(resource(INVOICES, &args.number)?)),
        ),
        ApiTool::new(
            client,
            "email_invoice",
            "Email a sales invoice to the customer",
            ToolTier::Tier1,
            |args: EmailInvoiceArgs| {
                let path = format!("{}/email", resource(INVOICES, &args.number)?);
                Ok(ApiRequest::post(path).body(to_body(&args)?))
            },
        ),
        ApiTool::new(
            client,
            "list_invoice_payments",
            "List payments recorded against a sales invoice",
            ToolTier::Tier0,
            |args: InvoiceNumberArgs| Ok(ApiRequest::get(payments(&args.number)?)),
        ),
        ApiTool::new(
            client,
            "add_invoice_payment",
            "Record a payment against a sales invoice. Supply idempotency_key to make retries safe",
            ToolTier::Tier1,
            |args: AddInvoicePaymentArgs| {
                Ok(ApiRequest::post(payments(&args.number)?)
                    .body(to_body(&args)?)
                    .idempotency_key(args.idempotency_key))
            },
        ),
        ApiTool::new(
            client,
            "delete_invoice_payment",
            "Remove a payment from a sales invoice",
            ToolTier::Tier2,
            |args: InvoicePaymentArgs| {
                Ok(ApiRequest::delete(resource(
                    &payments(&args.number)?,
                    &args.payment_id,
                )?))
            },
        ),
    ]
}

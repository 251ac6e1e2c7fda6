// Product catalogue tools

use crate::tools::command::{resource, to_body, to_query, ApiTool};
use crate::tools::ToolTier;
use ledgerlink_sdk::{ApiRequest, LedgerClient};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const PRODUCTS: &str = "/products";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListProductsArgs {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Results per page (maximum 100)
    pub page_size: Option<u32>,
    /// Filter on product code or name
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ProductCodeArgs {
    /// Product code
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProductArgs {
    /// Unique product code
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    /// Default sale price, excluding tax
    pub sale_price: Option<f64>,
    /// Default purchase price, excluding tax
    pub purchase_price: Option<f64>,
    /// Nominal ledger code for sales
    pub sales_nominal_code: Option<String>,
    /// Nominal ledger code for purchases
    pub purchase_nominal_code: Option<String>,
    /// Tax rate code, e.g. STANDARD, ZERO, EXEMPT
    pub vat_rate: Option<String>,
    /// Whether stock levels are tracked
    pub is_stock_item: Option<bool>,
    /// Key that makes a retried create a no-op upstream
    #[serde(skip_serializing)]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProductArgs {
    /// Code of the product to update
    #[serde(skip_serializing)]
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub sale_price: Option<f64>,
    pub purchase_price: Option<f64>,
    pub sales_nominal_code: Option<String>,
    pub purchase_nominal_code: Option<String>,
    pub vat_rate: Option<String>,
    pub is_stock_item: Option<bool>,
}

pub fn tools(client: &LedgerClient) -> Vec<ApiTool> {
    vec![
        ApiTool::new(
            client,
            "list_products",
            "List products in the catalogue, optionally filtered by code or name",
            ToolTier::Tier0,
            |args: ListProductsArgs| Ok(ApiRequest::get(PRODUCTS).query(to_query(&args)?)),
        ),
        ApiTool::new(
            client,
            "get_product",
            "Get a single product by its code",
            ToolTier::Tier0,
            |args: ProductCodeArgs| Ok(ApiRequest::get(resource(PRODUCTS, &args.code)?)),
        ),
        ApiTool::new(
            client,
            "create_product",
            "Create a product. Supply idempotency_key to make retries safe",
            ToolTier::Tier1,
            |args: CreateProductArgs| {
                Ok(ApiRequest::post(PRODUCTS)
                    .body(to_body(&args)?)
                    .idempotency_key(args.idempotency_key))
            },
        ),
        ApiTool::new(
            client,
            "update_product",
            "Update fields of an existing product; omitted fields are left unchanged",
            ToolTier::Tier1,
            |args: UpdateProductArgs| {
                Ok(ApiRequest::put(resource(PRODUCTS, &args.code)?).body(to_body(&args)?))
            },
        ),
        ApiTool::new(
            client,
            "delete_product",
            "Delete a product that has no transactions",
            ToolTier::Tier2,
            |args: ProductCodeArgs| Ok(ApiRequest::delete(resource(PRODUCTS, &args.code)?)),
        ),
    ]
}

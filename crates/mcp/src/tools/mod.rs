pub mod command;
pub mod customers;
pub mod invoices;
pub mod journals;
pub mod products;
pub mod receipts;
pub mod reports;
pub mod session;
pub mod webhooks;
mod registry;

pub use command::{pascal_case, pascal_case_keys, resource, to_body, to_query, ApiTool, ArgumentError};
pub use registry::{input_schema_for, Tool, ToolRegistry, ToolTier};
pub use session::AuthenticateTool;

use ledgerlink_sdk::LedgerClient;
use std::sync::Arc;

/// Register every ledger tool against `client`.
pub fn register_all(registry: &mut ToolRegistry, client: &LedgerClient) {
    registry.register(Arc::new(AuthenticateTool::new(client)));

    let families = [
        products::tools(client),
        customers::tools(client),
        invoices::tools(client),
        receipts::tools(client),
        journals::tools(client),
        reports::tools(client),
        webhooks::tools(client),
    ];
    for tool in families.into_iter().flatten() {
        registry.register(Arc::new(tool));
    }
}

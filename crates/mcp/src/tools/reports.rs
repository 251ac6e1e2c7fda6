// Financial report tools

use crate::tools::command::{to_query, ApiTool};
use crate::tools::ToolTier;
use ledgerlink_sdk::{ApiRequest, LedgerClient};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Arguments for reports that cover a period.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PeriodArgs {
    /// First day of the period (YYYY-MM-DD)
    pub from_date: String,
    /// Last day of the period (YYYY-MM-DD)
    pub to_date: String,
}

/// Arguments for reports taken at a single date.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AsOfArgs {
    /// Report date (YYYY-MM-DD); defaults to today
    pub as_of_date: Option<String>,
}

fn report(name: &str) -> String {
    format!("/reports/{}", name)
}

pub fn tools(client: &LedgerClient) -> Vec<ApiTool> {
    vec![
        ApiTool::new(
            client,
            "get_profit_and_loss",
            "Profit and loss statement for a period",
            ToolTier::Tier0,
            |args: PeriodArgs| {
                Ok(ApiRequest::get(report("profit-and-loss")).query(to_query(&args)?))
            },
        ),
        ApiTool::new(
            client,
            "get_balance_sheet",
            "Balance sheet at a date",
            ToolTier::Tier0,
            |args: AsOfArgs| Ok(ApiRequest::get(report("balance-sheet")).query(to_query(&args)?)),
        ),
        ApiTool::new(
            client,
            "get_trial_balance",
            "Trial balance of every nominal account at a date",
            ToolTier::Tier0,
            |args: AsOfArgs| Ok(ApiRequest::get(report("trial-balance")).query(to_query(&args)?)),
        ),
        ApiTool::new(
            client,
            "get_aged_debtors",
            "Outstanding customer balances grouped by age",
            ToolTier::Tier0,
            |args: AsOfArgs| Ok(ApiRequest::get(report("aged-debtors")).query(to_query(&args)?)),
        ),
        ApiTool::new(
            client,
            "get_vat_summary",
            "Output and input tax totals for a period",
            ToolTier::Tier0,
            |args: PeriodArgs| Ok(ApiRequest::get(report("vat-summary")).query(to_query(&args)?)),
        ),
    ]
}

// Manual journal tools

use crate::tools::command::{resource, to_body, to_query, ApiTool};
use crate::tools::ToolTier;
use ledgerlink_sdk::{ApiRequest, LedgerClient};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const JOURNALS: &str = "/journals";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListJournalsArgs {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct JournalIdArgs {
    pub id: String,
}

/// One side of a journal. Set exactly one of `debit` or `credit`; the
/// ledger rejects journals whose debits and credits differ.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct JournalLine {
    pub nominal_code: String,
    pub debit: Option<f64>,
    pub credit: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateJournalArgs {
    /// Posting date (YYYY-MM-DD)
    pub date: String,
    pub reference: Option<String>,
    pub description: Option<String>,
    pub lines: Vec<JournalLine>,
    #[serde(skip_serializing)]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReverseJournalArgs {
    #[serde(skip_serializing)]
    pub id: String,
    /// Date of the reversing entry (YYYY-MM-DD); defaults to today
    pub date: Option<String>,
    #[serde(skip_serializing)]
    pub idempotency_key: Option<String>,
}

pub fn tools(client: &LedgerClient) -> Vec<ApiTool> {
    vec![
        ApiTool::new(
            client,
            "list_journals",
            "List manual journals, optionally within a date range",
            ToolTier::Tier0,
            |args: ListJournalsArgs| Ok(ApiRequest::get(JOURNALS).query(to_query(&args)?)),
        ),
        ApiTool::new(
            client,
            "get_journal",
            "Get a manual journal and its lines",
            ToolTier::Tier0,
            |args: JournalIdArgs| Ok(ApiRequest::get(resource(JOURNALS, &args.id)?)),
        ),
        ApiTool::new(
            client,
            "create_journal",
            "Post a manual journal. Debits must equal credits. Supply idempotency_key to make retries safe",
            ToolTier::Tier1,
            |args: CreateJournalArgs| {
                Ok(ApiRequest::post(JOURNALS)
                    .body(to_body(&args)?)
                    .idempotency_key(args.idempotency_key))
            },
        ),
        ApiTool::new(
            client,
            "reverse_journal",
            "Post the mirror image of an existing journal",
            ToolTier::Tier2,
            |args: ReverseJournalArgs| {
                let path = format!("{}/reverse", resource(JOURNALS, &args.id)?);
                Ok(ApiRequest::post(path)
                    .body(to_body(&args)?)
                    .idempotency_key(args.idempotency_key))
            },
        ),
    ]
}

// Tools that translate typed arguments into upstream API requests

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{input_schema_for, Tool, ToolTier};
use anyhow::Result;
use ledgerlink_sdk::{ApiRequest, LedgerClient};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

type Translate = Box<dyn Fn(Value) -> Result<ApiRequest, ArgumentError> + Send + Sync>;

/// Arguments that failed validation, or could not be translated.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ArgumentError(String);

/// A tool backed by one upstream endpoint.
///
/// Arguments are deserialized into `A` before any network call; the
/// translation closure then shapes the upstream request.
pub struct ApiTool {
    name: &'static str,
    description: &'static str,
    tier: ToolTier,
    input_schema: Value,
    translate: Translate,
    client: LedgerClient,
}

impl ApiTool {
    pub fn new<A, F>(
        client: &LedgerClient,
        name: &'static str,
        description: &'static str,
        tier: ToolTier,
        translate: F,
    ) -> Self
    where
        A: DeserializeOwned + JsonSchema,
        F: Fn(A) -> Result<ApiRequest> + Send + Sync + 'static,
    {
        Self {
            name,
            description,
            tier,
            input_schema: input_schema_for::<A>(),
            translate: Box::new(move |arguments| {
                let arguments = match arguments {
                    Value::Null => Value::Object(Map::new()),
                    other => other,
                };
                let args: A =
                    serde_json::from_value(arguments).map_err(|e| ArgumentError(e.to_string()))?;
                translate(args).map_err(|e| ArgumentError(format!("{:#}", e)))
            }),
            client: client.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Validate `arguments` and build the upstream request without sending it.
    pub fn request_for(&self, arguments: Value) -> Result<ApiRequest, ArgumentError> {
        (self.translate)(arguments)
    }
}

#[async_trait::async_trait]
impl Tool for ApiTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema.clone(),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult> {
        let request = match self.request_for(arguments) {
            Ok(request) => request,
            Err(e) => {
                return Ok(CallToolResult::error(format!(
                    "Invalid arguments for {}: {}",
                    self.name, e
                )))
            }
        };

        match self.client.execute(&request).await {
            Ok(body) => Ok(CallToolResult::text(serde_json::to_string_pretty(&body)?)),
            Err(e) => {
                tracing::warn!(
                    tool = self.name,
                    status = ?e.status(),
                    method = e.method().unwrap_or(""),
                    path = e.path().unwrap_or(""),
                    error = %e,
                    "Tool call failed"
                );
                Ok(CallToolResult::error(e.to_string()))
            }
        }
    }

    fn tier(&self) -> ToolTier {
        self.tier
    }
}

/// Convert `snake_case` to `PascalCase`.
pub fn pascal_case(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Rename object keys to `PascalCase` at every depth and drop `null` members.
pub fn pascal_case_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (pascal_case(&k), pascal_case_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(pascal_case_keys).collect()),
        other => other,
    }
}

/// Upstream JSON body for a tool's arguments.
pub fn to_body<T: Serialize>(args: &T) -> Result<Value> {
    Ok(pascal_case_keys(serde_json::to_value(args)?))
}

/// Upstream query parameters for a tool's arguments. Arrays become
/// comma-separated lists; `null` members are skipped.
pub fn to_query<T: Serialize>(args: &T) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(args)?;
    let Value::Object(map) = value else {
        anyhow::bail!("query arguments must be an object");
    };

    Ok(map
        .into_iter()
        .filter_map(|(k, v)| query_value(&v).map(|v| (pascal_case(&k), v)))
        .collect())
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

/// `base/<id>` with the identifier percent-encoded.
///
/// Identifiers that would not name a single segment (empty, `.` or `..`)
/// are rejected.
pub fn resource(base: &str, id: &str) -> Result<String> {
    if matches!(id.trim(), "" | "." | "..") {
        anyhow::bail!("identifier {:?} does not name a resource", id);
    }
    Ok(format!("{}/{}", base, urlencoding::encode(id)))
}

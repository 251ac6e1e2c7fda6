// MCP server: newline-delimited JSON-RPC over stdio

use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, JsonRpcError,
    JsonRpcRequest, JsonRpcResponse, ListToolsResult, ServerCapabilities, ServerInfo,
    ToolsCapability, PROTOCOL_VERSION,
};
use crate::tools::ToolRegistry;
use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

#[derive(Clone)]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Serve on the process's stdin and stdout until stdin closes.
    pub async fn start(&self) -> Result<()> {
        tracing::info!(tools = self.registry.len(), "MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve newline-delimited requests from `reader`, writing responses to
    /// `writer`.
    ///
    /// Every request runs on its own task. Responses go through one writer
    /// task, so each occupies exactly one line however calls interleave.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<JsonRpcResponse>();

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(response) = rx.recv().await {
                let mut line = serde_json::to_string(&response)?;
                line.push('\n');
                writer.write_all(line.as_bytes()).await?;
                writer.flush().await?;
            }
            Ok::<(), anyhow::Error>(())
        });

        let mut lines = BufReader::new(reader).lines();
        let mut in_flight = JoinSet::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let server = self.clone();
            let tx = tx.clone();
            in_flight.spawn(async move {
                if let Some(response) = server.handle_line(&line).await {
                    if tx.send(response).is_err() {
                        tracing::warn!("Response dropped, writer has stopped");
                    }
                }
            });
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Request task failed");
            }
        }

        drop(tx);
        writer_task.await??;
        tracing::info!("Input closed, MCP server stopping");
        Ok(())
    }

    /// Handle one raw input line.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable request line");
                return Some(JsonRpcResponse::error(Value::Null, JsonRpcError::parse_error()));
            }
        };

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle_request(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Malformed request");
                Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()))
            }
        }
    }

    /// Dispatch a request. Notifications (no `id`) produce no response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request()));
        }

        let result = match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(json!({})),
            "tools/list" => self.list_tools(),
            "tools/call" => self.call_tool(request.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let protocol_version = match params {
            Some(params) => {
                let params: InitializeParams = serde_json::from_value(params)
                    .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))?;
                if let Some(client) = &params.client_info {
                    tracing::info!(client = %client.name, version = %client.version, "Client connected");
                }
                params.protocol_version
            }
            None => PROTOCOL_VERSION.to_string(),
        };

        let result = InitializeResult {
            protocol_version,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };
        to_result(&result)
    }

    fn list_tools(&self) -> Result<Value, JsonRpcError> {
        to_result(&ListToolsResult {
            tools: self.registry.list_schemas(),
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params = params.ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))?;

        let Some(tool) = self.registry.get(&params.name) else {
            tracing::warn!(tool = %params.name, "Unknown tool");
            return to_result(&CallToolResult::error(format!("Unknown tool: {}", params.name)));
        };

        let started = Instant::now();
        let result = match tool.execute(params.arguments).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(tool = %params.name, error = %e, "Tool execution failed");
                CallToolResult::error(format!("{:#}", e))
            }
        };
        tracing::info!(
            tool = %params.name,
            is_error = result.is_error.unwrap_or(false),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tool call finished"
        );

        to_result(&result)
    }
}

fn to_result<T: serde::Serialize>(value: &T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::register_all;
    use ledgerlink_sdk::LedgerClient;
    use std::collections::HashMap;
    use tokio::io::AsyncReadExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_for(base_url: &str) -> McpServer {
        let client = LedgerClient::builder()
            .base_url(base_url)
            .credentials("acme", "key")
            .build()
            .unwrap();
        let mut registry = ToolRegistry::new();
        register_all(&mut registry, &client);
        McpServer::new(registry)
    }

    fn offline() -> McpServer {
        server_for("http://127.0.0.1:9")
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok-1",
                "expires_in": 3600
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_initialize_echoes_protocol_version() {
        let response = offline()
            .handle_request(JsonRpcRequest::new(
                1,
                "initialize",
                Some(json!({
                    "protocolVersion": "2025-03-26",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "0.1.0"}
                })),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2025-03-26");
        assert_eq!(result["serverInfo"]["name"], "ledgerlink-mcp");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
    }

    #[tokio::test]
    async fn test_ping_and_notifications() {
        let server = offline();

        let response = server
            .handle_request(JsonRpcRequest::new("p-1", "ping", None))
            .await
            .unwrap();
        assert_eq!(response.id, json!("p-1"));
        assert_eq!(response.result, Some(json!({})));

        let response = server
            .handle_request(JsonRpcRequest::notification("notifications/initialized"))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let response = offline()
            .handle_request(JsonRpcRequest::new(2, "tools/list", None))
            .await
            .unwrap();

        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 37);
        assert_eq!(tools[0]["name"], "add_invoice_payment");
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let server = offline();

        let response = server
            .handle_request(JsonRpcRequest::new(3, "resources/list", None))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32601);

        let response = server
            .handle_request(JsonRpcRequest::new(4, "tools/call", Some(json!({"arguments": {}}))))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);

        let response = server
            .handle_request(JsonRpcRequest::new(5, "tools/call", None))
            .await
            .unwrap();
        assert_eq!(response.error.unwrap().code, -32602);

        let response = server.handle_line("{not json").await.unwrap();
        assert_eq!(response.id, Value::Null);
        assert_eq!(response.error.unwrap().code, -32700);

        let response = server.handle_line(r#"{"id": 6, "jsonrpc": "2.0"}"#).await.unwrap();
        assert_eq!(response.id, json!(6));
        assert_eq!(response.error.unwrap().code, -32600);

        let mut request = JsonRpcRequest::new(7, "ping", None);
        request.jsonrpc = "1.0".to_string();
        let response = server.handle_request(request).await.unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result() {
        let response = offline()
            .handle_request(JsonRpcRequest::new(
                8,
                "tools/call",
                Some(json!({"name": "drop_ledger", "arguments": {}})),
            ))
            .await
            .unwrap();

        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["content"][0]["text"], "Error: Unknown tool: drop_ledger");
    }

    #[tokio::test]
    async fn test_tools_call_reaches_upstream() {
        let upstream = MockServer::start().await;
        mount_token(&upstream).await;
        Mock::given(method("GET"))
            .and(path("/customers/ACME"))
            .and(header("Authorization", "Bearer tok-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"Code": "ACME", "Name": "Acme Ltd"})),
            )
            .expect(1)
            .mount(&upstream)
            .await;

        let response = server_for(&upstream.uri())
            .handle_request(JsonRpcRequest::new(
                9,
                "tools/call",
                Some(json!({"name": "get_customer", "arguments": {"code": "ACME"}})),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert!(result.get("isError").is_none());
        let text = result["content"][0]["text"].as_str().unwrap();
        let body: Value = serde_json::from_str(text).unwrap();
        assert_eq!(body, json!({"Code": "ACME", "Name": "Acme Ltd"}));
    }

    #[tokio::test]
    async fn test_invalid_arguments_make_no_upstream_call() {
        let upstream = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&upstream)
            .await;

        let response = server_for(&upstream.uri())
            .handle_request(JsonRpcRequest::new(
                10,
                "tools/call",
                Some(json!({"name": "create_customer", "arguments": {"code": "ACME"}})),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(
            result["content"][0]["text"],
            "Error: Invalid arguments for create_customer: missing field `name`"
        );
    }

    #[tokio::test]
    async fn test_upstream_error_is_normalized() {
        let upstream = MockServer::start().await;
        mount_token(&upstream).await;
        Mock::given(method("POST"))
            .and(path("/invoices"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "Status": 400,
                "Errors": [{"Code": "INV001", "Message": "Unknown customer", "Detail": "ACME"}]
            })))
            .expect(1)
            .mount(&upstream)
            .await;

        let response = server_for(&upstream.uri())
            .handle_request(JsonRpcRequest::new(
                11,
                "tools/call",
                Some(json!({
                    "name": "create_invoice",
                    "arguments": {"customer_code": "ACME", "issue_date": "2026-10-19", "lines": []}
                })),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(
            result["content"][0]["text"],
            "Error: INV001: Unknown customer - ACME"
        );
    }

    #[tokio::test]
    async fn test_serve_answers_each_request_on_its_own_line() {
        let (mut input, server_input) = tokio::io::duplex(64 * 1024);
        let (server_output, mut output) = tokio::io::duplex(1 << 20);

        let requests = [
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{}}}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#,
            "garbage",
        ];
        for line in requests {
            input.write_all(line.as_bytes()).await.unwrap();
            input.write_all(b"\n").await.unwrap();
        }
        drop(input);

        offline().serve(server_input, server_output).await.unwrap();

        let mut raw = String::new();
        output.read_to_string(&mut raw).await.unwrap();

        let responses: Vec<Value> = raw
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(responses.len(), 4);

        let by_id: HashMap<String, &Value> =
            responses.iter().map(|r| (r["id"].to_string(), r)).collect();
        assert_eq!(by_id["1"]["result"]["protocolVersion"], "2024-11-05");
        assert!(by_id["2"]["result"]["tools"].is_array());
        assert_eq!(by_id["3"]["result"], json!({}));
        assert_eq!(by_id["null"]["error"]["code"], -32700);
    }
}

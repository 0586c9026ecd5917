use super::catalog;
use super::protocol::{
    CallToolParams, CallToolResult, InitializeParams, JsonRpcError, JsonRpcId, JsonRpcRequest,
    JsonRpcResponse, ServerInfo, JSONRPC_VERSION, MCP_PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS,
};
use super::tools;
use crate::client::SlackClient;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "Slack MCP Server";

/// Transport-independent MCP request handling.
#[derive(Clone)]
pub struct McpServer {
    client: Arc<SlackClient>,
}

impl McpServer {
    pub fn new(client: Arc<SlackClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &SlackClient {
        &self.client
    }

    /// Handle one message. Notifications produce no response.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!(method = %request.method, "MCP request received");

        let Some(id) = request.id.clone() else {
            if !request.method.starts_with("notifications/") {
                warn!(method = %request.method, "dropping request without id");
            }
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!("Unsupported jsonrpc version: {}", request.jsonrpc)),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": catalog::tools() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => {
                warn!(method = %request.method, "unknown MCP method");
                JsonRpcResponse::error(id, JsonRpcError::method_not_found(&request.method))
            }
        };
        Some(response)
    }

    /// Parse a raw JSON-RPC message and handle it; malformed input gets a -32700 reply.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    JsonRpcId::Null,
                    JsonRpcError::parse_error(format!("Parse error: {e}")),
                ))
            }
        };
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(request) => self.handle(request).await,
            Err(e) => Some(JsonRpcResponse::error(
                JsonRpcId::Null,
                JsonRpcError::invalid_request(format!("Invalid request: {e}")),
            )),
        }
    }

    fn handle_initialize(&self, id: JsonRpcId, params: Option<Value>) -> JsonRpcResponse {
        let params = match params.map(serde_json::from_value::<InitializeParams>).transpose() {
            Ok(p) => p.unwrap_or_default(),
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid initialize params: {e}")),
                )
            }
        };

        let protocol_version = params
            .protocol_version
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(&v.as_str()))
            .unwrap_or_else(|| MCP_PROTOCOL_VERSION.to_string());
        info!(
            protocol_version = %protocol_version,
            client = ?params.client_info,
            token_type = ?self.client.token_type(),
            "MCP session initialized"
        );

        let server_info = ServerInfo {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": protocol_version,
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": server_info,
            }),
        )
    }

    async fn handle_tools_call(&self, id: JsonRpcId, params: Option<Value>) -> JsonRpcResponse {
        let call = match params.map(serde_json::from_value::<CallToolParams>) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid tool call params: {e}")),
                )
            }
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing tool call params"))
            }
        };

        info!(tool = %call.name, "executing tool");
        match tools::call_tool(&self.client, &call.name, call.arguments).await {
            Ok(payload) => match serde_json::to_value(CallToolResult::json(&payload)) {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
            },
            Err(err) => {
                warn!(tool = %call.name, "rejected tool call: {}", err);
                JsonRpcResponse::error(id, JsonRpcError::invalid_params(err.to_string()))
            }
        }
    }
}

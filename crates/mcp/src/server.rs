//! MCP server: exposes the dispatcher's tools over JSON-RPC.

use serde_json::Value;

use copper_tool_runtime::Dispatcher;

use crate::error::McpError;
use crate::transport::McpTransport;
use crate::types::*;

pub struct McpServer {
    dispatcher: Dispatcher,
    server_name: String,
    server_version: String,
    initialized: bool,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            server_name: "copper-mcp".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            initialized: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    /// Serve requests until the transport closes.
    pub async fn run<T: McpTransport>(&mut self, transport: &mut T) -> Result<(), McpError> {
        tracing::info!(server = %self.server_name, "MCP server starting");

        while let Some(line) = transport.receive().await? {
            tracing::debug!(message = %line, "Received message");
            if let Some(response) = self.handle_line(&line).await {
                let json = serde_json::to_string(&response)?;
                tracing::debug!(response = %json, "Sending response");
                transport.send(&json).await?;
            }
        }

        tracing::info!("Transport closed, shutting down");
        Ok(())
    }

    /// Handle one raw line. Notifications produce no response.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON");
                return Some(JsonRpcResponse::failure(RpcId::Null, McpError::JsonParse(e).to_rpc_error()));
            }
        };

        if raw.get("id").is_none() {
            match serde_json::from_value::<JsonRpcNotification>(raw) {
                Ok(notif) => self.handle_notification(&notif),
                Err(e) => tracing::debug!(error = %e, "Ignoring malformed notification"),
            }
            return None;
        }

        let id = raw
            .get("id")
            .and_then(|v| serde_json::from_value::<RpcId>(v.clone()).ok())
            .unwrap_or(RpcId::Null);
        match serde_json::from_value::<JsonRpcRequest>(raw) {
            Ok(request) => Some(self.handle_request(&request).await),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse JSON-RPC request");
                Some(JsonRpcResponse::failure(id, McpError::InvalidRequest(e.to_string()).to_rpc_error()))
            }
        }
    }

    pub async fn handle_request(&mut self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();
        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(&request.params),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => self.handle_call_tool(&request.params).await,
            method => {
                tracing::warn!(method = %method, "Unknown method");
                Err(McpError::MethodNotFound(method.to_string()))
            }
        };

        match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(err) => JsonRpcResponse::failure(id, err.to_rpc_error()),
        }
    }

    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        match notif.method.as_str() {
            "notifications/initialized" => tracing::info!("Client confirmed initialization"),
            "notifications/cancelled" => tracing::debug!("Client cancelled a request"),
            method => tracing::debug!(method = %method, "Unknown notification, ignoring"),
        }
    }

    fn handle_initialize(&mut self, params: &Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = params
            .clone()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .unwrap_or_default();

        let client = params.client_info.as_ref().map(|c| c.name.as_str()).unwrap_or("unknown");
        match params.protocol_version.as_deref() {
            Some(v) if v != PROTOCOL_VERSION => {
                tracing::warn!(client, requested = v, supported = PROTOCOL_VERSION, "Protocol version differs")
            }
            _ => tracing::info!(client, "Handling initialize"),
        }
        self.initialized = true;

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: Some(self.server_version.clone()),
            },
        };
        Ok(serde_json::to_value(result)?)
    }

    fn handle_list_tools(&self) -> Result<Value, McpError> {
        let tools: Vec<ToolInfo> = self.dispatcher.tools().into_iter().map(ToolInfo::from).collect();
        tracing::debug!(count = tools.len(), "Handling tools/list");
        Ok(serde_json::to_value(ListToolsResult { tools })?)
    }

    /// Runs the tool and returns the command response envelope as text content.
    async fn handle_call_tool(&self, params: &Option<Value>) -> Result<Value, McpError> {
        let params = params
            .clone()
            .ok_or_else(|| McpError::InvalidParams("missing params".to_string()))?;
        let call: CallToolParams =
            serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))?;

        if !self.initialized {
            tracing::warn!(tool = %call.name, "tools/call before initialize");
        }
        if !self.dispatcher.has_tool(&call.name) {
            return Err(McpError::ToolNotFound(call.name));
        }

        let response: copper_tool_runtime::CommandResponse =
            self.dispatcher.execute(&call.name, call.arguments).await.into();
        let text = serde_json::to_string_pretty(&response)?;
        Ok(serde_json::to_value(CallToolResult::text(text, !response.is_success()))?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use copper_core::EntityKind;
    use copper_tool_runtime::default_dispatcher;
    use copper_tool_runtime::mock::MemoryBackend;
    use serde_json::json;

    use super::*;
    use crate::transport::ChannelTransport;

    fn server() -> (McpServer, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        backend.insert(EntityKind::Company, json!({ "id": 5, "name": "Acme" }));
        let dispatcher = default_dispatcher(backend.clone()).unwrap();
        (McpServer::new(dispatcher), backend)
    }

    fn call(id: i64, name: &str, arguments: Value) -> JsonRpcRequest {
        JsonRpcRequest::new(RpcId::Number(id), "tools/call", Some(json!({ "name": name, "arguments": arguments })))
    }

    fn envelope_text(resp: JsonRpcResponse) -> (Value, bool) {
        let result: CallToolResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        let ToolContent::Text { text } = &result.content[0];
        (serde_json::from_str(text).unwrap(), result.is_error)
    }

    #[tokio::test]
    async fn initialize_reports_protocol_and_name() {
        let (mut server, _) = server();
        let req = JsonRpcRequest::new(
            RpcId::Number(1),
            "initialize",
            Some(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": { "name": "test-client" }
            })),
        );
        let resp = server.handle_request(&req).await;
        let result: InitializeResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(result.protocol_version, PROTOCOL_VERSION);
        assert_eq!(result.server_info.name, "copper-mcp");
        assert!(result.capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn lists_all_crm_tools() {
        let (mut server, _) = server();
        let resp = server.handle_request(&JsonRpcRequest::new(RpcId::Number(2), "tools/list", None)).await;
        let result: ListToolsResult = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(result.tools.len(), 32);
        assert!(result.tools.iter().any(|t| t.name == "get_entity_activities"));
    }

    #[tokio::test]
    async fn call_returns_success_envelope() {
        let (mut server, _) = server();
        let resp = server.handle_request(&call(3, "get_company", json!({ "company_id": 5 }))).await;
        let (envelope, is_error) = envelope_text(resp);
        assert!(!is_error);
        assert_eq!(envelope["status"], "success");
        assert_eq!(envelope["data"]["attributes"]["name"], "Acme");
    }

    #[tokio::test]
    async fn failed_call_sets_is_error() {
        let (mut server, backend) = server();
        let resp = server
            .handle_request(&call(
                4,
                "create_opportunity",
                json!({ "data": { "attributes": { "name": "Deal", "monetary_value": -1000 } } }),
            ))
            .await;
        assert!(resp.error.is_none());
        let (envelope, is_error) = envelope_text(resp);
        assert!(is_error);
        assert_eq!(envelope["status"], "error");
        assert_eq!(envelope["error"]["type"], "VALIDATION_ERROR");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_tool_and_method_are_rpc_errors() {
        let (mut server, _) = server();
        let resp = server.handle_request(&call(5, "get_lead", json!({}))).await;
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_PARAMS);

        let resp = server.handle_request(&JsonRpcRequest::new(RpcId::Number(6), "resources/list", None)).await;
        assert_eq!(resp.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn parse_errors_and_notifications() {
        let (mut server, _) = server();
        let resp = server.handle_line("{not json").await.unwrap();
        assert_eq!(resp.id, RpcId::Null);
        assert_eq!(resp.error.unwrap().code, error_codes::PARSE_ERROR);

        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());

        let resp = server.handle_line(r#"{"jsonrpc":"2.0","id":9}"#).await.unwrap();
        assert_eq!(resp.id, RpcId::Number(9));
        assert_eq!(resp.error.unwrap().code, error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn run_over_channel_transport() {
        let (mut client, mut server_side) = ChannelTransport::pair();
        let (mut server, _) = server();
        let handle = tokio::spawn(async move { server.run(&mut server_side).await });

        client.send(&serde_json::to_string(&call(1, "list_companies", json!({}))).unwrap()).await.unwrap();
        client.send(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).await.unwrap();
        client.send(r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#).await.unwrap();

        let first: JsonRpcResponse = serde_json::from_str(&client.receive().await.unwrap().unwrap()).unwrap();
        assert_eq!(first.id, RpcId::Number(1));
        let (envelope, _) = envelope_text(first);
        assert_eq!(envelope["data"][0]["source_id"], "5");

        // the notification is not answered, so the next line is the ping
        let second: JsonRpcResponse = serde_json::from_str(&client.receive().await.unwrap().unwrap()).unwrap();
        assert_eq!(second.id, RpcId::Number(2));

        drop(client);
        handle.await.unwrap().unwrap();
    }
}

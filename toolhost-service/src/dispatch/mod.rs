//! Transport-agnostic request handling: both the stdio and HTTP
//! transports funnel every JSON-RPC request through [`handle_request`]
//! so `initialize`/`tools/list`/`tools/call` behave identically
//! regardless of which one a client is speaking over.

pub mod http;
pub mod protocol;
pub mod session;
pub mod stdio;

use serde_json::{Value, json};

use crate::encoder::{ContentBlock, ResultEncode};
use crate::registry::Registry;
use crate::registry::schema::empty_object_schema;

use self::protocol::{McpError, McpRequest, McpResponse, ToolCallParams, server_info};

const INSTRUCTIONS: &str = "Tool registry and dispatch server exposing web, knowledge, social, analysis, context, and file tools over MCP.";

fn descriptor(entry: &crate::registry::Entry) -> Value {
    let metadata = entry.metadata();
    json!({
        "name": metadata.name,
        "description": metadata.description,
        "inputSchema": metadata.input_schema.clone().unwrap_or_else(empty_object_schema),
    })
}

pub async fn handle_request(registry: &Registry, request: McpRequest) -> McpResponse {
    let id = request.id.clone();

    let result = match request.method.as_str() {
        "initialize" => Ok(server_info(INSTRUCTIONS)),
        "tools/list" => {
            let tools: Vec<Value> = registry.all_entries().iter().map(descriptor).collect();
            Ok(json!({ "tools": tools }))
        }
        "tools/call" => handle_tool_call(registry, request.params).await,
        other => Err(McpError::method_not_found(other)),
    };

    match result {
        Ok(value) => McpResponse::success(id, value),
        Err(error) => McpResponse::failure(id, error),
    }
}

async fn handle_tool_call(registry: &Registry, params: Option<Value>) -> Result<Value, McpError> {
    let params: ToolCallParams = match params {
        Some(value) => serde_json::from_value(value).map_err(|err| McpError::invalid_params(err.to_string()))?,
        None => return Err(McpError::invalid_params("missing params for tools/call")),
    };

    match registry.execute(&params.name, params.arguments).await {
        Ok(value) => {
            let blocks = value.encode();
            Ok(json!({ "content": blocks, "isError": false }))
        }
        Err(err) => {
            let blocks = vec![ContentBlock::text(err.as_call_message(&params.name))];
            Ok(json!({ "content": blocks, "isError": true }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Tool, ToolCategory, ToolMetadata};
    use serde_json::Map;
    use std::sync::Arc;

    fn registry_with_echo() -> Registry {
        let registry = Registry::new();
        let metadata = ToolMetadata::new("echo", "Echoes", ToolCategory::Meta).with_defer_loading(false);
        let tool = Tool::new(metadata, Arc::new(|args| Box::pin(async move { Ok(Value::Object(args)) })));
        registry.register(tool, None);
        registry
    }

    #[tokio::test]
    async fn tools_list_returns_registered_tool() {
        let registry = registry_with_echo();
        let request = McpRequest { jsonrpc: "2.0".to_string(), id: json!(1), method: "tools/list".to_string(), params: None };
        let response = handle_request(&registry, request).await;
        let tools = response.result.unwrap();
        assert_eq!(tools["tools"][0]["name"], "echo");
    }

    #[tokio::test]
    async fn tools_call_on_unknown_tool_returns_in_band_error_block() {
        let registry = registry_with_echo();
        let mut params = Map::new();
        params.insert("name".to_string(), json!("does_not_exist"));
        let request = McpRequest { jsonrpc: "2.0".to_string(), id: json!(2), method: "tools/call".to_string(), params: Some(json!(params)) };
        let response = handle_request(&registry, request).await;
        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().starts_with("Error executing tool does_not_exist:"));
    }

    #[tokio::test]
    async fn unknown_method_returns_method_not_found() {
        let registry = registry_with_echo();
        let request = McpRequest { jsonrpc: "2.0".to_string(), id: json!(3), method: "bogus".to_string(), params: None };
        let response = handle_request(&registry, request).await;
        assert_eq!(response.error.unwrap().code, McpError::METHOD_NOT_FOUND);
    }
}

//! End-to-end scenarios exercising the loader, registry, and dispatch
//! layer together, independent of the on-disk `config/` directory (each
//! test builds its own `CategoryManager`/`Registry` so it is not
//! sensitive to where the test binary happens to run from).

use std::sync::Arc;

use serde_json::{Map, json};

use toolhost_service::dispatch::handle_request;
use toolhost_service::dispatch::protocol::McpRequest;
use toolhost_service::loader::register_all_tools;
use toolhost_service::registry::{CategoryManager, Registry};

fn request(id: i64, method: &str, params: Option<serde_json::Value>) -> McpRequest {
    McpRequest { jsonrpc: "2.0".to_string(), id: json!(id), method: method.to_string(), params }
}

/// An empty `tool_config.yaml` must still leave the always-live
/// meta-tools discoverable, so a client can bootstrap discovery before
/// anything else loads.
#[tokio::test]
async fn discovery_bootstrap_with_empty_tool_config_still_lists_meta_tools() {
    let registry = Registry::new();
    let categories = Arc::new(CategoryManager::load(None));
    register_all_tools(&registry, &categories, None).unwrap();

    let response = handle_request(&registry, request(1, "tools/list", None)).await;
    let tools = response.result.unwrap();
    let names: Vec<&str> = tools["tools"].as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();

    assert!(names.contains(&"search_tools"));
    assert!(names.contains(&"list_tool_categories"));
    assert!(names.contains(&"get_tool_info"));
}

/// A tool configured with `defer_loading: true` appears in `tools/list`
/// but is only materialized on first `tools/call`, and `get_tool_info`
/// can promote it directly.
#[tokio::test]
async fn deferred_tool_promotes_on_first_call() {
    let registry = Registry::new();
    let categories = Arc::new(CategoryManager::load(None));

    let config = tempfile_config(
        r#"
tools:
  search_github:
    category: social
    defer_loading: true
"#,
    );
    register_all_tools(&registry, &categories, Some(config.path())).unwrap();

    assert!(registry.get("search_github").is_none(), "deferred tool must not be live before first use");

    let mut args = Map::new();
    args.insert("tool_name".to_string(), json!("search_github"));
    let response = handle_request(&registry, request(2, "tools/call", Some(json!({ "name": "get_tool_info", "arguments": args })))).await;
    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);

    assert!(registry.get("search_github").is_some(), "get_tool_info must promote the deferred tool");
}

/// Adapters with no explicit input schema still carry one derived from
/// their declared parameters, surfaced unchanged through `tools/list`.
#[tokio::test]
async fn schema_derivation_round_trips_through_tools_list() {
    let registry = Registry::new();
    let categories = Arc::new(CategoryManager::load(None));

    let config = tempfile_config(
        r#"
tools:
  calculator:
    category: analysis
    defer_loading: false
"#,
    );
    register_all_tools(&registry, &categories, Some(config.path())).unwrap();

    let response = handle_request(&registry, request(3, "tools/list", None)).await;
    let tools = response.result.unwrap();
    let calculator = tools["tools"].as_array().unwrap().iter().find(|t| t["name"] == "calculator").unwrap();

    let schema = &calculator["inputSchema"];
    assert_eq!(schema["type"], "object");
    assert!(schema["properties"].get("expression").is_some());
    assert!(schema["required"].as_array().unwrap().contains(&json!("expression")));
}

/// Searching for `search_web` among a catalog that also contains
/// `search_wikipedia` and `search_webpage_content` must rank the exact
/// name match first.
#[tokio::test]
async fn search_tools_ranks_exact_name_match_first() {
    let registry = Registry::new();
    let categories = Arc::new(CategoryManager::load(None));

    let config = tempfile_config(
        r#"
tools:
  search_web:
    category: web
    defer_loading: false
  search_wikipedia:
    category: knowledge
    defer_loading: false
  extract_content_from_url:
    category: web
    defer_loading: false
    description: "search_webpage_content equivalent for ranking coverage"
"#,
    );
    register_all_tools(&registry, &categories, Some(config.path())).unwrap();

    let mut args = Map::new();
    args.insert("query".to_string(), json!("search_web"));
    let response =
        handle_request(&registry, request(4, "tools/call", Some(json!({ "name": "search_tools", "arguments": args })))).await;
    let result = response.result.unwrap();
    assert_eq!(result["isError"], false);

    let blocks = result["content"].as_array().unwrap();
    let payload: serde_json::Value = serde_json::from_str(blocks[0]["text"].as_str().unwrap()).unwrap();
    let first = payload.as_array().unwrap()[0]["name"].as_str().unwrap();
    assert_eq!(first, "search_web");
}

/// Calling an unregistered tool name produces an in-band error block,
/// not a JSON-RPC protocol-level error.
#[tokio::test]
async fn unknown_tool_call_is_an_in_band_error_not_a_protocol_error() {
    let registry = Registry::new();
    let categories = Arc::new(CategoryManager::load(None));
    register_all_tools(&registry, &categories, None).unwrap();

    let response = handle_request(&registry, request(5, "tools/call", Some(json!({ "name": "totally_unknown", "arguments": {} })))).await;
    assert!(response.error.is_none());
    let result = response.result.unwrap();
    assert_eq!(result["isError"], true);
    assert!(result["content"][0]["text"].as_str().unwrap().contains("totally_unknown"));
}

/// `initialize` reports a stable protocol version and server identity,
/// the minimum a client needs before issuing any well-known lookups.
#[tokio::test]
async fn initialize_reports_server_identity() {
    let registry = Registry::new();
    let categories = Arc::new(CategoryManager::load(None));
    register_all_tools(&registry, &categories, None).unwrap();

    let response = handle_request(&registry, request(6, "initialize", None)).await;
    let result = response.result.unwrap();
    assert_eq!(result["serverInfo"]["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(result["protocolVersion"], "2024-11-05");
}

/// Writes a tool_config.yaml body to a temp file for the duration of
/// the returned guard.
fn tempfile_config(contents: &str) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), contents).unwrap();
    file
}

//! Tool-discovery meta-tools: `search_tools`, `list_tool_categories`,
//! `get_tool_info`. These are the three tools the source always
//! registers before anything from `tool_config.yaml`, so a client can
//! discover the rest of the catalog even with every other category
//! deferred.
//!
//! Unlike every other adapter, these close over the registry itself
//! rather than being built from a no-arg constructor — they're
//! registered directly by the loader instead of going through
//! `ADAPTER_REGISTRY`.

use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::error::RegistryResult;
use crate::registry::schema::{ParamSpec, ParamType, generate_input_schema};
use crate::registry::{CategoryManager, Entry, Invoker, Registry, Tool, ToolCategory, ToolMetadata, ToolPriority};

use super::util::{optional_str, optional_u64, required_str};

pub fn register(registry: &Registry, categories: Arc<CategoryManager>) {
    registry.register(search_tools(registry.clone()), None);
    registry.register(list_tool_categories(registry.clone(), categories), None);
    registry.register(get_tool_info(registry.clone()), None);
}

fn entry_to_summary(entry: &Entry) -> Value {
    let metadata = entry.metadata();
    let mut summary = json!({
        "name": metadata.name,
        "description": metadata.description,
        "category": metadata.category.to_string(),
        "priority": metadata.priority.to_string(),
        "tags": metadata.tags.iter().cloned().collect::<Vec<_>>(),
    });

    if let Some(schema) = &metadata.input_schema {
        summary["has_schema"] = json!(true);
        summary["required_params"] = schema.get("required").cloned().unwrap_or_else(|| json!([]));
    }

    summary
}

fn search_tools(registry: Registry) -> Tool {
    let params = [
        ParamSpec::required("query", ParamType::String).described("Search query over name, description, and tags"),
        ParamSpec::optional("category", ParamType::String).described("Restrict results to one category"),
        ParamSpec::optional("limit", ParamType::Integer).described("Maximum number of results (default 10)"),
    ];
    let metadata = ToolMetadata::new("search_tools", "Search the tool catalog by name, description, or tag", ToolCategory::Meta)
        .with_priority(ToolPriority::High)
        .with_defer_loading(false)
        .with_tags(["meta".to_string(), "discovery".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let invoker: Invoker = Arc::new(move |args: Map<String, Value>| {
        let registry = registry.clone();
        Box::pin(async move {
            let query = required_str(&args, "query", "search_tools")?;
            let category = args
                .get("category")
                .and_then(Value::as_str)
                .and_then(|c| c.parse::<ToolCategory>().ok());
            let limit = optional_u64(&args, "limit", 10) as usize;

            let results = registry
                .search(query, category, limit)
                .iter()
                .map(entry_to_summary)
                .collect::<Vec<_>>();

            Ok(json!(results))
        })
    });

    Tool::new(metadata, invoker)
}

fn list_tool_categories(registry: Registry, categories: Arc<CategoryManager>) -> Tool {
    let metadata = ToolMetadata::new("list_tool_categories", "List every tool category with its tool count", ToolCategory::Meta)
        .with_priority(ToolPriority::High)
        .with_defer_loading(false)
        .with_tags(["meta".to_string(), "discovery".to_string()]);

    let invoker: Invoker = Arc::new(move |_args: Map<String, Value>| {
        let registry = registry.clone();
        let categories = categories.clone();
        Box::pin(async move {
            let mut rows = Vec::new();
            for name in categories.all_category_names() {
                let Ok(category) = name.parse::<ToolCategory>() else { continue };
                let entry = categories.category_entry(&name);
                rows.push(json!({
                    "name": name,
                    "display_name": entry.as_ref().and_then(|e| e.display_name.clone()).unwrap_or_else(|| name.clone()),
                    "description": entry.as_ref().and_then(|e| e.description.clone()),
                    "priority": categories.category_priority(&name).to_string(),
                    "icon": entry.as_ref().and_then(|e| e.icon.clone()),
                    "tools_count": registry.category_tool_count(category),
                }));
            }

            Ok(json!({ "categories": rows, "statistics": categories.statistics() }))
        })
    });

    Tool::new(metadata, invoker)
}

fn get_tool_info(registry: Registry) -> Tool {
    let params = [ParamSpec::required("tool_name", ParamType::String).described("Exact tool name")];
    let metadata = ToolMetadata::new("get_tool_info", "Get detailed metadata and statistics for one tool", ToolCategory::Meta)
        .with_priority(ToolPriority::High)
        .with_defer_loading(false)
        .with_tags(["meta".to_string(), "discovery".to_string()])
        .with_input_schema(generate_input_schema(&params));

    let invoker: Invoker = Arc::new(move |args: Map<String, Value>| {
        let registry = registry.clone();
        Box::pin(async move {
            let name = optional_str(&args, "tool_name", "");
            if name.is_empty() {
                return Ok(Value::Null);
            }

            // Loading promotes a deferred tool so its statistics become
            // observable; this is the one meta-tool allowed to trigger it.
            let tool = match registry.load(name).await {
                Ok(tool) => tool,
                Err(_) => return Ok(Value::Null),
            };

            let statistics = tool.statistics();
            Ok(json!({
                "name": tool.metadata.name,
                "description": tool.metadata.description,
                "category": tool.metadata.category.to_string(),
                "priority": tool.metadata.priority.to_string(),
                "tags": tool.metadata.tags.iter().cloned().collect::<Vec<_>>(),
                "input_schema": tool.metadata.input_schema,
                "defer_loading": tool.metadata.defer_loading,
                "statistics": {
                    "execution_count": statistics.execution_count(),
                    "error_count": statistics.error_count(),
                    "average_duration_ms": statistics.average_duration_ms(),
                },
            }))
        })
    });

    Tool::new(metadata, invoker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolMetadata as Metadata;

    fn registry_with_one_live_tool() -> Registry {
        let registry = Registry::new();
        let metadata = Metadata::new("search_web", "Search the web", ToolCategory::Web).with_defer_loading(false);
        let tool = Tool::new(metadata, Arc::new(|args| Box::pin(async move { Ok(Value::Object(args)) })));
        registry.register(tool, None);
        registry
    }

    #[tokio::test]
    async fn search_tools_finds_registered_tool_by_name() {
        let registry = registry_with_one_live_tool();
        let tool = search_tools(registry);
        let mut args = Map::new();
        args.insert("query".to_string(), json!("search_web"));
        let result = tool.execute(args).await.unwrap();
        let results = result.as_array().unwrap();
        assert_eq!(results[0]["name"], "search_web");
    }

    #[tokio::test]
    async fn get_tool_info_returns_null_for_unknown_tool() {
        let registry = registry_with_one_live_tool();
        let tool = get_tool_info(registry);
        let mut args = Map::new();
        args.insert("tool_name".to_string(), json!("does_not_exist"));
        let result = tool.execute(args).await.unwrap();
        assert!(result.is_null());
    }

    #[tokio::test]
    async fn list_tool_categories_reports_seven_default_categories() {
        let registry = registry_with_one_live_tool();
        let categories = Arc::new(CategoryManager::load(None));
        let tool = list_tool_categories(registry, categories);
        let result = tool.execute(Map::new()).await.unwrap();
        assert_eq!(result["categories"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn list_tool_categories_includes_category_manager_statistics() {
        let registry = registry_with_one_live_tool();
        let categories = Arc::new(CategoryManager::load(None));
        let tool = list_tool_categories(registry, categories);
        let result = tool.execute(Map::new()).await.unwrap();
        assert_eq!(result["statistics"]["total_categories"], 7);
        assert_eq!(result["statistics"]["high_priority_count"], 4);
    }
}

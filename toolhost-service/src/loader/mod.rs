//! Turns `tool_config.yaml` plus the compiled-in adapter set into a
//! populated [`Registry`], the Rust analogue of `registry/loader.py`'s
//! `register_all_tools`.

pub mod adapters;
pub mod config;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::RegistryResult;
use crate::registry::{CategoryManager, Loader, Registry, Tool, ToolCategory, ToolPriority};

use self::adapters::resolve_adapter;
use self::config::ToolConfigDocument;

fn read_document(path: Option<&Path>) -> ToolConfigDocument {
    let Some(path) = path else {
        return ToolConfigDocument::default();
    };
    if !path.exists() {
        warn!(path = %path.display(), "tool config not found, starting with an empty tool set");
        return ToolConfigDocument::default();
    }
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read tool config");
            return ToolConfigDocument::default();
        }
    };
    match serde_yaml::from_str(&contents) {
        Ok(document) => document,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to parse tool config, starting with an empty tool set");
            ToolConfigDocument::default()
        }
    }
}

/// Register the always-on meta-tools, then every tool named in
/// `tool_config.yaml`, resolving each against the compiled-in adapter
/// set and the category manager's priority/defer-loading defaults.
/// Unknown or unresolvable entries are logged and skipped rather than
/// failing the whole startup.
pub fn register_all_tools(registry: &Registry, categories: &Arc<CategoryManager>, config_path: Option<&Path>) -> RegistryResult<usize> {
    crate::adapters::meta::register(registry, categories.clone());

    let document = read_document(config_path);
    for (name, entry) in document.tools {
        if entry.enabled == Some(false) {
            info!(name = %name, "tool disabled by configuration, skipping");
            continue;
        }

        let Some(ctor) = resolve_adapter(&name) else {
            warn!(name = %name, "no adapter known for configured tool, skipping");
            continue;
        };

        let (mut metadata, invoker) = ctor();
        metadata.name = name.clone();

        let category_name = entry.category.clone().unwrap_or_else(|| metadata.category.to_string());
        if let Ok(category) = category_name.parse::<ToolCategory>() {
            metadata.category = category;
        } else {
            warn!(name = %name, category = %category_name, "unknown category, keeping adapter default");
        }

        metadata.priority = match entry.priority.as_deref().map(str::parse::<ToolPriority>) {
            Some(Ok(priority)) => priority,
            Some(Err(_)) | None => categories.category_priority(&metadata.category.to_string()),
        };

        metadata.defer_loading = entry
            .defer_loading
            .unwrap_or_else(|| categories.should_defer_loading(&metadata.category.to_string()));

        if let Some(description) = entry.description {
            metadata.description = description;
        }
        if let Some(tags) = entry.tags {
            metadata.tags = tags.into_iter().collect();
        }
        if let Some(schema) = entry.input_schema {
            metadata.input_schema = Some(schema);
        }

        let defer = metadata.defer_loading;
        let tool = Tool::new(metadata, invoker);

        if defer {
            let loader: Loader = {
                let tool = tool.clone();
                Arc::new(move || {
                    let tool = tool.clone();
                    Box::pin(async move { Ok(tool) })
                })
            };
            registry.register(tool, Some(loader));
        } else {
            registry.register(tool, None);
        }
    }

    let total = registry.all_names().len();
    info!(total, "tool registration complete");
    Ok(total)
}

//! Deserialization shape for `tool_config.yaml`.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// Root shape of `tool_config.yaml`: a flat map from tool name to its
/// per-deployment overrides. Everything is optional — an entry can be as
/// small as `{}` and still pick up sensible defaults from the category
/// table.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ToolConfigDocument {
    #[serde(default)]
    pub tools: HashMap<String, ToolConfigEntry>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ToolConfigEntry {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub defer_loading: Option<bool>,
    #[serde(default)]
    pub input_schema: Option<Value>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

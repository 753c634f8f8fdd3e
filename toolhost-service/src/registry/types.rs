//! Closed enumerations and the immutable tool descriptor.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Coarse grouping used for indexing, preload policy, and discovery
/// filtering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Web,
    Knowledge,
    Social,
    Analysis,
    Context,
    Files,
    Meta,
}

/// Loader-facing priority. Advisory: HIGH loads immediately at startup,
/// MEDIUM/LOW are eligible for deferral. Not a scheduling weight at call
/// time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ToolPriority {
    Low,
    Medium,
    High,
}

impl Default for ToolPriority {
    fn default() -> Self {
        ToolPriority::Medium
    }
}

/// Immutable descriptor of one tool. Shared between live tools and
/// deferred records so discovery output never depends on load state.
#[derive(Debug, Clone)]
pub struct ToolMetadata {
    /// Unique name, `^[a-z0-9_]+$`.
    pub name: String,
    pub description: String,
    pub category: ToolCategory,
    pub priority: ToolPriority,
    pub version: String,
    /// Free-form search terms.
    pub tags: HashSet<String>,
    /// JSON Schema for arguments. Derived at construction if absent and a
    /// function is bound.
    pub input_schema: Option<serde_json::Value>,
    pub output_schema: Option<serde_json::Value>,
    pub defer_loading: bool,
    pub requires_network: bool,
    pub requires_filesystem: bool,
    pub estimated_duration_ms: Option<u64>,
}

impl ToolMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>, category: ToolCategory) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            priority: ToolPriority::Medium,
            version: "1.0.0".to_string(),
            tags: HashSet::new(),
            input_schema: None,
            output_schema: None,
            defer_loading: true,
            requires_network: false,
            requires_filesystem: false,
            estimated_duration_ms: None,
        }
    }

    pub fn with_priority(mut self, priority: ToolPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn with_defer_loading(mut self, defer: bool) -> Self {
        self.defer_loading = defer;
        self
    }

    pub fn with_input_schema(mut self, schema: serde_json::Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Case-insensitive substring match over name, description, tags and
    /// category value.
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        if self.name.to_lowercase().contains(&q) {
            return true;
        }
        if self.description.to_lowercase().contains(&q) {
            return true;
        }
        if self.tags.iter().any(|t| t.to_lowercase().contains(&q)) {
            return true;
        }
        self.category.to_string().contains(&q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_strum() {
        assert_eq!(ToolCategory::Web.to_string(), "web");
        assert_eq!("social".parse::<ToolCategory>().unwrap(), ToolCategory::Social);
    }

    #[test]
    fn priority_round_trips_through_strum() {
        assert_eq!(ToolPriority::High.to_string(), "HIGH");
        assert_eq!("MEDIUM".parse::<ToolPriority>().unwrap(), ToolPriority::Medium);
    }

    #[test]
    fn matches_query_checks_name_description_tags_category() {
        let meta = ToolMetadata::new("search_github", "Search GitHub repositories", ToolCategory::Social)
            .with_tags(["code".to_string(), "vcs".to_string()]);
        assert!(meta.matches_query("github"));
        assert!(meta.matches_query("REPOSITOR"));
        assert!(meta.matches_query("code"));
        assert!(meta.matches_query("social"));
        assert!(!meta.matches_query("wikipedia"));
    }
}

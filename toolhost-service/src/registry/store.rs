//! The shared tool registry: one `DashMap` of tagged entries plus three
//! secondary indexes, rebuilt incrementally on insert/promote.
//!
//! `DashMap` gives per-shard locking, so a write for one name never
//! invalidates an in-progress read of another — the concurrency
//! guarantee the store must uphold under parallel dispatch.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde_json::{Map, Value};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::error::{RegistryError, RegistryResult};

use super::entry::{DeferredRecord, Entry, Loader};
use super::tool::Tool;
use super::types::{ToolCategory, ToolPriority};

/// Aggregate counts surfaced by `get_tool_info`/`list_tool_categories`
/// style callers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RegistryStatistics {
    pub total_tools: usize,
    pub live_tools: usize,
    pub deferred_tools: usize,
    pub loaded_categories: usize,
    pub load_count: u64,
    pub search_count: u64,
}

/// The shared registry. Cheaply cloned (every field is an `Arc`-backed
/// concurrent collection), so dispatchers can each hold an owned handle.
#[derive(Clone)]
pub struct Registry {
    entries: Arc<DashMap<String, Entry>>,
    loaded_categories: Arc<DashMap<ToolCategory, ()>>,
    by_category: Arc<DashMap<ToolCategory, Vec<String>>>,
    by_priority: Arc<DashMap<ToolPriority, Vec<String>>>,
    by_tag: Arc<DashMap<String, Vec<String>>>,
    promotion_locks: Arc<DashMap<String, Arc<AsyncMutex<()>>>>,
    load_count: Arc<AtomicU64>,
    search_count: Arc<AtomicU64>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            loaded_categories: Arc::new(DashMap::new()),
            by_category: Arc::new(DashMap::new()),
            by_priority: Arc::new(DashMap::new()),
            by_tag: Arc::new(DashMap::new()),
            promotion_locks: Arc::new(DashMap::new()),
            load_count: Arc::new(AtomicU64::new(0)),
            search_count: Arc::new(AtomicU64::new(0)),
        }
    }

    fn index_insert(&self, entry: &Entry) {
        let metadata = entry.metadata();
        let name = metadata.name.clone();

        self.by_category
            .entry(metadata.category)
            .or_default()
            .push(name.clone());
        self.by_priority
            .entry(metadata.priority)
            .or_default()
            .push(name.clone());
        for tag in &metadata.tags {
            self.by_tag.entry(tag.clone()).or_default().push(name.clone());
        }
    }

    fn index_remove(&self, name: &str, category: ToolCategory, priority: ToolPriority, tags: &HashSet<String>) {
        if let Some(mut names) = self.by_category.get_mut(&category) {
            names.retain(|n| n != name);
        }
        if let Some(mut names) = self.by_priority.get_mut(&priority) {
            names.retain(|n| n != name);
        }
        for tag in tags {
            if let Some(mut names) = self.by_tag.get_mut(tag) {
                names.retain(|n| n != name);
            }
        }
    }

    /// Register a live tool, or a deferred record when `loader` is
    /// supplied. Re-registration of an existing name replaces it with a
    /// warning rather than erroring, per the registry's "last write wins"
    /// collision policy.
    pub fn register(&self, tool: Tool, loader: Option<Loader>) {
        let name = tool.name().to_string();
        if self.entries.contains_key(&name) {
            warn!(name = %name, "tool already registered, overwriting");
            self.remove_from_indexes(&name);
        }

        let entry = match loader {
            Some(loader) => Entry::Deferred(DeferredRecord::new((*tool.metadata).clone(), loader)),
            None => Entry::Live(tool),
        };

        self.index_insert(&entry);
        self.entries.insert(name, entry);
    }

    fn remove_from_indexes(&self, name: &str) {
        if let Some(existing) = self.entries.get(name) {
            let metadata = existing.metadata();
            self.index_remove(name, metadata.category, metadata.priority, &metadata.tags);
        }
    }

    /// Live tool lookup only — deferred entries return `None` here,
    /// matching "metadata exposed in discovery does not depend on load
    /// state" while keeping `get` itself load-state-sensitive for callers
    /// that need a callable tool.
    pub fn get(&self, name: &str) -> Option<Tool> {
        match self.entries.get(name)?.value() {
            Entry::Live(tool) => Some(tool.clone()),
            Entry::Deferred(_) => None,
        }
    }

    pub fn all_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    /// Every registered entry, live or deferred. Used by discovery
    /// (`tools/list`), which must not depend on load state.
    pub fn all_entries(&self) -> Vec<Entry> {
        self.entries.iter().map(|e| e.value().clone()).collect()
    }

    pub fn by_category(&self, category: ToolCategory) -> Vec<Tool> {
        self.by_category
            .get(&category)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| self.get(n))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn by_priority(&self, priority: ToolPriority) -> Vec<Tool> {
        self.by_priority
            .get(&priority)
            .map(|names| names.iter().filter_map(|n| self.get(n)).collect())
            .unwrap_or_default()
    }

    /// Count of tools in a category regardless of load state — unlike
    /// `by_category`, which only returns already-live tools.
    pub fn category_tool_count(&self, category: ToolCategory) -> usize {
        self.by_category.get(&category).map(|names| names.len()).unwrap_or(0)
    }

    pub fn by_tag(&self, tag: &str) -> Vec<Tool> {
        self.by_tag
            .get(tag)
            .map(|names| names.iter().filter_map(|n| self.get(n)).collect())
            .unwrap_or_default()
    }

    /// Search blends live tools with deferred entries, projected through
    /// `Entry::matches_query` uniformly. Ordering: exact-name match
    /// first, then shorter names first, stable otherwise. Truncated to
    /// `limit`.
    pub fn search(&self, query: &str, category: Option<ToolCategory>, limit: usize) -> Vec<Entry> {
        self.search_count.fetch_add(1, Ordering::Relaxed);

        let query_lower = query.to_lowercase();
        let mut results: Vec<Entry> = self
            .entries
            .iter()
            .filter(|e| category.is_none_or(|c| e.metadata().category == c))
            .filter(|e| e.matches_query(query))
            .map(|e| e.value().clone())
            .collect();

        results.sort_by(|a, b| {
            let a_exact = a.name().to_lowercase() == query_lower;
            let b_exact = b.name().to_lowercase() == query_lower;
            match (a_exact, b_exact) {
                (true, false) => std::cmp::Ordering::Less,
                (false, true) => std::cmp::Ordering::Greater,
                _ => a.name().len().cmp(&b.name().len()),
            }
        });

        results.truncate(limit);
        results
    }

    /// The single path from deferred to live. Safe under concurrent calls
    /// for the same name: a per-name lock table ensures at most one
    /// invocation of the backing loader, with every other caller
    /// observing that winner's result.
    pub async fn load(&self, name: &str) -> RegistryResult<Tool> {
        if let Some(tool) = self.get(name) {
            return Ok(tool);
        }

        let lock = self
            .promotion_locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another caller may have promoted this tool while we waited.
        if let Some(tool) = self.get(name) {
            return Ok(tool);
        }

        let record = match self.entries.get(name).map(|e| e.value().clone()) {
            Some(Entry::Deferred(record)) => record,
            Some(Entry::Live(tool)) => return Ok(tool),
            None => return Err(RegistryError::ToolNotFound { name: name.to_string() }),
        };

        info!(name = %name, "loading deferred tool");
        let tool = (record.loader)().await?;

        self.entries.insert(name.to_string(), Entry::Live(tool.clone()));
        self.load_count.fetch_add(1, Ordering::Relaxed);
        self.promotion_locks.remove(name);

        Ok(tool)
    }

    /// Load every deferred tool in a category. Partial failures are
    /// logged, never fatal.
    pub async fn load_category(&self, category: ToolCategory) -> Vec<Tool> {
        if self.loaded_categories.contains_key(&category) {
            return self.by_category(category);
        }

        let deferred_names: Vec<String> = self
            .entries
            .iter()
            .filter(|e| matches!(e.value(), Entry::Deferred(_)) && e.metadata().category == category)
            .map(|e| e.key().clone())
            .collect();

        let mut loaded = Vec::new();
        for name in deferred_names {
            match self.load(&name).await {
                Ok(tool) => loaded.push(tool),
                Err(err) => warn!(name = %name, error = %err, "failed to load tool in category"),
            }
        }

        self.loaded_categories.insert(category, ());
        loaded
    }

    /// Promotes if necessary, then delegates to `execute_tracked`.
    pub async fn execute(&self, name: &str, args: Map<String, Value>) -> RegistryResult<Value> {
        let tool = self.load(name).await?;
        tool.execute_tracked(args).await
    }

    pub fn statistics(&self) -> RegistryStatistics {
        let live_tools = self.entries.iter().filter(|e| e.is_live()).count();
        let total_tools = self.entries.len();
        RegistryStatistics {
            total_tools,
            live_tools,
            deferred_tools: total_tools - live_tools,
            loaded_categories: self.loaded_categories.len(),
            load_count: self.load_count.load(Ordering::Relaxed),
            search_count: self.search_count.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tool::Tool;
    use crate::registry::types::ToolMetadata;
    use std::sync::atomic::AtomicU32;

    fn live_tool(name: &str, category: ToolCategory) -> Tool {
        let metadata = ToolMetadata::new(name, format!("does {name}"), category).with_defer_loading(false);
        Tool::new(
            metadata,
            Arc::new(|args| Box::pin(async move { Ok(Value::Object(args)) })),
        )
    }

    fn deferred_loader(name: &'static str) -> Loader {
        Arc::new(move || {
            Box::pin(async move {
                let metadata = ToolMetadata::new(name, format!("does {name}"), ToolCategory::Social);
                Ok(Tool::new(
                    metadata,
                    Arc::new(|args| Box::pin(async move { Ok(Value::Object(args)) })),
                ))
            })
        })
    }

    #[test]
    fn register_and_get_round_trips_live_tool() {
        let registry = Registry::new();
        registry.register(live_tool("search_web", ToolCategory::Web), None);
        assert!(registry.get("search_web").is_some());
        assert!(registry.all_names().contains(&"search_web".to_string()));
    }

    #[test]
    fn a_deferred_tool_is_in_all_names_but_absent_from_get() {
        let registry = Registry::new();
        let metadata = ToolMetadata::new("search_github", "Search GitHub", ToolCategory::Social);
        let record_tool = Tool::new(metadata, Arc::new(|args| Box::pin(async move { Ok(Value::Object(args)) })));
        registry.register(record_tool, Some(deferred_loader("search_github")));

        assert!(registry.all_names().contains(&"search_github".to_string()));
        assert!(registry.get("search_github").is_none());
    }

    #[tokio::test]
    async fn load_promotes_deferred_to_live_and_removes_it_from_deferred() {
        let registry = Registry::new();
        let metadata = ToolMetadata::new("search_github", "Search GitHub", ToolCategory::Social);
        let record_tool = Tool::new(metadata, Arc::new(|args| Box::pin(async move { Ok(Value::Object(args)) })));
        registry.register(record_tool, Some(deferred_loader("search_github")));

        let stats_before = registry.statistics();
        assert_eq!(stats_before.deferred_tools, 1);
        assert_eq!(stats_before.live_tools, 0);

        let tool = registry.load("search_github").await.unwrap();
        assert_eq!(tool.name(), "search_github");

        let stats_after = registry.statistics();
        assert_eq!(stats_after.live_tools, 1);
        assert_eq!(stats_after.deferred_tools, 0);
    }

    #[tokio::test]
    async fn concurrent_loads_invoke_the_backing_loader_at_most_once() {
        let registry = Registry::new();
        let invocations = Arc::new(AtomicU32::new(0));
        let invocations_clone = invocations.clone();

        let loader: Loader = Arc::new(move || {
            let invocations = invocations_clone.clone();
            Box::pin(async move {
                invocations.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                let metadata = ToolMetadata::new("slow_tool", "Slow", ToolCategory::Social);
                Ok(Tool::new(
                    metadata,
                    Arc::new(|args| Box::pin(async move { Ok(Value::Object(args)) })),
                ))
            })
        });

        let metadata = ToolMetadata::new("slow_tool", "Slow", ToolCategory::Social);
        let record_tool = Tool::new(metadata, Arc::new(|args| Box::pin(async move { Ok(Value::Object(args)) })));
        registry.register(record_tool, Some(loader));

        let r1 = registry.clone();
        let r2 = registry.clone();
        let (a, b) = tokio::join!(
            tokio::spawn(async move { r1.load("slow_tool").await }),
            tokio::spawn(async move { r2.load("slow_tool").await }),
        );
        a.unwrap().unwrap();
        b.unwrap().unwrap();

        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn search_orders_exact_match_first_then_shorter_names() {
        let registry = Registry::new();
        registry.register(live_tool("search_web", ToolCategory::Web), None);
        registry.register(live_tool("search_wikipedia", ToolCategory::Knowledge), None);
        registry.register(live_tool("search_webpage_content", ToolCategory::Web), None);

        let results = registry.search("search_web", None, 10);
        assert_eq!(results[0].name(), "search_web");
    }

    #[test]
    fn statistics_total_equals_live_plus_deferred() {
        let registry = Registry::new();
        registry.register(live_tool("a", ToolCategory::Web), None);
        let metadata = ToolMetadata::new("b", "b", ToolCategory::Social);
        let record_tool = Tool::new(metadata, Arc::new(|args| Box::pin(async move { Ok(Value::Object(args)) })));
        registry.register(record_tool, Some(deferred_loader("b")));

        let stats = registry.statistics();
        assert_eq!(stats.total_tools, stats.live_tools + stats.deferred_tools);
        assert_eq!(stats.total_tools, 2);
    }
}

//! Category manager: loads `categories.yaml`, falls back to a hard-coded
//! default table when the file is absent, and supports lock-free reload.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Deserialize;
use tracing::{info, warn};

use super::types::ToolPriority;

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<ToolPriority>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub defer_loading: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PriorityPolicy {
    #[serde(default)]
    pub load_immediately: bool,
    #[serde(default)]
    pub load_on_first_use: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoadingConfig {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default)]
    pub preload_categories: Vec<String>,
    #[serde(default = "default_initial_tool_limit")]
    pub initial_tool_limit: usize,
    #[serde(default = "default_true")]
    pub enable_tool_search: bool,
    #[serde(default = "default_true")]
    pub enable_defer_loading: bool,
}

fn default_strategy() -> String {
    "category_based".to_string()
}

fn default_initial_tool_limit() -> usize {
    10
}

fn default_true() -> bool {
    true
}

/// Root shape of `categories.yaml`.
#[derive(Debug, Clone, Deserialize, Default)]
struct CategoriesDocument {
    #[serde(default)]
    categories: HashMap<String, CategoryEntry>,
    #[serde(default)]
    priorities: HashMap<String, PriorityPolicy>,
    #[serde(default)]
    loading: LoadingConfig,
}

struct CategoryState {
    categories: HashMap<String, CategoryEntry>,
    priorities: HashMap<String, PriorityPolicy>,
    loading: LoadingConfig,
}

/// Hot-reloadable category configuration. Exposes reload via the same
/// `ArcSwap` pattern used elsewhere for runtime config hot-reload: a
/// reader never blocks on a concurrent writer, and a writer swaps the
/// whole snapshot atomically rather than mutating in place.
pub struct CategoryManager {
    state: ArcSwap<CategoryState>,
    config_path: Option<PathBuf>,
}

impl CategoryManager {
    /// Load from the given path, or fall back to the hard-coded default
    /// table (preserving the Python original's seven categories and
    /// priorities) if the path does not exist.
    pub fn load(path: Option<&Path>) -> Self {
        let config_path = path.map(Path::to_path_buf);
        let state = match &config_path {
            Some(path) if path.exists() => match Self::read_document(path) {
                Ok(document) => {
                    info!(categories = document.categories.len(), path = %path.display(), "loaded category config");
                    document
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to parse categories config, using defaults");
                    default_document()
                }
            },
            Some(path) => {
                warn!(path = %path.display(), "categories config not found, using defaults");
                default_document()
            }
            None => default_document(),
        };

        Self {
            state: ArcSwap::from_pointee(CategoryState {
                categories: state.categories,
                priorities: state.priorities,
                loading: state.loading,
            }),
            config_path,
        }
    }

    fn read_document(path: &Path) -> Result<CategoriesDocument, serde_yaml::Error> {
        let contents = std::fs::read_to_string(path).unwrap_or_default();
        serde_yaml::from_str(&contents)
    }

    /// Re-reads the file and atomically replaces the in-memory snapshot.
    /// Existing tool registrations are unaffected — this only changes
    /// what future lookups observe.
    pub fn reload(&self) {
        let Some(path) = &self.config_path else {
            warn!("cannot reload categories: no config path known");
            return;
        };
        if !path.exists() {
            warn!(path = %path.display(), "cannot reload categories: file not found");
            return;
        }
        match Self::read_document(path) {
            Ok(document) => {
                info!(path = %path.display(), "reloaded category config");
                self.state.store(Arc::new(CategoryState {
                    categories: document.categories,
                    priorities: document.priorities,
                    loading: document.loading,
                }));
            }
            Err(err) => warn!(path = %path.display(), error = %err, "failed to reload categories config"),
        }
    }

    pub fn category_entry(&self, name: &str) -> Option<CategoryEntry> {
        self.state.load().categories.get(name).cloned()
    }

    pub fn category_priority(&self, name: &str) -> ToolPriority {
        self.category_entry(name)
            .and_then(|c| c.priority)
            .unwrap_or(ToolPriority::Medium)
    }

    pub fn should_defer_loading(&self, name: &str) -> bool {
        self.category_entry(name).and_then(|c| c.defer_loading).unwrap_or(true)
    }

    pub fn all_category_names(&self) -> Vec<String> {
        self.state.load().categories.keys().cloned().collect()
    }

    pub fn preload_categories(&self) -> Vec<String> {
        self.state.load().loading.preload_categories.clone()
    }

    pub fn initial_tool_limit(&self) -> usize {
        self.state.load().loading.initial_tool_limit
    }

    pub fn is_tool_search_enabled(&self) -> bool {
        self.state.load().loading.enable_tool_search
    }

    /// Summary counts mirroring the source's `get_statistics`: total
    /// category count, how many are HIGH priority, how many are
    /// preloaded at startup, whether deferred loading is enabled at all,
    /// the active loading strategy, and the config path this manager was
    /// built from (`None` when running on built-in defaults).
    pub fn statistics(&self) -> CategoryStatistics {
        let state = self.state.load();
        let high_priority_count = state
            .categories
            .values()
            .filter(|c| c.priority == Some(ToolPriority::High))
            .count();

        CategoryStatistics {
            total_categories: state.categories.len(),
            high_priority_count,
            preload_count: state.loading.preload_categories.len(),
            defer_loading_enabled: state.loading.enable_defer_loading,
            loading_strategy: state.loading.strategy.clone(),
            config_path: self.config_path.as_ref().map(|p| p.display().to_string()),
        }
    }
}

/// Aggregate category-manager counts, surfaced by `list_tool_categories`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CategoryStatistics {
    pub total_categories: usize,
    pub high_priority_count: usize,
    pub preload_count: usize,
    pub defer_loading_enabled: bool,
    pub loading_strategy: String,
    pub config_path: Option<String>,
}

fn default_document() -> CategoriesDocument {
    let mut categories = HashMap::new();
    categories.insert(
        "web".to_string(),
        CategoryEntry {
            display_name: Some("Web Search & Content".to_string()),
            description: None,
            priority: Some(ToolPriority::High),
            icon: None,
            defer_loading: Some(false),
        },
    );
    categories.insert(
        "knowledge".to_string(),
        CategoryEntry {
            display_name: Some("Knowledge & Academic".to_string()),
            description: None,
            priority: Some(ToolPriority::Medium),
            icon: None,
            defer_loading: Some(true),
        },
    );
    categories.insert(
        "social".to_string(),
        CategoryEntry {
            display_name: Some("Social & Code".to_string()),
            description: None,
            priority: Some(ToolPriority::Medium),
            icon: None,
            defer_loading: Some(true),
        },
    );
    categories.insert(
        "analysis".to_string(),
        CategoryEntry {
            display_name: Some("Analysis & Processing".to_string()),
            description: None,
            priority: Some(ToolPriority::High),
            icon: None,
            defer_loading: Some(false),
        },
    );
    categories.insert(
        "context".to_string(),
        CategoryEntry {
            display_name: Some("Context & Location".to_string()),
            description: None,
            priority: Some(ToolPriority::High),
            icon: None,
            defer_loading: Some(false),
        },
    );
    categories.insert(
        "files".to_string(),
        CategoryEntry {
            display_name: Some("File Management".to_string()),
            description: None,
            priority: Some(ToolPriority::Medium),
            icon: None,
            defer_loading: Some(true),
        },
    );
    categories.insert(
        "meta".to_string(),
        CategoryEntry {
            display_name: Some("Tool Discovery".to_string()),
            description: None,
            priority: Some(ToolPriority::High),
            icon: None,
            defer_loading: Some(false),
        },
    );

    let mut priorities = HashMap::new();
    priorities.insert("HIGH".to_string(), PriorityPolicy { load_immediately: true, load_on_first_use: false });
    priorities.insert("MEDIUM".to_string(), PriorityPolicy { load_immediately: false, load_on_first_use: true });
    priorities.insert("LOW".to_string(), PriorityPolicy { load_immediately: false, load_on_first_use: false });

    CategoriesDocument {
        categories,
        priorities,
        loading: LoadingConfig {
            strategy: "category_based".to_string(),
            preload_categories: vec!["web".to_string(), "analysis".to_string(), "context".to_string(), "meta".to_string()],
            initial_tool_limit: 10,
            enable_tool_search: true,
            enable_defer_loading: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_falls_back_to_seven_default_categories() {
        let manager = CategoryManager::load(None);
        assert_eq!(manager.all_category_names().len(), 7);
        assert_eq!(manager.category_priority("web"), ToolPriority::High);
        assert!(!manager.should_defer_loading("web"));
        assert!(manager.should_defer_loading("social"));
    }

    #[test]
    fn preload_categories_default_to_high_priority_set() {
        let manager = CategoryManager::load(None);
        let preload = manager.preload_categories();
        assert!(preload.contains(&"web".to_string()));
        assert!(preload.contains(&"meta".to_string()));
    }

    #[test]
    fn statistics_counts_high_priority_and_preload_categories() {
        let manager = CategoryManager::load(None);
        let stats = manager.statistics();
        assert_eq!(stats.total_categories, 7);
        assert_eq!(stats.high_priority_count, 4);
        assert_eq!(stats.preload_count, 4);
        assert!(stats.defer_loading_enabled);
        assert_eq!(stats.loading_strategy, "category_based");
        assert!(stats.config_path.is_none());
    }
}

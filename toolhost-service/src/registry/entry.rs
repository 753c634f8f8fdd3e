//! The registry's tagged entry: a tool slot is either already live, or
//! deferred with metadata plus a no-arg thunk that materializes it.
//!
//! This replaces the source's ad-hoc `DeferredToolProxy` (a runtime-built
//! object mirroring the tool interface): discovery iterates over entries
//! uniformly and projects metadata regardless of which variant it finds;
//! execution pattern-matches and promotes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::RegistryResult;

use super::tool::Tool;
use super::types::ToolMetadata;

/// A no-arg thunk that resolves and constructs the live tool. Async
/// because resolution may itself perform I/O (e.g. importing a module
/// that builds an HTTP client).
pub type Loader =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = RegistryResult<Tool>> + Send>> + Send + Sync>;

/// Metadata plus a loader, stored in the registry until first use or
/// explicit load.
#[derive(Clone)]
pub struct DeferredRecord {
    pub metadata: Arc<ToolMetadata>,
    pub loader: Loader,
}

impl DeferredRecord {
    pub fn new(metadata: ToolMetadata, loader: Loader) -> Self {
        Self { metadata: Arc::new(metadata), loader }
    }

    pub fn matches_query(&self, query: &str) -> bool {
        self.metadata.matches_query(query)
    }
}

impl std::fmt::Debug for DeferredRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredRecord")
            .field("name", &self.metadata.name)
            .finish()
    }
}

/// A registry slot: already materialized, or deferred pending first use.
#[derive(Debug, Clone)]
pub enum Entry {
    Live(Tool),
    Deferred(DeferredRecord),
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Entry::Live(tool) => tool.name(),
            Entry::Deferred(record) => &record.metadata.name,
        }
    }

    pub fn metadata(&self) -> Arc<ToolMetadata> {
        match self {
            Entry::Live(tool) => tool.metadata.clone(),
            Entry::Deferred(record) => record.metadata.clone(),
        }
    }

    pub fn matches_query(&self, query: &str) -> bool {
        match self {
            Entry::Live(tool) => tool.matches_query(query),
            Entry::Deferred(record) => record.matches_query(query),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Entry::Live(_))
    }
}

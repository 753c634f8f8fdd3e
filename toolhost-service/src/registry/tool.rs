//! The live `Tool`: metadata plus a boxed invoker and atomic statistics.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde_json::{Map, Value};

use crate::error::{RegistryError, RegistryResult};

use super::types::ToolMetadata;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A tool's executable body. Boxed rather than a bare `fn` because
/// adapters close over HTTP clients and other owned state.
pub type Invoker = Arc<
    dyn Fn(Map<String, Value>) -> BoxFuture<'static, RegistryResult<Value>> + Send + Sync,
>;

/// Execution counters, updated only through `execute_tracked`. Atomics
/// let readers observe them without taking a lock across an `.await`.
#[derive(Debug, Default)]
pub struct ToolStatistics {
    execution_count: AtomicU64,
    error_count: AtomicU64,
    total_duration_ms: AtomicU64,
}

impl ToolStatistics {
    pub fn execution_count(&self) -> u64 {
        self.execution_count.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms.load(Ordering::Relaxed)
    }

    pub fn average_duration_ms(&self) -> u64 {
        let count = self.execution_count();
        if count == 0 {
            0
        } else {
            self.total_duration_ms() / count
        }
    }

    fn record_success(&self, duration_ms: u64) {
        self.execution_count.fetch_add(1, Ordering::Relaxed);
        self.total_duration_ms.fetch_add(duration_ms, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }
}

/// A registered, immediately callable tool: metadata plus invoker plus
/// its own statistics.
#[derive(Clone)]
pub struct Tool {
    pub metadata: Arc<ToolMetadata>,
    invoker: Invoker,
    statistics: Arc<ToolStatistics>,
}

impl Tool {
    pub fn new(metadata: ToolMetadata, invoker: Invoker) -> Self {
        Self {
            metadata: Arc::new(metadata),
            invoker,
            statistics: Arc::new(ToolStatistics::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn statistics(&self) -> &ToolStatistics {
        &self.statistics
    }

    /// Execute the tool body directly, with no tracking. Used internally
    /// by `execute_tracked`.
    pub async fn execute(&self, args: Map<String, Value>) -> RegistryResult<Value> {
        (self.invoker)(args).await
    }

    /// Wraps `execute`: measures wall-clock duration, increments exactly
    /// one of `execution_count`/`error_count`, and never swallows the
    /// error.
    pub async fn execute_tracked(&self, args: Map<String, Value>) -> RegistryResult<Value> {
        let start = Instant::now();
        match self.execute(args).await {
            Ok(value) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                self.statistics.record_success(elapsed_ms);
                Ok(value)
            }
            Err(err) => {
                self.statistics.record_error();
                Err(err)
            }
        }
    }

    pub fn matches_query(&self, query: &str) -> bool {
        self.metadata.matches_query(query)
    }

    /// The `(name, description, inputSchema)` triple returned by
    /// `tools/list`.
    pub fn to_descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.metadata.name.clone(),
            description: self.metadata.description.clone(),
            input_schema: self
                .metadata
                .input_schema
                .clone()
                .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}, "required": []})),
            category: self.metadata.category,
            priority: self.metadata.priority,
        }
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.metadata.name)
            .field("category", &self.metadata.category)
            .field("priority", &self.metadata.priority)
            .finish()
    }
}

/// The `(name, description, inputSchema)` triple returned by
/// `tools/list`, plus the indexing fields meta-tools need.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
    #[serde(skip)]
    pub category: super::types::ToolCategory,
    #[serde(skip)]
    pub priority: super::types::ToolPriority,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::types::ToolCategory;

    fn echo_tool() -> Tool {
        let metadata = ToolMetadata::new("echo", "Echoes its input", ToolCategory::Meta)
            .with_defer_loading(false);
        Tool::new(
            metadata,
            Arc::new(|args: Map<String, Value>| {
                Box::pin(async move { Ok(Value::Object(args)) })
            }),
        )
    }

    fn failing_tool() -> Tool {
        let metadata = ToolMetadata::new("fail", "Always fails", ToolCategory::Meta)
            .with_defer_loading(false);
        Tool::new(
            metadata,
            Arc::new(|_args| {
                Box::pin(async move {
                    Err(RegistryError::AdapterFailure {
                        name: "fail".to_string(),
                        message: "deliberate".to_string(),
                    })
                })
            }),
        )
    }

    #[tokio::test]
    async fn execute_tracked_increments_execution_count_on_success() {
        let tool = echo_tool();
        let result = tool.execute_tracked(Map::new()).await;
        assert!(result.is_ok());
        assert_eq!(tool.statistics().execution_count(), 1);
        assert_eq!(tool.statistics().error_count(), 0);
    }

    #[tokio::test]
    async fn execute_tracked_increments_error_count_on_failure() {
        let tool = failing_tool();
        let result = tool.execute_tracked(Map::new()).await;
        assert!(result.is_err());
        assert_eq!(tool.statistics().execution_count(), 0);
        assert_eq!(tool.statistics().error_count(), 1);
    }

    #[test]
    fn to_descriptor_falls_back_to_empty_object_schema() {
        let tool = echo_tool();
        let descriptor = tool.to_descriptor();
        assert_eq!(descriptor.name, "echo");
        assert_eq!(descriptor.input_schema["type"], "object");
    }
}

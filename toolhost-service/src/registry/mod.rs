//! Tool abstraction, schema derivation, and the shared registry.

pub mod category;
pub mod entry;
pub mod schema;
pub mod store;
pub mod tool;
pub mod types;

pub use category::{CategoryManager, CategoryStatistics};
pub use entry::{DeferredRecord, Entry, Loader};
pub use store::{Registry, RegistryStatistics};
pub use tool::{BoxFuture, Invoker, Tool, ToolDescriptor, ToolStatistics};
pub use types::{ToolCategory, ToolMetadata, ToolPriority};

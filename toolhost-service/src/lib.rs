//! Tool registry and dual-transport dispatch plane for the Model
//! Context Protocol: adapters register themselves (live or deferred)
//! into a shared registry, which two independent transports — a
//! line-framed stream and an HTTP streaming endpoint — both dispatch
//! `tools/list`/`tools/call` against.

pub mod adapters;
pub mod dispatch;
pub mod encoder;
pub mod error;
pub mod loader;
pub mod registry;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::RegistryResult;
use crate::registry::{CategoryManager, Registry};

/// Resolution order for a config file name: working-directory-relative,
/// then repository-relative (the crate's own `config/` directory), then
/// `/etc/<app>/`.
pub fn resolve_config_path(file_name: &str) -> Option<PathBuf> {
    let candidates = [
        PathBuf::from(file_name),
        PathBuf::from("config").join(file_name),
        Path::new(env!("CARGO_MANIFEST_DIR")).join("config").join(file_name),
        PathBuf::from("/etc/toolhost").join(file_name),
    ];

    candidates.into_iter().find(|path| path.exists())
}

/// Build a fully populated registry from the on-disk configuration,
/// falling back to hard-coded defaults when either file is absent.
pub async fn build_registry() -> RegistryResult<(Registry, Arc<CategoryManager>)> {
    let categories_path = resolve_config_path("categories.yaml");
    let tools_path = resolve_config_path("tool_config.yaml");

    if categories_path.is_none() {
        warn!("categories.yaml not found in any resolution path, using built-in defaults");
    }
    if tools_path.is_none() {
        warn!("tool_config.yaml not found in any resolution path, starting with meta-tools only");
    }

    let categories = Arc::new(CategoryManager::load(categories_path.as_deref()));
    let registry = Registry::new();

    let total = loader::register_all_tools(&registry, &categories, tools_path.as_deref())?;
    info!(total, "registry built");

    Ok((registry, categories))
}

/// Shared logging setup for both binaries, matching the compact,
/// `RUST_LOG`-driven format used throughout this crate's ancestry.
pub fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format().with_target(true).with_thread_ids(true).compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toolhost_service=info"));

    tracing_subscriber::registry().with(filter).with(fmt::layer().event_format(format)).init();
}

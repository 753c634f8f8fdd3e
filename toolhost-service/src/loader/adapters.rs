//! Resolves a configured tool name to the adapter constructor that
//! implements it.
//!
//! The source resolved this dynamically: strip a `search_`/`get_` prefix,
//! consult an exceptions table, then `importlib.import_module` the result
//! and pull a (possibly differently-named) symbol out of it. There's no
//! dynamic import in a compiled binary, so the table becomes the whole
//! mechanism: adapters self-register into `ADAPTER_REGISTRY` at startup
//! under their own canonical name, a small alias table carries the cases
//! where a configured tool name and its adapter's canonical name
//! genuinely differ, and substring/prefix rules cover the rest.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::registry::Invoker;
use crate::registry::ToolMetadata;

/// A self-contained adapter factory: produces the tool's metadata
/// (including its derived schema) and its invoker in one synchronous
/// call. No I/O happens here — an adapter that needs an HTTP client
/// builds it with `reqwest::Client::new()`, which is non-blocking.
pub type AdapterCtor = fn() -> (ToolMetadata, Invoker);

pub static ADAPTER_REGISTRY: LazyLock<HashMap<&'static str, AdapterCtor>> =
    LazyLock::new(|| crate::adapters::all().into_iter().collect());

/// Cases where the configured tool name doesn't match the adapter's own
/// canonical name, carried over verbatim from the loader's exceptions
/// table.
static ALIASES: &[(&str, &str)] = &[
    ("search_github", "search_github_repos"),
    ("extract_webpage_content", "extract_content_from_url"),
    ("parse_rss", "search_rss"),
];

/// Substrings that identify an adapter's family regardless of the exact
/// verb prefix used in configuration.
static SUBSTRING_RULES: &[(&str, &str)] = &[
    ("wikipedia", "search_wikipedia"),
    ("github", "search_github_repos"),
    ("reddit", "search_reddit"),
    ("file", "list_files"),
];

fn alias_of(name: &str) -> Option<&'static str> {
    ALIASES.iter().find(|(from, _)| *from == name).map(|(_, to)| *to)
}

fn substring_match(name: &str) -> Option<&'static str> {
    SUBSTRING_RULES.iter().find(|(needle, _)| name.contains(needle)).map(|(_, to)| *to)
}

fn strip_known_prefix(name: &str) -> Option<&str> {
    name.strip_prefix("search_").or_else(|| name.strip_prefix("get_"))
}

/// Resolve a configured tool name to its adapter constructor: direct
/// lookup, then alias, then substring family, then prefix-stripped
/// retry. `None` means the name has no known adapter.
pub fn resolve_adapter(name: &str) -> Option<AdapterCtor> {
    if let Some(ctor) = ADAPTER_REGISTRY.get(name) {
        return Some(*ctor);
    }
    if let Some(alias) = alias_of(name) {
        if let Some(ctor) = ADAPTER_REGISTRY.get(alias) {
            return Some(*ctor);
        }
    }
    if let Some(family) = substring_match(name) {
        if let Some(ctor) = ADAPTER_REGISTRY.get(family) {
            return Some(*ctor);
        }
    }
    if let Some(stripped) = strip_known_prefix(name) {
        if let Some(ctor) = ADAPTER_REGISTRY.get(stripped) {
            return Some(*ctor);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_registry_lookup_succeeds_for_canonical_names() {
        assert!(resolve_adapter("search_web").is_some());
    }

    #[test]
    fn aliased_name_resolves_to_the_real_adapter() {
        assert!(resolve_adapter("search_github").is_some());
    }

    #[test]
    fn unknown_name_resolves_to_nothing() {
        assert!(resolve_adapter("totally_unregistered_tool").is_none());
    }
}

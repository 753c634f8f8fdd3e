//! Concrete tool adapters, grouped the way the source's `tools/`
//! package groups them: one module per category, each exporting a flat
//! `entries()` list of `(canonical_name, constructor)` pairs that the
//! loader's `ADAPTER_REGISTRY` is built from.
//!
//! `meta` is handled separately: those three tools close over the
//! registry itself rather than being built from a no-arg constructor,
//! so they're registered directly by the loader instead of going
//! through `ADAPTER_REGISTRY`.

pub mod analysis;
pub mod context;
pub mod files;
pub mod knowledge;
pub mod meta;
pub mod social;
pub mod util;
pub mod web;

use crate::loader::adapters::AdapterCtor;

/// Every adapter this binary ships with, keyed by its canonical name.
pub fn all() -> Vec<(&'static str, AdapterCtor)> {
    let mut entries = Vec::new();
    entries.extend(web::entries());
    entries.extend(knowledge::entries());
    entries.extend(social::entries());
    entries.extend(analysis::entries());
    entries.extend(context::entries());
    entries.extend(files::entries());
    entries
}

//! Argument extraction helpers shared by adapters. Every adapter
//! receives `serde_json::Map<String, Value>` rather than a typed
//! struct, mirroring the source's `**kwargs` entrypoints; these helpers
//! are the Rust stand-in for `inspect.signature`'s runtime type
//! checking.

use serde_json::{Map, Value};

use crate::error::{RegistryError, RegistryResult};

pub fn required_str<'a>(args: &'a Map<String, Value>, key: &str, tool: &str) -> RegistryResult<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| RegistryError::InvalidArgument {
            name: tool.to_string(),
            message: format!("missing required string argument `{key}`"),
        })
}

pub fn optional_str<'a>(args: &'a Map<String, Value>, key: &str, default: &'a str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or(default)
}

pub fn optional_u64(args: &Map<String, Value>, key: &str, default: u64) -> u64 {
    args.get(key).and_then(Value::as_u64).unwrap_or(default)
}
